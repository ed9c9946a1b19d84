/// Calculate cosine similarity between two embeddings
///
/// Vectors of different lengths, and any all-zero vector, score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
  if a.len() != b.len() {
    return 0.0;
  }

  let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
  let magnitude_a = magnitude(a);
  let magnitude_b = magnitude(b);

  if magnitude_a == 0.0 || magnitude_b == 0.0 {
    0.0
  } else {
    dot_product / (magnitude_a * magnitude_b)
  }
}

/// L2 norm
pub fn magnitude(v: &[f32]) -> f32 {
  v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scale a vector to unit length; all-zero vectors are returned unchanged
pub fn normalize(mut v: Vec<f32>) -> Vec<f32> {
  let norm = magnitude(&v);
  if norm > 0.0 {
    for value in v.iter_mut() {
      *value /= norm;
    }
  }
  v
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_identical_vectors_score_one() {
    let v = vec![0.3, -1.2, 4.0, 0.0, 2.5];
    assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
  }

  #[test]
  fn test_zero_vector_scores_zero() {
    let v = vec![1.0, 2.0, 3.0];
    let zero = vec![0.0; 3];
    assert_eq!(cosine_similarity(&v, &zero), 0.0);
    assert_eq!(cosine_similarity(&zero, &zero), 0.0);
  }

  #[test]
  fn test_opposite_and_orthogonal_vectors() {
    assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
  }

  #[test]
  fn test_length_mismatch_scores_zero() {
    assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
  }

  #[test]
  fn test_normalize_produces_unit_length() {
    let v = normalize(vec![3.0, 4.0]);
    assert!((magnitude(&v) - 1.0).abs() < 1e-6);
    assert_eq!(normalize(vec![0.0, 0.0]), vec![0.0, 0.0]);
  }
}
