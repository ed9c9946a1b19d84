use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::text::extract_words;
use super::EmbeddingProvider;
use crate::error::{ConciergeError, Result};
use crate::similarity::normalize;

pub const DEFAULT_DIMENSION: usize = 384;

const MODEL_NAME: &str = "hashed-bag-of-words";

/// Deterministic embedding backed by feature hashing
///
/// Each meaningful word is hashed into one bucket with a hashed sign, so texts
/// sharing vocabulary land close together. Identical input always produces
/// bit-identical output, which keeps tests and offline runs reproducible.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
  dimension: usize,
}

impl HashEmbeddingProvider {
  pub fn new(dimension: usize) -> Result<Self> {
    if dimension == 0 {
      return Err(ConciergeError::configuration("embedding dimension must be greater than zero"));
    }
    Ok(Self { dimension })
  }

  pub fn embed_sync(&self, text: &str) -> Vec<f32> {
    let words = extract_words(text);
    let mut vector = vec![0.0f32; self.dimension];

    if words.is_empty() {
      // Nothing to hash word-wise; spread the raw text over every bucket instead
      fill_from_digest(text.as_bytes(), &mut vector);
    } else {
      for word in &words {
        let digest = Sha256::digest(word.as_bytes());
        let bucket = bucket_index(&digest, self.dimension);
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign;
      }
    }

    // Opposite signs can cancel out entirely
    if vector.iter().all(|v| *v == 0.0) {
      fill_from_digest(text.as_bytes(), &mut vector);
    }

    normalize(vector)
  }
}

impl Default for HashEmbeddingProvider {
  fn default() -> Self {
    Self { dimension: DEFAULT_DIMENSION }
  }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
  async fn embed(&self, text: &str) -> Result<Vec<f32>> {
    Ok(self.embed_sync(text))
  }

  fn dimension(&self) -> usize {
    self.dimension
  }

  fn model_name(&self) -> String {
    MODEL_NAME.to_string()
  }
}

fn bucket_index(digest: &[u8], dimension: usize) -> usize {
  let mut bytes = [0u8; 8];
  bytes.copy_from_slice(&digest[..8]);
  (u64::from_le_bytes(bytes) % dimension as u64) as usize
}

/// Fill `out` with values in [-1, 1] taken from SHA-256(seed || block counter)
fn fill_from_digest(seed: &[u8], out: &mut [f32]) {
  let mut counter: u32 = 0;
  let mut filled = 0;
  while filled < out.len() {
    let mut hasher = Sha256::new();
    hasher.update(seed);
    hasher.update(counter.to_le_bytes());
    let block = hasher.finalize();
    for byte in block.iter() {
      if filled == out.len() {
        break;
      }
      out[filled] = (*byte as f32 / 127.5) - 1.0;
      filled += 1;
    }
    counter += 1;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::similarity::{cosine_similarity, magnitude};

  #[test]
  fn test_zero_dimension_rejected() {
    assert!(HashEmbeddingProvider::new(0).is_err());
  }

  #[tokio::test]
  async fn test_deterministic_output() {
    let provider = HashEmbeddingProvider::default();
    let a = provider.embed("Museum of modern art").await.unwrap();
    let b = provider.embed("Museum of modern art").await.unwrap();

    assert_eq!(a.len(), DEFAULT_DIMENSION);
    assert_eq!(a, b);
  }

  #[test]
  fn test_vectors_are_unit_length() {
    let provider = HashEmbeddingProvider::new(32).unwrap();
    for text in ["beach day", "", "the and", "x"] {
      let v = provider.embed_sync(text);
      assert_eq!(v.len(), 32);
      assert!((magnitude(&v) - 1.0).abs() < 1e-5, "not unit length for {:?}", text);
    }
  }

  #[test]
  fn test_shared_vocabulary_scores_higher() {
    let provider = HashEmbeddingProvider::default();
    let query = provider.embed_sync("art museum");
    let close = provider.embed_sync("modern art museum downtown");
    let far = provider.embed_sync("surf lessons harbour");

    assert!(cosine_similarity(&query, &close) > cosine_similarity(&query, &far));
  }

  #[test]
  fn test_case_and_stop_words_ignored() {
    let provider = HashEmbeddingProvider::default();
    assert_eq!(provider.embed_sync("The Art Museum"), provider.embed_sync("art museum"));
  }
}
