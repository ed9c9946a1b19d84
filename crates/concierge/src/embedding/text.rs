use std::collections::HashSet;

/// Common English stop words to filter out
const STOP_WORDS: &[&str] = &[
  // Articles and determiners
  "the", "a", "an", // Conjunctions
  "and", "or", "but", // Prepositions
  "in", "on", "at", "to", "for", "of", "with", "by", "over", "near", // Common verbs
  "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will",
  "would", "could", "should", // Pronouns
  "you", "your", "we", "our", "us", "they", "them", "their", "it", "its",
];

/// Get the stop words as a HashSet for efficient lookup
pub fn get_stop_words() -> HashSet<&'static str> {
  STOP_WORDS.iter().cloned().collect()
}

/// Lowercased meaningful words of `text`, in order of appearance, stop words removed
pub fn extract_words(text: &str) -> Vec<String> {
  let stop_words = get_stop_words();

  text
    .split_whitespace()
    .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
    .filter(|word| !word.is_empty() && !stop_words.contains(word.as_str()))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extract_words_basic() {
    let words = extract_words("The quick brown fox jumps over the lazy dog");

    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"over".to_string()));
    assert_eq!(words, vec!["quick", "brown", "fox", "jumps", "lazy", "dog"]);
  }

  #[test]
  fn test_extract_words_punctuation() {
    let words = extract_words("Museums, galleries & cafés!");
    assert_eq!(words, vec!["museums", "galleries", "cafés"]);
  }

  #[test]
  fn test_extract_words_only_stop_words() {
    assert!(extract_words("the and or but").is_empty());
    assert!(extract_words("").is_empty());
  }
}
