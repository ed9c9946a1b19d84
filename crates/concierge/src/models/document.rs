use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::candidate::CandidateItem;

/// Text content with its embedding, stored in one partition of the vector index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingDocument {
  /// Unique within its partition
  pub id: String,
  #[serde(rename = "type")]
  pub doc_type: String,
  pub content: String,
  #[serde(default)]
  pub metadata: BTreeMap<String, serde_json::Value>,
  #[serde(default)]
  pub embedding: Vec<f32>,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub updated_at: Option<DateTime<Utc>>,
}

impl EmbeddingDocument {
  pub fn new(id: &str, doc_type: &str, content: &str) -> Self {
    Self {
      id: id.to_string(),
      doc_type: doc_type.to_string(),
      content: content.to_string(),
      metadata: BTreeMap::new(),
      embedding: Vec::new(),
      created_at: None,
      updated_at: None,
    }
  }

  /// Document for a candidate item, partitioned by the item's kind
  pub fn from_candidate(item: &CandidateItem) -> Self {
    let mut doc = Self::new(item.id(), item.partition(), &item.embedding_text());
    doc.metadata.insert("name".to_string(), serde_json::Value::String(item.name().to_string()));
    doc.metadata.insert("rating".to_string(), serde_json::json!(item.rating()));
    doc
  }

  pub fn with_metadata(mut self, key: &str, value: serde_json::Value) -> Self {
    self.metadata.insert(key.to_string(), value);
    self
  }

  pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
    self.embedding = embedding;
    self
  }

  pub fn has_embedding(&self) -> bool {
    !self.embedding.is_empty()
  }

  pub fn metadata_str(&self, key: &str) -> Option<&str> {
    self.metadata.get(key).and_then(|v| v.as_str())
  }
}

/// A document returned from a similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
  pub document: EmbeddingDocument,
  /// Cosine similarity in [-1.0, 1.0], higher is more similar
  pub similarity: f32,
}
