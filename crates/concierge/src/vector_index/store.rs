use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::VectorStore;
use crate::error::{ConciergeError, Result};
use crate::models::EmbeddingDocument;

type Partition = BTreeMap<String, EmbeddingDocument>;

/// Process-local store guarded by a single reader/writer lock
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
  partitions: RwLock<HashMap<String, Partition>>,
}

impl InMemoryVectorStore {
  pub fn new() -> Self {
    Self::default()
  }
}

/// Dimension shared by the partition's other embedded documents, if any
fn partition_dimension(partition: &Partition, skip_id: &str) -> Option<usize> {
  partition
    .values()
    .filter(|doc| doc.id != skip_id && doc.has_embedding())
    .map(|doc| doc.embedding.len())
    .next()
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
  async fn upsert(&self, mut doc: EmbeddingDocument) -> Result<()> {
    if doc.id.trim().is_empty() {
      return Err(ConciergeError::invalid_request("document id must not be empty"));
    }
    if doc.doc_type.trim().is_empty() {
      return Err(ConciergeError::invalid_request("document type must not be empty"));
    }

    let mut partitions = self.partitions.write().await;
    let partition = partitions.entry(doc.doc_type.clone()).or_default();

    if doc.has_embedding() {
      if let Some(expected) = partition_dimension(partition, &doc.id) {
        if expected != doc.embedding.len() {
          return Err(ConciergeError::DimensionMismatch {
            partition: doc.doc_type.clone(),
            expected,
            actual: doc.embedding.len(),
          });
        }
      }
    }

    let now = Utc::now();
    let previous_created = partition.get(&doc.id).and_then(|existing| existing.created_at);
    doc.created_at = previous_created.or(doc.created_at).or(Some(now));
    doc.updated_at = Some(now);

    partition.insert(doc.id.clone(), doc);
    Ok(())
  }

  async fn get(&self, partition: &str, id: &str) -> Result<Option<EmbeddingDocument>> {
    let partitions = self.partitions.read().await;
    Ok(partitions.get(partition).and_then(|p| p.get(id)).cloned())
  }

  async fn delete(&self, partition: &str, id: &str) -> Result<bool> {
    let mut partitions = self.partitions.write().await;
    let removed = match partitions.get_mut(partition) {
      Some(p) => p.remove(id).is_some(),
      None => false,
    };
    if partitions.get(partition).is_some_and(|p| p.is_empty()) {
      partitions.remove(partition);
    }
    Ok(removed)
  }

  async fn documents(&self, partition: &str) -> Result<Vec<EmbeddingDocument>> {
    let partitions = self.partitions.read().await;
    Ok(partitions.get(partition).map(|p| p.values().cloned().collect()).unwrap_or_default())
  }

  async fn count(&self, partition: Option<&str>) -> Result<usize> {
    let partitions = self.partitions.read().await;
    Ok(match partition {
      Some(name) => partitions.get(name).map_or(0, |p| p.len()),
      None => partitions.values().map(|p| p.len()).sum(),
    })
  }

  async fn partitions(&self) -> Result<Vec<String>> {
    let partitions = self.partitions.read().await;
    let mut names: Vec<String> =
      partitions.iter().filter(|(_, p)| !p.is_empty()).map(|(name, _)| name.clone()).collect();
    names.sort();
    Ok(names)
  }

  async fn clear_partition(&self, partition: &str) -> Result<usize> {
    let mut partitions = self.partitions.write().await;
    Ok(partitions.remove(partition).map_or(0, |p| p.len()))
  }
}
