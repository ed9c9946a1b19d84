use bentley::Logger;
use serde_json::json;
use std::sync::Arc;

use super::store::InMemoryVectorStore;
use super::VectorStore;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::models::{EmbeddingDocument, SearchHit};
use crate::similarity::cosine_similarity;

/// Embeds documents on the way in and answers similarity queries per partition
#[derive(Clone)]
pub struct VectorIndex {
  provider: Arc<dyn EmbeddingProvider>,
  store: Arc<dyn VectorStore>,
  logger: Logger,
}

impl VectorIndex {
  pub fn new(provider: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>, logger: Logger) -> Self {
    Self { provider, store, logger }
  }

  pub fn in_memory(provider: Arc<dyn EmbeddingProvider>, logger: Logger) -> Self {
    Self::new(provider, Arc::new(InMemoryVectorStore::new()), logger)
  }

  pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
    &self.provider
  }

  /// Upsert a document, embedding its content first when no vector is attached
  pub async fn store_embedding(&self, mut doc: EmbeddingDocument) -> Result<()> {
    if !doc.has_embedding() && !doc.content.trim().is_empty() {
      doc.embedding = self.provider.embed(&doc.content).await?;
    }

    self.logger.debug_with(
      "storing document",
      &[
        ("id", json!(doc.id)),
        ("partition", json!(doc.doc_type)),
        ("dimension", json!(doc.embedding.len())),
      ],
    );
    self.store.upsert(doc).await
  }

  /// Documents in `doc_type` ranked by cosine similarity to `query`
  ///
  /// Documents without an embedding are skipped. Ties keep storage order.
  /// A `limit` of 0 returns every match.
  pub async fn search_similar(&self, query: &str, doc_type: &str, limit: usize) -> Result<Vec<SearchHit>> {
    let documents = self.store.documents(doc_type).await?;
    if documents.is_empty() {
      return Ok(Vec::new());
    }

    let query_embedding = self.provider.embed(query).await?;

    let mut hits: Vec<SearchHit> = documents
      .into_iter()
      .filter(|doc| doc.has_embedding())
      .map(|doc| {
        let similarity = cosine_similarity(&query_embedding, &doc.embedding);
        SearchHit { document: doc, similarity }
      })
      .collect();

    hits.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));

    if limit > 0 {
      hits.truncate(limit);
    }

    self.logger.debug_with(
      "similarity search",
      &[("partition", json!(doc_type)), ("hits", json!(hits.len()))],
    );
    Ok(hits)
  }

  pub async fn get(&self, doc_type: &str, id: &str) -> Result<Option<EmbeddingDocument>> {
    self.store.get(doc_type, id).await
  }

  pub async fn delete(&self, doc_type: &str, id: &str) -> Result<bool> {
    self.store.delete(doc_type, id).await
  }

  pub async fn count(&self, doc_type: Option<&str>) -> Result<usize> {
    self.store.count(doc_type).await
  }

  pub async fn partitions(&self) -> Result<Vec<String>> {
    self.store.partitions().await
  }

  pub async fn clear_partition(&self, doc_type: &str) -> Result<usize> {
    let removed = self.store.clear_partition(doc_type).await?;
    self.logger.info_with("cleared partition", &[("partition", json!(doc_type)), ("removed", json!(removed))]);
    Ok(removed)
  }
}
