//! Partitioned vector storage and cosine-similarity search
//!
//! Documents are grouped into partitions keyed by their type tag
//! (`attraction`, `hotel`, `trip`, ...). Storage lives behind the
//! [`VectorStore`] trait so other backends can be swapped in without touching
//! [`VectorIndex`].

pub mod index;
pub mod store;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::EmbeddingDocument;

pub use index::VectorIndex;
pub use store::InMemoryVectorStore;

/// Storage interface for embedded documents
///
/// Implementations upsert by `(doc_type, id)` with last-write-wins semantics,
/// keep the first `created_at` a document was stored with and refresh
/// `updated_at` on every write.
#[async_trait]
pub trait VectorStore: Send + Sync {
  /// Insert or replace a document in the partition named by its type
  async fn upsert(&self, doc: EmbeddingDocument) -> Result<()>;

  async fn get(&self, partition: &str, id: &str) -> Result<Option<EmbeddingDocument>>;

  /// Remove a document, returning whether it existed
  async fn delete(&self, partition: &str, id: &str) -> Result<bool>;

  /// Snapshot of every document in a partition
  async fn documents(&self, partition: &str) -> Result<Vec<EmbeddingDocument>>;

  /// Documents in one partition, or in all partitions when `None`
  async fn count(&self, partition: Option<&str>) -> Result<usize>;

  /// Names of all non-empty partitions, sorted
  async fn partitions(&self) -> Result<Vec<String>>;

  /// Drop every document in a partition, returning how many were removed
  async fn clear_partition(&self, partition: &str) -> Result<usize>;
}
