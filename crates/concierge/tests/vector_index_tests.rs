use bentley::Logger;
use serde_json::json;
use std::sync::Arc;

use concierge::embedding::HashEmbeddingProvider;
use concierge::models::EmbeddingDocument;
use concierge::{ConciergeError, VectorIndex};

fn index() -> VectorIndex {
  VectorIndex::in_memory(Arc::new(HashEmbeddingProvider::default()), Logger::silent())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_do_not_lose_documents() {
  let index = index();

  let mut handles = Vec::new();
  for i in 0..40 {
    let index = index.clone();
    handles.push(tokio::spawn(async move {
      let doc = EmbeddingDocument::new(&format!("doc-{i}"), "attraction", &format!("harbour walk number {i}"));
      index.store_embedding(doc).await
    }));
  }
  for handle in handles {
    handle.await.unwrap().unwrap();
  }

  assert_eq!(index.count(Some("attraction")).await.unwrap(), 40);
  let hits = index.search_similar("harbour walk", "attraction", 0).await.unwrap();
  assert_eq!(hits.len(), 40);
}

#[tokio::test]
async fn test_identical_text_is_top_hit() {
  let index = index();
  index
    .store_embedding(EmbeddingDocument::new("a", "attraction", "Tile museum with azulejo collection"))
    .await
    .unwrap();
  index.store_embedding(EmbeddingDocument::new("b", "attraction", "Sunset sailing trip on the river")).await.unwrap();

  let hits = index.search_similar("Tile museum with azulejo collection", "attraction", 1).await.unwrap();

  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].document.id, "a");
  assert!((hits[0].similarity - 1.0).abs() < 1e-5);
}

#[tokio::test]
async fn test_partitions_are_isolated() {
  let index = index();
  index.store_embedding(EmbeddingDocument::new("h1", "hotel", "harbour view rooms")).await.unwrap();
  index.store_embedding(EmbeddingDocument::new("e1", "event", "harbour festival")).await.unwrap();

  let hits = index.search_similar("harbour", "hotel", 0).await.unwrap();
  assert_eq!(hits.iter().map(|h| h.document.id.as_str()).collect::<Vec<_>>(), vec!["h1"]);
  assert!(index.search_similar("harbour", "attraction", 0).await.unwrap().is_empty());
  assert_eq!(index.partitions().await.unwrap(), vec!["event".to_string(), "hotel".to_string()]);
}

#[tokio::test]
async fn test_upsert_replaces_content_and_keeps_creation_time() {
  let index = index();
  index
    .store_embedding(EmbeddingDocument::new("t1", "trip", "first draft").with_metadata("user_id", json!("ana")))
    .await
    .unwrap();
  let first = index.get("trip", "t1").await.unwrap().unwrap();

  index.store_embedding(EmbeddingDocument::new("t1", "trip", "final itinerary")).await.unwrap();
  let second = index.get("trip", "t1").await.unwrap().unwrap();

  assert_eq!(index.count(None).await.unwrap(), 1);
  assert_eq!(second.content, "final itinerary");
  assert_eq!(second.created_at, first.created_at);
  assert!(second.updated_at >= first.updated_at);
}

#[tokio::test]
async fn test_mismatched_dimension_is_rejected() {
  let index = index();
  index.store_embedding(EmbeddingDocument::new("a", "attraction", "castle on the hill")).await.unwrap();

  let short = EmbeddingDocument::new("b", "attraction", "river cruise").with_embedding(vec![0.5, 0.5, 0.0]);
  let result = index.store_embedding(short).await;

  assert!(matches!(
    result,
    Err(ConciergeError::DimensionMismatch { expected: 384, actual: 3, .. })
  ));
  assert_eq!(index.count(Some("attraction")).await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_and_clear() {
  let index = index();
  for id in ["a", "b", "c"] {
    index.store_embedding(EmbeddingDocument::new(id, "event", "street food market")).await.unwrap();
  }

  assert!(index.delete("event", "a").await.unwrap());
  assert!(!index.delete("event", "a").await.unwrap());
  assert_eq!(index.clear_partition("event").await.unwrap(), 2);
  assert_eq!(index.count(None).await.unwrap(), 0);
  assert!(index.partitions().await.unwrap().is_empty());
}
