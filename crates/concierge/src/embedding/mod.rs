//! Embedding providers
//!
//! The vector index only depends on the `text -> fixed vector` contract of
//! [`EmbeddingProvider`], so the deterministic mock backend and a real remote
//! model can be swapped through configuration alone.

pub mod mock;
pub mod remote;
pub mod text;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::EmbeddingBackend;
use crate::error::{ConciergeError, Result};

pub use mock::HashEmbeddingProvider;
pub use remote::RemoteEmbeddingProvider;

/// Maps text to a fixed-length vector
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
  async fn embed(&self, text: &str) -> Result<Vec<f32>>;

  /// Length of every vector this provider produces
  fn dimension(&self) -> usize;

  /// Identifier of the model behind the provider
  fn model_name(&self) -> String;
}

/// Build the provider selected by configuration
///
/// A disabled backend is a deployment defect and the only hard failure here.
pub fn build_provider(backend: &EmbeddingBackend) -> Result<Arc<dyn EmbeddingProvider>> {
  match backend {
    EmbeddingBackend::Disabled => Err(ConciergeError::configuration(
      "no embedding backend configured; set `embedding.backend` to `mock` or `remote`",
    )),
    EmbeddingBackend::Mock { dimension } => {
      Ok(Arc::new(HashEmbeddingProvider::new(*dimension)?))
    }
    EmbeddingBackend::Remote { endpoint, model, api_key_env, dimension, timeout_secs } => {
      let provider = RemoteEmbeddingProvider::from_env(
        endpoint,
        model,
        api_key_env,
        *dimension,
        std::time::Duration::from_secs(*timeout_secs),
      )?;
      Ok(Arc::new(provider))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_disabled_backend_is_configuration_error() {
    let result = build_provider(&EmbeddingBackend::Disabled);
    assert!(matches!(result, Err(ConciergeError::Configuration { .. })));
  }

  #[tokio::test]
  async fn test_mock_backend_builds() {
    let provider = build_provider(&EmbeddingBackend::Mock { dimension: 64 }).unwrap();
    assert_eq!(provider.dimension(), 64);
    assert_eq!(provider.embed("lisbon").await.unwrap().len(), 64);
  }
}
