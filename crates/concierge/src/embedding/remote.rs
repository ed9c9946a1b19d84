use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::EmbeddingProvider;
use crate::error::{ConciergeError, Result};

/// Embeddings from an OpenAI-compatible `/embeddings` endpoint
#[derive(Debug, Clone)]
pub struct RemoteEmbeddingProvider {
  client: Client,
  endpoint: Url,
  model: String,
  dimension: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
  model: &'a str,
  input: [&'a str; 1],
  dimensions: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
  data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
  embedding: Vec<f32>,
}

impl RemoteEmbeddingProvider {
  pub fn new(
    base_url: &str,
    model: &str,
    api_key: Option<&str>,
    dimension: usize,
    timeout: Duration,
  ) -> Result<Self> {
    if model.trim().is_empty() {
      return Err(ConciergeError::configuration("remote embedding model name is empty"));
    }
    if dimension == 0 {
      return Err(ConciergeError::configuration("embedding dimension must be greater than zero"));
    }

    let endpoint = embeddings_url(base_url)?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
      let value = HeaderValue::from_str(&format!("Bearer {key}"))
        .map_err(|_| ConciergeError::configuration("embedding API key is not a valid header"))?;
      headers.insert(AUTHORIZATION, value);
    }

    let client = Client::builder()
      .timeout(timeout)
      .default_headers(headers)
      .build()
      .map_err(|e| ConciergeError::configuration(format!("failed to build HTTP client: {e}")))?;

    Ok(Self { client, endpoint, model: model.to_string(), dimension })
  }

  /// Like [`RemoteEmbeddingProvider::new`], reading the API key from `api_key_env` when set
  pub fn from_env(
    base_url: &str,
    model: &str,
    api_key_env: &str,
    dimension: usize,
    timeout: Duration,
  ) -> Result<Self> {
    let api_key = std::env::var(api_key_env).ok();
    Self::new(base_url, model, api_key.as_deref(), dimension, timeout)
  }

  pub fn endpoint(&self) -> &Url {
    &self.endpoint
  }
}

#[async_trait]
impl EmbeddingProvider for RemoteEmbeddingProvider {
  async fn embed(&self, text: &str) -> Result<Vec<f32>> {
    let request = EmbeddingRequest { model: &self.model, input: [text], dimensions: self.dimension };

    let response = self
      .client
      .post(self.endpoint.clone())
      .json(&request)
      .send()
      .await
      .map_err(|e| ConciergeError::embedding(format!("embedding request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_else(|_| "<body unavailable>".to_string());
      return Err(ConciergeError::embedding(format!(
        "embedding endpoint returned {status}: {body}"
      )));
    }

    let parsed: EmbeddingResponse = response
      .json()
      .await
      .map_err(|e| ConciergeError::embedding(format!("malformed embedding response: {e}")))?;

    let embedding = parsed
      .data
      .into_iter()
      .next()
      .map(|entry| entry.embedding)
      .ok_or_else(|| ConciergeError::embedding("embedding response contained no vectors"))?;

    if embedding.len() != self.dimension {
      return Err(ConciergeError::embedding(format!(
        "model {} returned {} dimensions, expected {}",
        self.model,
        embedding.len(),
        self.dimension
      )));
    }

    Ok(embedding)
  }

  fn dimension(&self) -> usize {
    self.dimension
  }

  fn model_name(&self) -> String {
    self.model.clone()
  }
}

fn embeddings_url(base_url: &str) -> Result<Url> {
  let trimmed = base_url.trim().trim_end_matches('/');
  let full = if trimmed.ends_with("/embeddings") {
    trimmed.to_string()
  } else {
    format!("{trimmed}/embeddings")
  };

  let url = Url::parse(&full)
    .map_err(|e| ConciergeError::configuration(format!("invalid embedding endpoint '{base_url}': {e}")))?;
  match url.scheme() {
    "http" | "https" => Ok(url),
    other => Err(ConciergeError::configuration(format!(
      "embedding endpoint must use http or https, got '{other}'"
    ))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_endpoint_gets_embeddings_suffix() {
    let url = embeddings_url("https://api.example.com/v1/").unwrap();
    assert_eq!(url.as_str(), "https://api.example.com/v1/embeddings");

    let url = embeddings_url("http://localhost:8080/v1/embeddings").unwrap();
    assert_eq!(url.as_str(), "http://localhost:8080/v1/embeddings");
  }

  #[test]
  fn test_rejects_bad_endpoints() {
    assert!(embeddings_url("not a url").is_err());
    assert!(embeddings_url("ftp://example.com").is_err());
  }

  #[test]
  fn test_new_validates_settings() {
    let timeout = Duration::from_secs(5);
    assert!(RemoteEmbeddingProvider::new("https://x.test/v1", "", None, 8, timeout).is_err());
    assert!(RemoteEmbeddingProvider::new("https://x.test/v1", "m", None, 0, timeout).is_err());

    let provider =
      RemoteEmbeddingProvider::new("https://x.test/v1", "small", Some("k"), 8, timeout).unwrap();
    assert_eq!(provider.dimension(), 8);
    assert_eq!(provider.model_name(), "small");
    assert_eq!(provider.endpoint().path(), "/v1/embeddings");
  }
}
