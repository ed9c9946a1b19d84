use thiserror::Error;

use crate::models::SourceKind;

pub type Result<T> = std::result::Result<T, ConciergeError>;

#[derive(Error, Debug)]
pub enum ConciergeError {
  /// Deployment defect: the engine cannot run at all with this configuration
  #[error("Configuration error: {message}")]
  Configuration { message: String },

  #[error("Invalid trip request: {message}")]
  InvalidRequest { message: String },

  #[error("{source_kind} source unavailable: {message}")]
  SourceUnavailable { source_kind: SourceKind, message: String },

  #[error("{source_kind} fetch timed out after {millis}ms")]
  Timeout { source_kind: SourceKind, millis: u128 },

  #[error("Embedding failed: {message}")]
  Embedding { message: String },

  #[error("Embedding dimension mismatch in '{partition}': expected {expected}, got {actual}")]
  DimensionMismatch { partition: String, expected: usize, actual: usize },

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Serialization error: {message}")]
  Serialization { message: String },
}

impl ConciergeError {
  pub fn configuration(message: impl Into<String>) -> Self {
    Self::Configuration { message: message.into() }
  }

  pub fn invalid_request(message: impl Into<String>) -> Self {
    Self::InvalidRequest { message: message.into() }
  }

  pub fn source_unavailable(source_kind: SourceKind, message: impl Into<String>) -> Self {
    Self::SourceUnavailable { source_kind, message: message.into() }
  }

  pub fn timeout(source_kind: SourceKind, elapsed: std::time::Duration) -> Self {
    Self::Timeout { source_kind, millis: elapsed.as_millis() }
  }

  pub fn embedding(message: impl Into<String>) -> Self {
    Self::Embedding { message: message.into() }
  }

  pub fn serialization(message: impl Into<String>) -> Self {
    Self::Serialization { message: message.into() }
  }
}

impl From<serde_json::Error> for ConciergeError {
  fn from(e: serde_json::Error) -> Self {
    Self::serialization(e.to_string())
  }
}

impl From<serde_yaml::Error> for ConciergeError {
  fn from(e: serde_yaml::Error) -> Self {
    Self::serialization(e.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_messages() {
    let err = ConciergeError::source_unavailable(SourceKind::Hotels, "connection refused");
    assert_eq!(err.to_string(), "hotels source unavailable: connection refused");

    let err = ConciergeError::DimensionMismatch {
      partition: "attraction".to_string(),
      expected: 384,
      actual: 3,
    };
    assert!(err.to_string().contains("expected 384, got 3"));
  }

  #[test]
  fn test_timeout_message_reports_millis() {
    let err = ConciergeError::timeout(SourceKind::Weather, std::time::Duration::from_secs(30));
    assert_eq!(err.to_string(), "weather fetch timed out after 30000ms");
  }
}
