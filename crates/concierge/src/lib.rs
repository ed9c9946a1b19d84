//! Concierge - Trip Context Retrieval, Validation and Ranking Engine
//!
//! Gathers candidate attractions, hotels, transport, events and weather for a
//! trip request, filters and ranks them against the traveler's constraints,
//! partitions the budget, and finds similar past trips through a vector index.

pub mod config;
pub mod embedding;
pub mod error;
pub mod models;
pub mod ranking;
pub mod retriever;
pub mod similarity;
pub mod sources;
pub mod vector_index;

pub use config::{ConciergeConfig, EmbeddingBackend, FallbackMode};
pub use embedding::{build_provider, EmbeddingProvider};
pub use error::{ConciergeError, Result};
pub use ranking::{BudgetPolicy, Rankable, ValidatorRanker};
pub use retriever::ContextRetriever;
pub use sources::{InMemoryProfileStore, MockSourceConnector, SourceConnector, UserProfileStore};
pub use vector_index::{InMemoryVectorStore, VectorIndex, VectorStore};
