//! Data model shared by the retrieval, ranking and indexing layers

pub mod candidate;
pub mod criteria;
pub mod document;
pub mod trip;

pub use candidate::{
  Attraction, Bookable, CandidateItem, EmergencyKind, EmergencyService, Hotel, LocalEvent,
  Location, TransportMode, TransportOption,
};
pub use criteria::{RankingWeights, ValidationCriteria};
pub use document::{EmbeddingDocument, SearchHit};
pub use trip::{
  BudgetAllocation, PriorTrip, SimilarTrip, SourceKind, TripContext, TripRequest,
  WeatherCondition, WeatherEntry, WeatherForecast,
};
