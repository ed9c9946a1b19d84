//! External data sources
//!
//! [`SourceConnector`] is the seam to whatever supplies candidate data. Any
//! call may fail; callers are expected to degrade rather than abort.

pub mod dataset;
pub mod fallback;
pub mod mock;
pub mod profile;
pub mod reference;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Attraction, Hotel, LocalEvent, PriorTrip, TransportOption, WeatherForecast};

pub use crate::models::SourceKind;
pub use mock::MockSourceConnector;
pub use profile::InMemoryProfileStore;

#[async_trait]
pub trait SourceConnector: Send + Sync {
  async fn fetch_attractions(&self, destination: &str, interests: &[String]) -> Result<Vec<Attraction>>;

  async fn fetch_hotels(
    &self,
    destination: &str,
    check_in: NaiveDate,
    check_out: NaiveDate,
    budget: f64,
  ) -> Result<Vec<Hotel>>;

  async fn fetch_weather(&self, destination: &str, start: NaiveDate, end: NaiveDate) -> Result<WeatherForecast>;

  async fn fetch_events(&self, destination: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<LocalEvent>>;

  async fn fetch_transport(&self, destination: &str, start: NaiveDate) -> Result<Vec<TransportOption>>;
}

/// Past trips per user, used to find similar trips
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileStore: Send + Sync {
  async fn prior_trips(&self, user_id: &str) -> Result<Vec<PriorTrip>>;
}
