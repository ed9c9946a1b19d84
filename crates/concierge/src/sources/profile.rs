use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{SourceKind, UserProfileStore};
use crate::error::{ConciergeError, Result};
use crate::models::PriorTrip;

/// Prior trips held in memory, keyed by user id
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
  trips: RwLock<HashMap<String, Vec<PriorTrip>>>,
  failing: AtomicBool,
}

impl InMemoryProfileStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_trips(trips: impl IntoIterator<Item = PriorTrip>) -> Self {
    let mut by_user: HashMap<String, Vec<PriorTrip>> = HashMap::new();
    for trip in trips {
      by_user.entry(trip.user_id.clone()).or_default().push(trip);
    }
    Self { trips: RwLock::new(by_user), failing: AtomicBool::new(false) }
  }

  /// Seed the store from a JSON array of prior trips
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let content = std::fs::read_to_string(path)?;
    let trips: Vec<PriorTrip> = serde_json::from_str(&content)?;
    Ok(Self::with_trips(trips))
  }

  pub async fn add_trip(&self, trip: PriorTrip) {
    self.trips.write().await.entry(trip.user_id.clone()).or_default().push(trip);
  }

  pub fn set_failing(&self, failing: bool) {
    self.failing.store(failing, Ordering::SeqCst);
  }
}

#[async_trait]
impl UserProfileStore for InMemoryProfileStore {
  async fn prior_trips(&self, user_id: &str) -> Result<Vec<PriorTrip>> {
    if self.failing.load(Ordering::SeqCst) {
      return Err(ConciergeError::source_unavailable(SourceKind::PriorTrips, "profile store offline"));
    }
    Ok(self.trips.read().await.get(user_id).cloned().unwrap_or_default())
  }
}
