use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use super::{dataset, reference, SourceConnector, SourceKind};
use crate::error::{ConciergeError, Result};
use crate::models::{Attraction, Hotel, LocalEvent, TransportOption, WeatherForecast};

const ALL_SOURCES: [SourceKind; 5] = [
  SourceKind::Attractions,
  SourceKind::Hotels,
  SourceKind::Weather,
  SourceKind::Events,
  SourceKind::Transport,
];

/// Offline connector serving the deterministic dataset
///
/// Individual sources can be switched into a failing state, and an artificial
/// latency can be added to every call.
#[derive(Debug, Default)]
pub struct MockSourceConnector {
  failing: RwLock<BTreeSet<SourceKind>>,
  latency: Option<Duration>,
}

impl MockSourceConnector {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = Some(latency);
    self
  }

  fn read(&self) -> RwLockReadGuard<'_, BTreeSet<SourceKind>> {
    self.failing.read().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  fn write(&self) -> RwLockWriteGuard<'_, BTreeSet<SourceKind>> {
    self.failing.write().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  pub fn fail(&self, source: SourceKind) {
    self.write().insert(source);
  }

  pub fn fail_all(&self) {
    self.write().extend(ALL_SOURCES);
  }

  pub fn recover(&self, source: SourceKind) {
    self.write().remove(&source);
  }

  pub fn is_failing(&self, source: SourceKind) -> bool {
    self.read().contains(&source)
  }

  async fn gate(&self, source: SourceKind) -> Result<()> {
    if let Some(latency) = self.latency {
      tokio::time::sleep(latency).await;
    }
    if self.is_failing(source) {
      return Err(ConciergeError::source_unavailable(source, "simulated outage"));
    }
    Ok(())
  }
}

#[async_trait]
impl SourceConnector for MockSourceConnector {
  async fn fetch_attractions(&self, destination: &str, interests: &[String]) -> Result<Vec<Attraction>> {
    self.gate(SourceKind::Attractions).await?;
    Ok(dataset::attractions(&reference::lookup(destination), interests))
  }

  async fn fetch_hotels(
    &self,
    destination: &str,
    check_in: NaiveDate,
    _check_out: NaiveDate,
    _budget: f64,
  ) -> Result<Vec<Hotel>> {
    self.gate(SourceKind::Hotels).await?;
    Ok(dataset::hotels(&reference::lookup(destination), check_in))
  }

  async fn fetch_weather(&self, destination: &str, start: NaiveDate, end: NaiveDate) -> Result<WeatherForecast> {
    self.gate(SourceKind::Weather).await?;
    Ok(dataset::weather(&reference::lookup(destination), start, end))
  }

  async fn fetch_events(&self, destination: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<LocalEvent>> {
    self.gate(SourceKind::Events).await?;
    Ok(dataset::events(&reference::lookup(destination), start, end))
  }

  async fn fetch_transport(&self, destination: &str, start: NaiveDate) -> Result<Vec<TransportOption>> {
    self.gate(SourceKind::Transport).await?;
    Ok(dataset::transport(&reference::lookup(destination), start))
  }
}
