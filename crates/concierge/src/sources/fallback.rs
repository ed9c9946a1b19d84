//! Substitute data for sources that failed during a request

use chrono::NaiveDate;

use super::{dataset, reference};
use crate::config::FallbackMode;
use crate::models::{Attraction, Hotel, LocalEvent, TransportOption, WeatherForecast};

/// Tag carried by every item that came from the fallback dataset
pub const FALLBACK_TAG: &str = "fallback";

/// Builds substitutes according to the configured [`FallbackMode`]
#[derive(Debug, Clone, Copy)]
pub struct Fallback {
  mode: FallbackMode,
}

impl Fallback {
  pub fn new(mode: FallbackMode) -> Self {
    Self { mode }
  }

  pub fn mode(&self) -> FallbackMode {
    self.mode
  }

  fn enabled(&self) -> bool {
    self.mode == FallbackMode::Mock
  }

  pub fn attractions(&self, destination: &str, interests: &[String]) -> Vec<Attraction> {
    if !self.enabled() {
      return Vec::new();
    }
    let mut items = dataset::attractions(&reference::lookup(destination), interests);
    for item in items.iter_mut() {
      item.tags.insert(FALLBACK_TAG.to_string());
    }
    items
  }

  pub fn hotels(&self, destination: &str, check_in: NaiveDate) -> Vec<Hotel> {
    if !self.enabled() {
      return Vec::new();
    }
    let mut items = dataset::hotels(&reference::lookup(destination), check_in);
    for item in items.iter_mut() {
      item.tags.insert(FALLBACK_TAG.to_string());
    }
    items
  }

  /// Climatology for the destination, or an unknown condition with no forecast
  pub fn weather(&self, destination: &str, start: NaiveDate, end: NaiveDate) -> WeatherForecast {
    if !self.enabled() {
      return WeatherForecast::default();
    }
    dataset::weather(&reference::lookup(destination), start, end)
  }

  pub fn events(&self, destination: &str, start: NaiveDate, end: NaiveDate) -> Vec<LocalEvent> {
    if !self.enabled() {
      return Vec::new();
    }
    let mut items = dataset::events(&reference::lookup(destination), start, end);
    for item in items.iter_mut() {
      item.tags.insert(FALLBACK_TAG.to_string());
    }
    items
  }

  pub fn transport(&self, destination: &str, start: NaiveDate) -> Vec<TransportOption> {
    if !self.enabled() {
      return Vec::new();
    }
    let mut items = dataset::transport(&reference::lookup(destination), start);
    for item in items.iter_mut() {
      item.tags.insert(FALLBACK_TAG.to_string());
    }
    items
  }
}
