use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::candidate::{Attraction, EmergencyService, Hotel, LocalEvent, TransportOption};
use super::criteria::ValidationCriteria;
use crate::error::{ConciergeError, Result};

/// One planning request as received from the request-handling layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
  pub destination: String,
  pub start_date: NaiveDate,
  pub end_date: NaiveDate,
  #[serde(default)]
  pub budget: f64,
  #[serde(default = "default_travelers")]
  pub travelers: u32,
  #[serde(default)]
  pub interests: Vec<String>,
  #[serde(default)]
  pub preferences: BTreeMap<String, serde_json::Value>,
  #[serde(default)]
  pub user_id: Option<String>,

  /// Explicit overrides for the derived validation criteria
  #[serde(default)]
  pub required_rating: Option<f64>,
  #[serde(default)]
  pub preferred_types: Option<Vec<String>>,
  #[serde(default)]
  pub availability_check: Option<bool>,
  #[serde(default)]
  pub accessibility: bool,
}

fn default_travelers() -> u32 {
  1
}

impl TripRequest {
  pub fn new(destination: &str, start_date: NaiveDate, end_date: NaiveDate) -> Self {
    Self {
      destination: destination.to_string(),
      start_date,
      end_date,
      budget: 0.0,
      travelers: default_travelers(),
      interests: Vec::new(),
      preferences: BTreeMap::new(),
      user_id: None,
      required_rating: None,
      preferred_types: None,
      availability_check: None,
      accessibility: false,
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.destination.trim().is_empty() {
      return Err(ConciergeError::invalid_request("destination must not be empty"));
    }
    if self.start_date > self.end_date {
      return Err(ConciergeError::invalid_request(format!(
        "start date {} is after end date {}",
        self.start_date, self.end_date
      )));
    }
    if !self.budget.is_finite() || self.budget < 0.0 {
      return Err(ConciergeError::invalid_request(format!(
        "budget must be a non-negative number, got {}",
        self.budget
      )));
    }
    if self.travelers == 0 {
      return Err(ConciergeError::invalid_request("at least one traveler is required"));
    }
    Ok(())
  }

  /// Number of nights, at least one for same-day trips
  pub fn nights(&self) -> i64 {
    (self.end_date - self.start_date).num_days().max(1)
  }

  pub fn to_criteria(&self) -> ValidationCriteria {
    ValidationCriteria {
      budget: self.budget,
      required_rating: self.required_rating.unwrap_or(0.0),
      preferred_types: self.preferred_types.clone().unwrap_or_else(|| self.interests.clone()),
      accessibility: self.accessibility,
      preferences: self.preferences.clone(),
      availability_check: self.availability_check.unwrap_or(true),
      anchor: None,
    }
  }

  /// Free text describing the trip, used for similarity lookups
  pub fn query_text(&self) -> String {
    if self.interests.is_empty() {
      self.destination.clone()
    } else {
      format!("{} {}", self.destination, self.interests.join(" "))
    }
  }
}

/// External sources feeding a trip context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
  Attractions,
  Hotels,
  Weather,
  Events,
  Transport,
  PriorTrips,
  Emergency,
}

impl SourceKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      SourceKind::Attractions => "attractions",
      SourceKind::Hotels => "hotels",
      SourceKind::Weather => "weather",
      SourceKind::Events => "events",
      SourceKind::Transport => "transport",
      SourceKind::PriorTrips => "prior_trips",
      SourceKind::Emergency => "emergency",
    }
  }
}

impl std::fmt::Display for SourceKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
  pub summary: String,
  pub temperature_c: f64,
  pub precipitation_chance: f64,
}

impl Default for WeatherCondition {
  fn default() -> Self {
    Self { summary: "unknown".to_string(), temperature_c: 0.0, precipitation_chance: 0.0 }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherEntry {
  pub date: NaiveDate,
  pub summary: String,
  pub high_c: f64,
  pub low_c: f64,
  pub precipitation_chance: f64,
}

/// Current condition plus forecast entries ordered by date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WeatherForecast {
  pub current: WeatherCondition,
  #[serde(default)]
  pub forecast: Vec<WeatherEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorTrip {
  pub id: String,
  pub user_id: String,
  pub destination: String,
  #[serde(default)]
  pub start_date: Option<NaiveDate>,
  #[serde(default)]
  pub end_date: Option<NaiveDate>,
  #[serde(default)]
  pub interests: Vec<String>,
  #[serde(default)]
  pub notes: String,
  #[serde(default)]
  pub rating: Option<f64>,
}

impl PriorTrip {
  pub fn embedding_text(&self) -> String {
    let mut parts = vec![self.destination.clone()];
    parts.extend(self.interests.iter().cloned());
    if !self.notes.trim().is_empty() {
      parts.push(self.notes.clone());
    }
    parts.join(" ")
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarTrip {
  pub trip: PriorTrip,
  pub similarity: f32,
}

/// Fixed shares of the total trip budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetAllocation {
  pub total: f64,
  pub hotels: f64,
  pub activities: f64,
  pub transport: f64,
  pub reserve: f64,
}

/// Everything gathered for one planning request
///
/// List fields are always present; an empty list means "insufficient data",
/// not a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripContext {
  pub destination: String,
  #[serde(default)]
  pub user_id: Option<String>,
  #[serde(default)]
  pub attractions: Vec<Attraction>,
  #[serde(default)]
  pub hotels: Vec<Hotel>,
  #[serde(default)]
  pub transport_options: Vec<TransportOption>,
  #[serde(default)]
  pub local_events: Vec<LocalEvent>,
  #[serde(default)]
  pub emergency_services: Vec<EmergencyService>,
  #[serde(default)]
  pub weather: WeatherForecast,
  #[serde(default)]
  pub similar_trips: Vec<SimilarTrip>,
  #[serde(default)]
  pub budget_allocation: Option<BudgetAllocation>,
  /// Sources that failed and were substituted with fallback data
  #[serde(default)]
  pub degraded_sources: Vec<SourceKind>,
}

impl TripContext {
  pub fn empty(destination: &str) -> Self {
    Self {
      destination: destination.to_string(),
      user_id: None,
      attractions: Vec::new(),
      hotels: Vec::new(),
      transport_options: Vec::new(),
      local_events: Vec::new(),
      emergency_services: Vec::new(),
      weather: WeatherForecast::default(),
      similar_trips: Vec::new(),
      budget_allocation: None,
      degraded_sources: Vec::new(),
    }
  }

  pub fn is_degraded(&self, source: SourceKind) -> bool {
    self.degraded_sources.contains(&source)
  }

  pub fn mark_degraded(&mut self, source: SourceKind) {
    if !self.is_degraded(source) {
      self.degraded_sources.push(source);
    }
  }
}
