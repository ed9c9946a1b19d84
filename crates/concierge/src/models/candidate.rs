//! Candidate items gathered for a trip
//!
//! Every candidate is ephemeral: it lives for one planning request and is not
//! meant to be persisted as-is.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Location {
  pub lat: f64,
  pub lon: f64,
  #[serde(default)]
  pub address: String,
}

impl Location {
  pub fn new(lat: f64, lon: f64, address: &str) -> Self {
    Self { lat, lon, address: address.to_string() }
  }

  /// Great-circle distance in kilometres (haversine)
  pub fn distance_km(&self, other: &Location) -> f64 {
    let d_lat = (other.lat - self.lat).to_radians();
    let d_lon = (other.lon - self.lon).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
      + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
  pub id: String,
  pub name: String,
  #[serde(rename = "type")]
  pub kind: String,
  #[serde(default)]
  pub tags: BTreeSet<String>,
  #[serde(default)]
  pub location: Location,
  pub rating: f64,
  /// Discrete price level, 0 (free) to 4 (very expensive)
  pub price_level: u8,
  pub available: bool,
  #[serde(default)]
  pub opening_hours: Option<String>,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub accessible: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
  pub id: String,
  pub name: String,
  #[serde(rename = "type", default = "default_hotel_kind")]
  pub kind: String,
  #[serde(default)]
  pub tags: BTreeSet<String>,
  #[serde(default)]
  pub location: Location,
  pub rating: f64,
  pub price_per_night: f64,
  pub available: bool,
  #[serde(default)]
  pub amenities: Vec<String>,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub accessible: Option<bool>,
}

fn default_hotel_kind() -> String {
  "hotel".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
  Flight,
  Train,
  Bus,
  Ferry,
  Metro,
  Car,
}

impl TransportMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      TransportMode::Flight => "flight",
      TransportMode::Train => "train",
      TransportMode::Bus => "bus",
      TransportMode::Ferry => "ferry",
      TransportMode::Metro => "metro",
      TransportMode::Car => "car",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportOption {
  pub id: String,
  pub name: String,
  pub mode: TransportMode,
  #[serde(default)]
  pub tags: BTreeSet<String>,
  #[serde(default)]
  pub location: Location,
  pub rating: f64,
  pub price: f64,
  pub available: bool,
  #[serde(default)]
  pub duration_minutes: u32,
  #[serde(default)]
  pub departure: Option<DateTime<Utc>>,
  #[serde(default)]
  pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalEvent {
  pub id: String,
  pub name: String,
  #[serde(rename = "type")]
  pub kind: String,
  #[serde(default)]
  pub tags: BTreeSet<String>,
  #[serde(default)]
  pub location: Location,
  pub date: NaiveDate,
  pub rating: f64,
  pub price: f64,
  pub available: bool,
  #[serde(default)]
  pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmergencyKind {
  Hospital,
  Police,
  Fire,
  Ambulance,
  Pharmacy,
  Embassy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyService {
  pub id: String,
  pub name: String,
  #[serde(rename = "type")]
  pub kind: EmergencyKind,
  pub phone: String,
  #[serde(default)]
  pub location: Location,
  pub rating: f64,
  pub available: bool,
  pub open_24h: bool,
  #[serde(default)]
  pub description: String,
}

/// Any retrievable entity, for code that handles every kind uniformly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CandidateItem {
  Attraction(Attraction),
  Hotel(Hotel),
  Transport(TransportOption),
  Event(LocalEvent),
  Emergency(EmergencyService),
}

impl CandidateItem {
  pub fn id(&self) -> &str {
    match self {
      CandidateItem::Attraction(a) => &a.id,
      CandidateItem::Hotel(h) => &h.id,
      CandidateItem::Transport(t) => &t.id,
      CandidateItem::Event(e) => &e.id,
      CandidateItem::Emergency(e) => &e.id,
    }
  }

  pub fn name(&self) -> &str {
    match self {
      CandidateItem::Attraction(a) => &a.name,
      CandidateItem::Hotel(h) => &h.name,
      CandidateItem::Transport(t) => &t.name,
      CandidateItem::Event(e) => &e.name,
      CandidateItem::Emergency(e) => &e.name,
    }
  }

  pub fn rating(&self) -> f64 {
    match self {
      CandidateItem::Attraction(a) => a.rating,
      CandidateItem::Hotel(h) => h.rating,
      CandidateItem::Transport(t) => t.rating,
      CandidateItem::Event(e) => e.rating,
      CandidateItem::Emergency(e) => e.rating,
    }
  }

  /// Partition name used when the item is stored in the vector index
  pub fn partition(&self) -> &'static str {
    match self {
      CandidateItem::Attraction(_) => "attraction",
      CandidateItem::Hotel(_) => "hotel",
      CandidateItem::Transport(_) => "transport",
      CandidateItem::Event(_) => "event",
      CandidateItem::Emergency(_) => "emergency",
    }
  }

  /// Text that represents the item for embedding
  pub fn embedding_text(&self) -> String {
    match self {
      CandidateItem::Attraction(a) => {
        join_text(&[&a.name, &a.kind, &join_tags(&a.tags), &a.description, &a.location.address])
      }
      CandidateItem::Hotel(h) => join_text(&[
        &h.name,
        &h.kind,
        &join_tags(&h.tags),
        &h.amenities.join(" "),
        &h.description,
        &h.location.address,
      ]),
      CandidateItem::Transport(t) => {
        join_text(&[&t.name, t.mode.as_str(), &join_tags(&t.tags), &t.description])
      }
      CandidateItem::Event(e) => {
        join_text(&[&e.name, &e.kind, &join_tags(&e.tags), &e.description, &e.location.address])
      }
      CandidateItem::Emergency(e) => {
        join_text(&[&e.name, &format!("{:?}", e.kind).to_lowercase(), &e.location.address])
      }
    }
  }
}

fn join_tags(tags: &BTreeSet<String>) -> String {
  tags.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}

fn join_text(parts: &[&str]) -> String {
  parts.iter().filter(|p| !p.trim().is_empty()).copied().collect::<Vec<_>>().join(" ")
}

/// Items whose availability can be simulated or refreshed by a source
#[derive(Debug)]
pub enum Bookable<'a> {
  Attraction(&'a mut Attraction),
  Hotel(&'a mut Hotel),
  Transport(&'a mut TransportOption),
}

impl Bookable<'_> {
  pub fn id(&self) -> &str {
    match self {
      Bookable::Attraction(a) => &a.id,
      Bookable::Hotel(h) => &h.id,
      Bookable::Transport(t) => &t.id,
    }
  }

  pub fn is_available(&self) -> bool {
    match self {
      Bookable::Attraction(a) => a.available,
      Bookable::Hotel(h) => h.available,
      Bookable::Transport(t) => t.available,
    }
  }

  pub fn set_available(&mut self, available: bool) {
    match self {
      Bookable::Attraction(a) => a.available = available,
      Bookable::Hotel(h) => h.available = available,
      Bookable::Transport(t) => t.available = available,
    }
  }
}

impl<'a> From<&'a mut Attraction> for Bookable<'a> {
  fn from(item: &'a mut Attraction) -> Self {
    Bookable::Attraction(item)
  }
}

impl<'a> From<&'a mut Hotel> for Bookable<'a> {
  fn from(item: &'a mut Hotel) -> Self {
    Bookable::Hotel(item)
  }
}

impl<'a> From<&'a mut TransportOption> for Bookable<'a> {
  fn from(item: &'a mut TransportOption) -> Self {
    Bookable::Transport(item)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn attraction() -> Attraction {
    Attraction {
      id: "a1".to_string(),
      name: "Old Town Museum".to_string(),
      kind: "museum".to_string(),
      tags: ["culture".to_string(), "history".to_string()].into_iter().collect(),
      location: Location::new(48.8566, 2.3522, "Rue de Rivoli"),
      rating: 4.5,
      price_level: 2,
      available: true,
      opening_hours: None,
      description: "Paintings and sculpture".to_string(),
      accessible: Some(true),
    }
  }

  #[test]
  fn test_distance_km_zero_for_same_point() {
    let paris = Location::new(48.8566, 2.3522, "");
    assert!(paris.distance_km(&paris).abs() < 1e-9);
  }

  #[test]
  fn test_distance_km_paris_london() {
    let paris = Location::new(48.8566, 2.3522, "");
    let london = Location::new(51.5074, -0.1278, "");
    let km = paris.distance_km(&london);
    assert!((km - 343.5).abs() < 5.0, "got {km}");
  }

  #[test]
  fn test_bookable_sets_availability() {
    let mut item = attraction();
    {
      let mut bookable = Bookable::from(&mut item);
      assert_eq!(bookable.id(), "a1");
      bookable.set_available(false);
      assert!(!bookable.is_available());
    }
    assert!(!item.available);
  }

  #[test]
  fn test_embedding_text_includes_tags_and_type() {
    let text = CandidateItem::Attraction(attraction()).embedding_text();
    assert!(text.contains("Old Town Museum"));
    assert!(text.contains("museum"));
    assert!(text.contains("culture history"));
  }

  #[test]
  fn test_attraction_serializes_type_field() {
    let json = serde_json::to_value(attraction()).unwrap();
    assert_eq!(json["type"], "museum");
    assert_eq!(json["price_level"], 2);
  }
}
