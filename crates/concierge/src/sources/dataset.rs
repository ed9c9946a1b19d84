//! Deterministic per-destination candidate data
//!
//! Everything here is a pure function of the destination name and dates, so
//! the same request always produces the same candidates.

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeSet;

use super::reference::{seasonal_multiplier, seasonal_temperature, stable_unit, DestinationProfile};
use crate::models::{
  Attraction, Bookable, EmergencyKind, EmergencyService, Hotel, LocalEvent, Location, TransportMode,
  TransportOption, WeatherCondition, WeatherEntry, WeatherForecast,
};

/// Longest forecast the dataset produces
pub const MAX_FORECAST_DAYS: usize = 14;

/// Share of bookable items reported as unavailable
const UNAVAILABLE_RATE: f64 = 0.15;

struct AttractionTemplate {
  name: &'static str,
  kind: &'static str,
  tags: &'static [&'static str],
  price_level: u8,
  rating: f64,
  accessible: Option<bool>,
  hours: Option<&'static str>,
}

const ATTRACTIONS: &[AttractionTemplate] = &[
  AttractionTemplate { name: "Museum of Art", kind: "museum", tags: &["culture", "art"], price_level: 2, rating: 4.5, accessible: Some(true), hours: Some("10:00-18:00") },
  AttractionTemplate { name: "History Museum", kind: "museum", tags: &["culture", "history"], price_level: 1, rating: 4.3, accessible: Some(true), hours: Some("09:00-17:00") },
  AttractionTemplate { name: "Old Town Walking Tour", kind: "tour", tags: &["culture", "history", "outdoor"], price_level: 1, rating: 4.6, accessible: Some(false), hours: Some("10:00-12:00") },
  AttractionTemplate { name: "Cathedral", kind: "landmark", tags: &["culture", "heritage", "architecture"], price_level: 0, rating: 4.7, accessible: None, hours: Some("08:00-19:00") },
  AttractionTemplate { name: "Botanical Garden", kind: "park", tags: &["outdoor", "nature", "family"], price_level: 0, rating: 4.4, accessible: Some(true), hours: Some("08:00-20:00") },
  AttractionTemplate { name: "Waterfront Promenade", kind: "park", tags: &["outdoor", "walking"], price_level: 0, rating: 4.1, accessible: Some(true), hours: None },
  AttractionTemplate { name: "Science Centre", kind: "museum", tags: &["family", "science"], price_level: 2, rating: 4.2, accessible: Some(true), hours: Some("09:30-17:30") },
  AttractionTemplate { name: "Central Food Market", kind: "market", tags: &["food", "local"], price_level: 1, rating: 4.3, accessible: None, hours: Some("07:00-15:00") },
  AttractionTemplate { name: "Rooftop Jazz Bar", kind: "bar", tags: &["nightlife", "music"], price_level: 3, rating: 4.0, accessible: Some(false), hours: Some("19:00-02:00") },
  AttractionTemplate { name: "Observation Deck", kind: "viewpoint", tags: &["views", "landmark"], price_level: 3, rating: 4.2, accessible: Some(true), hours: Some("10:00-22:00") },
  AttractionTemplate { name: "Harbour Day Cruise", kind: "tour", tags: &["outdoor", "boat"], price_level: 4, rating: 4.4, accessible: Some(false), hours: Some("11:00-16:00") },
];

struct HotelTemplate {
  name: &'static str,
  kind: &'static str,
  tags: &'static [&'static str],
  base_price: f64,
  rating: f64,
  amenities: &'static [&'static str],
  accessible: Option<bool>,
}

const HOTELS: &[HotelTemplate] = &[
  HotelTemplate { name: "Central Hostel", kind: "hostel", tags: &["budget", "social"], base_price: 35.0, rating: 3.8, amenities: &["wifi", "lockers"], accessible: Some(false) },
  HotelTemplate { name: "Budget Inn", kind: "hotel", tags: &["budget"], base_price: 60.0, rating: 3.6, amenities: &["wifi"], accessible: Some(true) },
  HotelTemplate { name: "City Hotel", kind: "hotel", tags: &["central"], base_price: 110.0, rating: 4.1, amenities: &["wifi", "breakfast"], accessible: Some(true) },
  HotelTemplate { name: "Boutique Residence", kind: "boutique", tags: &["design", "central"], base_price: 170.0, rating: 4.5, amenities: &["wifi", "breakfast", "bar"], accessible: None },
  HotelTemplate { name: "Grand Palace Hotel", kind: "hotel", tags: &["luxury", "spa"], base_price: 320.0, rating: 4.8, amenities: &["wifi", "spa", "pool", "concierge"], accessible: Some(true) },
];

const EVENTS: &[(&str, &str, &[&str], f64)] = &[
  ("Jazz Festival", "festival", &["music", "nightlife"], 45.0),
  ("Street Food Fair", "market", &["food", "local", "family"], 10.0),
  ("Open-air Cinema", "film", &["outdoor", "family"], 12.0),
  ("Symphony Concert", "concert", &["music", "culture"], 80.0),
];

const TRANSPORT: &[(&str, TransportMode, f64, u32, f64)] = &[
  ("Inbound flight", TransportMode::Flight, 180.0, 150, 4.0),
  ("Intercity train", TransportMode::Train, 60.0, 180, 4.3),
  ("Coach bus", TransportMode::Bus, 25.0, 300, 3.7),
  ("Metro day pass", TransportMode::Metro, 8.0, 0, 4.1),
  ("Rental car", TransportMode::Car, 55.0, 0, 3.9),
];

fn slug(profile: &DestinationProfile) -> String {
  profile.name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

fn tag_set(tags: &[&str]) -> BTreeSet<String> {
  tags.iter().map(|t| t.to_string()).collect()
}

fn round_to(value: f64, places: i32) -> f64 {
  let factor = 10f64.powi(places);
  (value * factor).round() / factor
}

/// Base rating nudged by up to ±0.2, stable per destination and item
fn jitter_rating(profile: &DestinationProfile, id: &str, base: f64) -> f64 {
  let delta = (stable_unit(&profile.name.to_lowercase(), id) - 0.5) * 0.4;
  round_to((base + delta).clamp(0.0, 5.0), 1)
}

fn nearby(profile: &DestinationProfile, id: &str, label: &str) -> Location {
  let key = profile.name.to_lowercase();
  Location::new(
    profile.lat + (stable_unit(&key, &format!("{id}:lat")) - 0.5) * 0.05,
    profile.lon + (stable_unit(&key, &format!("{id}:lon")) - 0.5) * 0.05,
    &format!("{label}, {}", profile.name),
  )
}

/// Mark a stable subset of items unavailable
pub fn simulate_availability<'a>(items: impl IntoIterator<Item = Bookable<'a>>, seed: &str) {
  for mut item in items {
    let available = stable_unit(seed, item.id()) >= UNAVAILABLE_RATE;
    item.set_available(available);
  }
}

pub fn attractions(profile: &DestinationProfile, interests: &[String]) -> Vec<Attraction> {
  let slug = slug(profile);
  let mut items: Vec<Attraction> = ATTRACTIONS
    .iter()
    .enumerate()
    .map(|(i, t)| {
      let id = format!("{slug}-attr-{i}");
      Attraction {
        name: format!("{} {}", profile.name, t.name),
        kind: t.kind.to_string(),
        tags: tag_set(t.tags),
        location: nearby(profile, &id, t.name),
        rating: jitter_rating(profile, &id, t.rating),
        price_level: t.price_level,
        available: true,
        opening_hours: t.hours.map(str::to_string),
        description: format!("{} in {}", t.name, profile.name),
        accessible: t.accessible,
        id,
      }
    })
    .collect();

  // Interests the templates do not cover still get one dedicated experience
  for interest in interests.iter().map(|i| i.trim().to_string()).filter(|i| !i.is_empty()) {
    let covered = items.iter().any(|a| a.kind == interest || a.tags.contains(&interest));
    if covered {
      continue;
    }
    let id = format!("{slug}-attr-{}", interest.to_lowercase());
    items.push(Attraction {
      name: format!("{} {} Experience", profile.name, interest),
      kind: interest.clone(),
      tags: tag_set(&[interest.as_str()]),
      location: nearby(profile, &id, &interest),
      rating: jitter_rating(profile, &id, 4.0),
      price_level: 2,
      available: true,
      opening_hours: None,
      description: format!("Guided {interest} experience in {}", profile.name),
      accessible: None,
      id,
    });
  }

  let seed = profile.name.to_lowercase();
  simulate_availability(items.iter_mut().map(Bookable::from), &seed);
  items
}

pub fn hotels(profile: &DestinationProfile, check_in: NaiveDate) -> Vec<Hotel> {
  let slug = slug(profile);
  let season = seasonal_multiplier(check_in.month(), profile.southern_hemisphere);
  let mut items: Vec<Hotel> = HOTELS
    .iter()
    .enumerate()
    .map(|(i, t)| {
      let id = format!("{slug}-hotel-{i}");
      Hotel {
        name: format!("{} {}", profile.name, t.name),
        kind: t.kind.to_string(),
        tags: tag_set(t.tags),
        location: nearby(profile, &id, t.name),
        rating: jitter_rating(profile, &id, t.rating),
        price_per_night: round_to(t.base_price * profile.cost_index * season, 2),
        available: true,
        amenities: t.amenities.iter().map(|a| a.to_string()).collect(),
        description: format!("{} in {}", t.name, profile.name),
        accessible: t.accessible,
        id,
      }
    })
    .collect();

  let seed = format!("{}:{}", profile.name.to_lowercase(), check_in);
  simulate_availability(items.iter_mut().map(Bookable::from), &seed);
  items
}

fn summary_for(precipitation_chance: f64) -> &'static str {
  if precipitation_chance > 0.6 {
    "rain"
  } else if precipitation_chance > 0.35 {
    "cloudy"
  } else {
    "sunny"
  }
}

/// Climatology-based forecast, one entry per day from `start` to `end`
pub fn weather(profile: &DestinationProfile, start: NaiveDate, end: NaiveDate) -> WeatherForecast {
  let key = profile.name.to_lowercase();
  let current_temp = seasonal_temperature(profile, start.month());
  let current_precip = round_to(stable_unit(&key, "current"), 2);

  let forecast = start
    .iter_days()
    .take_while(|day| *day <= end)
    .take(MAX_FORECAST_DAYS)
    .map(|day| {
      let mean = seasonal_temperature(profile, day.month());
      let swing = (stable_unit(&key, &format!("{day}:temp")) - 0.5) * 4.0;
      let precipitation_chance = round_to(stable_unit(&key, &format!("{day}:rain")), 2);
      WeatherEntry {
        date: day,
        summary: summary_for(precipitation_chance).to_string(),
        high_c: round_to(mean + 4.0 + swing, 1),
        low_c: round_to(mean - 4.0 + swing, 1),
        precipitation_chance,
      }
    })
    .collect();

  WeatherForecast {
    current: WeatherCondition {
      summary: summary_for(current_precip).to_string(),
      temperature_c: round_to(current_temp, 1),
      precipitation_chance: current_precip,
    },
    forecast,
  }
}

/// Events spread evenly across the trip dates
pub fn events(profile: &DestinationProfile, start: NaiveDate, end: NaiveDate) -> Vec<LocalEvent> {
  let slug = slug(profile);
  let span = (end - start).num_days().max(0);
  let count = EVENTS.len() as i64;

  EVENTS
    .iter()
    .enumerate()
    .map(|(i, (name, kind, tags, base_price))| {
      let id = format!("{slug}-event-{i}");
      let offset = span * i as i64 / count;
      LocalEvent {
        name: format!("{} {}", profile.name, name),
        kind: kind.to_string(),
        tags: tag_set(tags),
        location: nearby(profile, &id, name),
        date: start + Duration::days(offset),
        rating: jitter_rating(profile, &id, 4.2),
        price: round_to(base_price * profile.cost_index, 2),
        available: true,
        description: format!("{name} during your stay"),
        id,
      }
    })
    .collect()
}

pub fn transport(profile: &DestinationProfile, start: NaiveDate) -> Vec<TransportOption> {
  let slug = slug(profile);
  let season = seasonal_multiplier(start.month(), profile.southern_hemisphere);
  let departure = start.and_hms_opt(9, 0, 0).map(|dt| dt.and_utc());

  let mut items: Vec<TransportOption> = TRANSPORT
    .iter()
    .enumerate()
    .map(|(i, (name, mode, base_price, minutes, rating))| {
      let id = format!("{slug}-transport-{i}");
      let scheduled = matches!(mode, TransportMode::Flight | TransportMode::Train | TransportMode::Bus);
      TransportOption {
        name: format!("{name} to {}", profile.name),
        mode: *mode,
        tags: tag_set(&[mode.as_str()]),
        location: nearby(profile, &id, mode.as_str()),
        rating: jitter_rating(profile, &id, *rating),
        price: round_to(base_price * profile.cost_index * season, 2),
        available: true,
        duration_minutes: *minutes,
        departure: if scheduled { departure } else { None },
        description: format!("{name} for {}", profile.name),
        id,
      }
    })
    .collect();

  let seed = format!("{}:{}:transport", profile.name.to_lowercase(), start);
  simulate_availability(items.iter_mut().map(Bookable::from), &seed);
  items
}

/// Fixed emergency inventory for a destination
pub fn emergency_services(profile: &DestinationProfile) -> Vec<EmergencyService> {
  let slug = slug(profile);
  let number = profile.emergency_number;
  [
    (EmergencyKind::Hospital, "General Hospital", number, true),
    (EmergencyKind::Police, "Central Police Station", number, true),
    (EmergencyKind::Fire, "Fire Brigade", number, true),
    (EmergencyKind::Ambulance, "Ambulance Service", number, true),
    (EmergencyKind::Pharmacy, "Night Pharmacy", "local directory", false),
  ]
  .into_iter()
  .enumerate()
  .map(|(i, (kind, name, phone, open_24h))| {
    let id = format!("{slug}-emergency-{i}");
    EmergencyService {
      name: format!("{} {}", profile.name, name),
      kind,
      phone: phone.to_string(),
      location: nearby(profile, &id, name),
      rating: 4.0,
      available: true,
      open_24h,
      description: String::new(),
      id,
    }
  })
  .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sources::reference::lookup;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn test_attractions_deterministic() {
    let profile = lookup("Lisbon");
    let interests = vec!["culture".to_string()];
    assert_eq!(attractions(&profile, &interests), attractions(&profile, &interests));
  }

  #[test]
  fn test_uncovered_interest_adds_experience() {
    let profile = lookup("Lisbon");
    let base = attractions(&profile, &[]);
    let with_surf = attractions(&profile, &["Surfing".to_string()]);

    assert_eq!(with_surf.len(), base.len() + 1);
    let extra = with_surf.last().unwrap();
    // Kept verbatim so an exact preferred-type match still finds it
    assert_eq!(extra.kind, "Surfing");
    assert!(extra.tags.contains("Surfing"));
    assert_eq!(extra.id, "lisbon-attr-surfing");

    // Covered interests add nothing
    assert_eq!(attractions(&profile, &["museum".to_string()]).len(), base.len());
  }

  #[test]
  fn test_ratings_stay_in_range() {
    let profile = lookup("Tokyo");
    for a in attractions(&profile, &[]) {
      assert!((0.0..=5.0).contains(&a.rating));
      assert!(a.price_level <= 4);
    }
  }

  #[test]
  fn test_hotel_prices_follow_cost_index_and_season() {
    let cheap = hotels(&lookup("Bangkok"), date(2026, 1, 10));
    let pricey = hotels(&lookup("London"), date(2026, 1, 10));
    assert!(cheap[2].price_per_night < pricey[2].price_per_night);

    let winter = hotels(&lookup("London"), date(2026, 1, 10));
    let summer = hotels(&lookup("London"), date(2026, 7, 10));
    assert!(winter[2].price_per_night < summer[2].price_per_night);
  }

  #[test]
  fn test_weather_covers_trip_days() {
    let forecast = weather(&lookup("Rome"), date(2026, 5, 1), date(2026, 5, 4));
    assert_eq!(forecast.forecast.len(), 4);
    assert_eq!(forecast.forecast[0].date, date(2026, 5, 1));
    assert!(forecast.forecast.windows(2).all(|w| w[0].date < w[1].date));
    assert!(forecast.forecast.iter().all(|e| e.high_c > e.low_c));

    let long = weather(&lookup("Rome"), date(2026, 5, 1), date(2026, 6, 30));
    assert_eq!(long.forecast.len(), MAX_FORECAST_DAYS);
  }

  #[test]
  fn test_events_fall_within_trip() {
    let start = date(2026, 5, 1);
    let end = date(2026, 5, 9);
    for event in events(&lookup("Paris"), start, end) {
      assert!(event.date >= start && event.date <= end);
    }
  }

  #[test]
  fn test_availability_simulation_is_stable() {
    let profile = lookup("Sydney");
    let a = transport(&profile, date(2026, 3, 1));
    let b = transport(&profile, date(2026, 3, 1));
    let flags: Vec<bool> = a.iter().map(|t| t.available).collect();
    assert_eq!(flags, b.iter().map(|t| t.available).collect::<Vec<_>>());
  }

  #[test]
  fn test_emergency_inventory_uses_local_number() {
    let services = emergency_services(&lookup("New York"));
    assert_eq!(services.len(), 5);
    assert!(services.iter().any(|s| s.kind == EmergencyKind::Hospital && s.phone == "911"));
  }
}
