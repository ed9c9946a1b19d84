//! Per-category filter rules and scoring factors

use super::budget::BudgetPolicy;
use crate::models::{Attraction, Hotel, Location, RankingWeights, ValidationCriteria};

/// Distance, in km, at which the distance factor falls to 1/e
const DISTANCE_SCALE_KM: f64 = 10.0;

const KEYWORD_BONUS: f64 = 0.2;
const NEUTRAL_MATCH: f64 = 0.5;

/// Preference flags and the type/tag keywords that satisfy them
const PREFERENCE_KEYWORDS: &[(&str, &[&str])] = &[
  ("cultural", &["culture", "cultural", "museum", "history", "art", "heritage", "temple", "gallery", "architecture", "landmark"]),
  ("outdoor", &["outdoor", "park", "nature", "hiking", "beach", "garden", "walking", "boat"]),
  ("family", &["family", "kids", "zoo", "aquarium", "science", "playground"]),
  ("nightlife", &["nightlife", "bar", "club", "music", "jazz", "pub"]),
];

/// Facts about the surviving set that some factors are relative to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeerStats {
  pub max_price: f64,
}

impl PeerStats {
  pub fn from_items<T: Rankable>(items: &[T]) -> Self {
    let max_price = items.iter().map(Rankable::unit_price).fold(0.0, f64::max);
    Self { max_price }
  }
}

/// A candidate the ranker can filter and score
pub trait Rankable: Clone {
  /// Short category name used in log fields
  const KIND: &'static str;

  fn id(&self) -> &str;
  fn rating(&self) -> f64;
  fn is_available(&self) -> bool;
  fn accessible(&self) -> Option<bool>;
  fn location(&self) -> &Location;

  /// Price in the category's own unit (level for attractions, nightly rate for hotels)
  fn unit_price(&self) -> f64;

  /// Category-specific admission rule, applied after the shared checks
  fn admits(&self, criteria: &ValidationCriteria, policy: &BudgetPolicy) -> bool;

  fn price_score(&self, peers: &PeerStats) -> f64;

  fn match_score(&self, criteria: &ValidationCriteria, policy: &BudgetPolicy) -> f64;
}

/// Exact match on the kind or any tag
fn matches_any(kind: &str, tags: &std::collections::BTreeSet<String>, wanted: &str) -> bool {
  kind == wanted || tags.contains(wanted)
}

impl Rankable for Attraction {
  const KIND: &'static str = "attraction";

  fn id(&self) -> &str {
    &self.id
  }

  fn rating(&self) -> f64 {
    self.rating
  }

  fn is_available(&self) -> bool {
    self.available
  }

  fn accessible(&self) -> Option<bool> {
    self.accessible
  }

  fn location(&self) -> &Location {
    &self.location
  }

  fn unit_price(&self) -> f64 {
    self.price_level as f64
  }

  fn admits(&self, criteria: &ValidationCriteria, _policy: &BudgetPolicy) -> bool {
    criteria.preferred_types.is_empty()
      || criteria.preferred_types.iter().any(|wanted| matches_any(&self.kind, &self.tags, wanted))
  }

  fn price_score(&self, _peers: &PeerStats) -> f64 {
    (1.0 - self.price_level as f64 / 4.0).clamp(0.0, 1.0)
  }

  fn match_score(&self, criteria: &ValidationCriteria, _policy: &BudgetPolicy) -> f64 {
    let flags: Vec<&[&str]> = PREFERENCE_KEYWORDS
      .iter()
      .filter(|(flag, _)| criteria.preference_flag(flag))
      .map(|(_, keywords)| *keywords)
      .collect();

    if criteria.preferred_types.is_empty() && flags.is_empty() {
      return NEUTRAL_MATCH;
    }

    let mut score = if criteria.preferred_types.is_empty() {
      0.0
    } else {
      let matched =
        criteria.preferred_types.iter().filter(|wanted| matches_any(&self.kind, &self.tags, wanted)).count();
      matched as f64 / criteria.preferred_types.len() as f64
    };

    for keywords in flags {
      if keywords.iter().any(|keyword| matches_any(&self.kind, &self.tags, keyword)) {
        score += KEYWORD_BONUS;
      }
    }

    score.clamp(0.0, 1.0)
  }
}

impl Rankable for Hotel {
  const KIND: &'static str = "hotel";

  fn id(&self) -> &str {
    &self.id
  }

  fn rating(&self) -> f64 {
    self.rating
  }

  fn is_available(&self) -> bool {
    self.available
  }

  fn accessible(&self) -> Option<bool> {
    self.accessible
  }

  fn location(&self) -> &Location {
    &self.location
  }

  fn unit_price(&self) -> f64 {
    self.price_per_night
  }

  fn admits(&self, criteria: &ValidationCriteria, policy: &BudgetPolicy) -> bool {
    !criteria.has_budget()
      || policy.projected_stay(self.price_per_night) <= policy.hotel_budget_cap * criteria.budget
  }

  fn price_score(&self, peers: &PeerStats) -> f64 {
    (1.0 - self.price_per_night / peers.max_price.max(1.0)).clamp(0.0, 1.0)
  }

  fn match_score(&self, criteria: &ValidationCriteria, policy: &BudgetPolicy) -> f64 {
    let mut score = NEUTRAL_MATCH;

    if criteria.has_budget() {
      let share = policy.projected_stay(self.price_per_night) / criteria.budget;
      if share <= 0.3 {
        score += 0.3;
      } else if share <= 0.5 {
        score += 0.1;
      } else if share > 0.7 {
        score -= 0.2;
      }
    }

    if criteria.preference_flag("luxury") && self.rating >= 4.0 {
      score += 0.2;
    }
    if criteria.preference_flag("budget") && self.price_per_night <= 100.0 {
      score += 0.2;
    }

    score.clamp(0.0, 1.0)
  }
}

/// Shared checks every category must pass before its own rule
pub fn passes<T: Rankable>(item: &T, criteria: &ValidationCriteria, policy: &BudgetPolicy) -> bool {
  if criteria.availability_check && !item.is_available() {
    return false;
  }
  if item.rating() < criteria.required_rating {
    return false;
  }
  if criteria.accessibility && item.accessible() == Some(false) {
    return false;
  }
  item.admits(criteria, policy)
}

/// Closeness to the criteria's anchor in [0, 1]; 0 without an anchor
pub fn distance_score(location: &Location, anchor: Option<&Location>) -> f64 {
  match anchor {
    Some(anchor) => (-location.distance_km(anchor) / DISTANCE_SCALE_KM).exp(),
    None => 0.0,
  }
}

/// Weighted sum of every scoring factor
pub fn score<T: Rankable>(
  item: &T,
  criteria: &ValidationCriteria,
  weights: &RankingWeights,
  policy: &BudgetPolicy,
  peers: &PeerStats,
) -> f64 {
  let rating = (item.rating() / 5.0).clamp(0.0, 1.0);
  let availability = if item.is_available() { 1.0 } else { 0.0 };

  weights.rating * rating
    + weights.price * item.price_score(peers)
    + weights.distance * distance_score(item.location(), criteria.anchor.as_ref())
    + weights.availability * availability
    + weights.user_match * item.match_score(criteria, policy)
}
