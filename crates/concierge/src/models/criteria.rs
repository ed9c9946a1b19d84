use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::candidate::Location;
use crate::error::{ConciergeError, Result};

/// Traveler constraints every candidate is validated against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationCriteria {
  /// Total trip budget; 0 means unconstrained
  #[serde(default)]
  pub budget: f64,
  #[serde(default)]
  pub required_rating: f64,
  #[serde(default)]
  pub preferred_types: Vec<String>,
  #[serde(default)]
  pub accessibility: bool,
  #[serde(default)]
  pub preferences: BTreeMap<String, serde_json::Value>,
  #[serde(default = "default_availability_check")]
  pub availability_check: bool,
  /// Reference point for the distance factor; without it distance scores 0
  #[serde(default)]
  pub anchor: Option<Location>,
}

fn default_availability_check() -> bool {
  true
}

impl Default for ValidationCriteria {
  fn default() -> Self {
    Self {
      budget: 0.0,
      required_rating: 0.0,
      preferred_types: Vec::new(),
      accessibility: false,
      preferences: BTreeMap::new(),
      availability_check: default_availability_check(),
      anchor: None,
    }
  }
}

impl ValidationCriteria {
  /// Whether a boolean-ish preference is switched on
  ///
  /// Accepts `true`, non-zero numbers, and the strings "true"/"yes"/"1".
  pub fn preference_flag(&self, key: &str) -> bool {
    match self.preferences.get(key) {
      Some(serde_json::Value::Bool(flag)) => *flag,
      Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
      Some(serde_json::Value::String(s)) => {
        matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "1")
      }
      _ => false,
    }
  }

  pub fn has_budget(&self) -> bool {
    self.budget > 0.0
  }
}

/// Relative importance of each scoring factor
///
/// Nominally sums to 1.0; any non-negative combination is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingWeights {
  pub rating: f64,
  pub price: f64,
  pub distance: f64,
  pub availability: f64,
  pub user_match: f64,
}

impl Default for RankingWeights {
  fn default() -> Self {
    Self { rating: 0.3, price: 0.25, distance: 0.2, availability: 0.15, user_match: 0.1 }
  }
}

impl RankingWeights {
  /// Reject negative or non-finite weights
  pub fn validate(&self) -> Result<()> {
    let named = [
      ("rating", self.rating),
      ("price", self.price),
      ("distance", self.distance),
      ("availability", self.availability),
      ("user_match", self.user_match),
    ];

    for (name, value) in named {
      if !value.is_finite() || value < 0.0 {
        return Err(ConciergeError::configuration(format!(
          "ranking weight '{name}' must be a non-negative number, got {value}"
        )));
      }
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_preference_flag_variants() {
    let mut criteria = ValidationCriteria::default();
    criteria.preferences.insert("luxury".to_string(), json!(true));
    criteria.preferences.insert("budget".to_string(), json!("yes"));
    criteria.preferences.insert("outdoor".to_string(), json!(0));
    criteria.preferences.insert("cultural".to_string(), json!(false));

    assert!(criteria.preference_flag("luxury"));
    assert!(criteria.preference_flag("budget"));
    assert!(!criteria.preference_flag("outdoor"));
    assert!(!criteria.preference_flag("cultural"));
    assert!(!criteria.preference_flag("missing"));
  }

  #[test]
  fn test_negative_weight_rejected() {
    let weights = RankingWeights { price: -0.1, ..RankingWeights::default() };
    assert!(weights.validate().is_err());
    assert!(RankingWeights::default().validate().is_ok());
  }

  #[test]
  fn test_criteria_deserializes_snake_case_with_defaults() {
    let criteria: ValidationCriteria =
      serde_json::from_value(json!({ "budget": 1000.0, "preferred_types": ["culture"] })).unwrap();
    assert_eq!(criteria.budget, 1000.0);
    assert_eq!(criteria.preferred_types, vec!["culture".to_string()]);
    assert!(criteria.availability_check);
    assert_eq!(criteria.required_rating, 0.0);
  }
}
