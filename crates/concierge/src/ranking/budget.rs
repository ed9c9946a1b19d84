use serde::{Deserialize, Serialize};

use crate::error::{ConciergeError, Result};
use crate::models::{BudgetAllocation, TripContext};

/// Constants behind budget filtering and partitioning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetPolicy {
  /// Nights a hotel price is projected over
  #[serde(default = "default_assumed_nights")]
  pub assumed_nights: f64,
  /// Largest fraction of the total budget a hotel stay may take during ranking
  #[serde(default = "default_hotel_budget_cap")]
  pub hotel_budget_cap: f64,
  /// Activities the activity budget is split across
  #[serde(default = "default_assumed_activities")]
  pub assumed_activities: f64,
  /// Cost attributed to each attraction price level
  #[serde(default = "default_price_level_cost")]
  pub price_level_cost: f64,
  #[serde(default = "default_hotel_share")]
  pub hotel_share: f64,
  #[serde(default = "default_activity_share")]
  pub activity_share: f64,
  #[serde(default = "default_transport_share")]
  pub transport_share: f64,
}

fn default_assumed_nights() -> f64 {
  7.0
}

fn default_hotel_budget_cap() -> f64 {
  0.5
}

fn default_assumed_activities() -> f64 {
  5.0
}

fn default_price_level_cost() -> f64 {
  25.0
}

fn default_hotel_share() -> f64 {
  0.4
}

fn default_activity_share() -> f64 {
  0.3
}

fn default_transport_share() -> f64 {
  0.2
}

impl Default for BudgetPolicy {
  fn default() -> Self {
    Self {
      assumed_nights: default_assumed_nights(),
      hotel_budget_cap: default_hotel_budget_cap(),
      assumed_activities: default_assumed_activities(),
      price_level_cost: default_price_level_cost(),
      hotel_share: default_hotel_share(),
      activity_share: default_activity_share(),
      transport_share: default_transport_share(),
    }
  }
}

impl BudgetPolicy {
  pub fn validate(&self) -> Result<()> {
    let positive = [
      ("assumed_nights", self.assumed_nights),
      ("hotel_budget_cap", self.hotel_budget_cap),
      ("assumed_activities", self.assumed_activities),
    ];
    for (name, value) in positive {
      if !value.is_finite() || value <= 0.0 {
        return Err(ConciergeError::configuration(format!(
          "budget policy '{name}' must be positive, got {value}"
        )));
      }
    }

    let non_negative = [
      ("price_level_cost", self.price_level_cost),
      ("hotel_share", self.hotel_share),
      ("activity_share", self.activity_share),
      ("transport_share", self.transport_share),
    ];
    for (name, value) in non_negative {
      if !value.is_finite() || value < 0.0 {
        return Err(ConciergeError::configuration(format!(
          "budget policy '{name}' must be non-negative, got {value}"
        )));
      }
    }

    let shares = self.hotel_share + self.activity_share + self.transport_share;
    if shares > 1.0 + 1e-9 {
      return Err(ConciergeError::configuration(format!(
        "budget shares add up to {shares}, which exceeds the total budget"
      )));
    }
    Ok(())
  }

  /// Projected hotel cost for the assumed stay
  pub fn projected_stay(&self, price_per_night: f64) -> f64 {
    price_per_night * self.assumed_nights
  }

  /// Split a total budget into category shares; the remainder is the reserve
  pub fn allocate(&self, total: f64) -> BudgetAllocation {
    let hotels = total * self.hotel_share;
    let activities = total * self.activity_share;
    let transport = total * self.transport_share;
    BudgetAllocation { total, hotels, activities, transport, reserve: total - hotels - activities - transport }
  }

  /// Spend allowed per activity under an allocation
  pub fn per_activity(&self, allocation: &BudgetAllocation) -> f64 {
    allocation.activities / self.assumed_activities
  }

  /// Drop items that do not fit their category's share of `total`
  ///
  /// Categories are filtered independently. A total of zero or less leaves the
  /// context untouched and returns `None`.
  pub fn apply(&self, context: &mut TripContext, total: f64) -> Option<BudgetAllocation> {
    if total <= 0.0 || !total.is_finite() {
      return None;
    }

    let allocation = self.allocate(total);
    let per_activity = self.per_activity(&allocation);

    context.hotels.retain(|h| self.projected_stay(h.price_per_night) <= allocation.hotels);
    context.attractions.retain(|a| a.price_level as f64 * self.price_level_cost <= per_activity);
    context.transport_options.retain(|t| t.price <= allocation.transport);
    context.local_events.retain(|e| e.price <= per_activity);

    context.budget_allocation = Some(allocation);
    Some(allocation)
  }
}
