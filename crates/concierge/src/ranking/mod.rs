//! Candidate validation, scoring and budget partitioning

pub mod budget;
pub mod scoring;

use bentley::Logger;
use serde_json::json;

use crate::models::{BudgetAllocation, RankingWeights, TripContext, ValidationCriteria};

pub use budget::BudgetPolicy;
pub use scoring::{distance_score, passes, score, PeerStats, Rankable};

/// Filters candidates against traveler constraints and orders the survivors
#[derive(Debug, Clone)]
pub struct ValidatorRanker {
  policy: BudgetPolicy,
  logger: Logger,
}

impl ValidatorRanker {
  pub fn new(policy: BudgetPolicy, logger: Logger) -> Self {
    Self { policy, logger }
  }

  pub fn policy(&self) -> &BudgetPolicy {
    &self.policy
  }

  /// Survivors of the filter stage, in input order
  pub fn filter<T: Rankable>(&self, items: Vec<T>, criteria: &ValidationCriteria) -> Vec<T> {
    let before = items.len();
    let survivors: Vec<T> = items.into_iter().filter(|item| passes(item, criteria, &self.policy)).collect();

    self.logger.debug_with(
      "filtered candidates",
      &[("kind", json!(T::KIND)), ("before", json!(before)), ("after", json!(survivors.len()))],
    );
    survivors
  }

  /// Filter, score and sort; every pair carries the score it was ordered by
  ///
  /// Ordering is descending by score and stable, so equal scores keep their
  /// input order.
  pub fn rank_with_scores<T: Rankable>(
    &self,
    items: Vec<T>,
    criteria: &ValidationCriteria,
    weights: &RankingWeights,
  ) -> Vec<(T, f64)> {
    let survivors = self.filter(items, criteria);
    let peers = PeerStats::from_items(&survivors);

    let mut scored: Vec<(T, f64)> = survivors
      .into_iter()
      .map(|item| {
        let value = score(&item, criteria, weights, &self.policy, &peers);
        (item, value)
      })
      .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    if let Some((top, value)) = scored.first() {
      self.logger.debug_with(
        "ranked candidates",
        &[("kind", json!(T::KIND)), ("top", json!(top.id())), ("score", json!(value))],
      );
    }
    scored
  }

  pub fn validate_and_rank<T: Rankable>(
    &self,
    items: Vec<T>,
    criteria: &ValidationCriteria,
    weights: &RankingWeights,
  ) -> Vec<T> {
    self.rank_with_scores(items, criteria, weights).into_iter().map(|(item, _)| item).collect()
  }

  /// Partition `total` across categories and drop items that do not fit
  pub fn apply_budget_constraints(&self, context: &mut TripContext, total: f64) -> Option<BudgetAllocation> {
    let before = (context.hotels.len(), context.attractions.len(), context.transport_options.len());
    let allocation = self.policy.apply(context, total)?;

    self.logger.info_with(
      "applied budget constraints",
      &[
        ("total", json!(total)),
        ("hotels_dropped", json!(before.0 - context.hotels.len())),
        ("attractions_dropped", json!(before.1 - context.attractions.len())),
        ("transport_dropped", json!(before.2 - context.transport_options.len())),
      ],
    );
    Some(allocation)
  }
}

impl Default for ValidatorRanker {
  fn default() -> Self {
    Self::new(BudgetPolicy::default(), Logger::silent())
  }
}
