use chrono::NaiveDate;
use serde_json::json;
use std::collections::BTreeSet;

use concierge::models::{Attraction, Hotel, Location, RankingWeights, TripContext, ValidationCriteria};
use concierge::sources::{dataset, reference};
use concierge::{BudgetPolicy, ValidatorRanker};

fn attraction(id: &str, kind: &str, location: Location) -> Attraction {
  Attraction {
    id: id.to_string(),
    name: id.to_string(),
    kind: kind.to_string(),
    tags: BTreeSet::new(),
    location,
    rating: 4.2,
    price_level: 1,
    available: true,
    opening_hours: None,
    description: String::new(),
    accessible: None,
  }
}

fn hotel(id: &str, price_per_night: f64) -> Hotel {
  Hotel {
    id: id.to_string(),
    name: id.to_string(),
    kind: "hotel".to_string(),
    tags: BTreeSet::new(),
    location: Location::default(),
    rating: 4.0,
    price_per_night,
    available: true,
    amenities: Vec::new(),
    description: String::new(),
    accessible: None,
  }
}

fn ids<T: concierge::Rankable>(items: &[T]) -> Vec<&str> {
  items.iter().map(|item| item.id()).collect()
}

#[test]
fn test_dataset_ranking_honours_every_constraint() {
  let ranker = ValidatorRanker::default();
  let profile = reference::lookup("Lisbon");
  let candidates = dataset::attractions(&profile, &["museum".to_string()]);

  let criteria = ValidationCriteria {
    required_rating: 3.5,
    preferred_types: vec!["museum".to_string()],
    ..Default::default()
  };
  let ranked = ranker.rank_with_scores(candidates, &criteria, &RankingWeights::default());

  assert!(!ranked.is_empty());
  for (item, _) in &ranked {
    assert!(item.available);
    assert!(item.rating >= 3.5);
    assert!(item.kind == "museum" || item.tags.contains("museum"));
  }
  assert!(ranked.windows(2).all(|pair| pair[0].1 >= pair[1].1));
}

#[test]
fn test_nearby_attraction_ranks_first_with_anchor() {
  let ranker = ValidatorRanker::default();
  let anchor = Location::new(38.72, -9.14, "hotel");
  let candidates = vec![
    attraction("far", "museum", Location::new(38.80, -9.30, "")),
    attraction("near", "museum", anchor.clone()),
  ];

  let criteria = ValidationCriteria { anchor: Some(anchor), ..Default::default() };
  let ranked = ranker.validate_and_rank(candidates, &criteria, &RankingWeights::default());

  assert_eq!(ids(&ranked), vec!["near", "far"]);
}

#[test]
fn test_cultural_flag_lifts_cultural_attractions() {
  let ranker = ValidatorRanker::default();
  let here = Location::new(38.72, -9.14, "");
  let candidates = vec![attraction("park", "park", here.clone()), attraction("museum", "museum", here)];

  let mut criteria = ValidationCriteria::default();
  criteria.preferences.insert("cultural".to_string(), json!(true));
  let ranked = ranker.validate_and_rank(candidates.clone(), &criteria, &RankingWeights::default());
  assert_eq!(ids(&ranked), vec!["museum", "park"]);

  // Without the flag both are neutral, so input order holds
  let neutral = ranker.validate_and_rank(candidates, &ValidationCriteria::default(), &RankingWeights::default());
  assert_eq!(ids(&neutral), vec!["park", "museum"]);
}

#[test]
fn test_cheaper_hotel_wins_at_equal_rating() {
  let ranker = ValidatorRanker::default();
  let ranked = ranker.validate_and_rank(
    vec![hotel("pricey", 120.0), hotel("cheap", 80.0)],
    &ValidationCriteria::default(),
    &RankingWeights::default(),
  );
  assert_eq!(ids(&ranked), vec!["cheap", "pricey"]);
}

#[test]
fn test_rating_only_weights_order_by_rating() {
  let ranker = ValidatorRanker::default();
  let here = Location::default();
  let mut low = attraction("low", "museum", here.clone());
  low.rating = 3.1;
  let mut high = attraction("high", "museum", here);
  high.rating = 4.9;
  high.price_level = 4;

  let weights = RankingWeights { rating: 1.0, price: 0.0, distance: 0.0, availability: 0.0, user_match: 0.0 };
  let ranked = ranker.validate_and_rank(vec![low, high], &ValidationCriteria::default(), &weights);
  assert_eq!(ids(&ranked), vec!["high", "low"]);
}

#[test]
fn test_budget_partition_over_dataset() {
  let ranker = ValidatorRanker::default();
  let profile = reference::lookup("Lisbon");
  let start = NaiveDate::from_ymd_opt(2026, 10, 5).unwrap();

  let mut context = TripContext::empty("Lisbon");
  context.hotels = dataset::hotels(&profile, start);
  context.attractions = dataset::attractions(&profile, &[]);
  context.transport_options = dataset::transport(&profile, start);

  let allocation = ranker.apply_budget_constraints(&mut context, 1500.0).unwrap();
  let policy = BudgetPolicy::default();

  assert!((allocation.hotels + allocation.activities + allocation.transport + allocation.reserve - 1500.0).abs() < 1e-9);
  assert!(context.hotels.iter().all(|h| policy.projected_stay(h.price_per_night) <= allocation.hotels));
  assert!(context.transport_options.iter().all(|t| t.price <= allocation.transport));
  assert!(context
    .attractions
    .iter()
    .all(|a| a.price_level as f64 * policy.price_level_cost <= policy.per_activity(&allocation)));
}
