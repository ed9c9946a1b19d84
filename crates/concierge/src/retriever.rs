//! Assembles one [`TripContext`] per planning request
//!
//! All sources are fetched concurrently, each under its own timeout. A failing
//! source is logged, replaced according to the fallback mode and recorded in
//! `TripContext::degraded_sources`; it never fails the request.

use bentley::Logger;
use futures::future::join_all;
use serde_json::json;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use crate::config::ConciergeConfig;
use crate::embedding::build_provider;
use crate::error::{ConciergeError, Result};
use crate::models::{
  CandidateItem, EmbeddingDocument, PriorTrip, SimilarTrip, SourceKind, TripContext, TripRequest,
};
use crate::ranking::ValidatorRanker;
use crate::sources::fallback::Fallback;
use crate::sources::{dataset, reference, SourceConnector, UserProfileStore};
use crate::vector_index::VectorIndex;

/// Vector index partition holding users' prior trips
pub const TRIP_PARTITION: &str = "trip";

pub struct ContextRetriever {
  connector: Arc<dyn SourceConnector>,
  profiles: Option<Arc<dyn UserProfileStore>>,
  index: VectorIndex,
  ranker: ValidatorRanker,
  fallback: Fallback,
  config: ConciergeConfig,
  logger: Logger,
}

impl ContextRetriever {
  /// Build a retriever with an in-memory index over the configured embedding backend
  ///
  /// Fails only on configuration errors, including a disabled embedding backend.
  pub fn new(
    config: ConciergeConfig,
    connector: Arc<dyn SourceConnector>,
    profiles: Option<Arc<dyn UserProfileStore>>,
    logger: Logger,
  ) -> Result<Self> {
    let provider = build_provider(&config.embedding)?;
    let index = VectorIndex::in_memory(provider, logger.child("index"));
    Self::with_index(config, connector, profiles, index, logger)
  }

  /// Build a retriever around an existing index
  pub fn with_index(
    config: ConciergeConfig,
    connector: Arc<dyn SourceConnector>,
    profiles: Option<Arc<dyn UserProfileStore>>,
    index: VectorIndex,
    logger: Logger,
  ) -> Result<Self> {
    config.validate()?;
    Ok(Self {
      connector,
      profiles,
      index,
      ranker: ValidatorRanker::new(config.budget_policy, logger.child("ranker")),
      fallback: Fallback::new(config.fallback),
      config,
      logger,
    })
  }

  pub fn index(&self) -> &VectorIndex {
    &self.index
  }

  pub fn config(&self) -> &ConciergeConfig {
    &self.config
  }

  /// Time left before `deadline`, or `None` when there is no deadline
  fn remaining(deadline: Option<Instant>) -> Option<Duration> {
    deadline.map(|d| d.saturating_duration_since(Instant::now()))
  }

  fn fetch_timeout(&self, deadline: Option<Instant>) -> Duration {
    let per_fetch = self.config.fetch_timeout();
    match Self::remaining(deadline) {
      Some(left) => per_fetch.min(left),
      None => per_fetch,
    }
  }

  async fn guarded<T, F>(source: SourceKind, limit: Duration, fetch: F) -> Result<T>
  where
    F: Future<Output = Result<T>>,
  {
    match tokio::time::timeout(limit, fetch).await {
      Ok(result) => result,
      Err(_) => Err(ConciergeError::timeout(source, limit)),
    }
  }

  fn degrade(&self, context: &mut TripContext, source: SourceKind, error: &ConciergeError, request_id: &Uuid) {
    self.logger.warn_with(
      "source degraded",
      &[
        ("request_id", json!(request_id.to_string())),
        ("source", json!(source.as_str())),
        ("error", json!(error.to_string())),
        ("fallback", json!(self.fallback.mode())),
      ],
    );
    context.mark_degraded(source);
  }

  pub async fn retrieve_context(&self, request: &TripRequest) -> Result<TripContext> {
    request.validate()?;

    let request_id = Uuid::new_v4();
    let started = Instant::now();
    let deadline = self.config.request_deadline().map(|d| started + d);
    let timeout = self.fetch_timeout(deadline);
    let destination = request.destination.trim();

    self.logger.info_with(
      "retrieving trip context",
      &[
        ("request_id", json!(request_id.to_string())),
        ("destination", json!(destination)),
        ("timeout_ms", json!(timeout.as_millis() as u64)),
      ],
    );

    let connector = &self.connector;
    let prior_trips = async {
      match (request.user_id.as_deref(), &self.profiles) {
        (Some(user_id), Some(store)) => {
          Self::guarded(SourceKind::PriorTrips, timeout, store.prior_trips(user_id)).await
        }
        _ => Ok(Vec::new()),
      }
    };

    let (attractions, hotels, weather, events, transport, prior_trips) = tokio::join!(
      Self::guarded(
        SourceKind::Attractions,
        timeout,
        connector.fetch_attractions(destination, &request.interests)
      ),
      Self::guarded(
        SourceKind::Hotels,
        timeout,
        connector.fetch_hotels(destination, request.start_date, request.end_date, request.budget)
      ),
      Self::guarded(
        SourceKind::Weather,
        timeout,
        connector.fetch_weather(destination, request.start_date, request.end_date)
      ),
      Self::guarded(
        SourceKind::Events,
        timeout,
        connector.fetch_events(destination, request.start_date, request.end_date)
      ),
      Self::guarded(SourceKind::Transport, timeout, connector.fetch_transport(destination, request.start_date)),
      prior_trips,
    );

    let mut context = TripContext::empty(destination);
    context.user_id = request.user_id.clone();

    let attractions = attractions.unwrap_or_else(|e| {
      self.degrade(&mut context, SourceKind::Attractions, &e, &request_id);
      self.fallback.attractions(destination, &request.interests)
    });
    let hotels = hotels.unwrap_or_else(|e| {
      self.degrade(&mut context, SourceKind::Hotels, &e, &request_id);
      self.fallback.hotels(destination, request.start_date)
    });
    context.weather = weather.unwrap_or_else(|e| {
      self.degrade(&mut context, SourceKind::Weather, &e, &request_id);
      self.fallback.weather(destination, request.start_date, request.end_date)
    });
    context.local_events = events.unwrap_or_else(|e| {
      self.degrade(&mut context, SourceKind::Events, &e, &request_id);
      self.fallback.events(destination, request.start_date, request.end_date)
    });
    context.transport_options = transport.unwrap_or_else(|e| {
      self.degrade(&mut context, SourceKind::Transport, &e, &request_id);
      self.fallback.transport(destination, request.start_date)
    });
    let prior_trips = prior_trips.unwrap_or_else(|e| {
      self.degrade(&mut context, SourceKind::PriorTrips, &e, &request_id);
      Vec::new()
    });
    context.emergency_services = dataset::emergency_services(&reference::lookup(destination));

    let criteria = request.to_criteria();
    let weights = self.config.weights;
    context.attractions = self.ranker.validate_and_rank(attractions, &criteria, &weights);
    context.hotels = self.ranker.validate_and_rank(hotels, &criteria, &weights);
    self.ranker.apply_budget_constraints(&mut context, request.budget);

    match Self::remaining(deadline) {
      Some(left) if left.is_zero() => {
        self.logger.warn_with(
          "request deadline reached, returning partial context",
          &[("request_id", json!(request_id.to_string()))],
        );
      }
      left => {
        let lookup = self.similar_trips(request, prior_trips);
        let similar = match left {
          Some(limit) => tokio::time::timeout(limit, lookup)
            .await
            .unwrap_or_else(|_| Err(ConciergeError::timeout(SourceKind::PriorTrips, limit))),
          None => lookup.await,
        };
        match similar {
          Ok(similar) => context.similar_trips = similar,
          Err(e) => self.degrade(&mut context, SourceKind::PriorTrips, &e, &request_id),
        }

        if self.config.index_attractions {
          self.index_attractions(&context, &request_id).await;
        }
      }
    }

    self.logger.info_with(
      "trip context ready",
      &[
        ("request_id", json!(request_id.to_string())),
        ("attractions", json!(context.attractions.len())),
        ("hotels", json!(context.hotels.len())),
        ("similar_trips", json!(context.similar_trips.len())),
        ("degraded", json!(context.degraded_sources)),
        ("elapsed_ms", json!(started.elapsed().as_millis() as u64)),
      ],
    );

    Ok(context)
  }

  /// The requesting user's prior trips most similar to this request
  async fn similar_trips(&self, request: &TripRequest, trips: Vec<PriorTrip>) -> Result<Vec<SimilarTrip>> {
    let Some(user_id) = request.user_id.as_deref() else {
      return Ok(Vec::new());
    };
    if trips.is_empty() || self.config.similar_trip_limit == 0 {
      return Ok(Vec::new());
    }

    let mut by_doc_id: HashMap<String, PriorTrip> = HashMap::new();
    for trip in trips.into_iter().filter(|t| t.user_id == user_id) {
      let doc_id = format!("{}:{}", trip.user_id, trip.id);
      let doc = EmbeddingDocument::new(&doc_id, TRIP_PARTITION, &trip.embedding_text())
        .with_metadata("user_id", json!(trip.user_id))
        .with_metadata("trip_id", json!(trip.id));
      self.index.store_embedding(doc).await?;
      by_doc_id.insert(doc_id, trip);
    }

    let hits = self.index.search_similar(&request.query_text(), TRIP_PARTITION, 0).await?;

    Ok(
      hits
        .into_iter()
        .filter(|hit| hit.similarity > 0.0 && hit.document.metadata_str("user_id") == Some(user_id))
        .filter_map(|hit| {
          by_doc_id.get(&hit.document.id).map(|trip| SimilarTrip { trip: trip.clone(), similarity: hit.similarity })
        })
        .take(self.config.similar_trip_limit)
        .collect(),
    )
  }

  /// Store ranked attractions so later similarity queries can find them
  async fn index_attractions(&self, context: &TripContext, request_id: &Uuid) {
    let writes = context.attractions.iter().map(|attraction| {
      let doc = EmbeddingDocument::from_candidate(&CandidateItem::Attraction(attraction.clone()))
        .with_metadata("destination", json!(context.destination));
      self.index.store_embedding(doc)
    });

    let failures = join_all(writes).await.into_iter().filter(|r| r.is_err()).count();
    if failures > 0 {
      self.logger.warn_with(
        "failed to index attractions",
        &[("request_id", json!(request_id.to_string())), ("failures", json!(failures))],
      );
    }
  }
}
