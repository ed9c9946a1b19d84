use anyhow::{anyhow, Context, Result};
use bentley::{JsonlSink, LogLevel, Logger, TracingSink};
use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use concierge::models::{CandidateItem, EmbeddingDocument, TripRequest};
use concierge::sources::{dataset, reference};
use concierge::{
  build_provider, ConciergeConfig, ContextRetriever, InMemoryProfileStore, MockSourceConnector, UserProfileStore,
  VectorIndex,
};

#[derive(Parser)]
#[command(name = "concierge")]
#[command(about = "Concierge - Trip context retrieval, validation and ranking")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), ", courtesy of Kernelle Software"))]
struct Cli {
  /// Config file (JSON or YAML); overrides CONCIERGE_CONFIG and the default search paths
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Also append structured logs to this JSONL file
  #[arg(long, global = true)]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
  Attraction,
  Hotel,
  Transport,
  Event,
  Emergency,
}

impl Kind {
  fn partition(self) -> &'static str {
    match self {
      Kind::Attraction => "attraction",
      Kind::Hotel => "hotel",
      Kind::Transport => "transport",
      Kind::Event => "event",
      Kind::Emergency => "emergency",
    }
  }
}

#[derive(Subcommand)]
enum Command {
  /// Retrieve, validate and rank the context for a trip
  Plan {
    /// Destination city
    destination: String,
    /// First day of the trip (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,
    /// Last day of the trip (YYYY-MM-DD)
    #[arg(long)]
    end: NaiveDate,
    /// Total trip budget; 0 means unconstrained
    #[arg(long, default_value_t = 0.0)]
    budget: f64,
    /// Number of travelers
    #[arg(long, default_value_t = 1)]
    travelers: u32,
    /// Interest, repeatable (used as preferred attraction types)
    #[arg(long = "interest")]
    interests: Vec<String>,
    /// Preference flag as key=value, repeatable (e.g. cultural=true)
    #[arg(long = "prefer", value_parser = parse_preference)]
    preferences: Vec<(String, serde_json::Value)>,
    /// Minimum rating an item needs
    #[arg(long)]
    min_rating: Option<f64>,
    /// Only keep items that are not declared inaccessible
    #[arg(long)]
    accessible: bool,
    /// User whose prior trips are searched for similar ones
    #[arg(long)]
    user: Option<String>,
    /// JSON file with prior trips (array of trips, each with a user_id)
    #[arg(long)]
    trips: Option<PathBuf>,
  },
  /// Seed the index from the offline dataset and run a similarity search
  Search {
    /// Search terms (space-separated)
    #[arg(required = true)]
    terms: Vec<String>,
    /// Destination whose dataset is indexed
    #[arg(short, long, default_value = "Lisbon")]
    destination: String,
    /// Partition to search
    #[arg(short, long, value_enum, default_value = "attraction")]
    kind: Kind,
    /// Maximum number of hits; 0 returns all
    #[arg(short, long, default_value_t = 5)]
    limit: usize,
  },
  /// Read back structured logs written with --log-file
  Logs {
    /// Maximum number of log entries to return
    #[arg(short, long, default_value = "50")]
    limit: usize,
    /// Filter by log level (verbose, debug, info, success, warn, error, all)
    #[arg(long, default_value = "all")]
    level: String,
  },
}

fn parse_preference(raw: &str) -> std::result::Result<(String, serde_json::Value), String> {
  let (key, value) = raw.split_once('=').ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
  let key = key.trim();
  if key.is_empty() {
    return Err(format!("preference key is empty in '{raw}'"));
  }
  let value = serde_json::from_str(value.trim())
    .unwrap_or_else(|_| serde_json::Value::String(value.trim().to_string()));
  Ok((key.to_string(), value))
}

fn parse_level(level: &str) -> Result<Option<LogLevel>> {
  let parsed = match level.to_lowercase().as_str() {
    "all" => None,
    "verbose" => Some(LogLevel::Verbose),
    "debug" => Some(LogLevel::Debug),
    "info" => Some(LogLevel::Info),
    "success" => Some(LogLevel::Success),
    "warn" => Some(LogLevel::Warn),
    "error" => Some(LogLevel::Error),
    other => return Err(anyhow!("unknown log level '{other}'")),
  };
  Ok(parsed)
}

/// Engine entries reach `tracing` through bentley's sink, so they carry its target
fn env_filter(verbose: bool) -> EnvFilter {
  if verbose {
    EnvFilter::new("concierge=debug,bentley=debug,info")
  } else {
    EnvFilter::new("concierge=info,bentley=info,warn")
  }
}

fn load_config(path: Option<&PathBuf>) -> Result<ConciergeConfig> {
  let config = match path {
    Some(path) => ConciergeConfig::load_from_file(path)
      .with_context(|| format!("failed to load config from {}", path.display()))?,
    None => ConciergeConfig::load().context("failed to load config")?,
  };
  Ok(config)
}

fn logger(log_file: Option<&PathBuf>, verbose: bool) -> Result<Logger> {
  match log_file {
    Some(path) => {
      let sink = JsonlSink::new_with_silent(path, !verbose)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
      Ok(Logger::new(Arc::new(sink), "concierge"))
    }
    None => Ok(Logger::new(Arc::new(TracingSink), "concierge")),
  }
}

fn profile_store(trips: Option<&PathBuf>) -> Result<Option<Arc<dyn UserProfileStore>>> {
  let Some(path) = trips else {
    return Ok(None);
  };
  let store: Arc<dyn UserProfileStore> = Arc::new(
    InMemoryProfileStore::load_from_file(path)
      .with_context(|| format!("failed to load prior trips from {}", path.display()))?,
  );
  Ok(Some(store))
}

async fn plan(
  config: ConciergeConfig,
  logger: Logger,
  request: TripRequest,
  profiles: Option<Arc<dyn UserProfileStore>>,
) -> Result<()> {
  if request.user_id.is_some() && profiles.is_none() {
    bentley::warn!("--user given without --trips; no similar trips can be found");
  }
  let retriever = ContextRetriever::new(config, Arc::new(MockSourceConnector::new()), profiles, logger)?;
  let context = retriever.retrieve_context(&request).await?;

  println!("{}", serde_json::to_string_pretty(&context)?);
  Ok(())
}

async fn search(
  config: ConciergeConfig,
  logger: Logger,
  terms: &[String],
  destination: &str,
  kind: Kind,
  limit: usize,
) -> Result<()> {
  let provider = build_provider(&config.embedding)?;
  let index = VectorIndex::in_memory(provider, logger.child("index"));

  let profile = reference::lookup(destination);
  let start = Utc::now().date_naive();
  let end = start + Duration::days(3);

  let items = dataset::attractions(&profile, &[])
    .into_iter()
    .map(CandidateItem::Attraction)
    .chain(dataset::hotels(&profile, start).into_iter().map(CandidateItem::Hotel))
    .chain(dataset::transport(&profile, start).into_iter().map(CandidateItem::Transport))
    .chain(dataset::events(&profile, start, end).into_iter().map(CandidateItem::Event))
    .chain(dataset::emergency_services(&profile).into_iter().map(CandidateItem::Emergency));

  for item in items {
    index.store_embedding(EmbeddingDocument::from_candidate(&item)).await?;
  }

  let query = terms.join(" ");
  let hits = index.search_similar(&query, kind.partition(), limit).await?;
  if hits.is_empty() {
    bentley::warn!(&format!("No {} documents matched '{}'", kind.partition(), query));
    return Ok(());
  }

  for hit in hits {
    let name = hit.document.metadata_str("name").unwrap_or(&hit.document.id);
    println!("{:.3}  {}  ({})", hit.similarity, name, hit.document.id);
  }
  Ok(())
}

fn logs(log_file: Option<&PathBuf>, limit: usize, level: &str) -> Result<()> {
  let path = log_file.ok_or_else(|| anyhow!("pass --log-file to choose which log to read"))?;
  let sink = JsonlSink::new_with_silent(path, true)?;
  if !sink.has_logs() {
    bentley::info!(&format!("No logs recorded in {}", path.display()));
    return Ok(());
  }

  let filter = parse_level(level)?;
  for entry in sink.read_entries(Some(limit), filter.as_ref().map(LogLevel::as_str))? {
    println!("{} [{}] {}", entry.timestamp.format("%Y-%m-%d %H:%M:%S"), entry.level, entry.render());
  }
  Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(env_filter(cli.verbose))
    .init();

  match cli.command {
    Command::Plan {
      destination,
      start,
      end,
      budget,
      travelers,
      interests,
      preferences,
      min_rating,
      accessible,
      user,
      trips,
    } => {
      let config = load_config(cli.config.as_ref())?;
      let logger = logger(cli.log_file.as_ref(), cli.verbose)?;

      let mut request = TripRequest::new(&destination, start, end);
      request.budget = budget;
      request.travelers = travelers;
      request.interests = interests;
      request.preferences = preferences.into_iter().collect();
      request.required_rating = min_rating;
      request.accessibility = accessible;
      request.user_id = user;

      let profiles = profile_store(trips.as_ref())?;
      plan(config, logger, request, profiles).await
    }
    Command::Search { terms, destination, kind, limit } => {
      let config = load_config(cli.config.as_ref())?;
      let logger = logger(cli.log_file.as_ref(), cli.verbose)?;
      search(config, logger, &terms, &destination, kind, limit).await
    }
    Command::Logs { limit, level } => logs(cli.log_file.as_ref(), limit, &level),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use bentley::{LogEntry, LogSink};
  use std::sync::atomic::{AtomicUsize, Ordering};
  use tracing_subscriber::layer::Context as LayerContext;
  use tracing_subscriber::Layer;

  /// Counts events that get past the filter
  struct Counter(Arc<AtomicUsize>);

  impl<S: tracing::Subscriber> Layer<S> for Counter {
    fn on_event(&self, _event: &tracing::Event<'_>, _ctx: LayerContext<'_, S>) {
      self.0.fetch_add(1, Ordering::SeqCst);
    }
  }

  fn delivered(verbose: bool, level: LogLevel) -> usize {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(env_filter(verbose)).with(Counter(count.clone()));
    tracing::subscriber::with_default(subscriber, || {
      TracingSink.record(LogEntry::new(level, "ranked candidates", "concierge"));
    });
    count.load(Ordering::SeqCst)
  }

  #[test]
  fn test_default_filter_shows_engine_info_but_not_debug() {
    assert_eq!(delivered(false, LogLevel::Info), 1);
    assert_eq!(delivered(false, LogLevel::Warn), 1);
    assert_eq!(delivered(false, LogLevel::Debug), 0);
  }

  #[test]
  fn test_verbose_filter_shows_engine_debug() {
    assert_eq!(delivered(true, LogLevel::Debug), 1);
    assert_eq!(delivered(true, LogLevel::Info), 1);
  }

  #[test]
  fn test_parse_preference() {
    assert_eq!(parse_preference("cultural=true").unwrap(), ("cultural".to_string(), serde_json::json!(true)));
    assert_eq!(parse_preference("pace= slow").unwrap(), ("pace".to_string(), serde_json::json!("slow")));
    assert!(parse_preference("novalue").is_err());
    assert!(parse_preference("=1").is_err());
  }

  #[test]
  fn test_profile_store_from_trips_file() {
    assert!(profile_store(None).unwrap().is_none());

    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("trips.json");
    std::fs::write(&path, r#"[{ "id": "t1", "user_id": "ana", "destination": "Porto" }]"#).unwrap();
    assert!(profile_store(Some(&path)).unwrap().is_some());

    assert!(profile_store(Some(&temp_dir.path().join("missing.json"))).is_err());
  }

  #[tokio::test]
  async fn test_user_trips_produce_similar_trips() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("trips.json");
    std::fs::write(
      &path,
      r#"[{ "id": "t1", "user_id": "ana", "destination": "Lisbon", "interests": ["museum"] }]"#,
    )
    .unwrap();

    let retriever = ContextRetriever::new(
      ConciergeConfig::default(),
      Arc::new(MockSourceConnector::new()),
      profile_store(Some(&path)).unwrap(),
      Logger::silent(),
    )
    .unwrap();

    let start = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    let mut request = TripRequest::new("Lisbon", start, start + Duration::days(3));
    request.interests = vec!["museum".to_string()];
    request.user_id = Some("ana".to_string());

    let context = retriever.retrieve_context(&request).await.unwrap();
    assert_eq!(context.similar_trips.len(), 1);
    assert_eq!(context.similar_trips[0].trip.id, "t1");
  }
}
