//! Structured logging collaborators
//!
//! Components receive a [`Logger`] instead of calling console functions directly.
//! A logger stamps every message with its component name and hands a [`LogEntry`]
//! to whatever [`LogSink`] it was built over:
//! - [`ConsoleSink`] prints through the bentley console format
//! - [`TracingSink`] forwards to `tracing` so a subscriber decides what to keep
//! - [`MemorySink`] captures entries (tests and diagnostics)
//! - [`JsonlSink`] appends entries to a JSONL file that can be queried back
//! - [`NullSink`] drops everything

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

// Types and Data Structures
// =========================

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
  Verbose,
  Debug,
  Info,
  Success,
  Warn,
  Error,
}

impl LogLevel {
  pub fn as_str(&self) -> &'static str {
    match self {
      LogLevel::Verbose => "verbose",
      LogLevel::Debug => "debug",
      LogLevel::Info => "info",
      LogLevel::Success => "success",
      LogLevel::Warn => "warn",
      LogLevel::Error => "error",
    }
  }
}

impl std::fmt::Display for LogLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A structured log entry
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LogEntry {
  pub timestamp: DateTime<Utc>,
  pub level: LogLevel,
  pub message: String,
  pub component: String,

  /// Structured key/value context attached by the caller
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub fields: BTreeMap<String, serde_json::Value>,
}

impl LogEntry {
  pub fn new(level: LogLevel, message: &str, component: &str) -> Self {
    Self {
      timestamp: Utc::now(),
      level,
      message: message.to_string(),
      component: component.to_string(),
      fields: BTreeMap::new(),
    }
  }

  pub fn with_fields(mut self, fields: &[(&str, serde_json::Value)]) -> Self {
    for (key, value) in fields {
      self.fields.insert((*key).to_string(), value.clone());
    }
    self
  }

  /// Render the entry as a single human-readable line
  pub fn render(&self) -> String {
    let mut line = format!("{}: {}", self.component, self.message);
    for (key, value) in &self.fields {
      match value {
        serde_json::Value::String(s) => line.push_str(&format!(" {key}={s}")),
        other => line.push_str(&format!(" {key}={other}")),
      }
    }
    line
  }
}

/// Destination for structured log entries
pub trait LogSink: Send + Sync {
  fn record(&self, entry: LogEntry);
}

// Logger
// ======

/// Component-scoped handle over a shared sink
#[derive(Clone)]
pub struct Logger {
  sink: Arc<dyn LogSink>,
  component: String,
}

impl std::fmt::Debug for Logger {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Logger").field("component", &self.component).finish()
  }
}

impl Logger {
  pub fn new(sink: Arc<dyn LogSink>, component: &str) -> Self {
    Self { sink, component: component.to_string() }
  }

  /// Logger that prints through the bentley console format
  pub fn console(component: &str) -> Self {
    Self::new(Arc::new(ConsoleSink), component)
  }

  /// Logger that discards everything
  pub fn silent() -> Self {
    Self::new(Arc::new(NullSink), "silent")
  }

  /// A logger for a sub-component sharing the same sink
  pub fn child(&self, component: &str) -> Self {
    Self { sink: Arc::clone(&self.sink), component: format!("{}.{}", self.component, component) }
  }

  pub fn component(&self) -> &str {
    &self.component
  }

  pub fn log(&self, level: LogLevel, message: &str) {
    self.sink.record(LogEntry::new(level, message, &self.component));
  }

  pub fn log_with(&self, level: LogLevel, message: &str, fields: &[(&str, serde_json::Value)]) {
    self.sink.record(LogEntry::new(level, message, &self.component).with_fields(fields));
  }

  pub fn verbose(&self, message: &str) {
    self.log(LogLevel::Verbose, message);
  }

  pub fn debug(&self, message: &str) {
    self.log(LogLevel::Debug, message);
  }

  pub fn info(&self, message: &str) {
    self.log(LogLevel::Info, message);
  }

  pub fn success(&self, message: &str) {
    self.log(LogLevel::Success, message);
  }

  pub fn warn(&self, message: &str) {
    self.log(LogLevel::Warn, message);
  }

  pub fn error(&self, message: &str) {
    self.log(LogLevel::Error, message);
  }

  pub fn info_with(&self, message: &str, fields: &[(&str, serde_json::Value)]) {
    self.log_with(LogLevel::Info, message, fields);
  }

  pub fn warn_with(&self, message: &str, fields: &[(&str, serde_json::Value)]) {
    self.log_with(LogLevel::Warn, message, fields);
  }

  pub fn debug_with(&self, message: &str, fields: &[(&str, serde_json::Value)]) {
    self.log_with(LogLevel::Debug, message, fields);
  }
}

// Sinks
// =====

/// Drops every entry
pub struct NullSink;

impl LogSink for NullSink {
  fn record(&self, _entry: LogEntry) {}
}

/// Prints entries through the bentley console functions
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
  fn record(&self, entry: LogEntry) {
    echo_to_console(&entry);
  }
}

fn echo_to_console(entry: &LogEntry) {
  let line = entry.render();
  match entry.level {
    LogLevel::Verbose => crate::verbose(&line),
    LogLevel::Debug => crate::debug(&line),
    LogLevel::Info => crate::info(&line),
    LogLevel::Success => crate::success(&line),
    LogLevel::Warn => crate::warn(&line),
    LogLevel::Error => crate::error(&line),
  }
}

/// Forwards entries to `tracing`; the installed subscriber does the filtering
pub struct TracingSink;

impl LogSink for TracingSink {
  fn record(&self, entry: LogEntry) {
    let fields = serde_json::Value::Object(entry.fields.into_iter().collect());
    let component = entry.component.as_str();
    match entry.level {
      LogLevel::Verbose => tracing::trace!(component, %fields, "{}", entry.message),
      LogLevel::Debug => tracing::debug!(component, %fields, "{}", entry.message),
      LogLevel::Info | LogLevel::Success => {
        tracing::info!(component, %fields, "{}", entry.message)
      }
      LogLevel::Warn => tracing::warn!(component, %fields, "{}", entry.message),
      LogLevel::Error => tracing::error!(component, %fields, "{}", entry.message),
    }
  }
}

/// Keeps entries in memory
#[derive(Default)]
pub struct MemorySink {
  entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
  pub fn new() -> Self {
    Self::default()
  }

  fn guard(&self) -> MutexGuard<'_, Vec<LogEntry>> {
    self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  pub fn entries(&self) -> Vec<LogEntry> {
    self.guard().clone()
  }

  pub fn entries_at(&self, level: LogLevel) -> Vec<LogEntry> {
    self.guard().iter().filter(|entry| entry.level == level).cloned().collect()
  }

  /// Whether any entry's message contains the given text
  pub fn contains(&self, text: &str) -> bool {
    self.guard().iter().any(|entry| entry.message.contains(text))
  }

  pub fn len(&self) -> usize {
    self.guard().len()
  }

  pub fn is_empty(&self) -> bool {
    self.guard().is_empty()
  }

  pub fn clear(&self) {
    self.guard().clear();
  }
}

impl LogSink for MemorySink {
  fn record(&self, entry: LogEntry) {
    self.guard().push(entry);
  }
}

/// Append-only JSONL log file
pub struct JsonlSink {
  path: PathBuf,
  silent: bool,
  write_lock: Mutex<()>,
}

impl JsonlSink {
  /// Create a sink that writes to the specified file path and echoes to the console
  pub fn new<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
    Self::new_with_silent(path, false)
  }

  /// Create a sink with the option to skip console echo
  pub fn new_with_silent<P: AsRef<Path>>(path: P, silent: bool) -> std::io::Result<Self> {
    let path = path.as_ref().to_path_buf();

    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    // Create file if it doesn't exist (but don't truncate if it does)
    if !path.exists() {
      File::create(&path)?;
    }

    Ok(Self { path, silent, write_lock: Mutex::new(()) })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Append a single entry to the file
  pub fn append(&self, entry: &LogEntry) -> std::io::Result<()> {
    let json_line = serde_json::to_string(entry)
      .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
    writeln!(file, "{json_line}")?;
    file.flush()
  }

  /// Read entries back, newest `limit` entries in chronological order
  ///
  /// `level_filter` of `"all"` or `None` keeps every level. Malformed lines are skipped.
  pub fn read_entries(
    &self,
    limit: Option<usize>,
    level_filter: Option<&str>,
  ) -> std::io::Result<Vec<LogEntry>> {
    if !self.path.exists() {
      return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(&self.path)?);
    let mut entries = Vec::new();

    for line in reader.lines() {
      let line = line?;
      if line.trim().is_empty() {
        continue;
      }

      let Ok(entry) = serde_json::from_str::<LogEntry>(&line) else {
        continue;
      };

      let matches_level =
        level_filter.is_none_or(|filter| filter == "all" || entry.level.as_str() == filter);
      if matches_level {
        entries.push(entry);
      }
    }

    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    if let Some(limit) = limit {
      entries.truncate(limit);
    }
    entries.reverse();

    Ok(entries)
  }

  /// Check if the log file exists and has content
  pub fn has_logs(&self) -> bool {
    std::fs::metadata(&self.path).map(|m| m.len() > 0).unwrap_or(false)
  }
}

impl LogSink for JsonlSink {
  fn record(&self, entry: LogEntry) {
    if !self.silent {
      echo_to_console(&entry);
    }
    // fire-and-forget: a failed log write must not take the caller down
    let _ = self.append(&entry);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_child_logger_shares_sink() {
    let sink = Arc::new(MemorySink::new());
    let root = Logger::new(sink.clone(), "concierge");
    let child = root.child("retriever");

    root.info("root message");
    child.warn("child message");

    let entries = sink.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].component, "concierge");
    assert_eq!(entries[1].component, "concierge.retriever");
    assert_eq!(entries[1].level, LogLevel::Warn);
  }

  #[test]
  fn test_fields_are_attached() {
    let sink = Arc::new(MemorySink::new());
    let logger = Logger::new(sink.clone(), "test");

    logger.warn_with("fetch failed", &[("source", json!("hotels")), ("attempt", json!(2))]);

    let entry = &sink.entries()[0];
    assert_eq!(entry.fields.get("source"), Some(&json!("hotels")));
    assert_eq!(entry.render(), "test: fetch failed attempt=2 source=hotels");
  }

  #[test]
  fn test_memory_sink_level_filter() {
    let sink = Arc::new(MemorySink::new());
    let logger = Logger::new(sink.clone(), "test");

    logger.info("one");
    logger.error("two");
    logger.info("three");

    assert_eq!(sink.entries_at(LogLevel::Info).len(), 2);
    assert!(sink.contains("two"));
    sink.clear();
    assert!(sink.is_empty());
  }

  #[test]
  fn test_jsonl_sink_round_trip_with_filter_and_limit() {
    let dir = tempfile::TempDir::new().unwrap();
    let sink = JsonlSink::new_with_silent(dir.path().join("logs/test.jsonl"), true).unwrap();
    assert!(!sink.has_logs());

    sink.record(LogEntry::new(LogLevel::Info, "first", "a"));
    sink.record(LogEntry::new(LogLevel::Warn, "second", "a"));
    sink.record(LogEntry::new(LogLevel::Info, "third", "a"));

    assert!(sink.has_logs());
    assert_eq!(sink.read_entries(None, Some("all")).unwrap().len(), 3);

    let warnings = sink.read_entries(None, Some("warn")).unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "second");

    let latest = sink.read_entries(Some(1), None).unwrap();
    assert_eq!(latest.len(), 1);
  }

  #[test]
  fn test_jsonl_sink_skips_malformed_lines() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("test.jsonl");
    std::fs::write(&path, "not json\n\n").unwrap();

    let sink = JsonlSink::new_with_silent(&path, true).unwrap();
    sink.record(LogEntry::new(LogLevel::Error, "real", "a"));

    let entries = sink.read_entries(None, None).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].level, LogLevel::Error);
  }
}
