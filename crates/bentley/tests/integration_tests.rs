use bentley::*;
use std::sync::Arc;

#[test]
fn test_basic_logging_functions() {
  // Test that basic logging functions can be called without panicking
  info("Test info message");
  warn("Test warning message");
  error("Test error message");
  debug("Test debug message");
  verbose("Test verbose message");
  success("Test success message");
}

#[test]
fn test_multiline_messages() {
  let multiline_msg = "First line\nSecond line\nThird line";
  info(multiline_msg);
  warn(multiline_msg);
  error(multiline_msg);
}

#[test]
fn test_macros_expand() {
  bentley::info!("macro info");
  bentley::warn!(&format!("macro warn {}", 1));
  bentley::verbose!("macro verbose");
}

#[test]
fn test_console_and_null_loggers_accept_messages() {
  let console = Logger::console("integration");
  console.info("console logger");
  console.success("done");

  let silent = Logger::silent();
  silent.error("nobody hears this");
}

#[test]
fn test_tracing_sink_forwards_without_subscriber() {
  let logger = Logger::new(Arc::new(TracingSink), "integration");
  logger.info_with("traced", &[("key", serde_json::json!("value"))]);
  logger.verbose("trace level");
}

#[test]
fn test_jsonl_logger_persists_component() {
  let dir = tempfile::TempDir::new().unwrap();
  let sink = Arc::new(JsonlSink::new_with_silent(dir.path().join("run.jsonl"), true).unwrap());
  let logger = Logger::new(sink.clone(), "retriever");

  logger.warn("source degraded");

  let entries = sink.read_entries(None, Some("warn")).unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].component, "retriever");
  assert_eq!(entries[0].message, "source degraded");
}
