//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, DefaultLogger, and the
//! global logger plumbing used by the video_* macros.

use crate::log::{set_logger, DefaultLogger, LogEntry, LogSeverity, Logger};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    // Test PartialOrd implementation
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
    assert!(LogSeverity::Error < LogSeverity::Critical);
}

#[test]
fn test_log_severity_equality() {
    assert_eq!(LogSeverity::Trace, LogSeverity::Trace);
    assert_eq!(LogSeverity::Critical, LogSeverity::Critical);
    assert_ne!(LogSeverity::Trace, LogSeverity::Debug);
    assert_ne!(LogSeverity::Error, LogSeverity::Critical);
}

#[test]
fn test_log_severity_copy() {
    let sev1 = LogSeverity::Info;
    let sev2 = sev1; // Copy, not move
    assert_eq!(sev1, sev2);
    assert_eq!(sev1, LogSeverity::Info);
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_creation_without_file_line() {
    let entry = LogEntry {
        severity: LogSeverity::Info,
        timestamp: SystemTime::now(),
        source: "video::Runtime".to_string(),
        message: "Runtime initialized".to_string(),
        file: None,
        line: None,
    };

    assert_eq!(entry.severity, LogSeverity::Info);
    assert_eq!(entry.source, "video::Runtime");
    assert_eq!(entry.message, "Runtime initialized");
    assert!(entry.file.is_none());
    assert!(entry.line.is_none());
}

#[test]
fn test_log_entry_creation_with_file_line() {
    let entry = LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "video::vulkan".to_string(),
        message: "Submit failed".to_string(),
        file: Some("vulkan_scheduler.rs"),
        line: Some(42),
    };

    assert_eq!(entry.severity, LogSeverity::Error);
    assert_eq!(entry.file, Some("vulkan_scheduler.rs"));
    assert_eq!(entry.line, Some(42));
}

#[test]
fn test_log_entry_clone() {
    let entry1 = LogEntry {
        severity: LogSeverity::Warn,
        timestamp: SystemTime::now(),
        source: "test".to_string(),
        message: "warning".to_string(),
        file: Some("test.rs"),
        line: Some(10),
    };

    let entry2 = entry1.clone();

    assert_eq!(entry1.severity, entry2.severity);
    assert_eq!(entry1.source, entry2.source);
    assert_eq!(entry1.message, entry2.message);
    assert_eq!(entry1.file, entry2.file);
    assert_eq!(entry1.line, entry2.line);
}

// ============================================================================
// GLOBAL LOGGER TESTS
// ============================================================================

/// Test logger that records every entry it receives
struct RecordingLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for RecordingLogger {
    fn log(&self, entry: &LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.clone());
        }
    }
}

#[test]
#[serial]
fn test_macros_route_through_global_logger() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    set_logger(Box::new(RecordingLogger {
        entries: entries.clone(),
    }));

    crate::video_info!("video::Test", "info message {}", 1);
    crate::video_warn!("video::Test", "warn message");
    crate::video_error!("video::Test", "error message");

    let recorded = entries.lock().unwrap();
    assert_eq!(recorded.len(), 3);

    assert_eq!(recorded[0].severity, LogSeverity::Info);
    assert_eq!(recorded[0].message, "info message 1");
    assert!(recorded[0].file.is_none());

    assert_eq!(recorded[1].severity, LogSeverity::Warn);

    // video_error! attaches file:line
    assert_eq!(recorded[2].severity, LogSeverity::Error);
    assert!(recorded[2].file.is_some());
    assert!(recorded[2].line.is_some());

    drop(recorded);
    set_logger(Box::new(DefaultLogger));
}

#[test]
#[serial]
fn test_critical_macro_attaches_location() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    set_logger(Box::new(RecordingLogger {
        entries: entries.clone(),
    }));

    crate::video_critical!("video::Test", "unimplemented format {}", "RGB8");

    let recorded = entries.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].severity, LogSeverity::Critical);
    assert!(recorded[0].message.contains("RGB8"));
    assert!(recorded[0].file.is_some());

    drop(recorded);
    set_logger(Box::new(DefaultLogger));
}
