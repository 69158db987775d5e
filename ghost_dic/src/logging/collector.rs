//! Per-file event collection for batch parsing
//!
//! While a file context is active every error and warning routed through the
//! logging macros is also recorded here, keyed by the file's path, so a caller
//! can print a cargo-style report after the batch.

use super::events::LogEvent;
use crate::config::compile_time::logging::MAX_LOG_EVENTS_PER_FILE;
use crate::logging::codes;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

// ============================================================================
// FILE PROCESSING CONTEXT
// ============================================================================

#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    /// Position of the file in the sorted batch
    pub file_id: usize,
    pub start_time: Instant,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self {
            file_path,
            file_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

// ============================================================================
// PROCESSING SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub failed_files: usize,
    pub files_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl ProcessingSummary {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.total_warnings > 0
    }
}

// ============================================================================
// ERROR COLLECTOR
// ============================================================================

/// Thread-safe collector of log events keyed by file path
pub struct ErrorCollector {
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
    file_contexts: Mutex<BTreeMap<PathBuf, FileProcessingContext>>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
            file_contexts: Mutex::new(BTreeMap::new()),
        }
    }

    fn events(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<LogEvent>>> {
        self.file_events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Record an event for a file, capped at `MAX_LOG_EVENTS_PER_FILE`
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut events = self.events();
        let file_events = events.entry(file_path.to_path_buf()).or_default();

        if file_events.len() < MAX_LOG_EVENTS_PER_FILE {
            file_events.push(event);
        } else if file_events.len() == MAX_LOG_EVENTS_PER_FILE {
            file_events.push(LogEvent::warning(
                codes::system::INTERNAL_ERROR,
                &format!(
                    "Too many events for file (limit: {})",
                    MAX_LOG_EVENTS_PER_FILE
                ),
            ));
        }
    }

    pub fn record_file_context(&self, context: FileProcessingContext) {
        self.file_contexts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(context.file_path.clone(), context);
    }

    pub fn get_file_events(&self, file_path: &Path) -> Vec<LogEvent> {
        self.events().get(file_path).cloned().unwrap_or_default()
    }

    pub fn get_file_errors(&self, file_path: &Path) -> Vec<LogEvent> {
        self.events()
            .get(file_path)
            .map(|events| events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    pub fn file_has_errors(&self, file_path: &Path) -> bool {
        self.events()
            .get(file_path)
            .is_some_and(|events| events.iter().any(|e| e.is_error()))
    }

    pub fn get_all_file_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        self.events().clone()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = self.events();
        let mut summary = ProcessingSummary {
            total_files: events.len(),
            ..Default::default()
        };

        for file_events in events.values() {
            let errors = file_events.iter().filter(|e| e.is_error()).count();
            let warnings = file_events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.failed_files += 1;
            } else if warnings > 0 {
                summary.files_with_warnings += 1;
            }
            summary.total_errors += errors;
            summary.total_warnings += warnings;
        }

        summary
    }

    pub fn total_event_count(&self) -> usize {
        self.events().values().map(Vec::len).sum()
    }

    pub fn clear(&self) {
        self.events().clear();
        self.file_contexts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CARGO-STYLE FORMATTING
// ============================================================================

pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (file_path, events) in &collector.get_all_file_events() {
        let reported: Vec<_> = events
            .iter()
            .filter(|e| e.is_error() || e.is_warning())
            .collect();
        if reported.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", file_path.display()));
        for event in reported {
            let label = if event.is_error() { "error" } else { "warning" };
            let location = event
                .span
                .as_ref()
                .map(|s| {
                    format!(
                        " --> {}:{}:{}",
                        file_path.display(),
                        s.start.line,
                        s.start.column
                    )
                })
                .unwrap_or_default();

            output.push_str(&format!(
                "{}[{}]: {}{}\n",
                label, event.code, event.message, location
            ));
            for (key, value) in &event.context {
                if key != "file" && key != "file_id" {
                    output.push_str(&format!("  = {}: {}\n", key, value));
                }
            }
        }
        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        output.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Span;

    #[test]
    fn test_error_collector_basic() {
        let collector = ErrorCollector::new();
        let file_path = PathBuf::from("ghost/dic/boot.dic");

        collector.record_event(
            &file_path,
            LogEvent::error(codes::dialect_a::UNEXPECTED_END_OF_INPUT, "Unclosed block"),
        );

        assert_eq!(collector.get_file_events(&file_path).len(), 1);
        assert_eq!(collector.get_file_errors(&file_path).len(), 1);
        assert!(collector.file_has_errors(&file_path));
        assert!(!collector.file_has_errors(Path::new("other.dic")));
    }

    #[test]
    fn test_processing_summary() {
        let collector = ErrorCollector::new();

        collector.record_event(
            Path::new("a.dic"),
            LogEvent::error(codes::batch::FILE_PARSE_FAILED, "Error"),
        );
        collector.record_event(
            Path::new("b.dic"),
            LogEvent::warning(codes::dialect_b::VARIABLE_SHADOWS_EVENT, "Warning"),
        );

        let summary = collector.get_summary();
        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.failed_files, 1);
        assert_eq!(summary.files_with_warnings, 1);
        assert!(summary.has_errors());
        assert!(summary.has_warnings());
    }

    #[test]
    fn test_per_file_cap() {
        let collector = ErrorCollector::new();
        let file_path = Path::new("noisy.dic");

        for _ in 0..MAX_LOG_EVENTS_PER_FILE + 10 {
            collector.record_event(file_path, LogEvent::info("event"));
        }

        // one overflow notice after the cap
        assert_eq!(collector.total_event_count(), MAX_LOG_EVENTS_PER_FILE + 1);
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();
        collector.record_event(
            Path::new("b.txt"),
            LogEvent::error(codes::dialect_b::DUPLICATE_EVENT, "Duplicate event declaration")
                .with_span(Span::on_line(3, 0, 7))
                .with_context("name", "OnBoot"),
        );

        let output = format_cargo_style_errors(&collector);
        assert!(output.contains("error[E090]: Duplicate event declaration --> b.txt:3:0"));
        assert!(output.contains("= name: OnBoot"));
        assert!(output.contains("Total errors: 1"));

        collector.clear();
        assert_eq!(collector.total_event_count(), 0);
    }
}
