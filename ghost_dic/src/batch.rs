//! Batch orchestrator for dialect parsing
//!
//! Dispatches a set of decoded files to one dialect engine in path order,
//! reporting progress after each file. A file the engine rejects becomes an
//! error diagnostic and the batch moves on; a batch over the file limit
//! becomes a single error diagnostic. A result is always returned.

use crate::config::constants::compile_time::batch::MAX_FILES_PER_BATCH;
use crate::config::runtime::{
    DialectAPreferences, DialectBPreferences, DialectCPreferences, RuntimeConfig,
};
use crate::dialect_a::{self, DialectAError, PreprocessorState};
use crate::dialect_b::{self, DialectBError};
use crate::dialect_c::{self, DialectCError};
use crate::logging::{self, codes, Code};
use crate::model::{BatchParseResult, DicFunction, ParseDiagnostic, ShioriType};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;

// ============================================================================
// BATCH TYPES
// ============================================================================

/// Dialect tag, resolved once per batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    A,
    B,
    C,
}

impl Dialect {
    pub fn shiori_type(&self) -> ShioriType {
        match self {
            Dialect::A => ShioriType::DialectA,
            Dialect::B => ShioriType::DialectB,
            Dialect::C => ShioriType::DialectC,
        }
    }
}

/// One decoded input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    pub file_path: String,
    pub decoded_text: String,
}

impl SourceFile {
    pub fn new(file_path: impl Into<String>, decoded_text: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            decoded_text: decoded_text.into(),
        }
    }
}

/// Batch-level refusal, reported as a diagnostic rather than returned
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Too many files in batch: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },
}

impl BatchError {
    pub fn error_code(&self) -> Code {
        match self {
            BatchError::TooManyFiles { .. } => codes::batch::TOO_MANY_FILES,
        }
    }
}

/// A single file's engine failure
#[derive(Debug, thiserror::Error)]
enum EngineError {
    #[error(transparent)]
    A(#[from] DialectAError),
    #[error(transparent)]
    B(#[from] DialectBError),
    #[error(transparent)]
    C(#[from] DialectCError),
}

impl EngineError {
    fn error_code(&self) -> Code {
        match self {
            EngineError::A(e) => e.error_code(),
            EngineError::B(e) => e.error_code(),
            EngineError::C(e) => e.error_code(),
        }
    }

    fn line(&self) -> Option<usize> {
        match self {
            EngineError::A(e) => e.line(),
            EngineError::B(e) => e.line(),
            EngineError::C(e) => e.line(),
        }
    }
}

struct FileOutput {
    functions: Vec<DicFunction>,
    diagnostics: Vec<ParseDiagnostic>,
}

// ============================================================================
// ENGINE DISPATCH
// ============================================================================

/// Per-batch engine; Dialect-A owns the batch's preprocessor state
enum Engine<'c> {
    A {
        preferences: &'c DialectAPreferences,
        state: PreprocessorState,
    },
    B(&'c DialectBPreferences),
    C(&'c DialectCPreferences),
}

impl<'c> Engine<'c> {
    fn new(dialect: Dialect, config: &'c RuntimeConfig) -> Self {
        match dialect {
            Dialect::A => Engine::A {
                preferences: &config.dialect_a,
                state: PreprocessorState::new(),
            },
            Dialect::B => Engine::B(&config.dialect_b),
            Dialect::C => Engine::C(&config.dialect_c),
        }
    }

    fn parse_file(&mut self, file: &SourceFile) -> Result<FileOutput, EngineError> {
        let path = file.file_path.as_str();
        let text = file.decoded_text.as_str();

        match self {
            Engine::A { preferences, state } => Ok(FileOutput {
                functions: dialect_a::parse_file_with(path, text, preferences, state)?,
                diagnostics: Vec::new(),
            }),
            Engine::B(preferences) => {
                let output = dialect_b::parse_file_with(path, text, preferences)?;
                Ok(FileOutput {
                    functions: output.functions,
                    diagnostics: output.diagnostics,
                })
            }
            Engine::C(preferences) => Ok(FileOutput {
                functions: dialect_c::parse_file_with(path, text, preferences)?,
                diagnostics: Vec::new(),
            }),
        }
    }
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

/// `round(100 * processed / total)`, 100 for an empty batch
pub fn progress_percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (200 * processed + total) / (2 * total);
    percent.min(100) as u8
}

/// Parse a batch with default configuration and no progress reporting
pub fn parse_batch(dialect: Dialect, files: Vec<SourceFile>) -> BatchParseResult {
    parse_batch_with_progress(dialect, files, &mut |_| {})
}

pub fn parse_batch_with_progress(
    dialect: Dialect,
    files: Vec<SourceFile>,
    progress: &mut dyn FnMut(u8),
) -> BatchParseResult {
    parse_batch_with_config(dialect, files, &RuntimeConfig::default(), progress)
}

/// Parse every file with one engine.
///
/// Files are processed in byte-wise path order. Progress goes out as 0
/// first, then once per file; an empty or refused batch reports 0 then 100.
pub fn parse_batch_with_config(
    dialect: Dialect,
    mut files: Vec<SourceFile>,
    config: &RuntimeConfig,
    progress: &mut dyn FnMut(u8),
) -> BatchParseResult {
    let start_time = Instant::now();
    let preferences = &config.batch;
    let mut report = |percent: u8| {
        if preferences.report_progress {
            progress(percent);
        }
    };

    if files.len() > MAX_FILES_PER_BATCH {
        let error = BatchError::TooManyFiles {
            count: files.len(),
            max: MAX_FILES_PER_BATCH,
        };
        crate::log_error!(error.error_code(), "Batch rejected",
            "files" => files.len(),
            "max" => MAX_FILES_PER_BATCH);

        let mut result = BatchParseResult::new(dialect.shiori_type());
        result.diagnostics.push(ParseDiagnostic::error(
            error.error_code(),
            error.to_string(),
            "",
            None,
        ));
        report(0);
        report(100);
        return result;
    }

    crate::log_info!("Starting batch",
        "dialect" => dialect.shiori_type().as_str(),
        "files" => files.len());

    files.sort_by(|a, b| a.file_path.cmp(&b.file_path));

    let total = files.len();
    let mut result = BatchParseResult::new(dialect.shiori_type());
    let mut engine = Engine::new(dialect, config);

    report(0);
    if total == 0 {
        report(100);
    }

    for (file_id, file) in files.iter().enumerate() {
        let file_start = Instant::now();

        let outcome = logging::with_file_context(PathBuf::from(&file.file_path), file_id, || {
            engine.parse_file(file)
        });

        match outcome {
            Ok(output) => {
                crate::log_success!(codes::success::FILE_PARSED, "File parsed",
                    "file" => file.file_path,
                    "functions" => output.functions.len(),
                    "diagnostics" => output.diagnostics.len());
                result.functions.extend(output.functions);
                result.diagnostics.extend(output.diagnostics);
            }
            Err(error) => {
                crate::log_error!(codes::batch::FILE_PARSE_FAILED, "File parse failed",
                    "file" => file.file_path,
                    "cause" => error.error_code(),
                    "error" => error);
                result.diagnostics.push(ParseDiagnostic::error(
                    codes::batch::FILE_PARSE_FAILED,
                    format!("{}: {}", error.error_code(), error),
                    file.file_path.as_str(),
                    error.line(),
                ));
            }
        }

        if preferences.log_file_timings {
            crate::log_debug!("File timing",
                "file" => file.file_path,
                "duration_ms" => format!("{:.2}", file_start.elapsed().as_secs_f64() * 1000.0));
        }

        report(progress_percent(file_id + 1, total));
    }

    crate::log_success!(codes::success::BATCH_COMPLETE, "Batch completed",
        "files" => total,
        "functions" => result.functions.len(),
        "errors" => result.error_count(),
        "warnings" => result.warning_count(),
        "duration_ms" => format!("{:.2}", start_time.elapsed().as_secs_f64() * 1000.0));

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(result: &BatchParseResult) -> Vec<(&str, &str)> {
        result
            .functions
            .iter()
            .map(|f| (f.file_path.as_str(), f.name.as_str()))
            .collect()
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0, 3), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(1, 8), 13);
        assert_eq!(progress_percent(0, 0), 100);
    }

    #[test]
    fn test_output_independent_of_input_order() {
        let b = SourceFile::new("b.dic", "OnB { \"b\" }");
        let a = SourceFile::new("a.dic", "OnA { \"a\" }");

        let first = parse_batch(Dialect::A, vec![b.clone(), a.clone()]);
        let second = parse_batch(Dialect::A, vec![a, b]);

        assert_eq!(first, second);
        assert_eq!(names(&first), vec![("a.dic", "OnA"), ("b.dic", "OnB")]);
    }

    #[test]
    fn test_malformed_file_does_not_abort_batch() {
        let files = vec![
            SourceFile::new("1.dic", "One { \"1\" }"),
            SourceFile::new("2.dic", "Broken {\n\"never closed\""),
            SourceFile::new("3.dic", "Three { \"3\" }"),
        ];
        let mut reported = Vec::new();
        let result = parse_batch_with_progress(Dialect::A, files, &mut |p| reported.push(p));

        assert_eq!(result.functions.len(), 2);
        assert_eq!(result.diagnostics.len(), 1);
        let diagnostic = &result.diagnostics[0];
        assert!(diagnostic.is_error());
        assert_eq!(diagnostic.file_path, "2.dic");
        assert_eq!(diagnostic.code, "E300");
        assert!(diagnostic.message.starts_with("E040"));
        assert_eq!(diagnostic.line, Some(0));

        assert_eq!(reported, vec![0, 33, 67, 100]);
    }

    #[test]
    fn test_empty_batch_progress() {
        let mut reported = Vec::new();
        let result = parse_batch_with_progress(Dialect::C, Vec::new(), &mut |p| reported.push(p));

        assert_eq!(reported, vec![0, 100]);
        assert!(result.functions.is_empty());
        assert_eq!(result.shiori_type, ShioriType::DialectC);
        assert!(result.meta.is_none());
    }

    #[test]
    fn test_progress_can_be_disabled() {
        let mut config = RuntimeConfig::default();
        config.batch.report_progress = false;
        let mut reported = Vec::new();

        parse_batch_with_config(
            Dialect::C,
            vec![SourceFile::new("a.txt", "a : 1")],
            &config,
            &mut |p| reported.push(p),
        );

        assert!(reported.is_empty());
    }

    #[test]
    fn test_preprocessor_state_spans_files_not_batches() {
        let files = vec![
            SourceFile::new("0_defs.dic", "#globaldefine %WHO ghost"),
            SourceFile::new("1_talk.dic", "Talk { \"%WHO\" }"),
        ];
        let result = parse_batch(Dialect::A, files);
        assert_eq!(result.functions[0].dialogues[0].raw_text, "ghost");

        let later = parse_batch(
            Dialect::A,
            vec![SourceFile::new("1_talk.dic", "Talk { \"%WHO\" }")],
        );
        assert_eq!(later.functions[0].dialogues[0].raw_text, "%WHO");
    }

    #[test]
    fn test_dialect_b_diagnostics_carried() {
        let files = vec![
            SourceFile::new("z.txt", "＊OnBoot\n：$(missing)"),
            SourceFile::new("y.txt", "＊OnClose\n：bye"),
        ];
        let result = parse_batch(Dialect::B, files);

        assert_eq!(names(&result), vec![("y.txt", "OnClose"), ("z.txt", "OnBoot")]);
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.diagnostics[0].file_path, "z.txt");
        assert_eq!(result.shiori_type, ShioriType::DialectB);
    }

    #[test]
    fn test_dialect_c_batch() {
        let files = vec![SourceFile::new("dict.txt", "a,b : 1\n:crypt\nc : 2\n:endcrypt")];
        let result = parse_batch(Dialect::C, files);
        assert_eq!(names(&result), vec![("dict.txt", "a"), ("dict.txt", "b")]);
    }

    #[test]
    fn test_too_many_files_still_returns_result() {
        let files = vec![SourceFile::new("x", "a : 1"); MAX_FILES_PER_BATCH + 1];
        let mut reported = Vec::new();
        let result = parse_batch_with_progress(Dialect::C, files, &mut |p| reported.push(p));

        assert!(result.functions.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.diagnostics[0].is_error());
        assert_eq!(result.diagnostics[0].code, "E301");
        assert!(result.diagnostics[0].message.contains("50001"));
        assert_eq!(reported, vec![0, 100]);
    }

    #[test]
    fn test_long_elseif_chain_is_parsed() {
        let source = format!(
            "OnBoot {{ if a {{\"x\"}} {}}}",
            "elseif a {\"y\"} ".repeat(50_000)
        );
        let result = parse_batch(Dialect::A, vec![SourceFile::new("chain.dic", source)]);

        assert!(result.diagnostics.is_empty());
        assert_eq!(result.functions.len(), 1);
        assert_eq!(result.functions[0].dialogues.len(), 50_001);
    }
}
