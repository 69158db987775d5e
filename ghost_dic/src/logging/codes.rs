//! Error, warning and success codes with their metadata
//!
//! Diagnostic codes surfaced in `ParseDiagnostic.code` come from this table,
//! so the identifiers here are part of the public output format.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CLASSIFICATION TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Metadata attached to a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    /// Whether the batch keeps going after this condition
    pub recoverable: bool,
    pub description: &'static str,
}

impl ErrorMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        description: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            description,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Limits applied to every source file before any engine runs
pub mod source {
    use super::Code;

    pub const SOURCE_TOO_LARGE: Code = Code::new("E007");
    pub const TOO_MANY_LINES: Code = Code::new("E008");
}

pub mod inline {
    use super::Code;

    pub const LARGE_DIALOGUE: Code = Code::new("W020");
    pub const UNKNOWN_CONTROL_SEQUENCE: Code = Code::new("W021");
}

/// Dialect-A (imperative script) parse failures
pub mod dialect_a {
    use super::Code;

    pub const UNEXPECTED_END_OF_INPUT: Code = Code::new("E040");
    pub const UNMATCHED_DELIMITER: Code = Code::new("E042");
    pub const UNEXPECTED_TOKEN: Code = Code::new("E050");
    pub const TOO_MANY_DEFINES: Code = Code::new("E051");
    pub const MAX_NESTING_DEPTH: Code = Code::new("E087");
}

/// Dialect-B semantic diagnostics
pub mod dialect_b {
    use super::Code;

    pub const DUPLICATE_EVENT: Code = Code::new("E090");
    pub const VARIABLE_SHADOWS_EVENT: Code = Code::new("E091");
    pub const TOO_MANY_SYMBOLS: Code = Code::new("E092");
    pub const UNDEFINED_VARIABLE: Code = Code::new("E110");
}

pub mod dialect_c {
    use super::Code;

    pub const TOO_MANY_ALIASES: Code = Code::new("E060");
}

pub mod batch {
    use super::Code;

    pub const FILE_PARSE_FAILED: Code = Code::new("E300");
    pub const TOO_MANY_FILES: Code = Code::new("E301");
}

/// Transport boundary failures
pub mod protocol {
    use super::Code;

    pub const MALFORMED_REQUEST: Code = Code::new("P001");
    pub const RESPONSE_ENCODING_FAILED: Code = Code::new("P002");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PARSED: Code = Code::new("I006");
    pub const DIALECT_C_ENTRIES_PARSED: Code = Code::new("I030");
    pub const DIALECT_B_ANALYSIS_COMPLETE: Code = Code::new("I050");
    pub const DIALECT_A_EXTRACTION_COMPLETE: Code = Code::new("I040");
    pub const BATCH_COMPLETE: Code = Code::new("I090");
    pub const REQUEST_HANDLED: Code = Code::new("I100");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

const REGISTRY_ENTRIES: &[ErrorMetadata] = &[
    // System
    ErrorMetadata::new(
        "ERR001",
        "System",
        Severity::Critical,
        false,
        "Internal error in the parsing core",
    ),
    ErrorMetadata::new(
        "ERR002",
        "System",
        Severity::Critical,
        false,
        "Logging or configuration initialization failure",
    ),
    // Source limits
    ErrorMetadata::new(
        "E007",
        "Source",
        Severity::Medium,
        true,
        "Source file exceeds the maximum size",
    ),
    ErrorMetadata::new(
        "E008",
        "Source",
        Severity::Medium,
        true,
        "Source file exceeds the maximum line count",
    ),
    // Inline tokenizer
    ErrorMetadata::new(
        "W020",
        "Inline",
        Severity::Low,
        true,
        "Dialogue text is unusually large",
    ),
    ErrorMetadata::new(
        "W021",
        "Inline",
        Severity::Low,
        true,
        "Unrecognised or unterminated control sequence kept as unknown token",
    ),
    // Dialect-A
    ErrorMetadata::new(
        "E040",
        "DialectA",
        Severity::High,
        true,
        "Unexpected end of input inside a block",
    ),
    ErrorMetadata::new(
        "E042",
        "DialectA",
        Severity::High,
        true,
        "Closing brace without matching opening brace",
    ),
    ErrorMetadata::new(
        "E050",
        "DialectA",
        Severity::High,
        true,
        "Unexpected token",
    ),
    ErrorMetadata::new(
        "E051",
        "DialectA",
        Severity::Medium,
        true,
        "Too many preprocessor definitions",
    ),
    ErrorMetadata::new(
        "E087",
        "DialectA",
        Severity::High,
        true,
        "Block nesting exceeds the maximum depth",
    ),
    // Dialect-B
    ErrorMetadata::new(
        "E090",
        "DialectB",
        Severity::Medium,
        true,
        "Event declared more than once",
    ),
    ErrorMetadata::new(
        "E091",
        "DialectB",
        Severity::Low,
        true,
        "Variable definition uses the name of an event",
    ),
    ErrorMetadata::new(
        "E092",
        "DialectB",
        Severity::Medium,
        true,
        "Symbol table exceeds the maximum size",
    ),
    ErrorMetadata::new(
        "E110",
        "DialectB",
        Severity::Medium,
        true,
        "Reference to a variable with no definition",
    ),
    // Dialect-C
    ErrorMetadata::new(
        "E060",
        "DialectC",
        Severity::Medium,
        true,
        "Entry declares too many aliases",
    ),
    // Batch
    ErrorMetadata::new(
        "E300",
        "Batch",
        Severity::Medium,
        true,
        "A file failed to parse and was skipped",
    ),
    ErrorMetadata::new(
        "E301",
        "Batch",
        Severity::High,
        false,
        "Batch contains more files than allowed",
    ),
    // Protocol
    ErrorMetadata::new(
        "P001",
        "Protocol",
        Severity::High,
        false,
        "Request message does not match any known shape",
    ),
    ErrorMetadata::new(
        "P002",
        "Protocol",
        Severity::High,
        false,
        "Response message could not be encoded",
    ),
];

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_ENTRIES
            .iter()
            .map(|metadata| (metadata.code, metadata.clone()))
            .collect()
    })
}

// ============================================================================
// LOOKUP FUNCTIONS
// ============================================================================

pub fn get_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_metadata(code)
        .map(|m| m.severity)
        .unwrap_or(Severity::Low)
}

pub fn get_category(code: &str) -> &'static str {
    if let Some(metadata) = get_metadata(code) {
        return metadata.category;
    }
    if code.starts_with('I') {
        "Success"
    } else {
        "Unknown"
    }
}

pub fn get_description(code: &str) -> &'static str {
    get_metadata(code)
        .map(|m| m.description)
        .unwrap_or("Unknown error")
}

pub fn is_recoverable(code: &str) -> bool {
    get_metadata(code).map(|m| m.recoverable).unwrap_or(true)
}

/// Every code with registered metadata
pub fn registered_codes() -> Vec<&'static str> {
    let mut codes: Vec<_> = get_error_registry().keys().copied().collect();
    codes.sort_unstable();
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_codes_have_metadata() {
        for code in [
            dialect_b::DUPLICATE_EVENT,
            dialect_b::UNDEFINED_VARIABLE,
            dialect_b::VARIABLE_SHADOWS_EVENT,
            dialect_a::UNEXPECTED_END_OF_INPUT,
            dialect_a::UNMATCHED_DELIMITER,
            batch::FILE_PARSE_FAILED,
            source::SOURCE_TOO_LARGE,
        ] {
            assert_ne!(get_description(code.as_str()), "Unknown error", "{}", code);
        }
    }

    #[test]
    fn test_registry_entries_are_unique() {
        assert_eq!(registered_codes().len(), REGISTRY_ENTRIES.len());
    }

    #[test]
    fn test_classification() {
        assert_eq!(get_category("E090"), "DialectB");
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert!(!is_recoverable("E301"));
        assert_eq!(get_category(success::BATCH_COMPLETE.as_str()), "Success");
        assert_eq!(get_category("Z999"), "Unknown");
    }
}
