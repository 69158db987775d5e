use super::dialogue::DicFunction;
use crate::logging::Code;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Warning,
    Error,
}

/// A problem found while parsing; never aborts a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseDiagnostic {
    pub level: DiagnosticLevel,
    pub code: String,
    pub message: String,
    pub file_path: String,
    /// Zero-based source line; `None` for file-scoped diagnostics
    pub line: Option<usize>,
}

impl ParseDiagnostic {
    pub fn error(
        code: Code,
        message: impl Into<String>,
        file_path: impl Into<String>,
        line: Option<usize>,
    ) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            code: code.as_str().to_string(),
            message: message.into(),
            file_path: file_path.into(),
            line,
        }
    }

    pub fn warning(
        code: Code,
        message: impl Into<String>,
        file_path: impl Into<String>,
        line: Option<usize>,
    ) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            code: code.as_str().to_string(),
            message: message.into(),
            file_path: file_path.into(),
            line,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == DiagnosticLevel::Error
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Error => "error",
        };
        match self.line {
            Some(line) => write!(
                f,
                "{}[{}]: {} ({}:{})",
                level, self.code, self.message, self.file_path, line
            ),
            None => write!(
                f,
                "{}[{}]: {} ({})",
                level, self.code, self.message, self.file_path
            ),
        }
    }
}

/// Which dialect produced a batch result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShioriType {
    #[serde(rename = "A")]
    DialectA,
    #[serde(rename = "B")]
    DialectB,
    #[serde(rename = "C")]
    DialectC,
}

impl ShioriType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShioriType::DialectA => "A",
            ShioriType::DialectB => "B",
            ShioriType::DialectC => "C",
        }
    }
}

/// Ghost package metadata; owned by an external collaborator and never
/// populated by the dialect engines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GhostMeta {
    pub name: Option<String>,
    pub sakura_name: Option<String>,
    pub kero_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchParseResult {
    pub shiori_type: ShioriType,
    pub functions: Vec<DicFunction>,
    pub meta: Option<GhostMeta>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl BatchParseResult {
    pub fn new(shiori_type: ShioriType) -> Self {
        Self {
            shiori_type,
            functions: Vec::new(),
            meta: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }
}
