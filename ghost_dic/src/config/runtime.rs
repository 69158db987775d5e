// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Errors raised while loading a runtime configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Boolean preference from the environment; unset or unparsable keeps `default`
fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectCPreferences {
    /// Line that opens an encrypted region
    pub crypt_open: String,

    /// Line that closes an encrypted region
    pub crypt_close: String,

    /// Whether a variant wrapped in double quotes loses one layer of quotes
    pub strip_variant_quotes: bool,
}

impl Default for DialectCPreferences {
    fn default() -> Self {
        Self {
            crypt_open: env::var(env_vars::C_CRYPT_OPEN).unwrap_or_else(|_| ":crypt".to_string()),
            crypt_close: env::var(env_vars::C_CRYPT_CLOSE)
                .unwrap_or_else(|_| ":endcrypt".to_string()),
            strip_variant_quotes: env_bool(env_vars::C_STRIP_VARIANT_QUOTES, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectBPreferences {
    /// Whether the `→` continuation prefix is removed before classification
    pub strip_continuation_prefix: bool,

    /// Whether `name＝value` counts as a variable definition alongside `name=value`
    pub accept_fullwidth_assignment: bool,
}

impl Default for DialectBPreferences {
    fn default() -> Self {
        Self {
            strip_continuation_prefix: env_bool(env_vars::B_STRIP_CONTINUATION, true),
            accept_fullwidth_assignment: env_bool(env_vars::B_FULLWIDTH_ASSIGNMENT, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectAPreferences {
    /// Whether literals without visible content are carried into the next literal
    pub merge_invisible_fragments: bool,

    /// Whether `#define` / `#globaldefine` substitution runs before lexing
    pub enable_preprocessor: bool,
}

impl Default for DialectAPreferences {
    fn default() -> Self {
        Self {
            merge_invisible_fragments: env_bool(env_vars::A_MERGE_INVISIBLE, true),
            enable_preprocessor: env_bool(env_vars::A_PREPROCESSOR, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchPreferences {
    /// Whether progress callbacks are invoked
    pub report_progress: bool,

    /// Whether per-file timings are logged
    pub log_file_timings: bool,
}

impl Default for BatchPreferences {
    fn default() -> Self {
        Self {
            report_progress: env_bool(env_vars::BATCH_REPORT_PROGRESS, true),
            log_file_timings: env_bool(env_vars::BATCH_LOG_TIMINGS, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level that reaches a logger
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_bool(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_bool(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel for compatibility
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub dialect_a: DialectAPreferences,
    pub dialect_b: DialectBPreferences,
    pub dialect_c: DialectCPreferences,
    pub batch: BatchPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse a configuration from TOML text; missing tables keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Dialect-A
    pub const A_MERGE_INVISIBLE: &str = "GHOST_DIC_A_MERGE_INVISIBLE";
    pub const A_PREPROCESSOR: &str = "GHOST_DIC_A_PREPROCESSOR";

    // Dialect-B
    pub const B_STRIP_CONTINUATION: &str = "GHOST_DIC_B_STRIP_CONTINUATION";
    pub const B_FULLWIDTH_ASSIGNMENT: &str = "GHOST_DIC_B_FULLWIDTH_ASSIGNMENT";

    // Dialect-C
    pub const C_CRYPT_OPEN: &str = "GHOST_DIC_C_CRYPT_OPEN";
    pub const C_CRYPT_CLOSE: &str = "GHOST_DIC_C_CRYPT_CLOSE";
    pub const C_STRIP_VARIANT_QUOTES: &str = "GHOST_DIC_C_STRIP_VARIANT_QUOTES";

    // Batch
    pub const BATCH_REPORT_PROGRESS: &str = "GHOST_DIC_BATCH_REPORT_PROGRESS";
    pub const BATCH_LOG_TIMINGS: &str = "GHOST_DIC_BATCH_LOG_TIMINGS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "GHOST_DIC_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "GHOST_DIC_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "GHOST_DIC_LOGGING_MIN_LEVEL";
}
