//! Dialogue dictionary parsing for ghost scripts in three dialects
//!
//! `tokenize` splits one dialogue into inline tokens; `batch::parse_batch`
//! runs a dialect engine over a set of decoded files; `protocol` wraps both
//! behind the request/response messages of the transport boundary.

// Internal modules
pub mod batch;
pub mod config;
pub mod dialect_a;
pub mod dialect_b;
pub mod dialect_c;
pub mod inline;
#[macro_use]
pub mod logging;
pub mod model;
pub mod protocol;
pub mod utils;

// Re-export key types for library consumers
pub use batch::{parse_batch, parse_batch_with_progress, BatchError, Dialect, SourceFile};
pub use inline::tokenize;
pub use model::{
    is_visible, BatchParseResult, DiagnosticLevel, DicFunction, Dialogue, GhostMeta,
    ParseDiagnostic, ShioriType, Token, TokenKind,
};
pub use protocol::{handle_request, Request, Response};
