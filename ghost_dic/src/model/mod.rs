//! Normalized dialogue model shared by every dialect engine
//!
//! All types are created fresh per parse call and serialize with camelCase
//! field names, which is the shape the transport layer forwards to viewers.

pub mod diagnostic;
pub mod dialogue;
pub mod token;

pub use diagnostic::{BatchParseResult, DiagnosticLevel, GhostMeta, ParseDiagnostic, ShioriType};
pub use dialogue::{is_visible, DicFunction, Dialogue};
pub use token::{Token, TokenKind};
