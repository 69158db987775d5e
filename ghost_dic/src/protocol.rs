//! Transport boundary: request/response message shapes and the three
//! batch request handlers
//!
//! Malformed messages are rejected here with a `ProtocolError` and never
//! reach an engine. File contents arrive as bytes and pass through a
//! `TextDecoder` before parsing.

use crate::batch::{self, Dialect, SourceFile};
use crate::logging::{codes, Code};
use crate::model::BatchParseResult;
use serde::{Deserialize, Serialize};

const REQUEST_TYPES: [&str; 3] = ["parse-A-batch", "parse-B-batch", "parse-C-batch"];

// ============================================================================
// MESSAGE SHAPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFile {
    pub file_path: String,
    pub file_content_bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    #[serde(rename = "parse-A-batch")]
    ParseABatch { files: Vec<RequestFile> },
    #[serde(rename = "parse-B-batch")]
    ParseBBatch { files: Vec<RequestFile> },
    #[serde(rename = "parse-C-batch")]
    ParseCBatch { files: Vec<RequestFile> },
}

impl Request {
    pub fn dialect(&self) -> Dialect {
        match self {
            Request::ParseABatch { .. } => Dialect::A,
            Request::ParseBBatch { .. } => Dialect::B,
            Request::ParseCBatch { .. } => Dialect::C,
        }
    }

    pub fn into_files(self) -> Vec<RequestFile> {
        match self {
            Request::ParseABatch { files }
            | Request::ParseBBatch { files }
            | Request::ParseCBatch { files } => files,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Response {
    Parsed { result: BatchParseResult },
    Error { message: String },
    Progress { percent: u8 },
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed request: {message}")]
    MalformedRequest { message: String },

    #[error("Unknown request type: {type_name}")]
    UnknownRequestType { type_name: String },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to encode response: {message}")]
    ResponseEncoding { message: String },
}

impl ProtocolError {
    pub fn error_code(&self) -> Code {
        match self {
            ProtocolError::MalformedRequest { .. }
            | ProtocolError::UnknownRequestType { .. }
            | ProtocolError::Json(_) => codes::protocol::MALFORMED_REQUEST,
            ProtocolError::ResponseEncoding { .. } => codes::protocol::RESPONSE_ENCODING_FAILED,
        }
    }
}

// ============================================================================
// TEXT DECODING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    /// Name of the encoding that was applied
    pub encoding: &'static str,
}

/// Bytes-to-text conversion in front of the engines
pub trait TextDecoder {
    fn decode(&self, bytes: &[u8]) -> DecodedText;
}

/// UTF-8 with BOM removal; invalid sequences become U+FFFD
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8TextDecoder;

impl TextDecoder for Utf8TextDecoder {
    fn decode(&self, bytes: &[u8]) -> DecodedText {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        DecodedText {
            text: String::from_utf8_lossy(bytes).into_owned(),
            encoding: "utf-8",
        }
    }
}

// ============================================================================
// DECODE / ENCODE
// ============================================================================

pub fn decode_request(json: &str) -> Result<Request, ProtocolError> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    let type_name = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| ProtocolError::MalformedRequest {
            message: "missing string field 'type'".to_string(),
        })?;

    if !REQUEST_TYPES.contains(&type_name) {
        return Err(ProtocolError::UnknownRequestType {
            type_name: type_name.to_string(),
        });
    }

    serde_json::from_value(value).map_err(|e| ProtocolError::MalformedRequest {
        message: e.to_string(),
    })
}

pub fn encode_response(response: &Response) -> Result<String, ProtocolError> {
    serde_json::to_string(response).map_err(|e| ProtocolError::ResponseEncoding {
        message: e.to_string(),
    })
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Run one request: progress responses, then one `parsed`
pub fn handle_request(request: Request, decoder: &dyn TextDecoder, emit: &mut dyn FnMut(Response)) {
    let dialect = request.dialect();

    let files: Vec<SourceFile> = request
        .into_files()
        .into_iter()
        .map(|file| {
            let decoded = decoder.decode(&file.file_content_bytes);
            crate::log_debug!("Decoded file",
                "file" => file.file_path,
                "encoding" => decoded.encoding,
                "bytes" => file.file_content_bytes.len());
            SourceFile::new(file.file_path, decoded.text)
        })
        .collect();
    let file_count = files.len();

    let result = batch::parse_batch_with_progress(dialect, files, &mut |percent| {
        emit(Response::Progress { percent })
    });

    crate::log_success!(codes::success::REQUEST_HANDLED, "Request handled",
        "dialect" => dialect.shiori_type().as_str(),
        "files" => file_count,
        "functions" => result.functions.len(),
        "errors" => result.error_count());
    emit(Response::Parsed { result });
}

/// Decode a JSON request and handle it.
///
/// A malformed request never reaches an engine: the caller gets the
/// `ProtocolError` back and a single `error` response is emitted.
pub fn handle_json(
    json: &str,
    decoder: &dyn TextDecoder,
    emit: &mut dyn FnMut(Response),
) -> Result<(), ProtocolError> {
    let request = match decode_request(json) {
        Ok(request) => request,
        Err(error) => {
            crate::log_error!(error.error_code(), "Request rejected", "error" => error);
            emit(Response::Error {
                message: error.to_string(),
            });
            return Err(error);
        }
    };
    handle_request(request, decoder, emit);
    Ok(())
}
