//! Data structures and types for document preview.
//!
//! This module defines the core types shared by the normalizer, the sniffer,
//! the viewport math and the wasm layer: error types, configuration options
//! and result structures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while decoding or previewing a document.
///
/// The core operations (`clean`, `is_valid`, `detect`, `to_document_space`)
/// are total and never produce these; they come from the decode path,
/// navigation and archive inspection.
#[derive(Debug, Error, PartialEq)]
pub enum PreviewError {
    /// The input is empty or does not match the base64 grammar.
    #[error("Invalid base64 input")]
    InvalidBase64,
    /// The payload matched the grammar but could not be decoded.
    #[error("base64 decode failed: {0}")]
    Decode(String),
    /// A document with no pages cannot be navigated.
    #[error("Document has no pages")]
    EmptyDocument,
    /// The requested page does not exist.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },
    /// Zoom factors must be finite and strictly positive.
    #[error("Invalid zoom factor: {0}")]
    InvalidZoom(f64),
    /// The payload looked like a zip archive but could not be read.
    #[error("Archive error: {0}")]
    Archive(String),
    /// The options JSON could not be parsed.
    #[error("Invalid options: {0}")]
    Options(String),
}

/// Best guess of a payload's content type.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TypeGuess {
    /// MIME type, e.g. `application/pdf`.
    pub mime: String,
    /// Short file extension without the dot, e.g. `pdf`.
    pub ext: String,
}

impl TypeGuess {
    pub fn new(mime: impl Into<String>, ext: impl Into<String>) -> Self {
        Self {
            mime: mime.into(),
            ext: ext.into(),
        }
    }

    /// The `application/octet-stream` / `bin` fallback.
    pub fn octet_stream() -> Self {
        Self::new("application/octet-stream", "bin")
    }
}

/// How the host page should present a decoded document.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PreviewKind {
    Image,
    Pdf,
    Audio,
    Video,
    Json,
    Xml,
    Text,
    /// No inline preview; offer a download instead.
    Download,
}

/// Text shown in the text/JSON/XML preview pane.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TextPreview {
    pub content: String,
    /// `true` when `content` was cut at `max_text_chars`.
    pub truncated: bool,
    /// `true` when the content was re-formatted (pretty JSON, indented XML).
    pub formatted: bool,
}

/// One entry of a zip archive listing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ArchiveEntry {
    pub name: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    pub is_dir: bool,
}

/// Everything the host page needs to render a decoded payload.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PreviewResult {
    pub guess: TypeGuess,
    pub kind: PreviewKind,
    /// Decoded size in bytes.
    pub size: usize,
    /// Human readable size, e.g. `"1.5 KB"`.
    pub size_label: String,
    /// Suggested download filename.
    pub filename: String,
    /// `data:` URI for image/pdf/audio/video surfaces and downloads.
    pub data_uri: String,
    pub text: Option<TextPreview>,
    pub archive: Option<Vec<ArchiveEntry>>,
    /// Textual notes about decisions taken while building the preview.
    pub notes: Vec<String>,
}

/// Quick facts about pasted text, shown while the user is still typing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PayloadStats {
    pub valid: bool,
    /// Length of the cleaned payload in characters.
    pub payload_len: usize,
    /// Size the payload decodes to; `0` when invalid.
    pub decoded_size: usize,
    pub size_label: String,
    /// MIME type declared by a `data:` prefix, if any.
    pub declared_mime: Option<String>,
}

/// Result of encoding an uploaded file to base64.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EncodedDocument {
    pub guess: TypeGuess,
    pub base64: String,
    pub data_uri: String,
    pub size: usize,
    pub size_label: String,
}

/// Configuration options for customizing preview behavior.
///
/// All fields are optional. When not provided, sensible defaults are used.
/// This structure is deserialized from JSON so it can be passed straight
/// from JavaScript.
///
/// # Examples
///
/// Using defaults:
/// ```json
/// {}
/// ```
///
/// Shorter text previews and a custom download name:
/// ```json
/// { "max_text_chars": 5000, "filename_stem": "invoice" }
/// ```
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct PreviewOptions {
    /// Maximum number of characters shown in a text preview.
    pub max_text_chars: Option<usize>,
    /// Pretty print JSON and indent XML previews. Defaults to `true`.
    pub pretty_print: bool,
    /// Stem of the suggested download filename. Defaults to `"decoded"`.
    pub filename_stem: Option<String>,
    /// Smallest zoom factor the PDF viewer allows.
    pub min_zoom: Option<f64>,
    /// Largest zoom factor the PDF viewer allows.
    pub max_zoom: Option<f64>,
    /// Amount added or removed by one zoom step.
    pub zoom_step: Option<f64>,
    /// List the entries of zip payloads. Defaults to `true`.
    pub list_archives: bool,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            max_text_chars: None,
            pretty_print: true,
            filename_stem: None,
            min_zoom: None,
            max_zoom: None,
            zoom_step: None,
            list_archives: true,
        }
    }
}

pub const DEFAULT_MAX_TEXT_CHARS: usize = 100_000;
pub const DEFAULT_MIN_ZOOM: f64 = 0.25;
pub const DEFAULT_MAX_ZOOM: f64 = 5.0;
pub const DEFAULT_ZOOM_STEP: f64 = 0.25;

impl PreviewOptions {
    /// Parses options from an optional JSON string.
    ///
    /// Missing JSON yields the defaults; malformed JSON is logged and also
    /// yields the defaults, so a bad options blob never blocks a preview.
    pub fn from_json(options_json: Option<&str>) -> Self {
        match options_json {
            Some(s) => Self::try_from_json(s).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "ignoring preview options");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn try_from_json(s: &str) -> Result<Self, PreviewError> {
        serde_json::from_str(s).map_err(|e| PreviewError::Options(e.to_string()))
    }

    pub fn max_text_chars(&self) -> usize {
        self.max_text_chars.unwrap_or(DEFAULT_MAX_TEXT_CHARS)
    }

    /// Returns `(min, max, step)` for the zoom control, sanitised so that
    /// `0 < min <= max` and `step > 0`.
    pub fn zoom_limits(&self) -> (f64, f64, f64) {
        let positive = |v: Option<f64>, default: f64| match v {
            Some(v) if v.is_finite() && v > 0.0 => v,
            _ => default,
        };
        let min = positive(self.min_zoom, DEFAULT_MIN_ZOOM);
        let max = positive(self.max_zoom, DEFAULT_MAX_ZOOM).max(min);
        let step = positive(self.zoom_step, DEFAULT_ZOOM_STEP);
        (min, max, step)
    }
}
