//! # Content Sniffer
//!
//! Guesses the MIME type and extension of a base64 payload without any
//! external metadata.
//!
//! ## Detection Strategy
//!
//! Rules are tried in strict priority order and the first one that matches
//! wins:
//!
//! 1. A declared `data:<mime>;base64,` prefix is trusted verbatim
//! 2. Binary signatures, matched on the base64 text itself
//! 3. Text heuristics on the decoded content (JSON, XML, HTML, JavaScript,
//!    plain text)
//! 4. `application/octet-stream` / `bin`
//!
//! Signatures are stored as the base64 characters their magic bytes encode
//! to, so a payload can be classified from its first few characters without
//! decoding it.

use crate::base64_utils::{clean, declared_mime, decode_payload, encode};
use crate::schema::TypeGuess;
use tracing::debug;

/// One row of the signature table: a base64 prefix and what it means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub prefix: &'static str,
    pub mime: &'static str,
    pub ext: &'static str,
}

const fn sig(prefix: &'static str, mime: &'static str, ext: &'static str) -> Signature {
    Signature { prefix, mime, ext }
}

/// Ordered signature table. Entries are tested top to bottom.
pub const SIGNATURES: &[Signature] = &[
    sig("JVBERi0", "application/pdf", "pdf"),
    sig("iVBORw0KGgo", "image/png", "png"),
    sig("/9j/", "image/jpeg", "jpg"),
    sig("R0lGODdh", "image/gif", "gif"),
    sig("R0lGODlh", "image/gif", "gif"),
    sig("UEsDBBQA", "application/zip", "zip"),
    sig("UEsFBgA", "application/zip", "zip"),
    sig("PK", "application/zip", "zip"),
    sig("AAAA", "video/mp4", "mp4"),
    sig("GkXfo", "video/webm", "webm"),
    sig("Qk0", "image/bmp", "bmp"),
    sig("SUkqAA", "image/tiff", "tiff"),
    sig("TU0AKg", "image/tiff", "tiff"),
    sig("UklGR", "image/webp", "webp"),
];

/// Derives a file extension from a MIME type: the subtype with everything
/// outside `[A-Za-z0-9]` removed, or `"bin"` when nothing is left.
pub fn extension_from_mime(mime: &str) -> String {
    let subtype = mime.split_once('/').map_or("", |(_, sub)| sub);
    let ext: String = subtype
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if ext.is_empty() { "bin".into() } else { ext }
}

/// Returns the first signature whose prefix starts `payload`.
pub fn match_signature(payload: &str) -> Option<&'static Signature> {
    SIGNATURES.iter().find(|s| payload.starts_with(s.prefix))
}

/// Reads decoded bytes as text the way a browser `atob` binary string would
/// be read, preferring UTF-8 when the bytes are valid UTF-8.
fn bytes_to_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
    }
}

/// Printable ASCII or ASCII whitespace. Latin-1 controls such as 0x85 and
/// 0xA0 do not count.
fn is_printable_text(text: &str) -> bool {
    text.chars()
        .all(|c| (' '..='~').contains(&c) || c.is_ascii_whitespace() || c == '\x0b')
}

/// Classifies decoded text. Returns `None` when no text rule matches.
pub fn sniff_text(text: &str) -> Option<TypeGuess> {
    let trimmed = text.trim();

    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
    {
        return Some(TypeGuess::new("application/json", "json"));
    }
    // `<` alone is enough, so markup documents land here before the html rule
    if trimmed.starts_with("<?xml") || trimmed.starts_with('<') {
        return Some(TypeGuess::new("application/xml", "xml"));
    }
    if trimmed.starts_with("<!DOCTYPE html") || trimmed.to_ascii_lowercase().contains("<html") {
        return Some(TypeGuess::new("text/html", "html"));
    }
    if trimmed.contains("function") || trimmed.contains("const ") || trimmed.contains("let ") {
        return Some(TypeGuess::new("application/javascript", "js"));
    }
    // untrimmed: `trim` would also drop Unicode whitespace like U+0085
    if is_printable_text(text) {
        return Some(TypeGuess::new("text/plain", "txt"));
    }
    None
}

/// Classifies an already cleaned payload: signatures, then text heuristics,
/// then the octet-stream default.
fn detect_payload(payload: &str) -> TypeGuess {
    if let Some(sig) = match_signature(payload) {
        return TypeGuess::new(sig.mime, sig.ext);
    }

    let Some(bytes) = decode_payload(payload) else {
        debug!(len = payload.len(), "payload is not decodable; using default type");
        return TypeGuess::octet_stream();
    };

    sniff_text(&bytes_to_text(bytes)).unwrap_or_else(TypeGuess::octet_stream)
}

/// Detects the content type of `input`.
///
/// `input` may be raw pasted text or an already cleaned payload; a declared
/// `data:` URI type takes precedence over anything found in the content.
/// Total: every input, including garbage, yields a guess.
///
/// ```ignore
/// assert_eq!(detect("JVBERi0xLjQK").mime, "application/pdf");
/// assert_eq!(detect("eyJhIjoxfQ==").ext, "json");
/// ```
pub fn detect(input: &str) -> TypeGuess {
    if let Some(mime) = declared_mime(input) {
        debug!(mime = %mime, "using declared data URI type");
        let ext = extension_from_mime(&mime);
        return TypeGuess { mime, ext };
    }
    detect_payload(&clean(input))
}

/// Detects the content type of raw bytes, e.g. an uploaded file.
pub fn detect_bytes(bytes: &[u8]) -> TypeGuess {
    detect_payload(&encode(bytes))
}
