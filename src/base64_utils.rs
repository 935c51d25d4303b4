//! # Base64 Normalizer
//!
//! Turns pasted or typed text into a canonical base64 payload and checks
//! its shape. Pasted text may be wrapped at arbitrary column widths and may
//! carry a `data:<mime>;base64,` prefix copied from a browser; both are
//! stripped before anything else looks at the payload.
//!
//! The grammar check is purely lexical: `[A-Za-z0-9+/]*` followed by at most
//! two `=` and a total length that is a multiple of 4.

use crate::schema::PreviewError;
use base64::Engine;
use base64::alphabet;
use base64::engine::DecodePaddingMode;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};

const DATA_SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// Decodes the way a browser `atob` does: non-zero trailing bits and missing
/// padding are accepted.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Splits a `data:` URI into its header (between `data:` and the first
/// comma) and the payload after the comma.
///
/// Only base64 data URIs are recognized: the header must end with `;base64`
/// and carry a non-empty MIME type.
fn split_data_uri(input: &str) -> Option<(&str, &str)> {
    let scheme = input.get(..DATA_SCHEME.len())?;
    if !scheme.eq_ignore_ascii_case(DATA_SCHEME) {
        return None;
    }
    let rest = &input[DATA_SCHEME.len()..];
    let comma = rest.find(',')?;
    let header = &rest[..comma];
    if !header.to_ascii_lowercase().ends_with(BASE64_MARKER) {
        return None;
    }
    let mime = header.split(';').next().unwrap_or_default();
    if mime.is_empty() {
        return None;
    }
    Some((mime, &rest[comma + 1..]))
}

fn strip_whitespace(input: &str) -> String {
    input.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Returns the MIME type declared by a `data:<mime>;base64,` prefix.
///
/// ```ignore
/// assert_eq!(declared_mime("data:image/png;base64,iVBOR").as_deref(), Some("image/png"));
/// assert_eq!(declared_mime("iVBOR"), None);
/// ```
pub fn declared_mime(input: &str) -> Option<String> {
    let compact = strip_whitespace(input);
    split_data_uri(&compact).map(|(mime, _)| mime.to_string())
}

/// Cleans raw text into a base64 payload.
///
/// Removes every whitespace character (which also trims the input) and
/// keeps only the part after the comma of a base64 data URI. Never fails.
///
/// Idempotent: a payload that itself starts with another data URI prefix is
/// unwrapped until none is left, so cleaning twice changes nothing.
pub fn clean(input: &str) -> String {
    let compact = strip_whitespace(input);
    let mut payload = compact.as_str();
    while let Some((_, rest)) = split_data_uri(payload) {
        payload = rest;
    }
    payload.to_string()
}

/// Checks the lexical base64 grammar on an already cleaned payload.
fn matches_grammar(payload: &str) -> bool {
    let bytes = payload.as_bytes();
    let body_len = bytes
        .iter()
        .rposition(|b| *b != b'=')
        .map_or(0, |idx| idx + 1);
    let padding = bytes.len() - body_len;
    padding <= 2
        && bytes[..body_len]
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'+' || *b == b'/')
}

/// Checks whether `input` cleans to a well-formed base64 payload.
///
/// Empty input (before or after cleaning) is invalid. Padding is only
/// checked lexically: `=` may appear solely in the last two positions.
pub fn is_valid(input: &str) -> bool {
    if input.is_empty() {
        return false;
    }
    let cleaned = clean(input);
    !cleaned.is_empty() && cleaned.len() % 4 == 0 && matches_grammar(&cleaned)
}

/// Validates, cleans and decodes `input` with the standard alphabet.
///
/// Decoding is as lenient as `atob`: `SGVsbG9=` decodes to `Hello`.
pub fn decode(input: &str) -> Result<Vec<u8>, PreviewError> {
    if !is_valid(input) {
        return Err(PreviewError::InvalidBase64);
    }
    LENIENT
        .decode(clean(input))
        .map_err(|e| PreviewError::Decode(e.to_string()))
}

/// Decodes an already cleaned payload without re-validating it.
pub(crate) fn decode_payload(payload: &str) -> Option<Vec<u8>> {
    LENIENT.decode(payload).ok()
}

/// Encodes bytes with the standard, padded alphabet.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Builds a `data:<mime>;base64,<payload>` URI.
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, encode(bytes))
}

/// Wraps an already encoded payload in a `data:` URI.
pub(crate) fn payload_to_data_uri(mime: &str, payload: &str) -> String {
    format!("data:{};base64,{}", mime, payload)
}
