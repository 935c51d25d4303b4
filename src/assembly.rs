//! # Assembly Module
//!
//! This module provides the WASM-exported functions of the previewer. It is
//! the bridge between the host page's JavaScript and the Rust logic.
//!
//! ## Overview
//!
//! - `clean_base64` / `is_valid_base64` / `inspect_base64`: input
//!   normalization and live size feedback
//! - `detect_type`: content sniffing, returns `{mime, ext}`
//! - `preview_base64`: the full decode path
//! - `encode_document`: the upload path
//! - `to_document_space` / `describe_pointer`: PDF point picking
//!
//! Structured results are returned as JSON strings wrapped in a `JsValue`;
//! failures come back as `{"error": "..."}` objects. Each export delegates
//! to a `*_json` function that does the work and can be exercised without a
//! JavaScript host.

use crate::base64_utils::{clean, is_valid};
use crate::preview::{build_preview, encode_document as encode_bytes, inspect_payload};
use crate::schema::PreviewOptions;
use crate::sniffer::detect;
use crate::viewport::{PageSize, PointerSample, ViewportTransform, describe_pointer as describe};
use serde::Serialize;
use serde_json::json;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::wasm_bindgen;

fn error_json(message: impl std::fmt::Display) -> String {
    json!({ "error": message.to_string() }).to_string()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| error_json("serialization failed"))
}

/// Wraps a JSON response, echoing error responses to the browser console.
fn respond(body: String) -> JsValue {
    if body.starts_with("{\"error\"") {
        web_sys::console::warn_1(&JsValue::from_str(&body));
    }
    JsValue::from_str(&body)
}

fn parse_transform(transform_json: &str) -> Result<ViewportTransform, String> {
    serde_json::from_str(transform_json).map_err(|e| format!("invalid viewport transform: {}", e))
}

pub fn detect_type_json(input: &str) -> String {
    to_json(&detect(input))
}

pub fn inspect_json(input: &str) -> String {
    to_json(&inspect_payload(input))
}

pub fn preview_json(input: &str, options_json: Option<&str>) -> String {
    let options = PreviewOptions::from_json(options_json);
    match build_preview(input, &options) {
        Ok(result) => to_json(&result),
        Err(err) => error_json(err),
    }
}

pub fn encode_json(bytes: &[u8], filename: Option<&str>) -> String {
    to_json(&encode_bytes(bytes, filename))
}

pub fn document_point_json(pixel_x: f64, pixel_y: f64, transform_json: &str) -> String {
    match parse_transform(transform_json) {
        Ok(t) => to_json(&t.to_document_space(pixel_x, pixel_y)),
        Err(msg) => error_json(msg),
    }
}

/// `page_size_json` is optional; `{"width": .., "height": ..}` in points.
pub fn pointer_report_json(
    pixel_x: f64,
    pixel_y: f64,
    page: usize,
    transform_json: &str,
    page_size_json: Option<&str>,
) -> String {
    let transform = match parse_transform(transform_json) {
        Ok(t) => t,
        Err(msg) => return error_json(msg),
    };
    let page_size = match page_size_json.map(serde_json::from_str::<PageSize>) {
        Some(Ok(size)) => Some(size),
        Some(Err(e)) => return error_json(format!("invalid page size: {}", e)),
        None => None,
    };
    let sample = PointerSample {
        pixel_x,
        pixel_y,
        page,
    };
    to_json(&describe(sample, &transform, page_size))
}

/// Cleans pasted text into a bare base64 payload.
#[wasm_bindgen]
pub fn clean_base64(input: &str) -> String {
    clean(input)
}

/// Checks whether pasted text is well-formed base64.
#[wasm_bindgen]
pub fn is_valid_base64(input: &str) -> bool {
    is_valid(input)
}

/// Reports validity and decoded size of pasted text without decoding it.
#[wasm_bindgen]
pub fn inspect_base64(input: &str) -> JsValue {
    respond(inspect_json(input))
}

/// Guesses the content type of pasted base64 text.
///
/// # Example
///
/// ```javascript
/// const guess = JSON.parse(detect_type(text));
/// console.log(guess.mime, guess.ext);
/// ```
#[wasm_bindgen]
pub fn detect_type(input: &str) -> JsValue {
    respond(detect_type_json(input))
}

/// Decodes pasted base64 text and returns everything the preview needs.
///
/// # Parameters
///
/// * `input` - Pasted text, optionally a `data:` URI.
/// * `options_json` - Optional JSON matching `PreviewOptions`. Invalid JSON
///   falls back to the defaults.
///
/// # Example
///
/// ```javascript
/// const result = JSON.parse(preview_base64(text, JSON.stringify({ max_text_chars: 5000 })));
/// if (result.error) {
///     showError(result.error);
/// } else if (result.kind === "pdf") {
///     openPdf(result.data_uri);
/// }
/// ```
#[wasm_bindgen]
pub fn preview_base64(input: &str, options_json: Option<String>) -> JsValue {
    respond(preview_json(input, options_json.as_deref()))
}

/// Encodes uploaded file bytes to base64 and a data URI.
#[wasm_bindgen]
pub fn encode_document(bytes: &[u8], filename: Option<String>) -> JsValue {
    respond(encode_json(bytes, filename.as_deref()))
}

/// Maps a canvas pixel position to PDF page coordinates.
///
/// `transform_json` is `{a, b, c, d, e, f, scale, width, height}` built from
/// the renderer's viewport for the page under the pointer. Returns
/// `{docX, docY, approximate}`.
#[wasm_bindgen]
pub fn to_document_space(pixel_x: f64, pixel_y: f64, transform_json: &str) -> JsValue {
    respond(document_point_json(pixel_x, pixel_y, transform_json))
}

/// Like `to_document_space`, plus edge offsets, percentages and millimetres.
#[wasm_bindgen]
pub fn describe_pointer(
    pixel_x: f64,
    pixel_y: f64,
    page: usize,
    transform_json: &str,
    page_size_json: Option<String>,
) -> JsValue {
    respond(pointer_report_json(
        pixel_x,
        pixel_y,
        page,
        transform_json,
        page_size_json.as_deref(),
    ))
}
