//! Client-side base64 document previewer.
//!
//! Pasted or uploaded base64 is normalized, sniffed for its content type and
//! turned into whatever the host page needs to preview it. PDF previews get
//! page/zoom navigation and pointer to page coordinate mapping.
//!
//! The `#[wasm_bindgen]` exports live in [`assembly`]; everything else is
//! plain Rust.

pub mod assembly;
pub mod base64_utils;
pub mod file_utils;
pub mod navigation;
pub mod preview;
pub mod schema;
pub mod size_utils;
pub mod sniffer;
pub mod viewport;

pub use base64_utils::{clean, decode, encode, is_valid, to_data_uri};
pub use navigation::PageNavigator;
pub use preview::{build_preview, encode_document, format_text, inspect_payload, list_archive};
pub use schema::{PreviewError, PreviewKind, PreviewOptions, PreviewResult, TypeGuess};
pub use sniffer::{detect, detect_bytes};
pub use viewport::{
    DocumentPoint, EdgeOffsets, PagePercent, PageSize, PointerSample, ViewportTransform,
    describe_pointer, to_document_space,
};
