//! # Preview Planning
//!
//! Ties the normalizer and the sniffer together into the two paths the
//! host page drives:
//!
//! - **decode**: pasted base64 -> type guess, size, filename and whatever
//!   the chosen preview surface needs (text, archive listing, data URI)
//! - **encode**: uploaded bytes -> base64 payload and data URI
//!
//! Rendering itself (image tags, the PDF canvas, media players) stays in the
//! host page.

use crate::base64_utils::{self, clean, declared_mime, encode, is_valid, payload_to_data_uri};
use crate::file_utils::{mime_from_filename, synthesize_filename};
use crate::schema::{
    ArchiveEntry, EncodedDocument, PayloadStats, PreviewError, PreviewKind, PreviewOptions,
    PreviewResult, TextPreview,
};
use crate::size_utils::{decoded_len, format_size};
use crate::sniffer::{detect, detect_bytes};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::Event;
use std::io::Cursor;
use tracing::debug;

impl PreviewKind {
    /// Picks the preview surface for a MIME type.
    pub fn from_mime(mime: &str) -> Self {
        let lower = mime.to_ascii_lowercase();
        match lower.as_str() {
            "application/pdf" => PreviewKind::Pdf,
            "application/json" => PreviewKind::Json,
            "application/xml" | "text/xml" => PreviewKind::Xml,
            "application/javascript" => PreviewKind::Text,
            m if m.starts_with("image/") => PreviewKind::Image,
            m if m.starts_with("audio/") => PreviewKind::Audio,
            m if m.starts_with("video/") => PreviewKind::Video,
            m if m.starts_with("text/") => PreviewKind::Text,
            _ => PreviewKind::Download,
        }
    }

    pub fn is_textual(self) -> bool {
        matches!(self, PreviewKind::Json | PreviewKind::Xml | PreviewKind::Text)
    }
}

fn pretty_json(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

/// Re-indents XML with two spaces. Returns `None` if the text is not
/// well-formed enough for the reader.
fn pretty_xml(text: &str) -> Option<String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(event) => {
                if let Err(err) = writer.write_event(event) {
                    debug!(error = %err, "xml re-indent failed");
                    return None;
                }
            }
            Err(err) => {
                debug!(error = %err, "xml is not well-formed; showing raw text");
                return None;
            }
        }
    }

    String::from_utf8(writer.into_inner().into_inner()).ok()
}

/// Cuts `text` to at most `max_chars` characters.
fn truncate_chars(text: String, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => (text[..idx].to_string(), true),
        None => (text, false),
    }
}

/// Builds the text shown in the text/JSON/XML pane.
///
/// JSON is pretty printed and XML re-indented when `pretty_print` is set;
/// content that fails to parse is shown as-is. Non-UTF-8 bytes are replaced.
pub fn format_text(bytes: &[u8], kind: PreviewKind, options: &PreviewOptions) -> TextPreview {
    let raw = String::from_utf8_lossy(bytes).into_owned();

    let pretty = if options.pretty_print {
        match kind {
            PreviewKind::Json => pretty_json(raw.trim()),
            PreviewKind::Xml => pretty_xml(raw.trim()),
            _ => None,
        }
    } else {
        None
    };

    let formatted = pretty.is_some();
    let (content, truncated) = truncate_chars(pretty.unwrap_or(raw), options.max_text_chars());
    TextPreview {
        content,
        truncated,
        formatted,
    }
}

/// Lists the entries of a zip archive without extracting anything.
pub fn list_archive(bytes: &[u8]) -> Result<Vec<ArchiveEntry>, PreviewError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| PreviewError::Archive(e.to_string()))?;

    let mut entries = Vec::with_capacity(archive.len());
    for idx in 0..archive.len() {
        let file = archive
            .by_index(idx)
            .map_err(|e| PreviewError::Archive(e.to_string()))?;
        entries.push(ArchiveEntry {
            name: file.name().to_string(),
            size: file.size(),
            is_dir: file.is_dir(),
        });
    }
    Ok(entries)
}

/// Validity and expected size of pasted text, without decoding it.
pub fn inspect_payload(input: &str) -> PayloadStats {
    let payload = clean(input);
    let valid = is_valid(input);
    let decoded_size = if valid { decoded_len(&payload) } else { 0 };
    PayloadStats {
        valid,
        payload_len: payload.len(),
        decoded_size,
        size_label: format_size(decoded_size),
        declared_mime: declared_mime(input),
    }
}

/// Decode path: classifies `input` and prepares everything needed to show
/// it.
///
/// # Errors
///
/// - [`PreviewError::InvalidBase64`] when `input` fails the grammar check
/// - [`PreviewError::Decode`] when it passes the grammar but cannot be
///   decoded
///
/// An unreadable zip archive is not an error: the listing is skipped and a
/// note is added.
pub fn build_preview(input: &str, options: &PreviewOptions) -> Result<PreviewResult, PreviewError> {
    let bytes = base64_utils::decode(input)?;
    let payload = clean(input);
    let guess = detect(input);
    let kind = PreviewKind::from_mime(&guess.mime);
    let mut notes = Vec::new();

    let text = if kind.is_textual() {
        let preview = format_text(&bytes, kind, options);
        if preview.truncated {
            notes.push(format!(
                "Preview truncated to {} characters",
                options.max_text_chars()
            ));
        }
        Some(preview)
    } else {
        None
    };

    let archive = if options.list_archives && guess.mime == "application/zip" {
        match list_archive(&bytes) {
            Ok(entries) => Some(entries),
            Err(err) => {
                notes.push(format!("Could not list archive: {}", err));
                None
            }
        }
    } else {
        None
    };

    debug!(mime = %guess.mime, size = bytes.len(), ?kind, "built preview");

    Ok(PreviewResult {
        filename: synthesize_filename(options.filename_stem.as_deref(), &guess.ext),
        data_uri: payload_to_data_uri(&guess.mime, &payload),
        size: bytes.len(),
        size_label: format_size(bytes.len()),
        kind,
        guess,
        text,
        archive,
        notes,
    })
}

/// Encode path: turns uploaded bytes into a base64 payload.
///
/// The type comes from the filename extension when it is known, otherwise
/// from sniffing the bytes.
pub fn encode_document(bytes: &[u8], filename: Option<&str>) -> EncodedDocument {
    let base64 = encode(bytes);
    let guess = filename
        .and_then(mime_from_filename)
        .unwrap_or_else(|| detect_bytes(bytes));
    EncodedDocument {
        data_uri: payload_to_data_uri(&guess.mime, &base64),
        size: bytes.len(),
        size_label: format_size(bytes.len()),
        guess,
        base64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base64_utils::to_data_uri;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn zip_bytes() -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let opts = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        writer.add_directory("docs/", opts).unwrap();
        writer.start_file("docs/readme.txt", opts).unwrap();
        writer.write_all(b"hello zip").unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn preview_kind_from_mime() {
        assert_eq!(PreviewKind::from_mime("image/png"), PreviewKind::Image);
        assert_eq!(PreviewKind::from_mime("application/pdf"), PreviewKind::Pdf);
        assert_eq!(PreviewKind::from_mime("audio/mpeg"), PreviewKind::Audio);
        assert_eq!(PreviewKind::from_mime("video/webm"), PreviewKind::Video);
        assert_eq!(PreviewKind::from_mime("application/json"), PreviewKind::Json);
        assert_eq!(PreviewKind::from_mime("text/xml"), PreviewKind::Xml);
        assert_eq!(PreviewKind::from_mime("text/html"), PreviewKind::Text);
        assert_eq!(PreviewKind::from_mime("application/javascript"), PreviewKind::Text);
        assert_eq!(PreviewKind::from_mime("application/zip"), PreviewKind::Download);
    }

    #[test]
    fn json_is_pretty_printed() {
        let preview = format_text(br#"{"a":[1,2]}"#, PreviewKind::Json, &PreviewOptions::default());
        assert!(preview.formatted);
        assert_eq!(preview.content, "{\n  \"a\": [\n    1,\n    2\n  ]\n}");
    }

    #[test]
    fn xml_is_indented() {
        let preview = format_text(b"<a><b>x</b></a>", PreviewKind::Xml, &PreviewOptions::default());
        assert!(preview.formatted);
        assert_eq!(preview.content, "<a>\n  <b>x</b>\n</a>");
    }

    #[test]
    fn malformed_markup_is_shown_raw() {
        let preview = format_text(b"<a><b></a>", PreviewKind::Xml, &PreviewOptions::default());
        assert!(!preview.formatted);
        assert_eq!(preview.content, "<a><b></a>");
    }

    #[test]
    fn pretty_print_can_be_disabled() {
        let opts = PreviewOptions {
            pretty_print: false,
            ..Default::default()
        };
        let preview = format_text(br#"{"a":1}"#, PreviewKind::Json, &opts);
        assert!(!preview.formatted);
        assert_eq!(preview.content, r#"{"a":1}"#);
    }

    #[test]
    fn long_text_is_truncated_on_char_boundary() {
        let opts = PreviewOptions {
            max_text_chars: Some(3),
            ..Default::default()
        };
        let preview = format_text("héllo".as_bytes(), PreviewKind::Text, &opts);
        assert!(preview.truncated);
        assert_eq!(preview.content, "hél");
    }

    #[test]
    fn archive_listing() {
        let entries = list_archive(&zip_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_dir);
        assert_eq!(entries[1].name, "docs/readme.txt");
        assert_eq!(entries[1].size, 9);
        assert!(list_archive(b"PK not really").is_err());
    }

    #[test]
    fn inspect_payload_reports_sizes() {
        let stats = inspect_payload("data:text/plain;base64,SGVs\nbG8=");
        assert!(stats.valid);
        assert_eq!(stats.payload_len, 8);
        assert_eq!(stats.decoded_size, 5);
        assert_eq!(stats.size_label, "5 Bytes");
        assert_eq!(stats.declared_mime.as_deref(), Some("text/plain"));

        let stats = inspect_payload("SGV");
        assert!(!stats.valid);
        assert_eq!(stats.decoded_size, 0);
        assert_eq!(stats.size_label, "0 Bytes");
    }

    #[test]
    fn build_preview_for_json() {
        let input = encode(br#"{"name":"demo"}"#);
        let result = build_preview(&input, &PreviewOptions::default()).unwrap();
        assert_eq!(result.guess.ext, "json");
        assert_eq!(result.kind, PreviewKind::Json);
        assert_eq!(result.filename, "decoded.json");
        assert_eq!(result.size, 15);
        assert_eq!(result.data_uri, format!("data:application/json;base64,{}", input));
        assert!(result.text.unwrap().formatted);
    }

    #[test]
    fn build_preview_for_zip() {
        let input = to_data_uri("application/zip", &zip_bytes());
        let opts = PreviewOptions {
            filename_stem: Some("bundle".into()),
            ..Default::default()
        };
        let result = build_preview(&input, &opts).unwrap();
        assert_eq!(result.kind, PreviewKind::Download);
        assert_eq!(result.filename, "bundle.zip");
        assert_eq!(result.archive.unwrap().len(), 2);
        assert!(result.text.is_none());
        assert!(result.notes.is_empty());
    }

    #[test]
    fn unreadable_archive_is_noted() {
        let input = to_data_uri("application/zip", b"not a zip at all");
        let result = build_preview(&input, &PreviewOptions::default()).unwrap();
        assert!(result.archive.is_none());
        assert_eq!(result.notes.len(), 1);
    }

    #[test]
    fn build_preview_keeps_declared_type() {
        let result = build_preview(
            "data:audio/mpeg;base64,SUQzBAAAAAAAI1RTU0U=",
            &PreviewOptions::default(),
        )
        .unwrap();
        assert_eq!(result.kind, PreviewKind::Audio);
        assert_eq!(result.filename, "decoded.mpeg");
        assert!(result.data_uri.starts_with("data:audio/mpeg;base64,SUQz"));
    }

    #[test]
    fn build_preview_rejects_invalid_input() {
        let err = build_preview("###", &PreviewOptions::default()).unwrap_err();
        assert_eq!(err, PreviewError::InvalidBase64);
    }

    #[test]
    fn encode_prefers_filename_then_sniffs() {
        let doc = encode_document(b"%PDF-1.7", Some("scan.pdf"));
        assert_eq!(doc.guess.mime, "application/pdf");
        assert_eq!(doc.base64, "JVBERi0xLjc=");
        assert_eq!(doc.data_uri, "data:application/pdf;base64,JVBERi0xLjc=");

        let doc = encode_document(b"just words", None);
        assert_eq!(doc.guess.mime, "text/plain");
        assert_eq!(doc.size_label, "10 Bytes");
    }
}
