use crate::schema::TypeGuess;

/// Converts points to millimeters.
///
/// # Arguments
///
/// * `pt` - The value in points to convert
///
/// # Returns
///
/// The equivalent value in millimeters. Conversion is based on:
/// - 1 point = 1/72 inch
/// - 1 inch = 25.4 mm
///
/// # Example
///
/// ```ignore
/// let mm = mm_from_pt(72.0); // 72 points = 1 inch = 25.4 mm
/// ```
pub fn mm_from_pt(pt: f64) -> f64 {
    // 1 point = 1/72 inch; 1 inch = 25.4 mm
    pt / 72.0 * 25.4
}

/// Stem used when the caller does not provide one.
pub const DEFAULT_STEM: &str = "decoded";

/// Builds a download filename from a stem and an extension.
///
/// The stem is reduced to its last path component and stripped of control
/// characters and characters that browsers reject in download names. An
/// empty result falls back to [`DEFAULT_STEM`]; an empty extension to `bin`.
///
/// # Example
///
/// ```ignore
/// assert_eq!(synthesize_filename(Some("../report"), "pdf"), "report.pdf");
/// assert_eq!(synthesize_filename(None, "png"), "decoded.png");
/// ```
pub fn synthesize_filename(stem: Option<&str>, ext: &str) -> String {
    let stem = stem
        .and_then(|s| s.rsplit(['/', '\\']).next())
        .map(|s| {
            s.chars()
                .filter(|c| {
                    !c.is_control() && !matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|')
                })
                .collect::<String>()
        })
        .map(|s| s.trim_matches(|c: char| c == '.' || c.is_whitespace()).to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_STEM.into());
    let ext = if ext.is_empty() { "bin" } else { ext };
    format!("{}.{}", stem, ext)
}

/// Guesses a type from a filename extension.
///
/// Used on the encode path, where the browser hands over a file name but the
/// content has not been sniffed yet. Returns `None` for unknown extensions.
///
/// # Detection Strategy
///
/// Case-insensitive match on the text after the last `.`; covers the types
/// the previewer can render plus a handful of common download-only types.
pub fn mime_from_filename(filename: &str) -> Option<TypeGuess> {
    let (_, ext) = filename.rsplit_once('.')?;
    let lower = ext.to_lowercase();
    let mime = match lower.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "json" => "application/json",
        "xml" => "application/xml",
        "html" | "htm" => "text/html",
        "js" => "application/javascript",
        "txt" | "md" | "markdown" | "csv" => "text/plain",
        "zip" => "application/zip",
        _ => return None,
    };
    Some(TypeGuess::new(mime, lower))
}
