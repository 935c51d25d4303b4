//! # Viewport Coordinate Transform
//!
//! Maps pointer positions on a rendered PDF canvas back to the page's own
//! coordinate space.
//!
//! PDF pages use physical points with the origin at the bottom-left and the
//! y axis growing upward; canvas events report pixels from the top-left with
//! y growing downward. Pages may also be rotated or scaled unevenly, so the
//! renderer describes the mapping as a full affine transform
//!
//! ```text
//! pixel_x = a * x + c * y + e
//! pixel_y = b * x + d * y + f
//! ```
//!
//! and picking a point means inverting it.

use crate::file_utils::mm_from_pt;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Below this determinant the transform is treated as singular.
pub const DET_EPSILON: f64 = 1e-10;

/// Affine map from document space to canvas pixels, plus the viewport's
/// scale and pixel dimensions.
///
/// Owned by whoever renders the current page and rebuilt on every page or
/// zoom change.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ViewportTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
    pub scale: f64,
    /// Viewport width in pixels.
    #[serde(default)]
    pub width: f64,
    /// Viewport height in pixels.
    pub height: f64,
}

/// A position in document space (PDF points, bottom-left origin).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct DocumentPoint {
    #[serde(rename = "docX")]
    pub x: f64,
    #[serde(rename = "docY")]
    pub y: f64,
    /// Set when the transform was singular and the scale-only fallback was
    /// used.
    pub approximate: bool,
}

/// Page dimensions in document units.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// Distances from a point to each page edge.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct EdgeOffsets {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl EdgeOffsets {
    pub fn new(point: &DocumentPoint, page: PageSize) -> Self {
        Self {
            left: point.x,
            right: page.width - point.x,
            top: page.height - point.y,
            bottom: point.y,
        }
    }
}

/// Position as a percentage of the page width and height.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PagePercent {
    pub x: f64,
    pub y: f64,
}

impl PagePercent {
    pub fn new(point: &DocumentPoint, page: PageSize) -> Self {
        let pct = |v: f64, total: f64| if total > 0.0 { v / total * 100.0 } else { 0.0 };
        Self {
            x: pct(point.x, page.width),
            y: pct(point.y, page.height),
        }
    }
}

/// One pointer-move event on the PDF canvas.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub pixel_x: f64,
    pub pixel_y: f64,
    /// 1-based page number the pointer is over.
    pub page: usize,
}

/// Everything the coordinate readout shows for one pointer sample.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PointerReport {
    pub page: usize,
    pub pixel_x: f64,
    pub pixel_y: f64,
    pub point: DocumentPoint,
    pub page_size: PageSize,
    pub offsets: EdgeOffsets,
    pub percent: PagePercent,
    pub x_mm: f64,
    pub y_mm: f64,
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

impl ViewportTransform {
    /// Builds a transform from a pdf.js style `[a, b, c, d, e, f]` matrix.
    pub fn from_matrix(m: [f64; 6], scale: f64, width: f64, height: f64) -> Self {
        let [a, b, c, d, e, f] = m;
        Self {
            a,
            b,
            c,
            d,
            e,
            f,
            scale,
            width,
            height,
        }
    }

    /// Builds the viewport a renderer would use for a page of
    /// `page_width` x `page_height` points at `scale` and `rotation`
    /// degrees clockwise.
    ///
    /// Follows the pdf.js `PageViewport` construction for a `[0, 0, w, h]`
    /// view box. Rotation is normalised modulo 360 and snapped to the nearest
    /// quarter turn.
    pub fn for_page(page_width: f64, page_height: f64, scale: f64, rotation: i32) -> Self {
        let quarter = ((rotation.rem_euclid(360) + 45) / 90) % 4;
        let (ra, rb, rc, rd) = match quarter {
            1 => (0.0, 1.0, 1.0, 0.0),
            2 => (-1.0, 0.0, 0.0, 1.0),
            3 => (0.0, -1.0, -1.0, 0.0),
            _ => (1.0, 0.0, 0.0, -1.0),
        };
        let cx = page_width / 2.0;
        let cy = page_height / 2.0;

        let (offset_x, offset_y, width, height) = if ra == 0.0 {
            (cy * scale, cx * scale, page_height * scale, page_width * scale)
        } else {
            (cx * scale, cy * scale, page_width * scale, page_height * scale)
        };

        Self {
            a: ra * scale,
            b: rb * scale,
            c: rc * scale,
            d: rd * scale,
            e: offset_x - ra * scale * cx - rc * scale * cy,
            f: offset_y - rb * scale * cx - rd * scale * cy,
            scale,
            width: width.abs(),
            height: height.abs(),
        }
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// `true` when the transform cannot be inverted exactly.
    pub fn is_degenerate(&self) -> bool {
        let det = self.determinant();
        det.is_nan() || det.abs() < DET_EPSILON
    }

    /// Forward map: document point to canvas pixels.
    pub fn to_pixel_space(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Inverse map: canvas pixels to document point.
    ///
    /// A singular transform falls back to a scale-only inverse
    /// (`x = px / scale`, `y = (height - py) / scale`) and marks the point as
    /// approximate. Never fails; non-finite fallback components are reported
    /// as `0.0`.
    pub fn to_document_space(&self, pixel_x: f64, pixel_y: f64) -> DocumentPoint {
        if self.is_degenerate() {
            debug!(
                det = self.determinant(),
                scale = self.scale,
                "singular viewport transform; using scale-only inverse"
            );
            return DocumentPoint {
                x: finite_or_zero(pixel_x / self.scale),
                y: finite_or_zero((self.height - pixel_y) / self.scale),
                approximate: true,
            };
        }

        let det = self.determinant();
        let dx = pixel_x - self.e;
        let dy = pixel_y - self.f;
        DocumentPoint {
            x: (self.d * dx - self.c * dy) / det,
            y: (-self.b * dx + self.a * dy) / det,
            approximate: false,
        }
    }

    /// Page dimensions implied by the viewport size and scale.
    ///
    /// Quarter-turn rotations swap the viewport axes, so they are swapped
    /// back here. Zero scale yields a zero-sized page.
    pub fn page_size(&self) -> PageSize {
        if self.scale == 0.0 || !self.scale.is_finite() {
            return PageSize {
                width: 0.0,
                height: 0.0,
            };
        }
        let (w, h) = (self.width / self.scale, self.height / self.scale);
        if self.a.abs() < self.b.abs() {
            PageSize {
                width: h.abs(),
                height: w.abs(),
            }
        } else {
            PageSize {
                width: w.abs(),
                height: h.abs(),
            }
        }
    }
}

/// Converts a canvas pixel position to document space.
pub fn to_document_space(
    pixel_x: f64,
    pixel_y: f64,
    transform: &ViewportTransform,
) -> DocumentPoint {
    transform.to_document_space(pixel_x, pixel_y)
}

/// Converts a pointer sample and derives the values shown in the readout.
///
/// `page_size` defaults to the size implied by the viewport.
pub fn describe_pointer(
    sample: PointerSample,
    transform: &ViewportTransform,
    page_size: Option<PageSize>,
) -> PointerReport {
    let point = transform.to_document_space(sample.pixel_x, sample.pixel_y);
    let page_size = page_size.unwrap_or_else(|| transform.page_size());
    PointerReport {
        page: sample.page,
        pixel_x: sample.pixel_x,
        pixel_y: sample.pixel_y,
        point,
        page_size,
        offsets: EdgeOffsets::new(&point, page_size),
        percent: PagePercent::new(&point, page_size),
        x_mm: mm_from_pt(point.x),
        y_mm: mm_from_pt(point.y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LETTER: (f64, f64) = (612.0, 792.0);

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn unrotated_page_flips_y_axis() {
        let vp = ViewportTransform::for_page(LETTER.0, LETTER.1, 1.5, 0);
        assert_eq!((vp.width, vp.height), (918.0, 1188.0));
        // bottom-left page corner is the bottom-left canvas corner
        let (px, py) = vp.to_pixel_space(0.0, 0.0);
        assert!(close(px, 0.0) && close(py, 1188.0));

        let p = vp.to_document_space(150.0, 0.0);
        assert!(close(p.x, 100.0));
        assert!(close(p.y, 792.0));
        assert!(!p.approximate);
    }

    #[test]
    fn quarter_turn_rotations_round_trip() {
        for rotation in [0, 90, 180, 270, -90, 450] {
            let vp = ViewportTransform::for_page(LETTER.0, LETTER.1, 2.0, rotation);
            let (px, py) = vp.to_pixel_space(123.5, 456.25);
            assert!(px >= 0.0 && px <= vp.width + 1e-9, "rotation {rotation}");
            assert!(py >= 0.0 && py <= vp.height + 1e-9, "rotation {rotation}");
            let p = vp.to_document_space(px, py);
            assert!(close(p.x, 123.5) && close(p.y, 456.25), "rotation {rotation}");
        }
    }

    #[test]
    fn rotated_viewport_swaps_dimensions() {
        let vp = ViewportTransform::for_page(LETTER.0, LETTER.1, 1.0, 90);
        assert_eq!((vp.width, vp.height), (792.0, 612.0));
        assert_eq!(
            vp.page_size(),
            PageSize {
                width: 612.0,
                height: 792.0
            }
        );
    }

    #[test]
    fn general_affine_inverse() {
        let vp =
            ViewportTransform::from_matrix([1.2, 0.3, -0.4, 0.9, 10.0, -5.0], 1.0, 100.0, 100.0);
        let (px, py) = vp.to_pixel_space(-7.0, 42.0);
        let p = to_document_space(px, py, &vp);
        assert!(close(p.x, -7.0) && close(p.y, 42.0));
    }

    #[test]
    fn singular_transform_uses_scale_fallback() {
        let vp = ViewportTransform::from_matrix([2.0, 4.0, 1.0, 2.0, 0.0, 0.0], 2.0, 200.0, 300.0);
        assert!(vp.is_degenerate());
        let p = vp.to_document_space(50.0, 100.0);
        assert!(p.approximate);
        assert_eq!((p.x, p.y), (25.0, 100.0));
    }

    #[test]
    fn zero_scale_stays_finite() {
        let vp = ViewportTransform::for_page(LETTER.0, LETTER.1, 0.0, 0);
        let p = vp.to_document_space(10.0, 20.0);
        assert!(p.approximate);
        assert!(p.x.is_finite() && p.y.is_finite());
        assert_eq!(vp.page_size(), PageSize { width: 0.0, height: 0.0 });
    }

    #[test]
    fn nan_coefficients_take_fallback() {
        let vp =
            ViewportTransform::from_matrix([f64::NAN, 0.0, 0.0, 1.0, 0.0, 0.0], 1.0, 10.0, 10.0);
        let p = vp.to_document_space(3.0, 4.0);
        assert!(p.approximate);
        assert_eq!((p.x, p.y), (3.0, 6.0));
    }

    #[test]
    fn offsets_and_percentages() {
        let page = PageSize {
            width: 600.0,
            height: 800.0,
        };
        let point = DocumentPoint {
            x: 150.0,
            y: 200.0,
            approximate: false,
        };
        let off = EdgeOffsets::new(&point, page);
        assert_eq!(off, EdgeOffsets { left: 150.0, right: 450.0, top: 600.0, bottom: 200.0 });
        assert_eq!(off.left + off.right, page.width);
        assert_eq!(off.top + off.bottom, page.height);

        let pct = PagePercent::new(&point, page);
        assert_eq!((pct.x, pct.y), (25.0, 25.0));

        let empty = PagePercent::new(&point, PageSize { width: 0.0, height: 0.0 });
        assert_eq!((empty.x, empty.y), (0.0, 0.0));
    }

    #[test]
    fn describe_pointer_uses_viewport_page_size() {
        let vp = ViewportTransform::for_page(LETTER.0, LETTER.1, 1.0, 0);
        let report = describe_pointer(
            PointerSample {
                pixel_x: 72.0,
                pixel_y: 792.0 - 72.0,
                page: 3,
            },
            &vp,
            None,
        );
        assert_eq!(report.page, 3);
        assert!(close(report.point.x, 72.0) && close(report.point.y, 72.0));
        assert_eq!(report.page_size, PageSize { width: 612.0, height: 792.0 });
        assert!(close(report.offsets.top, 720.0));
        assert!(close(report.x_mm, 25.4));
    }

    #[test]
    fn transform_deserializes_without_width() {
        let vp: ViewportTransform = serde_json::from_str(
            r#"{"a":1,"b":0,"c":0,"d":-1,"e":0,"f":792,"scale":1,"height":792}"#,
        )
        .unwrap();
        assert_eq!(vp.width, 0.0);
        let p = vp.to_document_space(10.0, 92.0);
        assert!(close(p.x, 10.0) && close(p.y, 700.0));
    }
}
