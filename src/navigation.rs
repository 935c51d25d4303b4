//! Page and zoom state for the PDF preview.
//!
//! The renderer owns decoding and drawing; this type only tracks which page
//! is shown at which zoom and hands out a fresh [`ViewportTransform`] every
//! time either changes.

use crate::schema::{PreviewError, PreviewOptions};
use crate::viewport::ViewportTransform;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PageNavigator {
    page_count: usize,
    /// 1-based.
    current_page: usize,
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    zoom_step: f64,
}

impl PageNavigator {
    /// Starts on page 1 at 100% zoom (clamped to the configured limits).
    pub fn new(page_count: usize, options: &PreviewOptions) -> Result<Self, PreviewError> {
        if page_count == 0 {
            return Err(PreviewError::EmptyDocument);
        }
        let (min_zoom, max_zoom, zoom_step) = options.zoom_limits();
        Ok(Self {
            page_count,
            current_page: 1,
            zoom: 1.0_f64.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
            zoom_step,
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.page_count
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Moves to the next page; stays put on the last one.
    /// Returns whether the page changed.
    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    /// Moves to the previous page; stays put on the first one.
    pub fn previous(&mut self) -> bool {
        if self.has_previous() {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    pub fn go_to(&mut self, page: usize) -> Result<(), PreviewError> {
        if page == 0 || page > self.page_count {
            return Err(PreviewError::PageOutOfRange {
                page,
                total: self.page_count,
            });
        }
        self.current_page = page;
        Ok(())
    }

    /// Sets the zoom factor, clamped to the configured limits.
    pub fn set_zoom(&mut self, zoom: f64) -> Result<f64, PreviewError> {
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(PreviewError::InvalidZoom(zoom));
        }
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        Ok(self.zoom)
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.zoom = (self.zoom + self.zoom_step).min(self.max_zoom);
        self.zoom
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.zoom = (self.zoom - self.zoom_step).max(self.min_zoom);
        self.zoom
    }

    /// Zooms so a page `page_width` points wide fills `container_px` pixels.
    pub fn fit_width(&mut self, container_px: f64, page_width: f64) -> Result<f64, PreviewError> {
        if !(page_width > 0.0) {
            return Err(PreviewError::InvalidZoom(page_width));
        }
        self.set_zoom(container_px / page_width)
    }

    /// Viewport for the current zoom. Build a new one after every page or
    /// zoom change; transforms are never updated in place.
    pub fn viewport(&self, page_width: f64, page_height: f64, rotation: i32) -> ViewportTransform {
        ViewportTransform::for_page(page_width, page_height, self.zoom, rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nav(pages: usize) -> PageNavigator {
        PageNavigator::new(pages, &PreviewOptions::default()).unwrap()
    }

    #[test]
    fn empty_document_is_rejected() {
        assert_eq!(
            PageNavigator::new(0, &PreviewOptions::default()),
            Err(PreviewError::EmptyDocument)
        );
    }

    #[test]
    fn paging_stays_in_bounds() {
        let mut n = nav(3);
        assert!(!n.previous());
        assert!(n.next());
        assert!(n.next());
        assert!(!n.next());
        assert_eq!(n.current_page(), 3);

        assert_eq!(
            n.go_to(4),
            Err(PreviewError::PageOutOfRange { page: 4, total: 3 })
        );
        assert!(n.go_to(0).is_err());
        n.go_to(2).unwrap();
        assert_eq!(n.current_page(), 2);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut n = nav(1);
        assert_eq!(n.zoom(), 1.0);
        assert_eq!(n.zoom_in(), 1.25);
        assert_eq!(n.set_zoom(50.0).unwrap(), 5.0);
        assert_eq!(n.zoom_in(), 5.0);
        assert_eq!(n.set_zoom(0.3).unwrap(), 0.3);
        assert_eq!(n.zoom_out(), 0.25);
        assert!(n.set_zoom(0.0).is_err());
        assert!(n.set_zoom(f64::INFINITY).is_err());
    }

    #[test]
    fn custom_limits_from_options() {
        let opts = PreviewOptions {
            min_zoom: Some(1.5),
            max_zoom: Some(3.0),
            zoom_step: Some(0.5),
            ..Default::default()
        };
        let mut n = PageNavigator::new(2, &opts).unwrap();
        assert_eq!(n.zoom(), 1.5);
        assert_eq!(n.zoom_in(), 2.0);
    }

    #[test]
    fn fit_width_and_viewport() {
        let mut n = nav(1);
        assert_eq!(n.fit_width(918.0, 612.0).unwrap(), 1.5);
        let vp = n.viewport(612.0, 792.0, 0);
        assert_eq!(vp.scale, 1.5);
        assert_eq!(vp.width, 918.0);
        assert!(n.fit_width(100.0, 0.0).is_err());
    }
}
