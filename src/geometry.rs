//! Page layout arithmetic in abstract layout units.
//!
//! The page stack is modeled in a unit space independent of terminal cells:
//! a page is `600 * zoom` units wide in single mode, pages stack vertically
//! with a fixed gap, and double mode places odd/even pairs side by side on a
//! shared row. Widgets convert units to cells at render time.

use crate::settings::PageMode;

/// Unscaled page width in single mode.
pub const SINGLE_BASE_WIDTH: f32 = 600.0;
/// Unscaled row width in double mode (two pages side by side).
pub const DOUBLE_BASE_WIDTH: f32 = 1200.0;
/// Vertical gap between page rows.
pub const PAGE_GAP: f32 = 16.0;

/// Position and size of one page within the laid-out stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRect {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

impl PageRect {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Computed geometry for every page at a given mode and zoom factor.
#[derive(Debug, Clone)]
pub struct PageLayout {
    mode: PageMode,
    rects: Vec<PageRect>,
    total_height: f32,
}

impl PageLayout {
    /// Lays out pages top to bottom. `aspects` holds height/width ratios in
    /// page order. In double mode pages pair up as (1,2), (3,4), ... with both
    /// pages of a pair sharing a row top; the row is as tall as its taller
    /// page, and a trailing odd page sits alone on the final row.
    pub fn compute(aspects: &[f32], mode: PageMode, zoom: f32) -> Self {
        let page_width = SINGLE_BASE_WIDTH * zoom;
        let mut rects = Vec::with_capacity(aspects.len());
        let mut y = 0.0_f32;

        match mode {
            PageMode::Single => {
                for aspect in aspects {
                    let height = page_width * aspect;
                    rects.push(PageRect {
                        top: y,
                        left: 0.0,
                        width: page_width,
                        height,
                    });
                    y += height + PAGE_GAP;
                }
            }
            PageMode::Double => {
                let mut i = 0;
                while i < aspects.len() {
                    let left_height = page_width * aspects[i];
                    if i + 1 < aspects.len() {
                        let right_height = page_width * aspects[i + 1];
                        rects.push(PageRect {
                            top: y,
                            left: 0.0,
                            width: page_width,
                            height: left_height,
                        });
                        rects.push(PageRect {
                            top: y,
                            left: page_width,
                            width: page_width,
                            height: right_height,
                        });
                        y += left_height.max(right_height) + PAGE_GAP;
                        i += 2;
                    } else {
                        rects.push(PageRect {
                            top: y,
                            left: 0.0,
                            width: page_width,
                            height: left_height,
                        });
                        y += left_height + PAGE_GAP;
                        i += 1;
                    }
                }
            }
        }

        let total_height = if rects.is_empty() { 0.0 } else { y - PAGE_GAP };

        Self {
            mode,
            rects,
            total_height,
        }
    }

    pub fn page_count(&self) -> usize {
        self.rects.len()
    }

    pub fn mode(&self) -> PageMode {
        self.mode
    }

    pub fn total_height(&self) -> f32 {
        self.total_height
    }

    /// Width of the widest row, used for horizontal centering.
    pub fn content_width(&self) -> f32 {
        self.rects
            .iter()
            .map(|r| r.left + r.width)
            .fold(0.0, f32::max)
    }

    /// Geometry of a 1-based page number.
    pub fn page_rect(&self, page: usize) -> Option<&PageRect> {
        page.checked_sub(1).and_then(|i| self.rects.get(i))
    }

    pub fn page_top(&self, page: usize) -> Option<f32> {
        self.page_rect(page).map(|r| r.top)
    }

    /// Largest scroll offset that still shows a full viewport of content.
    pub fn max_scroll(&self, viewport_height: f32) -> f32 {
        (self.total_height - viewport_height).max(0.0)
    }

    /// The page whose top edge is nearest the scroll offset. Ties go to the
    /// earlier page, so in double mode a row resolves to its left page.
    pub fn closest_page(&self, offset: f32) -> Option<usize> {
        let mut best = None;
        let mut best_distance = f32::INFINITY;
        for (i, rect) in self.rects.iter().enumerate() {
            let distance = (rect.top - offset).abs();
            if distance < best_distance {
                best_distance = distance;
                best = Some(i + 1);
            }
        }
        best
    }

    /// Pages intersecting the window `[offset, offset + viewport_height)`,
    /// paired with their 1-based page numbers.
    pub fn pages_in_view(
        &self,
        offset: f32,
        viewport_height: f32,
    ) -> impl Iterator<Item = (usize, &PageRect)> {
        let window_bottom = offset + viewport_height;
        self.rects
            .iter()
            .enumerate()
            .filter(move |(_, rect)| rect.bottom() > offset && rect.top < window_bottom)
            .map(|(i, rect)| (i + 1, rect))
    }
}
