//! Scroll, zoom and page navigation state for the page stack.
//!
//! All positions are in layout units (see `geometry`). The controller owns
//! the computed layout and rebuilds it whenever zoom or page mode change;
//! widgets read it back at render time.

use crate::geometry::PageLayout;
use crate::settings::PageMode;
use crate::zoom::ZoomLevel;
use log::debug;

const DEFAULT_VIEWPORT_HEIGHT: f32 = 480.0;

/// Interpolated scroll position. `target` moves immediately on input while
/// `offset` (the drawn position) chases it a fraction per tick. Suspending
/// turns every movement into an instant jump until resumed.
#[derive(Debug)]
pub struct SmoothScroll {
    offset: f32,
    target: f32,
    smooth: bool,
    resume_pending: bool,
}

impl SmoothScroll {
    const INTERPOLATION: f32 = 0.3;
    const SNAP_DISTANCE: f32 = 0.5;

    fn new() -> Self {
        Self {
            offset: 0.0,
            target: 0.0,
            smooth: true,
            resume_pending: false,
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    fn scroll_to(&mut self, position: f32, max: f32) {
        self.target = position.clamp(0.0, max);
        if !self.smooth {
            self.offset = self.target;
        }
    }

    fn jump_to(&mut self, position: f32, max: f32) {
        self.target = position.clamp(0.0, max);
        self.offset = self.target;
    }

    fn clamp(&mut self, max: f32) {
        self.target = self.target.clamp(0.0, max);
        self.offset = self.offset.clamp(0.0, max);
    }

    fn suspend(&mut self) {
        self.smooth = false;
        self.resume_pending = false;
    }

    /// Re-enables smoothing on the next tick, so a jump made while suspended
    /// never animates retroactively.
    fn schedule_resume(&mut self) {
        self.resume_pending = true;
    }

    pub fn is_animating(&self) -> bool {
        (self.target - self.offset).abs() > Self::SNAP_DISTANCE
    }

    fn on_tick(&mut self) -> bool {
        if self.resume_pending {
            self.smooth = true;
            self.resume_pending = false;
        }
        let diff = self.target - self.offset;
        if diff.abs() > Self::SNAP_DISTANCE {
            self.offset += diff * Self::INTERPOLATION;
            true
        } else if diff != 0.0 {
            self.offset = self.target;
            true
        } else {
            false
        }
    }
}

pub struct ViewerController {
    aspects: Vec<f32>,
    mode: PageMode,
    zoom: ZoomLevel,
    current_page: usize,
    layout: PageLayout,
    scroll: SmoothScroll,
    viewport_height: f32,
}

impl ViewerController {
    pub fn new(aspects: Vec<f32>, zoom: f32, mode: PageMode) -> Self {
        let zoom = ZoomLevel::new(zoom);
        let layout = PageLayout::compute(&aspects, mode, zoom.factor());
        Self {
            aspects,
            mode,
            zoom,
            current_page: 1,
            layout,
            scroll: SmoothScroll::new(),
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }

    pub fn page_count(&self) -> usize {
        self.aspects.len()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_mode(&self) -> PageMode {
        self.mode
    }

    pub fn zoom(&self) -> ZoomLevel {
        self.zoom
    }

    pub fn zoom_factor(&self) -> f32 {
        self.zoom.factor()
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll.offset()
    }

    pub fn scroll_target(&self) -> f32 {
        self.scroll.target()
    }

    pub fn is_scroll_animating(&self) -> bool {
        self.scroll.is_animating()
    }

    pub fn max_scroll(&self) -> f32 {
        self.layout.max_scroll(self.viewport_height)
    }

    /// Updates the visible window height (layout units) and re-clamps the
    /// scroll position against the new bounds.
    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height.max(0.0);
        self.scroll.clamp(self.max_scroll());
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    fn rebuild_layout(&mut self) {
        self.layout = PageLayout::compute(&self.aspects, self.mode, self.zoom.factor());
    }

    /// Rebuilds geometry without changing zoom or position intent, keeping
    /// the offset within the (possibly shrunken) scroll range.
    pub fn refresh_layout(&mut self) {
        self.rebuild_layout();
        self.scroll.clamp(self.max_scroll());
    }

    /// Applies an absolute zoom factor, keeping the current page at the same
    /// on-screen position: the page-top-to-viewport distance measured before
    /// the rescale is restored afterwards, clamped to the scroll range.
    pub fn set_zoom(&mut self, requested: f32) -> f32 {
        let visible_position = self
            .layout
            .page_top(self.current_page)
            .map(|top| top - self.scroll.offset());

        let factor = self.zoom.set(requested);
        self.rebuild_layout();

        match (self.layout.page_top(self.current_page), visible_position) {
            (Some(new_top), Some(position)) => {
                self.scroll.jump_to(new_top - position, self.max_scroll());
            }
            _ => self.scroll.clamp(self.max_scroll()),
        }
        factor
    }

    pub fn zoom_in(&mut self) -> f32 {
        self.set_zoom(self.zoom.factor() * ZoomLevel::ZOOM_IN_RATE)
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.set_zoom(self.zoom.factor() * ZoomLevel::ZOOM_OUT_RATE)
    }

    pub fn zoom_reset(&mut self) -> f32 {
        self.set_zoom(1.0)
    }

    /// Navigates to a 1-based page number and returns the page actually
    /// selected. Out-of-range numbers clamp; in double mode an even number
    /// resolves to its odd partner so the pair containing the request is
    /// shown. A page without geometry leaves the scroll untouched.
    pub fn go_to_page(&mut self, page: usize) -> usize {
        let clamped = page.clamp(1, self.page_count().max(1));
        let resolved = if self.mode.is_double() && clamped % 2 == 0 {
            clamped - 1
        } else {
            clamped
        };
        self.current_page = resolved;
        if let Some(top) = self.layout.page_top(resolved) {
            self.scroll.scroll_to(top, self.max_scroll());
        }
        resolved
    }

    /// Steps forward: two pages in double mode while a full pair remains,
    /// otherwise one.
    pub fn next_page(&mut self) -> usize {
        let step = if self.mode.is_double() && self.current_page + 1 < self.page_count() {
            2
        } else {
            1
        };
        self.go_to_page(self.current_page + step)
    }

    /// Steps backward: two pages in double mode except from the first pair,
    /// where a single step clamps to page 1.
    pub fn previous_page(&mut self) -> usize {
        let step = if self.mode.is_double() && self.current_page > 2 {
            2
        } else {
            1
        };
        self.go_to_page(self.current_page.saturating_sub(step))
    }

    /// Scrolls by a signed delta in layout units. Positive moves down.
    pub fn scroll_by(&mut self, delta: f32) {
        let max = self.max_scroll();
        self.scroll.scroll_to(self.scroll.target() + delta, max);
    }

    /// Flips between single and double layout while keeping the page that
    /// was under the viewport in view. The reposition is a plain jump;
    /// smoothing comes back one tick later. Returns the new mode.
    pub fn toggle_page_mode(&mut self) -> PageMode {
        self.scroll.suspend();

        let visible = self
            .layout
            .closest_page(self.scroll.offset())
            .unwrap_or(self.current_page);

        self.mode = self.mode.toggled();
        self.rebuild_layout();

        let target = if self.mode.is_double() && visible % 2 == 0 {
            visible - 1
        } else {
            visible
        };
        if let Some(top) = self.layout.page_top(target) {
            self.scroll.jump_to(top, self.max_scroll());
        }
        self.current_page = target;

        self.scroll.schedule_resume();
        // Reapply the factor so the anchor math runs against the new base
        // width.
        self.set_zoom(self.zoom.factor());

        debug!(
            "Page mode toggled to {}, page {}",
            self.mode.as_str(),
            self.current_page
        );
        self.mode
    }

    /// Recomputes the current page from the settled scroll position. In
    /// double mode an even result snaps to its odd partner so the tracked
    /// page is always the left one of the pair.
    pub fn sync_settled_scroll(&mut self) -> usize {
        let closest = self
            .layout
            .closest_page(self.scroll.offset())
            .unwrap_or(self.current_page);
        self.current_page = if self.mode.is_double() && closest % 2 == 0 {
            closest - 1
        } else {
            closest
        };
        self.current_page
    }

    /// The pages highlighted as "currently shown": the page itself in single
    /// mode, the odd/even pair in double mode (right side absent past the
    /// last page).
    pub fn displayed_pair(&self) -> (usize, Option<usize>) {
        match self.mode {
            PageMode::Single => (self.current_page, None),
            PageMode::Double => {
                let left = if self.current_page % 2 == 0 {
                    self.current_page - 1
                } else {
                    self.current_page
                };
                let right = left + 1;
                (left, (right <= self.page_count()).then_some(right))
            }
        }
    }

    /// Advances the scroll animation one frame. Returns true when the drawn
    /// offset moved.
    pub fn on_tick(&mut self) -> bool {
        self.scroll.on_tick()
    }
}
