// Copyright (c) 2026 rezky_nightky

use crate::animator::AnimationState;

/// Distance kept between the trail and the top/bottom edges.
pub const EDGE_PADDING: f64 = 18.0;

const EXTENT_EPSILON: f64 = 1.0e-9;

/// A reading of the page's scroll position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollPosition {
    pub offset: f64,
    pub extent: f64,
}

impl ScrollPosition {
    pub fn new(offset: f64, extent: f64) -> Self {
        Self { offset, extent }
    }

    /// Normalized progress in `[0, 1]`. A page that cannot scroll is at 0.
    pub fn progress(&self) -> f64 {
        if self.extent.is_nan() || self.extent <= 0.0 || self.offset.is_nan() {
            return 0.0;
        }
        let p = self.offset / self.extent.max(EXTENT_EPSILON);
        if p.is_nan() {
            return 0.0;
        }
        p.clamp(0.0, 1.0)
    }
}

/// Anything that can report where the page is scrolled to.
pub trait ScrollSource {
    fn scroll_position(&self) -> ScrollPosition;
}

impl ScrollSource for ScrollPosition {
    fn scroll_position(&self) -> ScrollPosition {
        *self
    }
}

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[derive(Clone, Copy, Debug)]
pub struct ScrollMapper {
    pub padding: f64,
}

impl Default for ScrollMapper {
    fn default() -> Self {
        Self {
            padding: EDGE_PADDING,
        }
    }
}

impl ScrollMapper {
    pub fn target_for(&self, progress: f64, height: f64) -> f64 {
        let lo = self.padding;
        let hi = height - self.padding;
        let t = lerp(lo, hi, progress.clamp(0.0, 1.0));
        t.clamp(0.0, height.max(0.0))
    }

    /// Refreshes `target` and raises the high-water mark if needed.
    pub fn update(&self, state: &mut AnimationState, scroll: ScrollPosition, height: f64) {
        state.target = self.target_for(scroll.progress(), height);
        state.high_water = state.high_water.max(state.target);
    }
}

/// The virtual document being scrolled. Offsets are in viewport units.
#[derive(Clone, Debug)]
pub struct Page {
    pages: f64,
    viewport_height: f64,
    offset: f64,
}

impl Page {
    pub fn new(pages: f64, viewport_height: f64) -> Self {
        Self {
            pages: pages.max(1.0),
            viewport_height: viewport_height.max(1.0),
            offset: 0.0,
        }
    }

    pub fn height(&self) -> f64 {
        self.pages * self.viewport_height
    }

    pub fn extent(&self) -> f64 {
        (self.height() - self.viewport_height).max(0.0)
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Keeps the same fractional position when the viewport changes.
    pub fn set_viewport_height(&mut self, h: f64) {
        let progress = self.scroll_position().progress();
        self.viewport_height = h.max(1.0);
        self.offset = (progress * self.extent()).clamp(0.0, self.extent());
    }

    /// Returns true when the offset actually moved.
    pub fn scroll_by(&mut self, delta: f64) -> bool {
        self.scroll_to(self.offset + delta)
    }

    pub fn scroll_to(&mut self, offset: f64) -> bool {
        let next = if offset.is_finite() {
            offset.clamp(0.0, self.extent())
        } else {
            self.offset
        };
        let moved = next != self.offset;
        self.offset = next;
        moved
    }

    pub fn at_bottom(&self) -> bool {
        self.offset >= self.extent()
    }
}

impl ScrollSource for Page {
    fn scroll_position(&self) -> ScrollPosition {
        ScrollPosition::new(self.offset, self.extent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_clamped() {
        let cases = [
            (-50.0, 100.0),
            (0.0, 100.0),
            (50.0, 100.0),
            (500.0, 100.0),
            (10.0, 0.0),
            (10.0, -5.0),
            (f64::NAN, 10.0),
        ];
        for (offset, extent) in cases {
            let p = ScrollPosition::new(offset, extent).progress();
            assert!((0.0..=1.0).contains(&p), "{} {} -> {}", offset, extent, p);
        }
    }

    #[test]
    fn infinite_offsets_clamp_to_the_ends() {
        assert_eq!(ScrollPosition::new(f64::INFINITY, 100.0).progress(), 1.0);
        assert_eq!(ScrollPosition::new(f64::NEG_INFINITY, 100.0).progress(), 0.0);
        assert_eq!(ScrollPosition::new(f64::INFINITY, f64::INFINITY).progress(), 0.0);
        assert_eq!(ScrollPosition::new(50.0, f64::INFINITY).progress(), 0.0);
    }

    #[test]
    fn unscrollable_page_has_zero_progress() {
        assert_eq!(ScrollPosition::new(0.0, 0.0).progress(), 0.0);
        assert_eq!(ScrollPosition::new(300.0, 0.0).progress(), 0.0);
        assert_eq!(ScrollPosition::new(300.0, -1.0).progress(), 0.0);
    }

    #[test]
    fn halfway_scroll_targets_the_middle() {
        let m = ScrollMapper::default();
        assert_eq!(m.target_for(0.5, 500.0), 250.0);
        assert_eq!(m.target_for(0.0, 500.0), 18.0);
        assert_eq!(m.target_for(1.0, 500.0), 482.0);
    }

    #[test]
    fn tiny_viewport_target_stays_inside() {
        let m = ScrollMapper::default();
        let t = m.target_for(0.0, 10.0);
        assert!((0.0..=10.0).contains(&t));
    }

    #[test]
    fn high_water_never_decreases_while_scrolling() {
        let m = ScrollMapper::default();
        let mut st = AnimationState::default();
        let mut last = st.high_water;
        for offset in [0.0, 40.0, 90.0, 30.0, 0.0, 60.0, 100.0, 10.0] {
            m.update(&mut st, ScrollPosition::new(offset, 100.0), 500.0);
            assert!(st.high_water >= last);
            last = st.high_water;
        }
        assert_eq!(st.high_water, 482.0);
        assert_eq!(st.target, m.target_for(0.1, 500.0));
    }

    #[test]
    fn page_clamps_offset_and_reports_motion() {
        let mut page = Page::new(3.0, 100.0);
        assert_eq!(page.extent(), 200.0);
        assert!(!page.scroll_by(-10.0));
        assert!(page.scroll_by(150.0));
        assert!(page.scroll_by(150.0));
        assert_eq!(page.offset(), 200.0);
        assert!(page.at_bottom());
        assert!(!page.scroll_by(1.0));
    }

    #[test]
    fn single_screen_page_cannot_scroll() {
        let mut page = Page::new(1.0, 100.0);
        assert!(!page.scroll_by(50.0));
        assert_eq!(page.scroll_position().progress(), 0.0);
    }

    #[test]
    fn viewport_change_keeps_relative_position() {
        let mut page = Page::new(5.0, 100.0);
        page.scroll_to(200.0);
        page.set_viewport_height(200.0);
        assert_eq!(page.extent(), 800.0);
        assert_eq!(page.offset(), 400.0);
    }
}
