//! Scroll geometry used to decide when to load and where the indicator goes.
//!
//! Everything here is pure: the surface captures a [`Geometry`] snapshot and the sequencing code
//! acts on the answers.

use crate::{Direction, EdgeInsets, Point, Size};

/// Space the indicator takes in the trailing inset: its extent plus a margin on both sides.
pub fn footprint(indicator_extent: f32, margin: f32) -> f32 {
    indicator_extent + margin * 2.0
}

/// A snapshot of the host surface plus the insets this crate has added to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    pub direction: Direction,
    /// Viewport size.
    pub bounds: Size,
    pub content_size: Size,
    pub content_offset: Point,
    /// Content inset plus safe area, including anything the control has added.
    pub adjusted_inset: EdgeInsets,
    /// Footprint currently reserved by the control.
    pub indicator_inset: f32,
    /// Padding currently reserved for under-full content.
    pub extra_end_inset: f32,
}

impl Geometry {
    fn viewport_extent(&self) -> f32 {
        self.direction.extent(self.bounds)
    }

    /// The trailing inset the consumer configured, without what the control added.
    pub fn original_end_inset(&self) -> f32 {
        self.adjusted_inset.end(self.direction) - self.extra_end_inset - self.indicator_inset
    }

    /// Content extent, grown to at least the visible area between the original insets.
    ///
    /// This guarantees a threshold exists even when the content does not fill the viewport.
    pub fn clamp_to_visible_bounds(&self, content_size: Size) -> f32 {
        let visible = self.viewport_extent()
            - self.adjusted_inset.start(self.direction)
            - self.original_end_inset();
        self.direction.extent(content_size).max(visible)
    }

    pub fn clamped_extent(&self) -> f32 {
        self.clamp_to_visible_bounds(self.content_size)
    }

    /// Offset at which the indicator starts to become visible.
    pub fn reveal_start(&self) -> f32 {
        self.clamped_extent() - self.viewport_extent() + self.original_end_inset()
    }

    /// Offset past which a drag starts loading.
    pub fn action_offset(&self, trigger_offset: f32) -> f32 {
        self.reveal_start() - trigger_offset
    }

    /// The user has dragged past the threshold while moving toward the end.
    ///
    /// `velocity` uses the pan convention: negative while content moves toward its end.
    pub fn crosses_threshold(&self, trigger_offset: f32, velocity: Point) -> bool {
        let offset = self.direction.main(self.content_offset);
        offset > self.action_offset(trigger_offset) && self.direction.main(velocity) <= 0.0
    }

    /// Offsets between which the indicator is partially on screen.
    pub fn indicator_band(&self, footprint: f32) -> (f32, f32) {
        let min = self.reveal_start();
        (min, min + footprint)
    }

    pub fn is_partially_revealed(&self, footprint: f32) -> bool {
        let (min, max) = self.indicator_band(footprint);
        let offset = self.direction.main(self.content_offset);
        offset > min && offset < max
    }

    /// Where the indicator sits for `content_size`: centered across the axis, one half
    /// footprint past the clamped content end along it.
    pub fn indicator_center(&self, content_size: Size, footprint: f32) -> Point {
        let along = self.clamp_to_visible_bounds(content_size) + footprint * 0.5;
        let across = self.direction.cross_extent(content_size) * 0.5;
        match self.direction {
            Direction::Vertical => Point::new(across, along),
            Direction::Horizontal => Point::new(along, across),
        }
    }

    /// Padding needed so the indicator lands at the true end of under-full content.
    pub fn extra_end_inset_needed(&self) -> f32 {
        (self.clamped_extent() - self.direction.extent(self.content_size)).max(0.0)
    }

    /// The leading edge: origin adjusted for the leading inset, cross axis untouched.
    pub fn start_offset(&self) -> Point {
        let start = -self.adjusted_inset.start(self.direction);
        self.content_offset.with_main(self.direction, start)
    }
}

pub(crate) fn sanitize(value: f32) -> f32 {
    debug_assert!(value.is_finite(), "non-finite geometry value: {value}");
    if value.is_finite() { value } else { 0.0 }
}
