use alloc::rc::Rc;

use crate::{Direction, Easing, Feedback};

/// Invoked once per trigger, after the deceleration delay.
pub type LoadCallback = Rc<dyn Fn()>;

/// Decides whether a threshold crossing may start loading.
///
/// Return `false` to block loading, e.g. once the last page has been shown.
pub type ShouldLoadCallback = Rc<dyn Fn() -> bool>;

/// Fixed delays and durations used by the loading sequences.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timings {
    /// Wait before invoking the load callback, so a fling can decelerate first.
    pub callback_delay_ms: u64,
    /// Wait between `end_loading` and the start of the stop sequence.
    pub end_delay_ms: u64,
    /// Wait before clearing the loading flag when the user is still dragging.
    pub clear_delay_ms: u64,
    /// Duration of content inset animations.
    pub inset_animation_ms: u64,
    /// Duration of animated scroll-to-row on list-like surfaces.
    pub scroll_animation_ms: u64,
    pub easing: Easing,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            callback_delay_ms: 100,
            end_delay_ms: 500,
            clear_delay_ms: 500,
            inset_animation_ms: 250,
            scroll_animation_ms: 250,
            easing: Easing::default(),
        }
    }
}

/// Configuration for [`crate::LoadControl`].
///
/// Closures are stored in `Rc`s, so cloning is cheap and `LoadControl::update_options` can apply
/// a tweaked copy without rebuilding callbacks.
#[derive(Clone)]
pub struct LoadControlOptions {
    pub direction: Direction,
    /// Space before and after the indicator along the loading axis.
    pub indicator_margin: f32,
    /// Extra lead distance: larger values start loading before the end is reached.
    pub trigger_offset: f32,
    pub should_load: Option<ShouldLoadCallback>,
    pub timings: Timings,
    pub feedback: Option<Rc<dyn Feedback>>,
}

impl Default for LoadControlOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Vertical,
            indicator_margin: 25.0,
            trigger_offset: 0.0,
            should_load: None,
            timings: Timings::default(),
            feedback: None,
        }
    }
}

impl LoadControlOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_indicator_margin(mut self, margin: f32) -> Self {
        self.indicator_margin = margin;
        self
    }

    pub fn with_trigger_offset(mut self, trigger_offset: f32) -> Self {
        self.trigger_offset = trigger_offset;
        self
    }

    pub fn with_should_load(mut self, should_load: Option<impl Fn() -> bool + 'static>) -> Self {
        self.should_load = should_load.map(|f| -> ShouldLoadCallback { Rc::new(f) });
        self
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_feedback(mut self, feedback: Option<impl Feedback + 'static>) -> Self {
        self.feedback = feedback.map(|f| -> Rc<dyn Feedback> { Rc::new(f) });
        self
    }
}

impl core::fmt::Debug for LoadControlOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoadControlOptions")
            .field("direction", &self.direction)
            .field("indicator_margin", &self.indicator_margin)
            .field("trigger_offset", &self.trigger_offset)
            .field("has_should_load", &self.should_load.is_some())
            .field("timings", &self.timings)
            .field("has_feedback", &self.feedback.is_some())
            .finish()
    }
}
