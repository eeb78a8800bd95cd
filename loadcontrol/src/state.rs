use crate::Direction;

/// Where a load control is in its begin/end cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoadState {
    #[default]
    Idle,
    /// The indicator is in, and the load callback is waiting for the scroll to decelerate.
    Triggering,
    /// The load callback has run; waiting for `end_loading`.
    Loading,
    /// `end_loading` was called; insets are being reverted.
    Completing,
}

impl LoadState {
    pub fn is_loading(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// A lightweight, serializable snapshot of a load control.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadControlState {
    pub state: LoadState,
    pub is_initialized: bool,
    pub direction: Direction,
    /// Footprint currently reserved in the trailing inset.
    pub indicator_inset: f32,
    /// Padding added because the content was shorter than the viewport.
    pub extra_end_inset: f32,
    pub scroll_to_start_when_finished: bool,
}

impl LoadControlState {
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }
}
