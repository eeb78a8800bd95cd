//! A headless "load more" control for the trailing edge of scrollable lists.
//!
//! The control watches a scroll surface, starts a user-supplied callback when the user drags
//! near the end of the content, makes room for a progress indicator by growing the trailing
//! content inset, and reverts everything once the consumer calls
//! [`LoadControl::end_loading`]. It is the trailing-edge counterpart of pull-to-refresh.
//!
//! It is UI-agnostic. An adapter is expected to:
//! - mirror its scroll view into a [`ScrollView`] (bounds, content size, offset, insets, drags)
//! - drive time with [`RunLoop::advance_to`] from its frame loop
//! - draw the indicator from [`ScrollView::indicator`] and the inset from
//!   [`ScrollView::presented_content_inset`]
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod control;
mod coordinator;
mod feedback;
mod geometry;
mod indicator;
mod options;
mod run_loop;
mod state;
mod surface;
mod tween;
mod types;

#[cfg(test)]
mod tests;

pub use control::LoadControl;
pub use feedback::{Feedback, ImpactStyle};
pub use geometry::{Geometry, footprint};
pub use indicator::{ActivityIndicator, IndicatorView, ProgressIndicator};
pub use options::{LoadCallback, LoadControlOptions, ShouldLoadCallback, Timings};
pub use run_loop::{AnimationKey, RunLoop};
pub use state::{LoadControlState, LoadState};
pub use surface::{GestureTarget, GestureTargetId, ListLayout, ScrollView};
pub use tween::{Easing, Tween};
pub use types::{Direction, EdgeInsets, GesturePhase, IndexPath, Point, Rect, RowPosition, Size};
