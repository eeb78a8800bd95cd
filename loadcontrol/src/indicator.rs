use alloc::boxed::Box;
use core::fmt;

use crate::{Direction, Point, Size};

/// A progress indicator shown while a page is loading.
///
/// The control only needs to know how big the indicator is and to start/stop it. Drawing is up
/// to the adapter, which reads [`IndicatorView`] snapshots from the surface.
pub trait ProgressIndicator {
    fn size(&self) -> Size;
    fn start_animating(&mut self);
    fn stop_animating(&mut self);
    fn is_animating(&self) -> bool;
}

/// The default spinner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActivityIndicator {
    size: Size,
    animating: bool,
}

impl ActivityIndicator {
    pub const DEFAULT_SIZE: Size = Size {
        width: 50.0,
        height: 50.0,
    };

    pub fn new(size: Size) -> Self {
        Self {
            size,
            animating: false,
        }
    }
}

impl Default for ActivityIndicator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}

impl ProgressIndicator for ActivityIndicator {
    fn size(&self) -> Size {
        self.size
    }

    fn start_animating(&mut self) {
        self.animating = true;
    }

    fn stop_animating(&mut self) {
        self.animating = false;
    }

    fn is_animating(&self) -> bool {
        self.animating
    }
}

/// What an adapter needs to draw the indicator.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndicatorView {
    /// Center in content coordinates.
    pub center: Point,
    pub size: Size,
    pub hidden: bool,
    /// Whether the indicator currently lives inside the scroll surface.
    pub attached: bool,
    pub animating: bool,
}

/// The indicator plus its placement, owned by the load control.
pub(crate) struct IndicatorSlot {
    indicator: Box<dyn ProgressIndicator>,
    pub(crate) center: Point,
    pub(crate) hidden: bool,
    pub(crate) attached: bool,
}

impl IndicatorSlot {
    pub(crate) fn new(indicator: Box<dyn ProgressIndicator>) -> Self {
        Self {
            indicator,
            center: Point::ZERO,
            hidden: true,
            attached: false,
        }
    }

    pub(crate) fn replace(&mut self, indicator: Box<dyn ProgressIndicator>) {
        let animating = self.indicator.is_animating();
        self.indicator = indicator;
        if animating {
            self.indicator.start_animating();
        }
    }

    /// Extent of the indicator along `direction`.
    pub(crate) fn extent(&self, direction: Direction) -> f32 {
        direction.extent(self.indicator.size())
    }

    pub(crate) fn start(&mut self) {
        self.indicator.start_animating();
    }

    pub(crate) fn stop(&mut self) {
        self.indicator.stop_animating();
    }

    pub(crate) fn view(&self) -> IndicatorView {
        IndicatorView {
            center: self.center,
            size: self.indicator.size(),
            hidden: self.hidden,
            attached: self.attached,
            animating: self.indicator.is_animating(),
        }
    }
}

impl fmt::Debug for IndicatorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndicatorSlot")
            .field("center", &self.center)
            .field("hidden", &self.hidden)
            .field("attached", &self.attached)
            .field("animating", &self.indicator.is_animating())
            .finish_non_exhaustive()
    }
}
