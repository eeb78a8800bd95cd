use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::geometry::footprint;
use crate::indicator::IndicatorSlot;
use crate::surface::{GestureTargetId, SurfaceInner};
use crate::{
    ActivityIndicator, Direction, GesturePhase, IndicatorView, LoadCallback, LoadControlOptions,
    LoadControlState, LoadState, ProgressIndicator, ScrollView, ShouldLoadCallback,
};

pub(crate) struct ControlInner {
    pub(crate) options: RefCell<LoadControlOptions>,
    pub(crate) state: Cell<LoadState>,
    is_initialized: Cell<bool>,
    pub(crate) indicator_inset: Cell<f32>,
    pub(crate) extra_end_inset: Cell<f32>,
    pub(crate) scroll_to_start_when_finished: Cell<bool>,
    /// Bumped at every begin; deferred work from an older cycle is dropped.
    pub(crate) cycle: Cell<u64>,
    callback: RefCell<Option<LoadCallback>>,
    pub(crate) indicator: RefCell<IndicatorSlot>,
    surface: RefCell<Weak<SurfaceInner>>,
    gesture_target: Cell<Option<GestureTargetId>>,
}

/// Trailing-edge "load more" control.
///
/// Construct it, attach it with [`ScrollView::set_load_control`], then arm it with
/// [`LoadControl::set_callback`]. Every lifecycle call is a silent no-op when it does not apply
/// (not armed, already loading, not loading), so it is safe to drive the control from several
/// event sources at once.
///
/// The handle is cheap to clone; clones share state.
#[derive(Clone)]
pub struct LoadControl {
    pub(crate) inner: Rc<ControlInner>,
}

impl Default for LoadControl {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadControl {
    pub fn new() -> Self {
        Self::with_options(LoadControlOptions::default())
    }

    pub fn with_options(options: LoadControlOptions) -> Self {
        Self::with_indicator(options, ActivityIndicator::default())
    }

    pub fn with_indicator(options: LoadControlOptions, indicator: impl ProgressIndicator + 'static) -> Self {
        Self {
            inner: Rc::new(ControlInner {
                options: RefCell::new(options),
                state: Cell::new(LoadState::Idle),
                is_initialized: Cell::new(false),
                indicator_inset: Cell::new(0.0),
                extra_end_inset: Cell::new(0.0),
                scroll_to_start_when_finished: Cell::new(false),
                cycle: Cell::new(0),
                callback: RefCell::new(None),
                indicator: RefCell::new(IndicatorSlot::new(Box::new(indicator))),
                surface: RefCell::new(Weak::new()),
                gesture_target: Cell::new(None),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<ControlInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<ControlInner> {
        Rc::downgrade(&self.inner)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // --- lifecycle ---

    /// Stores the load callback.
    ///
    /// The first call (since construction or since [`LoadControl::remove_loading`]) also arms the
    /// control and starts listening to drag-end events on the attached surface. Later calls only
    /// replace the callback.
    pub fn set_callback(&self, callback: impl Fn() + 'static) {
        *self.inner.callback.borrow_mut() = Some(Rc::new(callback));
        if self.inner.is_initialized.get() {
            return;
        }

        if let Some(view) = self.scroll_view() {
            self.wire_gesture(&view);
        }
        self.inner.is_initialized.set(true);
        lcdebug!("load control armed");
    }

    /// Starts loading as if the user had dragged past the threshold, then scrolls the indicator
    /// into view once the inset animation ends.
    pub fn begin_loading(&self) {
        if !self.inner.is_initialized.get() {
            return;
        }
        if let Some(view) = self.scroll_view() {
            view.begin_loading_if_needed(self, true);
        }
    }

    /// Reports that the work started by the callback is done.
    ///
    /// After `end_delay_ms` the insets are reverted and the indicator hidden.
    pub fn end_loading(&self) {
        if !matches!(self.state(), LoadState::Triggering | LoadState::Loading) {
            return;
        }
        self.inner.state.set(LoadState::Completing);

        let Some(view) = self.scroll_view() else {
            self.finish_without_surface();
            return;
        };

        let cycle = self.inner.cycle.get();
        let delay = self.inner.options.borrow().timings.end_delay_ms;
        let control = self.downgrade();
        let surface = view.downgrade();
        view.run_loop().delay(delay, move || {
            let Some(control) = control.upgrade().map(LoadControl::from_inner) else {
                return;
            };
            if control.inner.cycle.get() != cycle {
                return;
            }
            match surface.upgrade() {
                Some(surface) => ScrollView::from_inner(surface).stop_loading_animation(&control),
                None => control.finish_without_surface(),
            }
        });
    }

    /// Disarms the control: drag events are no longer observed, the indicator is taken off the
    /// surface and the callback is dropped. Can be re-armed with [`LoadControl::set_callback`].
    pub fn remove_loading(&self) {
        if !self.inner.is_initialized.get() {
            return;
        }

        if let Some(view) = self.scroll_view() {
            self.unwire_gesture(&view);
        }
        {
            let mut slot = self.inner.indicator.borrow_mut();
            slot.stop();
            slot.hidden = true;
            slot.attached = false;
        }
        self.inner.callback.borrow_mut().take();
        self.inner.is_initialized.set(false);
        lcdebug!("load control removed");
    }

    // --- queries ---

    pub fn is_initialized(&self) -> bool {
        self.inner.is_initialized.get()
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading()
    }

    pub fn state(&self) -> LoadState {
        self.inner.state.get()
    }

    pub fn state_snapshot(&self) -> LoadControlState {
        LoadControlState {
            state: self.state(),
            is_initialized: self.is_initialized(),
            direction: self.direction(),
            indicator_inset: self.inner.indicator_inset.get(),
            extra_end_inset: self.inner.extra_end_inset.get(),
            scroll_to_start_when_finished: self.inner.scroll_to_start_when_finished.get(),
        }
    }

    /// The surface this control is attached to, if it is still alive.
    pub fn scroll_view(&self) -> Option<ScrollView> {
        self.inner.surface.borrow().upgrade().map(ScrollView::from_inner)
    }

    pub fn indicator_view(&self) -> IndicatorView {
        self.inner.indicator.borrow().view()
    }

    /// Indicator extent plus both margins, along the active axis.
    pub fn footprint(&self) -> f32 {
        let (direction, margin) = {
            let options = self.inner.options.borrow();
            (options.direction, options.indicator_margin)
        };
        footprint(self.inner.indicator.borrow().extent(direction), margin)
    }

    // --- configuration ---

    pub fn options(&self) -> LoadControlOptions {
        self.inner.options.borrow().clone()
    }

    pub fn set_options(&self, options: LoadControlOptions) {
        *self.inner.options.borrow_mut() = options;
    }

    pub fn update_options(&self, f: impl FnOnce(&mut LoadControlOptions)) {
        let mut options = self.options();
        f(&mut options);
        self.set_options(options);
    }

    pub fn direction(&self) -> Direction {
        self.inner.options.borrow().direction
    }

    pub fn set_direction(&self, direction: Direction) {
        self.inner.options.borrow_mut().direction = direction;
    }

    pub fn set_indicator_margin(&self, margin: f32) {
        self.inner.options.borrow_mut().indicator_margin = margin;
    }

    pub fn set_trigger_offset(&self, trigger_offset: f32) {
        self.inner.options.borrow_mut().trigger_offset = trigger_offset;
    }

    pub fn set_should_load(&self, should_load: Option<impl Fn() -> bool + 'static>) {
        self.inner.options.borrow_mut().should_load = should_load.map(|f| -> ShouldLoadCallback { Rc::new(f) });
    }

    /// Swaps the indicator. A running indicator keeps running.
    pub fn set_indicator(&self, indicator: impl ProgressIndicator + 'static) {
        self.inner.indicator.borrow_mut().replace(Box::new(indicator));
    }

    // --- wiring ---

    pub(crate) fn attach_to(&self, view: &ScrollView) {
        if let Some(previous) = self.scroll_view() {
            if !Rc::ptr_eq(&previous.inner, &view.inner) {
                self.unwire_gesture(&previous);
                previous.release_load_control(self);
                lcdebug!(from = previous.id(), to = view.id(), "load control moved");
            }
        }
        *self.inner.surface.borrow_mut() = view.downgrade();
        if self.inner.is_initialized.get() {
            self.wire_gesture(view);
        }
        lcdebug!(surface = view.id(), "load control attached");
    }

    pub(crate) fn detach_from(&self, view: &ScrollView) {
        self.unwire_gesture(view);
        *self.inner.surface.borrow_mut() = Weak::new();
        let mut slot = self.inner.indicator.borrow_mut();
        slot.attached = false;
        slot.hidden = true;
        lcdebug!(surface = view.id(), "load control detached");
    }

    fn wire_gesture(&self, view: &ScrollView) {
        if self.inner.gesture_target.get().is_some() {
            return;
        }
        let control = self.downgrade();
        let id = view.add_gesture_target(Rc::new(move |phase| {
            if let Some(inner) = control.upgrade() {
                LoadControl::from_inner(inner).handle_gesture(phase);
            }
        }));
        self.inner.gesture_target.set(Some(id));
    }

    fn unwire_gesture(&self, view: &ScrollView) {
        if let Some(id) = self.inner.gesture_target.take() {
            view.remove_gesture_target(id);
        }
    }

    /// A released finger may leave the indicator half on screen.
    fn handle_gesture(&self, phase: GesturePhase) {
        if !phase.is_terminal() || !self.is_loading() {
            return;
        }
        if let Some(view) = self.scroll_view() {
            view.scroll_to_indicator_if_needed(self, true, false);
        }
    }

    /// Runs the load callback if this control is still in the cycle that scheduled it.
    pub(crate) fn fire_callback(&self, cycle: u64) {
        if self.inner.cycle.get() != cycle || !self.is_loading() {
            return;
        }
        if self.state() == LoadState::Triggering {
            self.inner.state.set(LoadState::Loading);
        }
        let callback = self.inner.callback.borrow().clone();
        if let Some(callback) = callback {
            lcdebug!("invoking load callback");
            callback();
        }
    }

    /// The surface went away mid-cycle: there are no insets left to revert.
    pub(crate) fn finish_without_surface(&self) {
        self.inner.indicator_inset.set(0.0);
        self.inner.extra_end_inset.set(0.0);
        {
            let mut slot = self.inner.indicator.borrow_mut();
            slot.stop();
            slot.hidden = true;
        }
        self.inner.state.set(LoadState::Idle);
        lcdebug!("surface gone, loading cleared");
    }
}

impl fmt::Debug for LoadControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadControl")
            .field("state", &self.state())
            .field("is_initialized", &self.is_initialized())
            .field("indicator_inset", &self.inner.indicator_inset.get())
            .field("extra_end_inset", &self.inner.extra_end_inset.get())
            .field("options", &*self.inner.options.borrow())
            .field("indicator", &*self.inner.indicator.borrow())
            .finish_non_exhaustive()
    }
}
