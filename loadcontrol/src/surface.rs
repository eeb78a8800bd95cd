use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::geometry::sanitize;
use crate::indicator::IndicatorView;
use crate::run_loop::AnimationKey;
use crate::{EdgeInsets, Easing, GesturePhase, IndexPath, LoadControl, Point, Rect, RowPosition, RunLoop, Size};

/// Row structure of a list-like surface (a table).
///
/// Self-sizing rows make raw offsets unreliable, so list-like surfaces are scrolled by row and
/// asked to recompute their content size before the control measures them.
pub trait ListLayout {
    fn number_of_sections(&self) -> usize;
    fn number_of_rows(&self, section: usize) -> usize;
    /// Frame of a row in content coordinates.
    fn row_frame(&self, index: IndexPath) -> Rect;
    /// Content size that fits all rows for the given viewport width.
    fn size_that_fits(&self, width: f32) -> Size;
}

/// Receives pan gesture phases.
pub type GestureTarget = Rc<dyn Fn(GesturePhase)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GestureTargetId(u64);

#[derive(Clone, Copy, Debug, Default)]
struct Frame {
    bounds: Size,
    content_size: Size,
    content_offset: Point,
    content_inset: EdgeInsets,
    safe_area: EdgeInsets,
    presented_inset: EdgeInsets,
}

pub(crate) struct SurfaceInner {
    id: u64,
    run_loop: RunLoop,
    frame: RefCell<Frame>,
    is_dragging: Cell<bool>,
    pan_velocity: Cell<Point>,
    accessibility_reading: Cell<bool>,
    list: Option<Rc<dyn ListLayout>>,
    load_control: RefCell<Option<LoadControl>>,
    gesture_targets: RefCell<Vec<(GestureTargetId, GestureTarget)>>,
    next_target: Cell<u64>,
}

/// The host scroll surface.
///
/// A cheap-to-clone handle. Offset and content-size changes go through explicit setters, which
/// synchronously notify an attached, armed [`LoadControl`]. The surface owns its control; the
/// control only keeps a weak reference back.
#[derive(Clone)]
pub struct ScrollView {
    pub(crate) inner: Rc<SurfaceInner>,
}

impl ScrollView {
    /// Creates a plain scroll surface with the given viewport size.
    pub fn new(run_loop: &RunLoop, bounds: Size) -> Self {
        Self::build(run_loop, bounds, None)
    }

    /// Creates a list-like surface whose rows come from `layout`.
    pub fn with_list(run_loop: &RunLoop, bounds: Size, layout: Rc<dyn ListLayout>) -> Self {
        Self::build(run_loop, bounds, Some(layout))
    }

    fn build(run_loop: &RunLoop, bounds: Size, list: Option<Rc<dyn ListLayout>>) -> Self {
        Self {
            inner: Rc::new(SurfaceInner {
                id: run_loop.allocate_owner_id(),
                run_loop: run_loop.clone(),
                frame: RefCell::new(Frame {
                    bounds,
                    ..Frame::default()
                }),
                is_dragging: Cell::new(false),
                pan_velocity: Cell::new(Point::ZERO),
                accessibility_reading: Cell::new(false),
                list,
                load_control: RefCell::new(None),
                gesture_targets: RefCell::new(Vec::new()),
                next_target: Cell::new(0),
            }),
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<SurfaceInner> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn from_inner(inner: Rc<SurfaceInner>) -> Self {
        Self { inner }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn run_loop(&self) -> &RunLoop {
        &self.inner.run_loop
    }

    pub fn is_list(&self) -> bool {
        self.inner.list.is_some()
    }

    // --- load control attachment ---

    pub fn load_control(&self) -> Option<LoadControl> {
        self.inner.load_control.borrow().clone()
    }

    /// Attaches `control` (or detaches with `None`).
    ///
    /// A replaced control loses its gesture wiring and its back-reference.
    pub fn set_load_control(&self, control: Option<LoadControl>) {
        let previous = self.inner.load_control.replace(control.clone());
        if let Some(previous) = previous {
            if control.as_ref().is_some_and(|c| c.ptr_eq(&previous)) {
                return;
            }
            previous.detach_from(self);
        }
        if let Some(control) = control {
            control.attach_to(self);
        }
    }

    /// Empties the slot if it still holds `control`, which has moved to another surface.
    pub(crate) fn release_load_control(&self, control: &LoadControl) {
        let mut slot = self.inner.load_control.borrow_mut();
        if slot.as_ref().is_some_and(|c| c.ptr_eq(control)) {
            *slot = None;
        }
    }

    /// The attached control, if it has been armed with a callback.
    pub(crate) fn armed_control(&self) -> Option<LoadControl> {
        self.load_control().filter(|c| c.is_initialized())
    }

    // --- geometry ---

    pub fn bounds(&self) -> Size {
        self.inner.frame.borrow().bounds
    }

    pub fn set_bounds(&self, bounds: Size) {
        self.inner.frame.borrow_mut().bounds =
            Size::new(sanitize(bounds.width), sanitize(bounds.height));
    }

    pub fn content_size(&self) -> Size {
        self.inner.frame.borrow().content_size
    }

    /// Sets the content size and repositions the indicator of an armed control.
    pub fn set_content_size(&self, size: Size) {
        let size = Size::new(sanitize(size.width), sanitize(size.height));
        self.inner.frame.borrow_mut().content_size = size;
        if let Some(control) = self.armed_control() {
            self.loading_content_size_changed(&control, size);
        }
    }

    pub fn content_offset(&self) -> Point {
        self.inner.frame.borrow().content_offset
    }

    /// Sets the content offset and runs the trigger check of an armed control.
    pub fn set_content_offset(&self, offset: Point) {
        let offset = Point::new(sanitize(offset.x), sanitize(offset.y));
        self.inner.frame.borrow_mut().content_offset = offset;
        if let Some(control) = self.armed_control() {
            self.loading_did_scroll(&control, offset);
        }
    }

    /// Animates the content offset to `target`; every frame goes through `set_content_offset`.
    pub fn set_content_offset_animated(&self, target: Point, duration_ms: u64, easing: Easing) {
        let from = self.content_offset();
        let weak = self.downgrade();
        self.inner.run_loop.animate(
            AnimationKey::new(self.inner.id, "content_offset"),
            duration_ms,
            easing,
            move |p| {
                if let Some(inner) = weak.upgrade() {
                    let at = Point::new(from.x + (target.x - from.x) * p, from.y + (target.y - from.y) * p);
                    ScrollView::from_inner(inner).set_content_offset(at);
                }
            },
            |_| {},
        );
    }

    pub fn content_inset(&self) -> EdgeInsets {
        self.inner.frame.borrow().content_inset
    }

    /// Sets the content inset without animation.
    pub fn set_content_inset(&self, inset: EdgeInsets) {
        let mut frame = self.inner.frame.borrow_mut();
        frame.content_inset = inset;
        frame.presented_inset = inset;
    }

    /// Sets the model inset now and animates what is presented.
    ///
    /// `completion` receives `false` if a later inset animation interrupted this one.
    pub(crate) fn animate_content_inset(
        &self,
        inset: EdgeInsets,
        duration_ms: u64,
        easing: Easing,
        completion: impl FnOnce(bool) + 'static,
    ) {
        let from = {
            let mut frame = self.inner.frame.borrow_mut();
            frame.content_inset = inset;
            frame.presented_inset
        };
        let weak = self.downgrade();
        self.inner.run_loop.animate(
            AnimationKey::new(self.inner.id, "content_inset"),
            duration_ms,
            easing,
            move |p| {
                if let Some(inner) = weak.upgrade() {
                    inner.frame.borrow_mut().presented_inset = from.lerp(&inset, p);
                }
            },
            completion,
        );
    }

    /// The inset currently on screen, which trails `content_inset` while animating.
    pub fn presented_content_inset(&self) -> EdgeInsets {
        self.inner.frame.borrow().presented_inset
    }

    pub fn safe_area_insets(&self) -> EdgeInsets {
        self.inner.frame.borrow().safe_area
    }

    pub fn set_safe_area_insets(&self, insets: EdgeInsets) {
        self.inner.frame.borrow_mut().safe_area = insets;
    }

    /// Content inset plus safe area.
    pub fn adjusted_content_inset(&self) -> EdgeInsets {
        let frame = self.inner.frame.borrow();
        frame.content_inset + frame.safe_area
    }

    /// Largest main-axis offsets the surface can rest at: `(x, y)`.
    pub fn max_content_offset(&self) -> Point {
        let frame = self.inner.frame.borrow();
        let inset = frame.content_inset + frame.safe_area;
        let max_x = frame.content_size.width + inset.right - frame.bounds.width;
        let max_y = frame.content_size.height + inset.bottom - frame.bounds.height;
        Point::new(max_x.max(-inset.left), max_y.max(-inset.top))
    }

    // --- drag signal ---

    pub fn is_dragging(&self) -> bool {
        self.inner.is_dragging.get()
    }

    pub fn pan_velocity(&self) -> Point {
        self.inner.pan_velocity.get()
    }

    /// Touch down. Stops any animated offset scroll so the finger owns the offset.
    pub fn begin_drag(&self) {
        self.inner
            .run_loop
            .cancel(AnimationKey::new(self.inner.id, "content_offset"));
        self.inner.is_dragging.set(true);
        self.inner.pan_velocity.set(Point::ZERO);
        self.notify_gesture(GesturePhase::Began);
    }

    /// Moves content under the finger.
    ///
    /// `velocity` follows the pan convention: negative along the axis while the finger pushes
    /// content toward its end.
    pub fn drag_to(&self, offset: Point, velocity: Point) {
        self.inner.pan_velocity.set(velocity);
        self.set_content_offset(offset);
        self.notify_gesture(GesturePhase::Changed);
    }

    /// Ends the drag, then reports the terminal `phase` to gesture targets.
    pub fn end_drag(&self, phase: GesturePhase) {
        debug_assert!(phase.is_terminal(), "end_drag with {phase:?}");
        self.inner.is_dragging.set(false);
        self.inner.pan_velocity.set(Point::ZERO);
        self.notify_gesture(phase);
    }

    pub fn is_accessibility_reading(&self) -> bool {
        self.inner.accessibility_reading.get()
    }

    /// Screen-reader mode: offset changes run the trigger check even without a drag.
    pub fn set_accessibility_reading(&self, reading: bool) {
        self.inner.accessibility_reading.set(reading);
    }

    pub fn add_gesture_target(&self, target: GestureTarget) -> GestureTargetId {
        let id = GestureTargetId(self.inner.next_target.get());
        self.inner.next_target.set(id.0.wrapping_add(1));
        self.inner.gesture_targets.borrow_mut().push((id, target));
        id
    }

    pub fn remove_gesture_target(&self, id: GestureTargetId) {
        self.inner
            .gesture_targets
            .borrow_mut()
            .retain(|(target_id, _)| *target_id != id);
    }

    pub fn gesture_target_count(&self) -> usize {
        self.inner.gesture_targets.borrow().len()
    }

    fn notify_gesture(&self, phase: GesturePhase) {
        let targets: Vec<GestureTarget> = self
            .inner
            .gesture_targets
            .borrow()
            .iter()
            .map(|(_, t)| Rc::clone(t))
            .collect();
        for target in targets {
            target(phase);
        }
    }

    // --- list-like surfaces ---

    /// Recomputes content size from the list layout. No-op for plain surfaces.
    pub fn force_update_content_size(&self) {
        let Some(list) = self.inner.list.clone() else {
            return;
        };
        let width = self.bounds().width;
        self.set_content_size(list.size_that_fits(width));
    }

    pub fn last_index_path(&self) -> Option<IndexPath> {
        let list = self.inner.list.as_ref()?;
        let last_section = list.number_of_sections().checked_sub(1)?;
        let last_row = list.number_of_rows(last_section).checked_sub(1)?;
        Some(IndexPath::new(last_section, last_row))
    }

    /// Scrolls so the row sits at the top or bottom of the viewport, within scrollable range.
    pub fn scroll_to_row(&self, index: IndexPath, position: RowPosition, animation: Option<(u64, Easing)>) {
        let Some(list) = self.inner.list.clone() else {
            return;
        };
        let row = list.row_frame(index);
        let inset = self.adjusted_content_inset();
        let wanted = match position {
            RowPosition::Top => row.min_y() - inset.top,
            RowPosition::Bottom => row.max_y() - self.bounds().height + inset.bottom,
        };
        let y = wanted.clamp(-inset.top, self.max_content_offset().y);
        let target = Point::new(self.content_offset().x, y);
        match animation {
            Some((duration_ms, easing)) => self.set_content_offset_animated(target, duration_ms, easing),
            None => self.set_content_offset(target),
        }
    }

    // --- presentation ---

    /// Indicator placement of the attached control, for drawing.
    pub fn indicator(&self) -> Option<IndicatorView> {
        self.load_control().map(|c| c.indicator_view())
    }
}

impl fmt::Debug for ScrollView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = *self.inner.frame.borrow();
        f.debug_struct("ScrollView")
            .field("id", &self.inner.id)
            .field("bounds", &frame.bounds)
            .field("content_size", &frame.content_size)
            .field("content_offset", &frame.content_offset)
            .field("content_inset", &frame.content_inset)
            .field("is_dragging", &self.inner.is_dragging.get())
            .field("is_list", &self.inner.list.is_some())
            .finish_non_exhaustive()
    }
}
