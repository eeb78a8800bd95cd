use crate::*;

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

const VIEWPORT: Size = Size {
    width: 400.0,
    height: 800.0,
};

struct Harness {
    run_loop: RunLoop,
    view: ScrollView,
    control: LoadControl,
    calls: Rc<Cell<usize>>,
}

impl Harness {
    fn plain(content_height: f32, options: LoadControlOptions) -> Self {
        let run_loop = RunLoop::new();
        let view = ScrollView::new(&run_loop, VIEWPORT);
        view.set_content_size(Size::new(VIEWPORT.width, content_height));
        Self::attach(run_loop, view, options)
    }

    fn attach(run_loop: RunLoop, view: ScrollView, options: LoadControlOptions) -> Self {
        let control = LoadControl::with_options(options);
        view.set_load_control(Some(control.clone()));
        Self {
            run_loop,
            view,
            control,
            calls: Rc::new(Cell::new(0)),
        }
    }

    fn arm(&self) {
        let calls = Rc::clone(&self.calls);
        self.control.set_callback(move || calls.set(calls.get() + 1));
    }

    fn drag(&self, y: f32, velocity_y: f32) {
        if !self.view.is_dragging() {
            self.view.begin_drag();
        }
        self.view.drag_to(Point::new(0.0, y), Point::new(0.0, velocity_y));
    }

    fn settle(&self) {
        assert!(self.run_loop.run_until_idle(64));
    }
}

fn linear() -> LoadControlOptions {
    LoadControlOptions::new().with_timings(Timings {
        easing: Easing::Linear,
        ..Timings::default()
    })
}

struct Rows {
    count: Cell<usize>,
    height: f32,
}

impl ListLayout for Rows {
    fn number_of_sections(&self) -> usize {
        1
    }

    fn number_of_rows(&self, _section: usize) -> usize {
        self.count.get()
    }

    fn row_frame(&self, index: IndexPath) -> Rect {
        Rect::new(0.0, index.row as f32 * self.height, VIEWPORT.width, self.height)
    }

    fn size_that_fits(&self, width: f32) -> Size {
        Size::new(width, self.count.get() as f32 * self.height)
    }
}

#[test]
fn unarmed_control_ignores_everything() {
    let h = Harness::plain(2_000.0, linear());

    h.drag(1_500.0, -10.0);
    h.view.end_drag(GesturePhase::Ended);
    h.view.set_content_size(Size::new(400.0, 3_000.0));
    h.control.begin_loading();
    h.control.end_loading();
    h.control.remove_loading();
    h.settle();

    assert!(!h.control.is_loading());
    assert_eq!(h.view.content_inset(), EdgeInsets::ZERO);
    assert_eq!(h.calls.get(), 0);
    let indicator = h.control.indicator_view();
    assert!(indicator.hidden);
    assert!(!indicator.attached);
}

#[test]
fn crossing_twice_loads_once() {
    let h = Harness::plain(2_000.0, linear());
    h.arm();

    h.drag(1_150.0, -5.0);
    assert_eq!(h.control.state(), LoadState::Idle);

    h.drag(1_250.0, -5.0);
    assert_eq!(h.control.state(), LoadState::Triggering);
    assert_eq!(h.view.content_inset().bottom, 100.0);

    h.drag(1_300.0, -5.0);
    h.drag(1_320.0, 0.0);
    h.run_loop.advance_to(100);
    assert_eq!(h.control.state(), LoadState::Loading);
    h.drag(1_330.0, -5.0);
    h.run_loop.advance_to(1_000);

    assert_eq!(h.calls.get(), 1);
    assert_eq!(h.view.content_inset().bottom, 100.0);
}

#[test]
fn retreating_drag_does_not_trigger() {
    let h = Harness::plain(700.0, linear());
    h.arm();

    h.drag(10.0, 4.0);
    assert!(!h.control.is_loading());

    h.drag(10.0, -1.0);
    assert!(h.control.is_loading());

    let state = h.control.state_snapshot();
    assert_eq!(state.indicator_inset, 100.0);
    assert_eq!(state.extra_end_inset, 100.0);
    assert!(!state.scroll_to_start_when_finished);
    assert_eq!(h.view.content_inset().bottom, 200.0);
}

#[test]
fn full_cycle_restores_insets() {
    let run_loop = RunLoop::new();
    let view = ScrollView::new(&run_loop, VIEWPORT);
    view.set_content_size(Size::new(400.0, 2_000.0));
    let original = EdgeInsets::new(0.0, 0.0, 34.0, 0.0);
    view.set_content_inset(original);
    view.set_safe_area_insets(EdgeInsets::new(20.0, 0.0, 0.0, 0.0));
    let h = Harness::attach(run_loop, view, linear());
    h.arm();

    // 2000 - 800 + 34
    h.drag(1_230.0, -1.0);
    assert!(!h.control.is_loading());
    h.drag(1_240.0, -1.0);
    assert!(h.control.is_loading());
    assert_eq!(h.view.content_inset().bottom, 134.0);

    // Released half way into the indicator band: finish revealing it.
    h.view.end_drag(GesturePhase::Ended);
    assert_eq!(h.view.content_offset(), Point::new(0.0, 1_334.0));

    h.run_loop.advance_to(100);
    assert_eq!(h.calls.get(), 1);
    h.control.end_loading();
    h.settle();

    assert_eq!(h.control.state(), LoadState::Idle);
    assert_eq!(h.view.content_inset(), original);
    assert_eq!(h.view.presented_content_inset(), original);
    assert_eq!(h.control.state_snapshot().indicator_inset, 0.0);
    assert_eq!(h.control.state_snapshot().extra_end_inset, 0.0);
    assert!(h.control.indicator_view().hidden);
}

#[test]
fn should_load_false_suppresses_begin() {
    let h = Harness::plain(2_000.0, linear().with_should_load(Some(|| false)));
    h.arm();

    h.drag(1_500.0, -5.0);
    h.view.end_drag(GesturePhase::Ended);
    h.control.begin_loading();
    h.settle();

    assert!(!h.control.is_loading());
    assert_eq!(h.calls.get(), 0);
    assert_eq!(h.view.content_inset(), EdgeInsets::ZERO);
    assert!(h.control.indicator_view().hidden);
}

#[test]
fn programmatic_begin_reveals_and_end_reverts() {
    let impacts = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&impacts);
    let options = linear().with_feedback(Some(move |style: ImpactStyle, intensity: f32| {
        log.borrow_mut().push((style, intensity))
    }));
    let h = Harness::plain(2_000.0, options);
    h.arm();

    h.control.begin_loading();
    assert_eq!(*impacts.borrow(), [(ImpactStyle::Medium, 1.0_f32)]);
    assert_eq!(h.control.footprint(), 100.0);
    assert_eq!(h.control.state_snapshot().indicator_inset, 100.0);
    assert_eq!(h.view.content_inset().bottom, 100.0);

    let indicator = h.control.indicator_view();
    assert!(indicator.attached);
    assert!(!indicator.hidden);
    assert!(indicator.animating);
    assert_eq!(indicator.center, Point::new(200.0, 2_050.0));

    h.run_loop.advance_to(125);
    assert_eq!(h.view.presented_content_inset().bottom, 50.0);
    assert_eq!(h.calls.get(), 1);

    h.run_loop.advance_to(250);
    assert_eq!(h.view.content_offset(), Point::new(0.0, 1_300.0));

    h.control.end_loading();
    assert_eq!(h.control.state(), LoadState::Completing);
    h.run_loop.advance_to(999);
    assert_eq!(h.view.content_inset().bottom, 0.0);
    assert_eq!(h.control.state(), LoadState::Completing);

    h.run_loop.advance_to(1_000);
    assert_eq!(h.control.state(), LoadState::Idle);
    assert_eq!(h.view.presented_content_inset().bottom, 0.0);
    assert_eq!(h.view.content_offset(), Point::new(0.0, 1_300.0));
    let indicator = h.control.indicator_view();
    assert!(indicator.hidden);
    assert!(!indicator.animating);
}

#[test]
fn first_page_snaps_back_to_start() {
    let run_loop = RunLoop::new();
    let view = ScrollView::new(&run_loop, VIEWPORT);
    view.set_content_inset(EdgeInsets::new(30.0, 0.0, 0.0, 0.0));
    view.set_content_offset(Point::new(5.0, 50.0));
    let h = Harness::attach(run_loop, view, linear());
    h.arm();

    h.control.begin_loading();
    let state = h.control.state_snapshot();
    assert!(state.scroll_to_start_when_finished);
    // max(0, 800 - 30) is padded out so the indicator still sits at the end.
    assert_eq!(state.extra_end_inset, 770.0);
    assert_eq!(h.view.content_inset().bottom, 870.0);

    h.run_loop.advance_to(250);
    assert_eq!(h.view.content_offset(), Point::new(5.0, 70.0));

    h.view.set_content_size(Size::new(400.0, 1_000.0));
    h.control.end_loading();
    h.settle();

    assert_eq!(h.view.content_offset(), Point::new(5.0, -30.0));
    assert_eq!(h.view.content_inset(), EdgeInsets::new(30.0, 0.0, 0.0, 0.0));
    assert!(!h.control.is_loading());
}

#[test]
fn clearing_waits_while_dragging() {
    let h = Harness::plain(2_000.0, linear());
    h.arm();

    h.control.begin_loading();
    h.run_loop.advance_to(100);
    h.view.begin_drag();
    h.control.end_loading();

    h.run_loop.advance_to(850);
    assert_eq!(h.control.state(), LoadState::Completing);
    assert!(h.control.indicator_view().hidden);
    assert_eq!(h.view.content_inset().bottom, 0.0);

    h.run_loop.advance_to(1_349);
    assert_eq!(h.control.state(), LoadState::Completing);
    h.run_loop.advance_to(1_350);
    assert_eq!(h.control.state(), LoadState::Idle);
}

#[test]
fn end_loading_is_ignored_when_not_loading() {
    let h = Harness::plain(2_000.0, linear());
    h.arm();

    h.control.end_loading();
    assert!(h.run_loop.is_idle());

    h.control.begin_loading();
    h.run_loop.advance_to(100);
    h.control.end_loading();
    h.control.end_loading();
    h.settle();

    assert_eq!(h.control.state(), LoadState::Idle);
    assert_eq!(h.view.content_inset(), EdgeInsets::ZERO);
}

#[test]
fn ending_before_the_callback_still_runs_it() {
    let h = Harness::plain(2_000.0, linear());
    h.arm();

    h.control.begin_loading();
    h.control.end_loading();
    h.run_loop.advance_to(100);
    assert_eq!(h.calls.get(), 1);
    assert_eq!(h.control.state(), LoadState::Completing);

    h.settle();
    assert_eq!(h.control.state(), LoadState::Idle);
}

#[test]
fn remove_and_rearm() {
    let h = Harness::plain(2_000.0, linear());
    h.arm();
    h.arm();
    assert_eq!(h.view.gesture_target_count(), 1);

    h.control.remove_loading();
    h.control.remove_loading();
    assert!(!h.control.is_initialized());
    assert_eq!(h.view.gesture_target_count(), 0);
    assert!(!h.control.indicator_view().attached);

    h.drag(1_500.0, -5.0);
    assert!(!h.control.is_loading());
    h.view.end_drag(GesturePhase::Cancelled);

    h.arm();
    assert_eq!(h.view.gesture_target_count(), 1);
    h.drag(1_500.0, -5.0);
    assert!(h.control.is_loading());
    h.run_loop.advance_to(100);
    assert_eq!(h.calls.get(), 1);
}

#[test]
fn callback_before_attach_wires_on_attach() {
    let run_loop = RunLoop::new();
    let view = ScrollView::new(&run_loop, VIEWPORT);
    let control = LoadControl::new();
    control.set_callback(|| {});
    assert!(control.is_initialized());
    assert!(control.scroll_view().is_none());

    view.set_load_control(Some(control.clone()));
    assert_eq!(view.gesture_target_count(), 1);
    assert!(control.scroll_view().is_some());

    let replacement = LoadControl::new();
    view.set_load_control(Some(replacement.clone()));
    assert_eq!(view.gesture_target_count(), 0);
    assert!(control.scroll_view().is_none());
    assert!(view.load_control().is_some_and(|c| c.ptr_eq(&replacement)));

    view.set_load_control(None);
    assert!(replacement.scroll_view().is_none());
    assert!(view.indicator().is_none());
}

#[test]
fn horizontal_uses_width_and_right_inset() {
    let run_loop = RunLoop::new();
    let view = ScrollView::new(&run_loop, Size::new(300.0, 120.0));
    view.set_content_size(Size::new(900.0, 120.0));
    let h = Harness::attach(run_loop, view, linear().with_direction(Direction::Horizontal));
    h.arm();

    h.view.begin_drag();
    h.view.drag_to(Point::new(590.0, 0.0), Point::new(-3.0, 0.0));
    assert!(!h.control.is_loading());
    h.view.drag_to(Point::new(650.0, 0.0), Point::new(-3.0, 0.0));
    assert!(h.control.is_loading());

    assert_eq!(h.view.content_inset(), EdgeInsets::new(0.0, 0.0, 0.0, 100.0));
    assert_eq!(h.control.indicator_view().center, Point::new(950.0, 60.0));

    h.view.end_drag(GesturePhase::Ended);
    assert_eq!(h.view.content_offset(), Point::new(700.0, 0.0));
}

#[test]
fn trigger_offset_starts_loading_early() {
    let h = Harness::plain(2_000.0, linear());
    h.arm();
    h.control.update_options(|o| o.trigger_offset = 200.0);

    h.drag(1_050.0, 0.0);
    assert!(h.control.is_loading());
}

#[test]
fn accessibility_reading_triggers_without_drag() {
    let h = Harness::plain(2_000.0, linear());
    h.arm();

    h.view.set_content_offset(Point::new(0.0, 1_250.0));
    assert!(!h.control.is_loading());

    h.view.set_accessibility_reading(true);
    h.view.set_content_offset(Point::new(0.0, 1_260.0));
    assert!(h.control.is_loading());
}

#[test]
fn content_size_changes_move_the_indicator() {
    let h = Harness::plain(2_000.0, linear());
    h.arm();

    h.view.set_content_size(Size::new(400.0, 3_000.0));
    let indicator = h.control.indicator_view();
    assert!(indicator.attached);
    assert!(indicator.hidden);
    assert_eq!(indicator.center, Point::new(200.0, 3_050.0));
}

#[test]
fn lists_reveal_by_scrolling_to_the_last_row() {
    let run_loop = RunLoop::new();
    let rows = Rc::new(Rows {
        count: Cell::new(20),
        height: 100.0,
    });
    let view = ScrollView::with_list(&run_loop, VIEWPORT, rows.clone());
    view.force_update_content_size();
    assert_eq!(view.content_size().height, 2_000.0);
    assert_eq!(view.last_index_path(), Some(IndexPath::new(0, 19)));
    let h = Harness::attach(run_loop, view, linear());
    h.arm();

    h.drag(1_250.0, -1.0);
    assert!(h.control.is_loading());
    h.view.end_drag(GesturePhase::Ended);

    // Row 19 at the top is past the end, so it clamps to the fully revealed indicator. The
    // inset animation ends mid-scroll and restarts the scroll from where it is.
    h.run_loop.advance_to(250);
    assert!(h.view.content_offset().y < 1_300.0);
    h.run_loop.advance_to(500);
    assert_eq!(h.view.content_offset(), Point::new(0.0, 1_300.0));
    assert_eq!(h.calls.get(), 1);

    rows.count.set(30);
    h.control.end_loading();
    h.settle();

    assert_eq!(h.view.content_size().height, 3_000.0);
    assert_eq!(h.view.content_offset(), Point::new(0.0, 1_300.0));
    assert_eq!(h.view.content_inset(), EdgeInsets::ZERO);
    assert!(!h.control.is_loading());
}

#[test]
fn empty_list_counts_as_no_content() {
    let run_loop = RunLoop::new();
    let rows = Rc::new(Rows {
        count: Cell::new(0),
        height: 1.0,
    });
    let view = ScrollView::with_list(&run_loop, VIEWPORT, rows);
    view.set_content_size(Size::new(400.0, 1.0));
    assert_eq!(view.last_index_path(), None);
    let h = Harness::attach(run_loop, view, linear());
    h.arm();

    h.control.begin_loading();
    assert!(h.control.state_snapshot().scroll_to_start_when_finished);
}

#[test]
fn dropped_surface_makes_pending_work_a_no_op() {
    let h = Harness::plain(2_000.0, linear());
    h.arm();
    h.control.begin_loading();

    let Harness {
        run_loop,
        view,
        control,
        calls,
    } = h;
    drop(view);

    assert!(run_loop.run_until_idle(64));
    assert_eq!(calls.get(), 0);
    assert!(control.scroll_view().is_none());
    assert_eq!(control.state(), LoadState::Idle);

    control.end_loading();
    control.begin_loading();
    assert!(run_loop.is_idle());
}

#[test]
fn touch_down_stops_the_row_scroll() {
    let run_loop = RunLoop::new();
    let rows = Rc::new(Rows {
        count: Cell::new(20),
        height: 100.0,
    });
    let view = ScrollView::with_list(&run_loop, VIEWPORT, rows);
    view.force_update_content_size();
    let h = Harness::attach(run_loop, view, linear());
    h.arm();
    let scrolling = AnimationKey::new(h.view.id(), "content_offset");

    h.control.begin_loading();
    h.run_loop.advance_to(300);
    assert!(h.run_loop.is_animating(scrolling));
    assert_eq!(h.view.content_offset(), Point::new(0.0, 260.0));

    h.drag(200.0, 5.0);
    assert!(!h.run_loop.is_animating(scrolling));
    h.run_loop.advance_to(316);
    assert_eq!(h.view.content_offset(), Point::new(0.0, 200.0));
    h.run_loop.advance_to(600);
    assert_eq!(h.view.content_offset(), Point::new(0.0, 200.0));
}

#[test]
fn half_visible_indicator_is_hidden_after_loading() {
    let h = Harness::plain(2_000.0, linear());
    h.arm();

    h.drag(1_250.0, -1.0);
    h.view.end_drag(GesturePhase::Ended);
    h.run_loop.advance_to(250);
    assert_eq!(h.calls.get(), 1);

    // Deceleration leaves the indicator half on screen.
    h.view.set_content_offset(Point::new(0.0, 1_250.0));
    h.control.end_loading();

    h.run_loop.advance_to(999);
    assert_eq!(h.view.content_offset(), Point::new(0.0, 1_250.0));
    h.run_loop.advance_to(1_000);
    assert_eq!(h.view.content_offset(), Point::new(0.0, 1_200.0));

    h.settle();
    assert_eq!(h.control.state(), LoadState::Idle);
    assert_eq!(h.view.content_inset(), EdgeInsets::ZERO);
}

#[test]
fn moving_a_control_empties_the_old_surface() {
    let h = Harness::plain(2_000.0, linear());
    h.arm();
    let other = ScrollView::new(&h.run_loop, VIEWPORT);
    other.set_content_size(Size::new(400.0, 2_000.0));

    other.set_load_control(Some(h.control.clone()));
    assert!(h.view.load_control().is_none());
    assert_eq!(h.view.gesture_target_count(), 0);
    assert_eq!(other.gesture_target_count(), 1);
    assert!(h.control.scroll_view().is_some_and(|v| v.id() == other.id()));

    h.drag(1_500.0, -5.0);
    assert!(!h.control.is_loading());

    other.begin_drag();
    other.drag_to(Point::new(0.0, 1_500.0), Point::new(0.0, -5.0));
    assert!(h.control.is_loading());
}
