//! The loading sequences, run against the surface whenever it reports a geometry change, a drag
//! end, or a lifecycle call on the control.
//!
//! Each deferred step holds weak references and upgrades them when it runs, so a surface or
//! control that is dropped mid-sequence turns the remaining steps into no-ops.

use crate::geometry::Geometry;
use crate::{Direction, ImpactStyle, LoadControl, LoadState, Point, RowPosition, ScrollView, Size};

impl ScrollView {
    pub(crate) fn geometry_for(&self, control: &LoadControl) -> Geometry {
        Geometry {
            direction: control.direction(),
            bounds: self.bounds(),
            content_size: self.content_size(),
            content_offset: self.content_offset(),
            adjusted_inset: self.adjusted_content_inset(),
            indicator_inset: control.inner.indicator_inset.get(),
            extra_end_inset: control.inner.extra_end_inset.get(),
        }
    }

    /// Empty lists still report a content extent of 1.
    fn has_content(&self, direction: Direction) -> bool {
        let empty = if self.is_list() { 1.0 } else { 0.0 };
        direction.extent(self.content_size()) > empty
    }

    pub(crate) fn loading_did_scroll(&self, control: &LoadControl, offset: Point) {
        if !self.is_dragging() && !self.is_accessibility_reading() {
            return;
        }

        let trigger_offset = control.inner.options.borrow().trigger_offset;
        let geometry = Geometry {
            content_offset: offset,
            ..self.geometry_for(control)
        };
        if geometry.crosses_threshold(trigger_offset, self.pan_velocity()) {
            lctrace!(
                offset = geometry.direction.main(offset),
                action_offset = geometry.action_offset(trigger_offset),
                "threshold crossed"
            );
            self.begin_loading_if_needed(control, false);
        }
    }

    pub(crate) fn loading_content_size_changed(&self, control: &LoadControl, content_size: Size) {
        self.position_indicator(control, content_size);
    }

    /// Centers the indicator in the footprint past the content end.
    fn position_indicator(&self, control: &LoadControl, content_size: Size) {
        let center = self
            .geometry_for(control)
            .indicator_center(content_size, control.footprint());

        let mut slot = control.inner.indicator.borrow_mut();
        if !slot.attached {
            slot.attached = true;
            lctrace!(surface = self.id(), "indicator attached");
        }
        if slot.center != center {
            slot.center = center;
        }
    }

    pub(crate) fn begin_loading_if_needed(&self, control: &LoadControl, force_scroll: bool) {
        if control.is_loading() {
            return;
        }

        let should_load = control.inner.options.borrow().should_load.clone();
        if should_load.is_some_and(|allowed| !allowed()) {
            lcdebug!("loading suppressed by should_load");
            return;
        }

        self.start_loading_animation(control, force_scroll);

        // Give a fling time to decelerate before the consumer starts its work.
        let cycle = control.inner.cycle.get();
        let delay = control.inner.options.borrow().timings.callback_delay_ms;
        let weak_control = control.downgrade();
        let weak_view = self.downgrade();
        self.run_loop().delay(delay, move || {
            let Some(control) = weak_control.upgrade().map(LoadControl::from_inner) else {
                return;
            };
            if weak_view.upgrade().is_none() {
                lcwarn!("surface dropped before the load callback ran");
                control.finish_without_surface();
                return;
            }
            control.fire_callback(cycle);
        });
    }

    fn start_loading_animation(&self, control: &LoadControl, force_scroll: bool) {
        let options = control.options();
        let direction = options.direction;

        control.inner.indicator.borrow_mut().start();
        if let Some(feedback) = &options.feedback {
            feedback.impact(ImpactStyle::Medium, 1.0);
        }
        self.position_indicator(control, self.content_size());
        control.inner.indicator.borrow_mut().hidden = false;

        let footprint = control.footprint();
        let extra = self.geometry_for(control).extra_end_inset_needed();
        let mut inset = self.content_inset();
        *inset.end_mut(direction) += footprint + extra;

        let cycle = control.inner.cycle.get().wrapping_add(1);
        control.inner.cycle.set(cycle);
        control.inner.indicator_inset.set(footprint);
        control.inner.extra_end_inset.set(extra);
        control.inner.state.set(LoadState::Triggering);
        control
            .inner
            .scroll_to_start_when_finished
            .set(!self.has_content(direction));
        lcdebug!(cycle, footprint, extra, "loading started, trailing inset grown");

        let weak_control = control.downgrade();
        let weak_view = self.downgrade();
        self.animate_content_inset(
            inset,
            options.timings.inset_animation_ms,
            options.timings.easing,
            move |finished| {
                if !finished {
                    return;
                }
                let (Some(control), Some(view)) = (weak_control.upgrade(), weak_view.upgrade()) else {
                    return;
                };
                ScrollView::from_inner(view).scroll_to_indicator_if_needed(
                    &LoadControl::from_inner(control),
                    true,
                    force_scroll,
                );
            },
        );
    }

    pub(crate) fn stop_loading_animation(&self, control: &LoadControl) {
        let options = control.options();
        let direction = options.direction;

        control.inner.indicator.borrow_mut().stop();
        self.force_update_content_size();

        let removed = control.inner.indicator_inset.get() + control.inner.extra_end_inset.get();
        let mut inset = self.content_inset();
        *inset.end_mut(direction) -= removed;
        control.inner.indicator_inset.set(0.0);
        control.inner.extra_end_inset.set(0.0);
        lcdebug!(removed, "loading finished, trailing inset reverted");

        let cycle = control.inner.cycle.get();
        let clear_delay = options.timings.clear_delay_ms;
        let run_loop = self.run_loop().clone();
        let weak_control = control.downgrade();
        let weak_view = self.downgrade();
        self.animate_content_inset(
            inset,
            options.timings.inset_animation_ms,
            options.timings.easing,
            move |finished| {
                let Some(control) = weak_control.upgrade().map(LoadControl::from_inner) else {
                    return;
                };
                if control.inner.cycle.get() != cycle {
                    return;
                }
                let view = weak_view.upgrade().map(ScrollView::from_inner);

                if let (true, Some(view)) = (finished, &view) {
                    if control.inner.scroll_to_start_when_finished.get() {
                        view.scroll_to_start(&control);
                    } else {
                        view.scroll_to_indicator_if_needed(&control, false, false);
                    }
                }
                control.inner.indicator.borrow_mut().hidden = true;

                let clear = {
                    let weak_control = control.downgrade();
                    move || {
                        let Some(inner) = weak_control.upgrade() else {
                            return;
                        };
                        if inner.cycle.get() == cycle && inner.state.get() == LoadState::Completing {
                            inner.state.set(LoadState::Idle);
                            lcdebug!(cycle, "loading cleared");
                        }
                    }
                };
                // Clearing while the finger is down would let the same drag trigger again.
                if view.is_some_and(|v| v.is_dragging()) {
                    run_loop.delay(clear_delay, clear);
                } else {
                    run_loop.immediately(clear);
                }
            },
        );
    }

    /// Snaps to the leading edge, keeping the cross-axis offset.
    fn scroll_to_start(&self, control: &LoadControl) {
        let start = self.geometry_for(control).start_offset();
        lcdebug!("scrolling back to start");
        self.set_content_offset(start);
    }

    /// Settles a half-visible indicator: `reveal` scrolls it fully in, otherwise fully out.
    /// `force` scrolls even when the indicator is not in the band.
    pub(crate) fn scroll_to_indicator_if_needed(&self, control: &LoadControl, reveal: bool, force: bool) {
        if self.is_dragging() || !control.is_loading() {
            return;
        }

        self.force_update_content_size();
        let geometry = self.geometry_for(control);
        let footprint = control.footprint();
        if !force && !geometry.is_partially_revealed(footprint) {
            return;
        }

        // Self-sizing rows make raw offsets unreliable on lists.
        if geometry.direction == Direction::Vertical {
            if let Some(last) = self.last_index_path() {
                let timings = control.inner.options.borrow().timings;
                let position = if reveal {
                    RowPosition::Top
                } else {
                    RowPosition::Bottom
                };
                lcdebug!(reveal, section = last.section, row = last.row, "scrolling to last row");
                self.scroll_to_row(last, position, Some((timings.scroll_animation_ms, timings.easing)));
                return;
            }
        }

        let (min, max) = geometry.indicator_band(footprint);
        let target = if reveal { max } else { min };
        lcdebug!(reveal, target, "scrolling to indicator edge");
        self.set_content_offset(geometry.content_offset.with_main(geometry.direction, target));
    }
}
