// Example: a horizontal carousel that stops loading after three pages.
use std::cell::Cell;
use std::rc::Rc;

use loadcontrol::{Direction, LoadControl, LoadControlOptions, Point, RunLoop, ScrollView, Size};

const PAGE_WIDTH: f32 = 600.0;
const MAX_PAGES: u32 = 3;

fn main() {
    let run_loop = RunLoop::new();
    let view = ScrollView::new(&run_loop, Size::new(360.0, 160.0));
    view.set_content_size(Size::new(PAGE_WIDTH, 160.0));

    let pages = Rc::new(Cell::new(1u32));
    let remaining = Rc::clone(&pages);
    let options = LoadControlOptions::new()
        .with_direction(Direction::Horizontal)
        .with_trigger_offset(40.0)
        .with_should_load(Some(move || remaining.get() < MAX_PAGES));
    let control = LoadControl::with_options(options);
    view.set_load_control(Some(control.clone()));

    let loading = Rc::new(Cell::new(false));
    let flag = Rc::clone(&loading);
    control.set_callback(move || flag.set(true));

    for round in 0..5 {
        let end = view.content_size().width - view.bounds().width;
        view.begin_drag();
        view.drag_to(Point::new(end, 0.0), Point::new(-8.0, 0.0));
        view.end_drag(loadcontrol::GesturePhase::Ended);
        run_loop.run_until_idle(64);

        if loading.replace(false) {
            pages.set(pages.get() + 1);
            let width = PAGE_WIDTH * pages.get() as f32;
            view.set_content_size(Size::new(width, 160.0));
            control.end_loading();
            run_loop.run_until_idle(64);
        }

        println!(
            "round {round}: pages={} width={} state={:?}",
            pages.get(),
            view.content_size().width,
            control.state_snapshot()
        );
    }
}
