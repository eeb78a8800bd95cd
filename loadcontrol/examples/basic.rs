// Example: arm a control, drag past the end, finish the load.
use std::cell::Cell;
use std::rc::Rc;

use loadcontrol::{GesturePhase, LoadControl, Point, RunLoop, ScrollView, Size};

fn main() {
    let run_loop = RunLoop::new();
    let view = ScrollView::new(&run_loop, Size::new(400.0, 800.0));
    view.set_content_size(Size::new(400.0, 2_000.0));

    let control = LoadControl::new();
    view.set_load_control(Some(control.clone()));

    let pages = Rc::new(Cell::new(1u32));
    let p = Rc::clone(&pages);
    control.set_callback(move || {
        p.set(p.get() + 1);
        println!("load callback: fetching page {}", p.get());
    });

    // The user drags toward the end; the threshold is 2000 - 800.
    view.begin_drag();
    for y in (1_000..=1_260).step_by(20) {
        view.drag_to(Point::new(0.0, y as f32), Point::new(0.0, -12.0));
    }
    view.end_drag(GesturePhase::Ended);
    println!(
        "released: state={:?} offset={:?} inset={:?}",
        control.state(),
        view.content_offset(),
        view.content_inset()
    );

    // A frame loop would call advance_to every 16ms.
    let mut now = 0u64;
    while now < 300 {
        now += 16;
        run_loop.advance_to(now);
    }

    // The page arrived.
    view.set_content_size(Size::new(400.0, 3_000.0));
    control.end_loading();
    run_loop.run_until_idle(64);

    println!(
        "done: state={:?} pages={} inset={:?} indicator={:?}",
        control.state(),
        pages.get(),
        view.content_inset(),
        view.indicator()
    );
}
