//! A scripted user session: an empty feed loads its first page, then the user keeps dragging
//! to the end until the feed runs out.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use loadcontrol::{
    Direction, EdgeInsets, GesturePhase, ImpactStyle, LoadControl, LoadControlOptions,
    LoadControlState, Point, RunLoop, ScrollView, Size,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::feed::{Comment, CommentSource, FeedError, FeedViewModel};
use crate::table::CommentTable;

const FRAME_MS: u64 = 16;
const DRAG_STEP: f32 = 40.0;
const DRAG_VELOCITY: f32 = 900.0;
/// How far past the end the finger pulls.
const OVERSCROLL: f32 = 60.0;
const CROSS_EXTENT: f32 = 390.0;
const MAX_WAIT_FRAMES: usize = 256;
const MAX_SETTLE_TURNS: usize = 256;

#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    pub row_height: f32,
    pub viewport: f32,
    pub direction: Direction,
    pub trigger_offset: f32,
    pub max_pages: Option<u32>,
    pub latency_ms: u64,
}

/// What the session ended with, printed as JSON.
#[derive(Debug, Serialize)]
pub struct SessionReport {
    pub pages_loaded: u32,
    pub comments: usize,
    pub loads: u32,
    pub content_size: Size,
    pub content_offset: Point,
    pub content_inset: EdgeInsets,
    pub control: LoadControlState,
    pub last_comment: Option<Comment>,
}

pub struct Session {
    config: SessionConfig,
    run_loop: RunLoop,
    view: ScrollView,
    control: LoadControl,
    table: Rc<CommentTable>,
    feed: Rc<RefCell<FeedViewModel>>,
    requested: Rc<Cell<bool>>,
    loads: u32,
}

impl Session {
    pub fn new(config: SessionConfig, source: CommentSource) -> Self {
        let run_loop = RunLoop::new();
        let table = Rc::new(CommentTable::new(CROSS_EXTENT, config.row_height));
        let view = match config.direction {
            Direction::Vertical => ScrollView::with_list(
                &run_loop,
                Size::new(CROSS_EXTENT, config.viewport),
                table.clone(),
            ),
            Direction::Horizontal => {
                ScrollView::new(&run_loop, Size::new(config.viewport, CROSS_EXTENT))
            }
        };

        let feed = Rc::new(RefCell::new(FeedViewModel::new(source, config.max_pages)));
        let has_more = Rc::clone(&feed);
        let options = LoadControlOptions::new()
            .with_direction(config.direction)
            .with_trigger_offset(config.trigger_offset)
            .with_should_load(Some(move || has_more.borrow().has_more()))
            .with_feedback(Some(|style: ImpactStyle, intensity: f32| {
                debug!(?style, intensity, "haptic impact");
            }));
        let control = LoadControl::with_options(options);
        view.set_load_control(Some(control.clone()));

        let requested = Rc::new(Cell::new(false));
        let flag = Rc::clone(&requested);
        control.set_callback(move || flag.set(true));

        Self {
            config,
            run_loop,
            view,
            control,
            table,
            feed,
            requested,
            loads: 0,
        }
    }

    pub fn run(mut self) -> Result<SessionReport, FeedError> {
        info!(direction = ?self.config.direction, viewport = self.config.viewport, "session started");

        // Nothing is on screen yet, so the first page is requested programmatically.
        self.control.begin_loading();
        if self.wait_for_request() {
            self.complete_load()?;
        }

        loop {
            self.drag_to_end();
            if !self.wait_for_request() {
                info!(pages = self.feed.borrow().pages_loaded(), "no more pages");
                break;
            }
            self.complete_load()?;
        }

        Ok(self.report())
    }

    fn direction(&self) -> Direction {
        self.config.direction
    }

    /// Drags from the current offset to just past the end, one frame per step.
    fn drag_to_end(&self) {
        let direction = self.direction();
        let start = direction.main(self.view.content_offset());
        let end = direction.extent(self.view.content_size()) - direction.extent(self.view.bounds())
            + self.view.adjusted_content_inset().end(direction);
        let target = end.max(start) + OVERSCROLL;
        let velocity = Point::ZERO.with_main(direction, -DRAG_VELOCITY);

        self.view.begin_drag();
        let mut at = start;
        while at < target {
            at = (at + DRAG_STEP).min(target);
            let offset = self.view.content_offset().with_main(direction, at);
            self.view.drag_to(offset, velocity);
            self.run_loop.advance_by(FRAME_MS);
        }
        self.view.end_drag(GesturePhase::Ended);
        debug!(
            offset = direction.main(self.view.content_offset()),
            state = ?self.control.state(),
            "drag released"
        );
    }

    /// Ticks frames until the load callback asks for a page. Returns `false` once nothing is
    /// pending and the control stayed idle.
    fn wait_for_request(&self) -> bool {
        for _ in 0..MAX_WAIT_FRAMES {
            if self.requested.replace(false) {
                return true;
            }
            if self.run_loop.is_idle() && !self.control.is_loading() {
                return false;
            }
            self.run_loop.advance_by(FRAME_MS);
        }
        warn!("gave up waiting for the load callback");
        false
    }

    fn complete_load(&mut self) -> Result<(), FeedError> {
        let until = self.run_loop.now_ms() + self.config.latency_ms;
        while self.run_loop.now_ms() < until {
            self.run_loop.advance_by(FRAME_MS);
        }

        let added = self.feed.borrow_mut().load_next()?;
        self.loads += 1;
        self.sync_content_size();
        info!(
            page = self.feed.borrow().pages_loaded(),
            added,
            rows = self.table.rows(),
            "page loaded"
        );

        self.control.end_loading();
        if !self.run_loop.run_until_idle(MAX_SETTLE_TURNS) {
            warn!(pending = self.run_loop.pending(), "run loop still busy after loading");
        }
        debug!(state = ?self.control.state_snapshot(), "load settled");
        Ok(())
    }

    fn sync_content_size(&self) {
        self.table.set_rows(self.feed.borrow().comments().len());
        match self.direction() {
            Direction::Vertical => self.view.force_update_content_size(),
            Direction::Horizontal => self
                .view
                .set_content_size(Size::new(self.table.extent(), CROSS_EXTENT)),
        }
    }

    fn report(&self) -> SessionReport {
        let feed = self.feed.borrow();
        SessionReport {
            pages_loaded: feed.pages_loaded(),
            comments: feed.comments().len(),
            loads: self.loads,
            content_size: self.view.content_size(),
            content_offset: self.view.content_offset(),
            content_inset: self.view.content_inset(),
            control: self.control.state_snapshot(),
            last_comment: feed.comments().last().cloned(),
        }
    }
}
