use std::cell::Cell;

use loadcontrol::{IndexPath, ListLayout, Rect, Size};

/// One section of fixed-height comment rows.
#[derive(Debug)]
pub struct CommentTable {
    rows: Cell<usize>,
    row_width: f32,
    row_height: f32,
}

impl CommentTable {
    pub fn new(row_width: f32, row_height: f32) -> Self {
        Self {
            rows: Cell::new(0),
            row_width,
            row_height,
        }
    }

    pub fn set_rows(&self, rows: usize) {
        self.rows.set(rows);
    }

    pub fn rows(&self) -> usize {
        self.rows.get()
    }

    /// Total extent of all rows along the scroll axis.
    pub fn extent(&self) -> f32 {
        self.rows.get() as f32 * self.row_height
    }
}

impl ListLayout for CommentTable {
    fn number_of_sections(&self) -> usize {
        1
    }

    fn number_of_rows(&self, section: usize) -> usize {
        if section == 0 { self.rows.get() } else { 0 }
    }

    fn row_frame(&self, index: IndexPath) -> Rect {
        Rect::new(0.0, index.row as f32 * self.row_height, self.row_width, self.row_height)
    }

    fn size_that_fits(&self, width: f32) -> Size {
        Size::new(width, self.extent())
    }
}
