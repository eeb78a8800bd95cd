use core::ops::Add;

/// The axis along which content grows and loading triggers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    #[default]
    Vertical,
    Horizontal,
}

impl Direction {
    /// Component of `p` along this axis.
    pub fn main(self, p: Point) -> f32 {
        match self {
            Self::Vertical => p.y,
            Self::Horizontal => p.x,
        }
    }

    /// Extent of `s` along this axis.
    pub fn extent(self, s: Size) -> f32 {
        match self {
            Self::Vertical => s.height,
            Self::Horizontal => s.width,
        }
    }

    /// Extent of `s` across this axis.
    pub fn cross_extent(self, s: Size) -> f32 {
        match self {
            Self::Vertical => s.width,
            Self::Horizontal => s.height,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns a copy with the component along `direction` replaced.
    pub fn with_main(self, direction: Direction, value: f32) -> Self {
        match direction {
            Direction::Vertical => Self { x: self.x, y: value },
            Direction::Horizontal => Self { x: value, y: self.y },
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn min_y(&self) -> f32 {
        self.origin.y
    }

    pub fn max_y(&self) -> f32 {
        self.origin.y + self.size.height
    }
}

/// Padding around scrollable content.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeInsets {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl EdgeInsets {
    pub const ZERO: Self = Self {
        top: 0.0,
        left: 0.0,
        bottom: 0.0,
        right: 0.0,
    };

    pub fn new(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Leading inset along `direction` (top or left).
    pub fn start(&self, direction: Direction) -> f32 {
        match direction {
            Direction::Vertical => self.top,
            Direction::Horizontal => self.left,
        }
    }

    /// Trailing inset along `direction` (bottom or right).
    pub fn end(&self, direction: Direction) -> f32 {
        match direction {
            Direction::Vertical => self.bottom,
            Direction::Horizontal => self.right,
        }
    }

    pub fn end_mut(&mut self, direction: Direction) -> &mut f32 {
        match direction {
            Direction::Vertical => &mut self.bottom,
            Direction::Horizontal => &mut self.right,
        }
    }

    /// Linear interpolation between `self` and `to`.
    pub fn lerp(&self, to: &Self, t: f32) -> Self {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Self {
            top: mix(self.top, to.top),
            left: mix(self.left, to.left),
            bottom: mix(self.bottom, to.bottom),
            right: mix(self.right, to.right),
        }
    }
}

impl Add for EdgeInsets {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            top: self.top + rhs.top,
            left: self.left + rhs.left,
            bottom: self.bottom + rhs.bottom,
            right: self.right + rhs.right,
        }
    }
}

/// Row address inside a list-like surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexPath {
    pub section: usize,
    pub row: usize,
}

impl IndexPath {
    pub fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

/// Where a row should land in the viewport after a scroll-to-row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RowPosition {
    Top,
    Bottom,
}

/// Phase reported to gesture targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
    Failed,
}

impl GesturePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled | Self::Failed)
    }
}
