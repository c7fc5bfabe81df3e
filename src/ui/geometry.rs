use std::ops::{Add, Sub};

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// Integer pixel size. Negative components are only legal as the `UNSET`
/// marker ("not measured yet" / "no limit").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    /// Sentinel for an unmeasured size or an unbounded max size.
    pub const UNSET: Self = Self {
        width: -1,
        height: -1,
    };

    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// True when either side has no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn is_zero(&self) -> bool {
        self.width == 0 && self.height == 0
    }

    /// True when both components are non-negative.
    pub fn is_valid(&self) -> bool {
        self.width >= 0 && self.height >= 0
    }

    /// Component-wise maximum.
    pub fn max(self, other: Self) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    pub fn clamp_non_negative(self) -> Self {
        Self {
            width: self.width.max(0),
            height: self.height.max(0),
        }
    }
}

impl Add for Size {
    type Output = Size;

    fn add(self, rhs: Size) -> Size {
        Size {
            width: self.width + rhs.width,
            height: self.height + rhs.height,
        }
    }
}

/// Grows a size by the horizontal/vertical totals of an inset.
impl Add<Insets> for Size {
    type Output = Size;

    fn add(self, rhs: Insets) -> Size {
        Size {
            width: self.width + rhs.horizontal(),
            height: self.height + rhs.vertical(),
        }
    }
}

/// Shrinks a size by an inset. Never yields negative components.
impl Sub<Insets> for Size {
    type Output = Size;

    fn sub(self, rhs: Insets) -> Size {
        Size {
            width: (self.width - rhs.horizontal()).max(0),
            height: (self.height - rhs.vertical()).max(0),
        }
    }
}

// ---------------------------------------------------------------------------
// Point / Rect
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// Axis-aligned rectangle in integer pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin with the given size.
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    /// Returns true if the point is inside this rectangle (right/bottom edges exclusive).
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Deflates a rectangle by an inset, clamping the size at zero.
impl Sub<Insets> for Rect {
    type Output = Rect;

    fn sub(self, rhs: Insets) -> Rect {
        let size = self.size() - rhs;
        Rect::new(self.x + rhs.left, self.y + rhs.top, size.width, size.height)
    }
}

// ---------------------------------------------------------------------------
// Insets
// ---------------------------------------------------------------------------

/// Resolved pixel edges (left, top, right, bottom).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Insets {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Insets {
    pub const ZERO: Self = Self {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn all(v: i32) -> Self {
        Self::new(v, v, v, v)
    }

    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> i32 {
        self.top + self.bottom
    }

    pub fn clamp_non_negative(self) -> Self {
        Self::new(
            self.left.max(0),
            self.top.max(0),
            self.right.max(0),
            self.bottom.max(0),
        )
    }
}

impl Add for Insets {
    type Output = Insets;

    fn add(self, rhs: Insets) -> Insets {
        Insets::new(
            self.left + rhs.left,
            self.top + rhs.top,
            self.right + rhs.right,
            self.bottom + rhs.bottom,
        )
    }
}

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

/// Per-corner radii in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CornerRadii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_left: f32,
    pub bottom_right: f32,
}

impl CornerRadii {
    pub const fn all(radius: f32) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_left: radius,
            bottom_right: radius,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.top_left == 0.0
            && self.top_right == 0.0
            && self.bottom_left == 0.0
            && self.bottom_right == 0.0
    }
}

/// Rectangle with rounded corners; doubles as the clip shape.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoundRect {
    pub rect: Rect,
    pub radii: CornerRadii,
}

impl RoundRect {
    pub fn new(rect: Rect, radii: CornerRadii) -> Self {
        Self { rect, radii }
    }

    /// A square-cornered shape.
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect, CornerRadii::default())
    }

    /// True if no corner is rounded.
    pub fn is_rect(&self) -> bool {
        self.radii.is_zero()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Line {
    pub from: Point,
    pub to: Point,
}

impl Line {
    pub const fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// 2D affine matrix, row-vector convention:
/// `x' = x*m11 + y*m21 + dx`, `y' = x*m12 + y*m22 + dy`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub dx: f32,
    pub dy: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        m11: 1.0,
        m12: 0.0,
        m21: 0.0,
        m22: 1.0,
        dx: 0.0,
        dy: 0.0,
    };

    pub const fn translation(x: f32, y: f32) -> Self {
        Self {
            dx: x,
            dy: y,
            ..Self::IDENTITY
        }
    }

    /// Transform whose local origin sits at `(x, y)` in this transform's space.
    pub fn translate(&self, x: f32, y: f32) -> Self {
        Self {
            dx: self.dx + x * self.m11 + y * self.m21,
            dy: self.dy + x * self.m12 + y * self.m22,
            ..*self
        }
    }

    pub fn transform_point(&self, p: Point) -> (f32, f32) {
        let (x, y) = (p.x as f32, p.y as f32);
        (
            x * self.m11 + y * self.m21 + self.dx,
            x * self.m12 + y * self.m22 + self.dy,
        )
    }

    /// Maps a rect's origin, keeping its size. Exact for translation-only transforms.
    pub fn map_rect(&self, rect: Rect) -> Rect {
        let (x, y) = self.transform_point(rect.origin());
        Rect::new(x.round() as i32, y.round() as i32, rect.width, rect.height)
    }
}
