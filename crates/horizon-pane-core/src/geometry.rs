//! Screen-space geometry primitives.
//!
//! All values are in physical pixels of the virtual desktop. Rectangles are
//! stored as origin + size, which is what the window switchboard works with;
//! edge accessors are provided for the places that think in left/top/right/bottom.

/// A point in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The origin.
    pub const ZERO: Point = Point::new(0, 0);

    /// Offset this point by another point, subtracting.
    pub fn relative_to(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }
}

/// A width/height pair.
///
/// Sizes are signed so that negative values can act as an "unset" sentinel
/// for tracking limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Sentinel for a tracking limit that has not been set.
    pub const UNSET: Size = Size::new(-1, -1);

    /// Whether the width component is set (non-negative).
    pub fn has_width(&self) -> bool {
        self.width >= 0
    }

    /// Whether the height component is set (non-negative).
    pub fn has_height(&self) -> bool {
        self.height >= 0
    }

    /// Whether either component is set.
    pub fn is_set(&self) -> bool {
        self.has_width() || self.has_height()
    }
}

/// An axis-aligned rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

impl Rect {
    /// Create a rectangle from origin and size.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from its four edges.
    pub const fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Left edge.
    pub fn left(&self) -> i32 {
        self.x
    }

    /// Top edge.
    pub fn top(&self) -> i32 {
        self.y
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Width and height.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether the point lies inside this rectangle.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// Shrink the rectangle by the given insets.
    pub fn inset(&self, insets: Insets) -> Rect {
        Rect::from_edges(
            self.left() + insets.left,
            self.top() + insets.top,
            self.right() - insets.right,
            self.bottom() - insets.bottom,
        )
    }

    /// Compute the insets that separate `inner` from this rectangle.
    pub fn insets_to(&self, inner: &Rect) -> Insets {
        Insets {
            left: inner.left() - self.left(),
            top: inner.top() - self.top(),
            right: self.right() - inner.right(),
            bottom: self.bottom() - inner.bottom(),
        }
    }

    /// Fit a rectangle of the given aspect into this one, centered, keeping
    /// the aspect ratio of `content`.
    ///
    /// Degenerate content (zero width or height) fills the whole rectangle.
    pub fn letterbox(&self, content: Size) -> Rect {
        if content.width <= 0 || content.height <= 0 || self.width <= 0 || self.height <= 0 {
            return *self;
        }

        // Compare aspect ratios with integer cross-multiplication.
        let wide = i64::from(content.width) * i64::from(self.height)
            > i64::from(self.width) * i64::from(content.height);

        let (width, height) = if wide {
            let h = i64::from(self.width) * i64::from(content.height) / i64::from(content.width);
            (self.width, h as i32)
        } else {
            let w = i64::from(self.height) * i64::from(content.width) / i64::from(content.height);
            (w as i32, self.height)
        };

        Rect::new(
            self.x + (self.width - width) / 2,
            self.y + (self.height - height) / 2,
            width,
            height,
        )
    }
}

/// Distances from a window's outer frame to its content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Insets {
    /// Left frame thickness.
    pub left: i32,
    /// Top frame thickness (caption included).
    pub top: i32,
    /// Right frame thickness.
    pub right: i32,
    /// Bottom frame thickness.
    pub bottom: i32,
}

impl Insets {
    /// Create insets from the four edges.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// No frame at all.
    pub const ZERO: Insets = Insets::new(0, 0, 0, 0);

    /// Whether any edge is negative.
    pub fn is_negative(&self) -> bool {
        self.left < 0 || self.top < 0 || self.right < 0 || self.bottom < 0
    }

    /// Sum of left and right.
    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    /// Sum of top and bottom.
    pub fn vertical(&self) -> i32 {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::from_edges(10, 20, 110, 220);
        assert_eq!(r.width, 100);
        assert_eq!(r.height, 200);
        assert_eq!(r.right(), 110);
        assert_eq!(r.bottom(), 220);
    }

    #[test]
    fn test_rect_contains_is_half_open() {
        let r = Rect::new(0, 0, 10, 10);
        assert!(r.contains(Point::new(0, 0)));
        assert!(r.contains(Point::new(9, 9)));
        assert!(!r.contains(Point::new(10, 5)));
    }

    #[test]
    fn test_insets_between_rects() {
        let outer = Rect::new(100, 100, 400, 300);
        let inner = Rect::new(108, 131, 384, 261);
        let insets = outer.insets_to(&inner);
        assert_eq!(insets, Insets::new(8, 31, 8, 8));
        assert_eq!(outer.inset(insets), inner);
    }

    #[test]
    fn test_letterbox_wide_content() {
        let screen = Rect::new(0, 0, 1920, 1080);
        // 2:1 content on a 16:9 screen leaves bars top and bottom.
        let fitted = screen.letterbox(Size::new(400, 200));
        assert_eq!(fitted, Rect::new(0, 60, 1920, 960));
    }

    #[test]
    fn test_letterbox_tall_content() {
        let screen = Rect::new(0, 0, 1920, 1080);
        let fitted = screen.letterbox(Size::new(300, 300));
        assert_eq!(fitted, Rect::new(420, 0, 1080, 1080));
    }

    #[test]
    fn test_letterbox_degenerate_content_fills() {
        let screen = Rect::new(0, 0, 800, 600);
        assert_eq!(screen.letterbox(Size::new(0, 10)), screen);
    }

    #[test]
    fn test_size_unset_sentinel() {
        assert!(!Size::UNSET.is_set());
        assert!(Size::new(0, -1).is_set());
        assert!(Size::new(0, -1).has_width());
        assert!(!Size::new(0, -1).has_height());
    }
}
