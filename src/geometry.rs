//! Plain geometry in a top-left-origin, y-down coordinate space.
//!
//! Every rectangle the layout engine consumes or produces is a [`Rect`] in
//! logical pixels.  Screens are described by their *usable* frame, i.e.
//! with docks, bars and other reserved areas already removed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A width/height pair in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle.  `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn mid_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.mid_x(),
            y: self.mid_y(),
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// A rectangle with no positive extent on either axis.
    ///
    /// NaN sizes count as empty so garbage frames from a backend never
    /// survive filtering.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Shrink by `amount` on all four sides.  Sizes saturate at zero.
    pub fn inset(&self, amount: f64) -> Rect {
        Rect {
            x: self.x + amount,
            y: self.y + amount,
            width: (self.width - 2.0 * amount).max(0.0),
            height: (self.height - 2.0 * amount).max(0.0),
        }
    }

    /// Whether `p` lies inside the rectangle (right and bottom edges are
    /// exclusive, so neighbouring screens never both claim a point).
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.max_x() && p.y >= self.y && p.y < self.max_y()
    }

    /// Whether the interiors of two rectangles overlap.  Rectangles that
    /// merely share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.max_x()
            && other.x < self.max_x()
            && self.y < other.max_y()
            && other.y < self.max_y()
    }

    /// Whether `other` lies completely within `self`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.x, self.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inset_shrinks_all_sides() {
        let r = Rect::new(0.0, 0.0, 100.0, 50.0).inset(10.0);
        assert_eq!(r, Rect::new(10.0, 10.0, 80.0, 30.0));
    }

    #[test]
    fn inset_saturates_at_zero() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0).inset(20.0);
        assert_eq!(r.width, 0.0);
        assert_eq!(r.height, 0.0);
        assert!(r.is_empty());
    }

    #[test]
    fn shared_edge_is_not_an_intersection() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(100.0, 0.0, 100.0, 100.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Rect::new(99.0, 99.0, 10.0, 10.0)));
    }

    #[test]
    fn contains_rect_allows_shared_edges() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(outer.contains_rect(&outer));
        assert!(outer.contains_rect(&Rect::new(50.0, 0.0, 50.0, 100.0)));
        assert!(!outer.contains_rect(&Rect::new(60.0, 0.0, 50.0, 100.0)));
    }

    #[test]
    fn empty_detection() {
        assert!(Rect::new(5.0, 5.0, 0.0, 10.0).is_empty());
        assert!(Rect::new(5.0, 5.0, 10.0, -1.0).is_empty());
        assert!(Rect::new(0.0, 0.0, f64::NAN, 10.0).is_empty());
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn contains_point_excludes_far_edges() {
        let r = Rect::new(0.0, 0.0, 1920.0, 1080.0);
        assert!(r.contains(Point { x: 0.0, y: 0.0 }));
        assert!(!r.contains(Point { x: 1920.0, y: 500.0 }));
    }

    #[test]
    fn display_is_hyprland_style() {
        assert_eq!(Rect::new(1.0, 2.0, 3.0, 4.0).to_string(), "3x4+1+2");
    }
}
