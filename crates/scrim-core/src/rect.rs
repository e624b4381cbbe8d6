// Author: Dustin Pilgrim
// License: MIT

use serde::{Deserialize, Serialize};

/// Integer rectangle in host screen coordinates.
///
/// Always normalised: `left <= right` and `top <= bottom`. Zero area is a
/// valid (degenerate) rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Build from edges, swapping them if they arrive inverted.
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left: left.min(right),
            top: top.min(bottom),
            right: left.max(right),
            bottom: top.max(bottom),
        }
    }

    /// Build from origin + size. Negative sizes collapse to zero.
    pub fn from_xywh(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            left: x,
            top: y,
            right: x.saturating_add(w.max(0)),
            bottom: y.saturating_add(h.max(0)),
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }

    /// Overlap of two rectangles; degenerate (at `self`'s clamped origin) when
    /// they don't touch.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right).max(left);
        let bottom = self.bottom.min(other.bottom).max(top);
        Rect { left, top, right, bottom }
    }

    pub fn clip_to(&self, screen: ScreenExtent) -> Rect {
        self.intersect(&screen.bounds())
    }
}

/// Size of the host screen in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenExtent {
    pub width: i32,
    pub height: i32,
}

impl ScreenExtent {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(0),
            height: height.max(0),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_xywh(0, 0, self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalises_inverted_edges() {
        let r = Rect::new(10, 20, 0, 5);
        assert_eq!(r, Rect { left: 0, top: 5, right: 10, bottom: 20 });
        assert_eq!((r.width(), r.height()), (10, 15));
    }

    #[test]
    fn negative_size_is_degenerate() {
        let r = Rect::from_xywh(4, 4, -3, 2);
        assert_eq!(r.width(), 0);
        assert!(r.is_empty());
    }

    #[test]
    fn clip_to_screen() {
        let screen = ScreenExtent::new(100, 50);
        let r = Rect::new(-10, 40, 120, 80).clip_to(screen);
        assert_eq!(r, Rect::new(0, 40, 100, 50));

        let outside = Rect::new(200, 200, 300, 300).clip_to(screen);
        assert!(outside.is_empty());
    }
}
