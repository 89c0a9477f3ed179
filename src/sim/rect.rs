//! Axis-aligned integer rectangles in tile space
//!
//! A rectangle is defined by:
//! - top_left: the upper-left tile it covers
//! - size: width and height in tiles (right and bottom are inclusive edges)

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// A rectangle of tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top_left: IVec2,
    pub size: IVec2,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            top_left: IVec2::new(x, y),
            size: IVec2::new(width, height),
        }
    }

    pub fn from_parts(top_left: IVec2, size: IVec2) -> Self {
        Self { top_left, size }
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.top_left.x
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.top_left.y
    }

    /// Rightmost column covered by the rect
    #[inline]
    pub fn right(&self) -> i32 {
        self.top_left.x + self.size.x - 1
    }

    /// Lowest row covered by the rect
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.top_left.y + self.size.y - 1
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.size.y
    }

    pub fn bottom_left(&self) -> IVec2 {
        IVec2::new(self.left(), self.bottom())
    }

    pub fn is_empty(&self) -> bool {
        self.size.x <= 0 || self.size.y <= 0
    }

    /// Check whether the two rects share at least one tile
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        self.left() <= other.right()
            && other.left() <= self.right()
            && self.top() <= other.bottom()
            && other.top() <= self.bottom()
    }

    pub fn contains(&self, point: IVec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Iterate over all tile positions, row by row
    pub fn tiles(&self) -> impl Iterator<Item = IVec2> + use<> {
        let Rect { top_left, size } = *self;
        (0..size.y.max(0))
            .flat_map(move |row| (0..size.x.max(0)).map(move |col| top_left + IVec2::new(col, row)))
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ {{{}, {}}}, {{{}, {}}} }}",
            self.top_left.x, self.top_left.y, self.size.x, self.size.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_are_inclusive() {
        let rect = Rect::new(9, 4, 3, 3);
        assert_eq!(rect.right(), 11);
        assert_eq!(rect.bottom(), 6);
        assert_eq!(rect.bottom_left(), IVec2::new(9, 6));
    }

    #[test]
    fn test_intersects() {
        let screen = Rect::new(0, 0, 32, 20);
        assert!(screen.intersects(&Rect::new(31, 19, 4, 4)));
        assert!(!screen.intersects(&Rect::new(32, 0, 4, 4)));
        assert!(!screen.intersects(&Rect::new(0, 20, 4, 4)));
        assert!(!screen.intersects(&Rect::new(-4, 0, 4, 4)));
        // Degenerate rects never intersect anything
        assert!(!screen.intersects(&Rect::new(5, 5, 3, 0)));
    }

    #[test]
    fn test_tiles_row_major() {
        let tiles: Vec<_> = Rect::new(1, 2, 2, 2).tiles().collect();
        assert_eq!(
            tiles,
            vec![
                IVec2::new(1, 2),
                IVec2::new(2, 2),
                IVec2::new(1, 3),
                IVec2::new(2, 3)
            ]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Rect::new(9, 4, 3, 3).to_string(), "{ {9, 4}, {3, 3} }");
    }
}
