//! Collision queries against the tile map
//!
//! Only the map's solid edges are consulted here. A rect is "on solid ground"
//! when any cell in the row directly below it is solid on its top edge, and
//! "touching the ceiling" when any cell in the row directly above it is solid
//! on its bottom edge.

use super::map::{Map, SolidEdge};
use super::rect::Rect;

/// Answers ground/ceiling questions for rectangles on a map
#[derive(Debug, Clone, Copy)]
pub struct CollisionChecker<'a> {
    map: &'a Map,
}

impl<'a> CollisionChecker<'a> {
    pub fn new(map: &'a Map) -> Self {
        Self { map }
    }

    /// The bottom edge of the map counts as ground
    pub fn is_on_solid_ground(&self, rect: &Rect) -> bool {
        let y = rect.bottom() + 1;
        if y >= self.map.height() {
            return true;
        }

        (rect.left()..=rect.right())
            .any(|x| self.map.collision_data(x, y).is_solid_on(SolidEdge::Top))
    }

    /// Above the top of the map there is no ceiling
    pub fn is_touching_ceiling(&self, rect: &Rect) -> bool {
        let y = rect.top() - 1;
        if y < 0 {
            return false;
        }

        (rect.left()..=rect.right())
            .any(|x| self.map.collision_data(x, y).is_solid_on(SolidEdge::Bottom))
    }
}
