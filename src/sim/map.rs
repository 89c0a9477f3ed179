//! Two-layer tile map with per-tile attributes
//!
//! Layer 0 holds the background tiles, layer 1 the foreground (masked) tiles.
//! Attributes are looked up by tile index, so every tile of the same kind shares
//! the same collision and flammability flags. Tile index 0 is always empty.

use serde::{Deserialize, Serialize};

use super::rect::Rect;

pub type TileIndex = u16;

/// Both layers of one map cell: `[background, foreground]`
pub type TilePair = [TileIndex; 2];

pub const NUM_LAYERS: usize = 2;

/// Bitmask of tile attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileAttributes {
    pub bits: u16,
}

impl TileAttributes {
    pub const NONE: Self = Self { bits: 0 };
    pub const SOLID_TOP: Self = Self { bits: 1 << 0 };
    pub const SOLID_BOTTOM: Self = Self { bits: 1 << 1 };
    pub const SOLID_LEFT: Self = Self { bits: 1 << 2 };
    pub const SOLID_RIGHT: Self = Self { bits: 1 << 3 };
    pub const FLAMMABLE: Self = Self { bits: 1 << 4 };
    pub const FOREGROUND: Self = Self { bits: 1 << 5 };

    /// All four solid edges
    pub const SOLID: Self = Self { bits: 0b1111 };

    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    pub const fn contains(self, other: Self) -> bool {
        self.bits & other.bits == other.bits
    }

    pub fn is_flammable(self) -> bool {
        self.contains(Self::FLAMMABLE)
    }

    pub fn is_foreground(self) -> bool {
        self.contains(Self::FOREGROUND)
    }

    pub fn collision(self) -> CollisionData {
        CollisionData {
            bits: (self.bits & Self::SOLID.bits) as u8,
        }
    }
}

impl std::ops::BitOr for TileAttributes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Which edges of a map cell block movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolidEdge {
    Top,
    Bottom,
    Left,
    Right,
}

impl SolidEdge {
    fn mask(self) -> u8 {
        match self {
            SolidEdge::Top => 1 << 0,
            SolidEdge::Bottom => 1 << 1,
            SolidEdge::Left => 1 << 2,
            SolidEdge::Right => 1 << 3,
        }
    }
}

/// Solid edges of a map cell, combined over both layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionData {
    bits: u8,
}

impl CollisionData {
    pub fn is_solid_on(self, edge: SolidEdge) -> bool {
        self.bits & edge.mask() != 0
    }

    pub fn is_clear(self) -> bool {
        self.bits == 0
    }
}

/// The level's tile grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMap")]
pub struct Map {
    width: i32,
    height: i32,
    layers: [Vec<TileIndex>; NUM_LAYERS],
    /// Attributes indexed by tile index
    attributes: Vec<TileAttributes>,
}

/// Map as stored in level files, before its dimensions are checked
#[derive(Deserialize)]
struct RawMap {
    width: i32,
    height: i32,
    layers: [Vec<TileIndex>; NUM_LAYERS],
    attributes: Vec<TileAttributes>,
}

impl TryFrom<RawMap> for Map {
    type Error = String;

    fn try_from(raw: RawMap) -> Result<Self, Self::Error> {
        if raw.width < 0 || raw.height < 0 {
            return Err(format!("invalid map size {}x{}", raw.width, raw.height));
        }

        let cells = raw.width as usize * raw.height as usize;
        for (layer, tiles) in raw.layers.iter().enumerate() {
            if tiles.len() != cells {
                return Err(format!(
                    "layer {layer} has {} tiles, expected {cells} for a {}x{} map",
                    tiles.len(),
                    raw.width,
                    raw.height
                ));
            }
        }

        Ok(Self {
            width: raw.width,
            height: raw.height,
            layers: raw.layers,
            attributes: raw.attributes,
        })
    }
}

impl Map {
    /// Create an empty map with the given attribute table
    pub fn new(width: i32, height: i32, attributes: Vec<TileAttributes>) -> Self {
        let cells = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            layers: [vec![0; cells], vec![0; cells]],
            attributes,
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    fn cell_index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    /// Tile index at the given cell; cells outside the map read as empty
    pub fn tile_at(&self, layer: usize, x: i32, y: i32) -> TileIndex {
        self.cell_index(x, y)
            .map_or(0, |index| self.layers[layer][index])
    }

    /// Write a tile; writes outside the map are dropped
    pub fn set_tile_at(&mut self, layer: usize, x: i32, y: i32, tile: TileIndex) {
        match self.cell_index(x, y) {
            Some(index) => self.layers[layer][index] = tile,
            None => log::trace!("Ignoring tile write outside the map at ({x}, {y})"),
        }
    }

    /// Set both layers of the given rectangle to the empty tile
    pub fn clear_section(&mut self, x: i32, y: i32, width: i32, height: i32) {
        for row in y..y + height {
            for col in x..x + width {
                for layer in 0..NUM_LAYERS {
                    self.set_tile_at(layer, col, row, 0);
                }
            }
        }
    }

    pub fn clear_rect(&mut self, rect: &Rect) {
        self.clear_section(rect.left(), rect.top(), rect.width(), rect.height());
    }

    /// Attributes of a single tile index
    pub fn tile_attributes(&self, tile: TileIndex) -> TileAttributes {
        self.attributes
            .get(tile as usize)
            .copied()
            .unwrap_or(TileAttributes::NONE)
    }

    /// Attributes of both layers at the given cell, combined
    pub fn attributes(&self, x: i32, y: i32) -> TileAttributes {
        self.tile_attributes(self.tile_at(0, x, y)) | self.tile_attributes(self.tile_at(1, x, y))
    }

    pub fn collision_data(&self, x: i32, y: i32) -> CollisionData {
        self.attributes(x, y).collision()
    }

    pub fn is_empty_at(&self, x: i32, y: i32) -> bool {
        self.tile_at(0, x, y) == 0 && self.tile_at(1, x, y) == 0
    }

    /// Flattened row-major copy of both layers inside `rect`
    pub fn copy_section(&self, rect: &Rect) -> Vec<TilePair> {
        rect.tiles()
            .map(|pos| [self.tile_at(0, pos.x, pos.y), self.tile_at(1, pos.x, pos.y)])
            .collect()
    }

    /// Paint a rectangle with one tile on one layer
    pub fn fill(&mut self, layer: usize, rect: &Rect, tile: TileIndex) {
        for pos in rect.tiles() {
            self.set_tile_at(layer, pos.x, pos.y, tile);
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub const SOLID_BLOCK: TileIndex = 1;
    pub const DECORATION: TileIndex = 2;
    pub const FLAMMABLE: TileIndex = 3;
    pub const PLATFORM: TileIndex = 4;
    pub const BRICK: TileIndex = 5;

    /// Attribute table shared by the unit tests
    pub fn attribute_table() -> Vec<TileAttributes> {
        vec![
            TileAttributes::NONE,
            TileAttributes::SOLID,
            TileAttributes::NONE,
            TileAttributes::FLAMMABLE,
            TileAttributes::SOLID_TOP,
            TileAttributes::SOLID,
        ]
    }

    /// Map with a solid floor in its bottom row
    pub fn map_with_floor(width: i32, height: i32) -> Map {
        let mut map = Map::new(width, height, attribute_table());
        map.fill(0, &Rect::new(0, height - 1, width, 1), SOLID_BLOCK);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_out_of_bounds_access_is_total() {
        let mut map = Map::new(4, 4, attribute_table());
        assert_eq!(map.tile_at(0, -1, 0), 0);
        assert_eq!(map.tile_at(1, 4, 4), 0);
        map.set_tile_at(0, 10, 10, SOLID_BLOCK);
        assert_eq!(map.attributes(10, 10), TileAttributes::NONE);
    }

    #[test]
    fn test_clear_section_clears_both_layers() {
        let mut map = Map::new(6, 6, attribute_table());
        map.fill(0, &Rect::new(0, 0, 6, 6), BRICK);
        map.fill(1, &Rect::new(0, 0, 6, 6), DECORATION);

        map.clear_section(1, 2, 3, 2);

        for y in 0..6 {
            for x in 0..6 {
                let inside = (1..4).contains(&x) && (2..4).contains(&y);
                assert_eq!(map.is_empty_at(x, y), inside, "cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_collision_combines_layers() {
        let mut map = Map::new(2, 2, attribute_table());
        map.set_tile_at(0, 0, 0, DECORATION);
        map.set_tile_at(1, 0, 0, PLATFORM);

        let collision = map.collision_data(0, 0);
        assert!(collision.is_solid_on(SolidEdge::Top));
        assert!(!collision.is_solid_on(SolidEdge::Bottom));
        assert!(map.collision_data(1, 1).is_clear());
    }

    #[test]
    fn test_copy_section_is_row_major() {
        let mut map = Map::new(4, 4, attribute_table());
        map.set_tile_at(0, 1, 1, BRICK);
        map.set_tile_at(1, 2, 1, DECORATION);
        map.set_tile_at(0, 1, 2, FLAMMABLE);

        let copy = map.copy_section(&Rect::new(1, 1, 2, 2));
        assert_eq!(copy, vec![[BRICK, 0], [0, DECORATION], [FLAMMABLE, 0], [0, 0]]);
    }
}
