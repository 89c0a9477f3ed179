//! Recording tile batcher
//!
//! Captures every draw call together with the tiles it would draw, which is
//! all a headless runner or a test needs.

use glam::IVec2;

use super::{DrawMode, TileBatcher};
use crate::sim::map::{Map, TilePair};
use crate::sim::rect::Rect;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    /// Section of the live map
    Section {
        section: Rect,
        pixel_pos: IVec2,
        tiles: Vec<TilePair>,
        mode: DrawMode,
    },
    /// Rows from a cached snapshot
    Cached {
        pixel_pos: IVec2,
        tiles: Vec<TilePair>,
        row_width: i32,
        mode: DrawMode,
    },
}

impl DrawCall {
    /// Number of non-empty tiles the pass would actually draw
    pub fn visible_tiles(&self, map: &Map) -> usize {
        let (tiles, mode) = match self {
            DrawCall::Section { tiles, mode, .. } | DrawCall::Cached { tiles, mode, .. } => {
                (tiles, *mode)
            }
        };

        tiles
            .iter()
            .flatten()
            .filter(|&&tile| tile != 0)
            .filter(|&&tile| {
                map.tile_attributes(tile).is_foreground() == (mode == DrawMode::Foreground)
            })
            .count()
    }
}

/// Batcher that records draw calls instead of submitting them
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub calls: Vec<DrawCall>,
}

impl DrawList {
    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl TileBatcher for DrawList {
    fn render_dynamic_section(&mut self, map: &Map, section: Rect, pixel_pos: IVec2, mode: DrawMode) {
        self.calls.push(DrawCall::Section {
            section,
            pixel_pos,
            tiles: map.copy_section(&section),
            mode,
        });
    }

    fn render_cached_section(
        &mut self,
        pixel_pos: IVec2,
        tiles: &[TilePair],
        row_width: i32,
        mode: DrawMode,
    ) {
        self.calls.push(DrawCall::Cached {
            pixel_pos,
            tiles: tiles.to_vec(),
            row_width,
            mode,
        });
    }
}
