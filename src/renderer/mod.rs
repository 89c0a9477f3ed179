//! Rendering of the dynamic parts of the map
//!
//! The static map is drawn elsewhere. This module draws what the simulation
//! moves or changes: simple sections from the live map, falling geometry at
//! its interpolated position, and the cached snapshot of the area a falling
//! piece has not uncovered yet. Actual tile drawing is left to a
//! [`TileBatcher`].

pub mod batch;
pub mod dynamic_sections;

pub use batch::{DrawCall, DrawList};
pub use dynamic_sections::{
    interpolated_pixel_position, render_dynamic_background_sections,
    render_dynamic_foreground_sections, render_dynamic_sections,
};

use glam::IVec2;

use crate::sim::map::{Map, TilePair};
use crate::sim::rect::Rect;

/// Which tiles a pass draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    /// Tiles behind sprites
    Background,
    /// Tiles flagged as foreground, drawn over sprites
    Foreground,
}

/// Turns rectangular tile spans into draw calls
pub trait TileBatcher {
    /// Draw `section` of the live map with its top-left corner at `pixel_pos`
    fn render_dynamic_section(&mut self, map: &Map, section: Rect, pixel_pos: IVec2, mode: DrawMode);

    /// Draw cached rows of tiles; `tiles` holds whole rows of `row_width` tiles
    fn render_cached_section(
        &mut self,
        pixel_pos: IVec2,
        tiles: &[TilePair],
        row_width: i32,
        mode: DrawMode,
    );
}
