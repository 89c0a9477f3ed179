//! Per-frame drawing of simple sections and falling geometry
//!
//! The live map already holds every piece at its position for the next step,
//! while the screen shows the piece somewhere between its previous and current
//! position. Reading the live map under a moving piece would show a gap, so the
//! area below a falling piece is drawn from the snapshot taken at level setup
//! until the piece has passed through it.

use glam::{IVec2, Vec2};

use super::{DrawMode, TileBatcher};
use crate::sim::rect::Rect;
use crate::sim::state::{GameState, GeometryPiece};
use crate::tile_vec_to_pixel_vec;

/// Pixel position between two tile positions, rounded to whole pixels
pub fn interpolated_pixel_position(previous: IVec2, current: IVec2, factor: f32) -> IVec2 {
    let from = tile_vec_to_pixel_vec(previous).as_vec2();
    let to = tile_vec_to_pixel_vec(current).as_vec2();
    Vec2::lerp(from, to, factor.clamp(0.0, 1.0)).round().as_ivec2()
}

pub fn render_dynamic_background_sections(
    state: &GameState,
    batcher: &mut impl TileBatcher,
    screen: &Rect,
    interpolation: f32,
) {
    render_dynamic_sections(state, batcher, screen, DrawMode::Background, interpolation);
}

pub fn render_dynamic_foreground_sections(
    state: &GameState,
    batcher: &mut impl TileBatcher,
    screen: &Rect,
    interpolation: f32,
) {
    render_dynamic_sections(state, batcher, screen, DrawMode::Foreground, interpolation);
}

/// Draw everything dynamic that intersects `screen` (in tiles).
///
/// `interpolation` is the fraction of time elapsed towards the next
/// simulation step. Pixel positions are relative to the screen's top-left.
pub fn render_dynamic_sections(
    state: &GameState,
    batcher: &mut impl TileBatcher,
    screen: &Rect,
    mode: DrawMode,
    interpolation: f32,
) {
    let map = &state.world.map;
    let start = screen.top_left;

    for section in &state.simple_sections {
        if !section.intersects(screen) {
            continue;
        }

        let pixel_pos = tile_vec_to_pixel_vec(section.top_left - start);
        batcher.render_dynamic_section(map, *section, pixel_pos, mode);
    }

    let factor = if state.world.settings.motion_smoothing {
        interpolation
    } else {
        1.0
    };

    for piece in &state.pieces {
        render_piece(piece, state, batcher, screen, mode, factor);
    }
}

fn render_piece(
    piece: &GeometryPiece,
    state: &GameState,
    batcher: &mut impl TileBatcher,
    screen: &Rect,
    mode: DrawMode,
    factor: f32,
) {
    let link = &piece.body.link;
    let start = screen.top_left;

    if link.section.intersects(screen) {
        // Position is the bottom-left tile; the batcher wants the top-left
        let to_top_left = IVec2::new(0, link.section.height() - 1);
        let pixel_pos =
            interpolated_pixel_position(piece.previous_position, piece.body.position, factor)
                - tile_vec_to_pixel_vec(to_top_left + start);
        batcher.render_dynamic_section(&state.world.map, link.section, pixel_pos, mode);
    }

    let (Some(extra), Some(visible)) = (&link.extra_section, link.extra_section_rect()) else {
        return;
    };
    if visible.height() <= 0 || !visible.intersects(screen) {
        return;
    }

    let skipped_rows = (extra.height - visible.height()) as usize;
    let row_width = visible.width();
    let Some(rows) = extra.tiles.get(skipped_rows * row_width as usize..) else {
        log::warn!("Snapshot of entity {} is shorter than its area", piece.id);
        return;
    };

    batcher.render_cached_section(
        tile_vec_to_pixel_vec(visible.top_left - start),
        rows,
        row_width,
        mode,
    );
}
