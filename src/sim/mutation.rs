//! Low-level tile grid operations shared by falling, sinking and exploding geometry

use glam::IVec2;

use super::map::{Map, NUM_LAYERS};
use super::rect::Rect;
use super::state::{TileDebris, World};

/// Shift every row of `section` down by one on both layers and clear the
/// vacated top row. The row below the section is overwritten.
pub fn move_tile_rows(section: &Rect, map: &mut Map) {
    let start_x = section.left();
    let start_y = section.top();
    let width = section.width();
    let height = section.height();

    for layer in 0..NUM_LAYERS {
        // Bottom-up so no row is overwritten before it has been copied
        for row in (0..height).rev() {
            let source_y = start_y + row;
            for col in 0..width {
                let x = start_x + col;
                let tile = map.tile_at(layer, x, source_y);
                map.set_tile_at(layer, x, source_y + 1, tile);
            }
        }
    }

    map.clear_section(start_x, start_y, width, 1);
}

/// Move a whole section one row down, keeping its size
pub fn move_tile_section(section: &mut Rect, map: &mut Map) {
    move_tile_rows(section, map);
    section.top_left.y += 1;
}

/// Move all but the lowest row one row down. The lowest row is overwritten
/// by the one above it, so the section loses one row from the bottom up.
pub fn squash_tile_section(section: &mut Rect, map: &mut Map) {
    let upper_rows = Rect::from_parts(section.top_left, section.size - IVec2::new(0, 1));
    move_tile_rows(&upper_rows, map);
    section.top_left.y += 1;
    section.size.y -= 1;
}

/// One debris entity for each non-empty background tile of `section`
pub fn spawn_tile_debris_for_section(section: &Rect, world: &mut World) {
    for pos in section.tiles() {
        let tile = world.map.tile_at(0, pos.x, pos.y);
        if tile == 0 {
            continue;
        }

        let velocity_x = 3 - world.random_below(6);
        let sequence_offset = world.random_below(5) as usize;
        let id = world.next_entity_id();
        world.debris.push(TileDebris {
            id,
            tile,
            position: pos,
            previous_position: pos,
            velocity_x,
            sequence_step: sequence_offset,
            frames_left: world.settings.debris_timeout_frames,
        });
    }
}

/// Scatter the section's tiles as debris and clear it from the map
pub fn explode_map_section(section: &Rect, world: &mut World) {
    log::debug!("Exploding map section {section}");
    spawn_tile_debris_for_section(section, world);
    world.map.clear_rect(section);
}
