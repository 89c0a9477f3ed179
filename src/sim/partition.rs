//! Load-time split of the level map into static and dynamic parts
//!
//! The static part never changes during play and can be baked once by the map
//! renderer. Everything that can change (burnable tiles, missile holes, falling
//! geometry and whatever it uncovers while falling) is cleared from the static
//! copy and drawn by the dynamic section renderer instead.

use super::collision::CollisionChecker;
use super::level::{ActorDesc, ActorKind};
use super::map::Map;
use super::rect::Rect;
use crate::consts::{MISSILE_HEIGHT, MISSILE_HOLE_SIZE};

/// Area uncovered below a falling piece of geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallingSectionInfo {
    /// Position of the piece among all falling candidates, in level order
    pub index: usize,
    /// Index of the actor description the piece was created from
    pub actor_index: usize,
    pub section_below: Rect,
}

/// Result of partitioning a level map
#[derive(Debug, Clone)]
pub struct DynamicMapSectionData {
    /// The map with every dynamic region cleared
    pub map_static_parts: Map,
    /// Burnable regions and missile holes
    pub simple_sections: Vec<Rect>,
    /// Ordered by ascending index
    pub falling_sections: Vec<FallingSectionInfo>,
}

/// Find the first non-empty row below `section` that lies above solid ground,
/// and extend it down to the next row standing on solid ground.
///
/// Returns `(top, bottom)` with `bottom` exclusive.
fn find_section_below_falling_section(
    map: &Map,
    checker: &CollisionChecker<'_>,
    section: &Rect,
) -> Option<(i32, i32)> {
    let row_above = |y: i32| Rect::new(section.left(), y - 1, section.width(), 1);

    let mut y = section.bottom() + 1;
    while y < map.height() && !checker.is_on_solid_ground(&row_above(y)) {
        let row_has_tiles = (section.left()..=section.right()).any(|x| !map.is_empty_at(x, y));
        if row_has_tiles {
            let mut end = y + 1;
            while end < map.height() && !checker.is_on_solid_ground(&row_above(end)) {
                end += 1;
            }
            return Some((y, end));
        }
        y += 1;
    }

    None
}

/// Probe upward from an intact missile for the ceiling it will blow a hole into
fn find_missile_hole(checker: &CollisionChecker<'_>, missile: &ActorDesc) -> Option<Rect> {
    let x = missile.position.x;
    let mut y = missile.position.y - MISSILE_HEIGHT;
    while y >= 0 && !checker.is_touching_ceiling(&Rect::new(x, y + 1, MISSILE_HOLE_SIZE, 1)) {
        y -= 1;
    }

    (y >= 2).then(|| Rect::new(x, y - 2, MISSILE_HOLE_SIZE, MISSILE_HOLE_SIZE))
}

/// Grow a rectangle of flammable tiles from its top-left corner: first along
/// the row, then down the starting column.
fn grow_flammable_rect(map: &Map, x: i32, y: i32) -> Rect {
    let mut end_x = x + 1;
    while end_x < map.width() && map.attributes(end_x, y).is_flammable() {
        end_x += 1;
    }

    let mut end_y = y + 1;
    while end_y < map.height() && map.attributes(x, end_y).is_flammable() {
        end_y += 1;
    }

    Rect::new(x, y, end_x - x, end_y - y)
}

/// Split `original_map` into its static part and the dynamic sections
pub fn determine_dynamic_map_sections(
    original_map: &Map,
    actors: &[ActorDesc],
) -> DynamicMapSectionData {
    let mut map = original_map.clone();
    let mut simple_sections = Vec::new();

    // (actor index, area) of every piece that can fall
    let mut candidates: Vec<(usize, Rect)> = Vec::new();

    for (actor_index, actor) in actors.iter().enumerate() {
        if let Some(area) = actor.assigned_area {
            if actor.kind.is_shootable_wall() {
                map.clear_rect(&area);
            } else {
                candidates.push((actor_index, area));
            }
        } else if actor.kind == ActorKind::MissileIntact {
            let hole = find_missile_hole(&CollisionChecker::new(&map), actor);
            if let Some(hole) = hole {
                log::debug!("Missile at {:?} opens ceiling section {}", actor.position, hole);
                map.clear_rect(&hole);
                simple_sections.push(hole);
            }
        }
    }

    // Cleared tiles read as non-flammable, so each region is found once
    for y in 0..map.height() {
        for x in 0..map.width() {
            if map.attributes(x, y).is_flammable() {
                let section = grow_flammable_rect(&map, x, y);
                map.clear_rect(&section);
                simple_sections.push(section);
            }
        }
    }

    let falling_sections: Vec<FallingSectionInfo> = {
        let checker = CollisionChecker::new(&map);
        candidates
            .iter()
            .enumerate()
            .filter_map(|(index, &(actor_index, section))| {
                find_section_below_falling_section(&map, &checker, &section).map(|(top, bottom)| {
                    FallingSectionInfo {
                        index,
                        actor_index,
                        section_below: Rect::new(section.left(), top, section.width(), bottom - top),
                    }
                })
            })
            .collect()
    };

    for (_, section) in &candidates {
        map.clear_rect(section);
    }
    for info in &falling_sections {
        map.clear_rect(&info.section_below);
    }

    log::info!(
        "Partitioned map: {} simple sections, {} falling candidates, {} uncovered areas",
        simple_sections.len(),
        candidates.len(),
        falling_sections.len()
    );

    DynamicMapSectionData {
        map_static_parts: map,
        simple_sections,
        falling_sections,
    }
}
