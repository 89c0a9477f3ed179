//! Dynamic map geometry for a tile-based platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (map partitioning, falling geometry, map mutation)
//! - `renderer`: Per-frame drawing of the dynamic parts of the map
//! - `settings`: Tuning values and presentation toggles

pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::Settings;

use glam::IVec2;

/// Game configuration constants
pub mod consts {
    /// Edge length of one tile in pixels
    pub const TILE_SIZE: i32 = 8;

    /// Rows a falling piece of geometry moves per simulation step
    pub const GEOMETRY_FALL_SPEED: i32 = 2;

    /// Frames a delayed piece waits before it starts falling
    pub const FALL_DELAY_FRAMES: u32 = 20;
    /// Frames between opening a blue key door and the door dropping
    pub const DOOR_DELAY_FRAMES: u32 = 2;
    /// Frames of earth shaking needed before quake geometry lets go
    pub const QUAKE_DELAY_FRAMES: u32 = 2;

    /// Lifetime of a single piece of tile debris
    pub const DEBRIS_TIMEOUT_FRAMES: u32 = 80;

    /// Vertical displacement (tiles per frame) applied to tile debris
    pub const TILE_DEBRIS_MOVEMENT_SEQUENCE: [i32; 11] = [-3, -3, -2, -2, -1, 0, 0, 1, 2, 2, 3];

    /// Intact missiles are this many tiles tall; the ceiling probe starts at their tip
    pub const MISSILE_HEIGHT: i32 = 12;
    /// Size of the hole a missile punches into the map
    pub const MISSILE_HOLE_SIZE: i32 = 3;

    /// Screen shake applied by the burn effect of sinking geometry
    pub const BURN_SHAKE_AMOUNT: i32 = 2;
    /// Screen shake applied when a piece of geometry hits the ground
    pub const LANDING_SHAKE_AMOUNT: i32 = 7;
}

/// Convert a tile coordinate to pixels
#[inline]
pub fn tile_to_pixel(tiles: i32) -> i32 {
    tiles * consts::TILE_SIZE
}

/// Convert a tile position to a pixel position
#[inline]
pub fn tile_vec_to_pixel_vec(tiles: IVec2) -> IVec2 {
    tiles * consts::TILE_SIZE
}
