//! Deterministic simulation of dynamic map geometry
//!
//! The level map is partitioned once into a static part and the sections that
//! can change. After that, the live map is the single source of truth:
//! - A piece's linked section always names the tiles it currently owns
//! - Linked sections never overlap each other or a simple section
//! - Gameplay events apply at the start of a tick, never mid-update
//! - Pieces update in entity ID order with a seeded RNG

pub mod behavior;
pub mod collision;
pub mod events;
pub mod level;
pub mod map;
pub mod mutation;
pub mod partition;
pub mod rect;
pub mod state;
pub mod tick;

pub use behavior::{
    DynamicGeometryController, GeometryState, GeometryType, StepContext, UpdateResult,
};
pub use collision::CollisionChecker;
pub use events::{EffectKind, GameEvent, GameplayEvent, SoundId};
pub use level::{ActorDesc, ActorKind, LevelData};
pub use map::{CollisionData, Map, SolidEdge, TileAttributes, TileIndex, TilePair};
pub use partition::{DynamicMapSectionData, FallingSectionInfo, determine_dynamic_map_sections};
pub use rect::Rect;
pub use state::{
    ActivationPolicy, EntityId, ExtraSection, GameState, GeometryBody, GeometryPiece,
    MapGeometryLink, TileDebris, World,
};
pub use tick::tick;
