//! Simulation state: the live map and every entity touching it
//!
//! Entities are kept in plain vectors ordered by ID. IDs are handed out in
//! creation order, so iterating a vector visits entities in the order they were
//! created.

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::behavior::DynamicGeometryController;
use super::events::{GameEvent, GameplayEvent, SoundId};
use super::level::{ActorDesc, LevelData};
use super::map::{Map, TilePair, TileIndex};
use super::partition::{FallingSectionInfo, determine_dynamic_map_sections};
use super::rect::Rect;
use crate::Settings;
use crate::consts::TILE_DEBRIS_MOVEMENT_SEQUENCE;

pub type EntityId = u32;

/// When an entity gets updated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationPolicy {
    /// Only while inside the active region
    #[default]
    WhenOnScreen,
    Always,
}

/// Snapshot of the map area a falling piece uncovers
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraSection {
    /// Row-major copy of both layers, `width * height` entries
    pub tiles: Vec<TilePair>,
    pub top: i32,
    pub height: i32,
}

/// Ties an entity to the map tiles it owns
#[derive(Debug, Clone, PartialEq)]
pub struct MapGeometryLink {
    /// Tiles currently owned by the entity in the live map
    pub section: Rect,
    pub extra_section: Option<ExtraSection>,
}

impl MapGeometryLink {
    pub fn new(section: Rect) -> Self {
        Self {
            section,
            extra_section: None,
        }
    }

    /// Part of the extra section that lies below the piece's current position
    ///
    /// The height drops to zero (or below) once the piece has passed through
    /// the whole area.
    pub fn extra_section_rect(&self) -> Option<Rect> {
        let extra = self.extra_section.as_ref()?;
        let top = extra.top.max(self.section.bottom() + 1);
        let bottom = extra.top + extra.height;
        Some(Rect::new(
            self.section.left(),
            top,
            self.section.width(),
            bottom - top,
        ))
    }
}

/// Position and map ownership of a piece of dynamic geometry
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryBody {
    /// Bottom-left tile of the piece
    pub position: IVec2,
    pub link: MapGeometryLink,
    pub activation: ActivationPolicy,
}

impl GeometryBody {
    pub fn new(section: Rect) -> Self {
        Self {
            position: section.bottom_left(),
            link: MapGeometryLink::new(section),
            activation: ActivationPolicy::WhenOnScreen,
        }
    }

    /// Whether the piece takes part in a step limited to `active_region`
    pub fn is_active(&self, active_region: Option<&Rect>) -> bool {
        match (self.activation, active_region) {
            (ActivationPolicy::Always, _) | (_, None) => true,
            (ActivationPolicy::WhenOnScreen, Some(region)) => region.intersects(&self.link.section),
        }
    }
}

/// An entity made of map tiles
#[derive(Debug, Clone)]
pub struct GeometryPiece {
    pub id: EntityId,
    /// Actor description this piece was created from
    pub actor_index: Option<usize>,
    /// Shootable walls never fall
    pub shootable: bool,
    pub body: GeometryBody,
    /// Position at the start of the current step (for motion smoothing)
    pub previous_position: IVec2,
    pub controller: Option<DynamicGeometryController>,
}

/// A single tile flying off an explosion
#[derive(Debug, Clone, PartialEq)]
pub struct TileDebris {
    pub id: EntityId,
    pub tile: TileIndex,
    pub position: IVec2,
    pub previous_position: IVec2,
    pub velocity_x: i32,
    pub sequence_step: usize,
    pub frames_left: u32,
}

impl TileDebris {
    /// Advance one frame. Returns false once the debris has timed out.
    pub fn update(&mut self) -> bool {
        self.previous_position = self.position;

        let last = TILE_DEBRIS_MOVEMENT_SEQUENCE.len() - 1;
        let velocity_y = TILE_DEBRIS_MOVEMENT_SEQUENCE[self.sequence_step.min(last)];
        self.position += IVec2::new(self.velocity_x, velocity_y);
        self.sequence_step += 1;

        self.frames_left = self.frames_left.saturating_sub(1);
        self.frames_left > 0
    }
}

/// Everything a geometry update may touch besides the piece itself
#[derive(Debug, Clone)]
pub struct World {
    /// The live map
    pub map: Map,
    pub debris: Vec<TileDebris>,
    /// Outgoing events for audio and presentation, drained by the frontend
    pub events: Vec<GameEvent>,
    pub settings: Settings,
    rng: Pcg32,
    next_id: EntityId,
}

impl World {
    pub fn new(map: Map, seed: u64, settings: Settings) -> Self {
        Self {
            map,
            debris: Vec::new(),
            events: Vec::new(),
            settings: settings.sanitized(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Uniform random integer in `0..bound`
    pub fn random_below(&mut self, bound: i32) -> i32 {
        if bound <= 1 {
            return 0;
        }
        self.rng.random_range(0..bound)
    }

    pub fn play_sound(&mut self, sound: SoundId) {
        self.events.push(GameEvent::PlaySound(sound));
    }

    pub fn shake_screen(&mut self, amount: i32) {
        if self.settings.effective_screen_shake() {
            self.events.push(GameEvent::ScreenShake { amount });
        }
    }

    pub fn flash_screen(&mut self) {
        if self.settings.effective_screen_flash() {
            self.events.push(GameEvent::ScreenFlash);
        }
    }

    /// Take all outgoing events emitted so far
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Complete simulation state for one level
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub world: World,
    /// Burnable regions and missile holes; kept for the whole level
    pub simple_sections: Vec<Rect>,
    /// Dynamic geometry entities, sorted by ID
    pub pieces: Vec<GeometryPiece>,
    /// Gameplay events waiting for the next tick
    pub(crate) pending_events: Vec<GameplayEvent>,
}

impl GameState {
    pub fn new(map: Map, simple_sections: Vec<Rect>, seed: u64, settings: Settings) -> Self {
        Self {
            seed,
            time_ticks: 0,
            world: World::new(map, seed, settings),
            simple_sections,
            pieces: Vec::new(),
            pending_events: Vec::new(),
        }
    }

    /// Set up a level: partition the map, create the dynamic geometry entities
    /// and attach the uncovered-area snapshots to them.
    ///
    /// Returns the state together with the static part of the map.
    pub fn from_level(level: LevelData, seed: u64, settings: Settings) -> (Self, Map) {
        let sections = determine_dynamic_map_sections(&level.map, &level.actors);
        let LevelData { map, actors } = level;

        let mut state = Self::new(map, sections.simple_sections, seed, settings);
        for (actor_index, actor) in actors.iter().enumerate() {
            state.spawn_actor(actor_index, actor);
        }
        state.initialize_dynamic_geometry_entities(&sections.falling_sections);

        log::info!(
            "Level ready: {} geometry pieces, {} simple sections",
            state.pieces.len(),
            state.simple_sections.len()
        );

        (state, sections.map_static_parts)
    }

    /// Create the entity for an actor that owns a map area
    pub fn spawn_actor(&mut self, actor_index: usize, actor: &ActorDesc) -> Option<EntityId> {
        let area = actor.assigned_area?;
        let id = self.world.next_entity_id();
        let mut body = GeometryBody::new(area);
        body.position = actor.position;

        self.pieces.push(GeometryPiece {
            id,
            actor_index: Some(actor_index),
            shootable: actor.kind.is_shootable_wall(),
            previous_position: body.position,
            body,
            controller: actor
                .kind
                .initial_geometry_type()
                .map(DynamicGeometryController::new),
        });
        Some(id)
    }

    /// Attach the snapshot of the area below each falling piece.
    ///
    /// Infos and pieces are matched on the actor they both came from, walking
    /// both in ascending order. Shootable walls never fall and are skipped.
    pub fn initialize_dynamic_geometry_entities(&mut self, falling_sections: &[FallingSectionInfo]) {
        let mut infos = falling_sections.iter().peekable();

        for piece in self.pieces.iter_mut() {
            if piece.shootable {
                continue;
            }
            let Some(actor_index) = piece.actor_index else {
                continue;
            };

            while let Some(orphan) = infos.next_if(|info| info.actor_index < actor_index) {
                log::warn!(
                    "No geometry entity for falling section {} (actor {})",
                    orphan.section_below,
                    orphan.actor_index
                );
            }

            if let Some(info) = infos.next_if(|info| info.actor_index == actor_index) {
                let below = info.section_below;
                log::debug!("Entity {} uncovers {} while falling", piece.id, below);
                piece.body.link.extra_section = Some(ExtraSection {
                    tiles: self.world.map.copy_section(&below),
                    top: below.top(),
                    height: below.height(),
                });
            }
        }
    }

    pub fn piece(&self, id: EntityId) -> Option<&GeometryPiece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    pub fn piece_mut(&mut self, id: EntityId) -> Option<&mut GeometryPiece> {
        self.pieces.iter_mut().find(|p| p.id == id)
    }

    pub fn remove_piece(&mut self, id: EntityId) {
        self.pieces.retain(|p| p.id != id);
    }
}
