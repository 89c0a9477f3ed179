//! Gameplay events in, presentation events out
//!
//! Other systems report kills, detonations, burning tiles and opened doors as
//! [`GameplayEvent`]s. They are queued with [`GameState::post`] and applied at
//! the start of the next tick, before any piece of geometry is updated, so
//! event-driven map changes never interleave with a piece's own update.
//!
//! Sounds, screen effects and one-shot sprites produced by the simulation are
//! collected as [`GameEvent`]s in [`World::events`](super::state::World).

use glam::IVec2;

use super::behavior::{DynamicGeometryController, GeometryType};
use super::mutation::explode_map_section;
use super::rect::Rect;
use super::state::{ActivationPolicy, EntityId, GameState};
use crate::consts::MISSILE_HOLE_SIZE;

/// Sound effects triggered by dynamic geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundId {
    /// Delayed geometry is about to let go
    FallingRock,
    /// Sinking geometry grinding into the floor
    HammerSmash,
    /// Geometry landed or sank by one row
    BlueKeyDoorOpened,
    BigExplosion,
}

/// One-shot visual effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    ShotImpact,
}

/// Output of the simulation, consumed by audio and presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    PlaySound(SoundId),
    ScreenShake { amount: i32 },
    ScreenFlash,
    SpawnOneShot { effect: EffectKind, position: IVec2 },
}

/// Input from other gameplay systems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameplayEvent {
    /// A shootable entity was destroyed
    ShootableKilled { entity: EntityId },
    /// The player opened a blue key door
    DoorOpened { entity: EntityId },
    /// A missile hit the map
    MissileDetonated { impact: IVec2 },
    /// Fire consumed a single tile
    TileBurnedAway { position: IVec2 },
}

impl GameState {
    /// Queue an event for the next tick
    pub fn post(&mut self, event: GameplayEvent) {
        self.pending_events.push(event);
    }

    /// Apply all queued events in the order they were posted
    pub(crate) fn process_pending_events(&mut self) {
        for event in std::mem::take(&mut self.pending_events) {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: GameplayEvent) {
        log::debug!("Handling {event:?}");
        match event {
            GameplayEvent::ShootableKilled { entity } => self.on_shootable_killed(entity),
            GameplayEvent::DoorOpened { entity } => self.on_door_opened(entity),
            GameplayEvent::MissileDetonated { impact } => self.on_missile_detonated(impact),
            GameplayEvent::TileBurnedAway { position } => self.on_tile_burned_away(position),
        }
    }

    fn on_shootable_killed(&mut self, entity: EntityId) {
        let Some(piece) = self.piece(entity) else {
            log::warn!("Shootable {entity} is gone, nothing to explode");
            return;
        };
        let section = piece.body.link.section;

        explode_map_section(&section, &mut self.world);
        self.world.play_sound(SoundId::BigExplosion);
        self.world.flash_screen();
        self.remove_piece(entity);
    }

    fn on_door_opened(&mut self, entity: EntityId) {
        let Some(piece) = self.piece_mut(entity) else {
            log::warn!("Opened door {entity} does not exist");
            return;
        };

        piece.body.activation = ActivationPolicy::Always;
        piece.controller = Some(DynamicGeometryController::new(GeometryType::BlueKeyDoor));
    }

    fn on_missile_detonated(&mut self, impact: IVec2) {
        let offset = MISSILE_HOLE_SIZE / 2;
        let section = Rect::from_parts(
            impact - IVec2::splat(offset),
            IVec2::splat(MISSILE_HOLE_SIZE),
        );

        explode_map_section(&section, &mut self.world);
        self.register_simple_section(section);
        self.world.flash_screen();
    }

    fn on_tile_burned_away(&mut self, position: IVec2) {
        self.world.map.set_tile_at(0, position.x, position.y, 0);
        self.world.map.set_tile_at(1, position.x, position.y, 0);

        if !self.simple_sections.iter().any(|s| s.contains(position)) {
            self.register_simple_section(Rect::from_parts(position, IVec2::ONE));
        }
    }

    fn register_simple_section(&mut self, section: Rect) {
        if !self.simple_sections.contains(&section) {
            self.simple_sections.push(section);
        }
    }
}
