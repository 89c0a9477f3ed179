//! Behavior of falling, sinking and exploding map geometry
//!
//! Every piece of dynamic geometry with a controller runs a small state machine
//! once per simulation step. Moving a piece means moving its tiles in the live
//! map, so the map always shows each piece where the simulation has it.

use glam::IVec2;

use super::events::{EffectKind, GameEvent, SoundId};
use super::map::{Map, SolidEdge};
use super::mutation::{explode_map_section, move_tile_section, squash_tile_section};
use super::rect::Rect;
use super::state::{ActivationPolicy, GeometryBody, World};

/// Behavior variants of dynamic geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    FallDownAfterDelayThenSinkIntoGround,
    FallDownWhileEarthQuakeActiveThenExplode,
    FallDownImmediatelyThenStayOnGround,
    FallDownImmediatelyThenExplode,
    FallDownAfterDelayThenStayOnGround,
    BlueKeyDoor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryState {
    #[default]
    Waiting,
    Falling,
    Sinking,
}

/// Per-step input shared by all pieces
#[derive(Debug, Clone, Copy, Default)]
pub struct StepContext {
    /// An earthquake is going on this step
    pub is_earth_shaking: bool,
    /// Pieces without the always-active policy only update inside this region.
    /// `None` updates everything.
    pub active_region: Option<Rect>,
}

/// Whether the piece survived its update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResult {
    Alive,
    Destroyed,
}

/// State machine driving one piece of dynamic geometry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicGeometryController {
    pub kind: GeometryType,
    pub state: GeometryState,
    pub frames_elapsed: u32,
}

/// Bottom row at the map edge, or a top-solid tile under either bottom corner
pub fn is_on_solid_ground(section: &Rect, map: &Map) -> bool {
    if section.bottom() >= map.height() - 1 {
        return true;
    }

    let below = section.bottom() + 1;
    map.collision_data(section.left(), below)
        .is_solid_on(SolidEdge::Top)
        || map
            .collision_data(section.right(), below)
            .is_solid_on(SolidEdge::Top)
}

/// Move the piece down by up to `fall_speed` rows (at least one). Returns true
/// as soon as it stands on solid ground.
pub fn fall(body: &mut GeometryBody, map: &mut Map, fall_speed: i32) -> bool {
    for _ in 0..fall_speed.max(1) {
        if is_on_solid_ground(&body.link.section, map) {
            return true;
        }

        move_tile_section(&mut body.link.section, map);
        body.position.y += 1;
    }

    false
}

/// Squash the piece by one row; the last row disappears with the entity
pub fn sink(body: &mut GeometryBody, world: &mut World) -> UpdateResult {
    let section = &mut body.link.section;
    if section.height() == 1 {
        world.map.clear_section(section.left(), section.top(), section.width(), 1);
        world.play_sound(SoundId::BlueKeyDoorOpened);
        return UpdateResult::Destroyed;
    }

    squash_tile_section(section, &mut world.map);
    log::trace!("Sank to {section}");
    UpdateResult::Alive
}

/// Blow the piece apart
pub fn explode(body: &GeometryBody, world: &mut World) -> UpdateResult {
    explode_map_section(&body.link.section, world);
    world.play_sound(SoundId::BigExplosion);
    world.flash_screen();
    UpdateResult::Destroyed
}

fn land(world: &mut World) {
    world.play_sound(SoundId::BlueKeyDoorOpened);
    world.shake_screen(world.settings.landing_shake_amount);
}

fn do_burn_effect(section: &Rect, world: &mut World) {
    world.shake_screen(world.settings.burn_shake_amount);
    world.play_sound(SoundId::HammerSmash);

    let offset = world.random_below(section.width());
    world.events.push(GameEvent::SpawnOneShot {
        effect: EffectKind::ShotImpact,
        position: IVec2::new(section.left() + offset, section.bottom() + 1),
    });
}

fn make_always_active(body: &mut GeometryBody) {
    body.activation = ActivationPolicy::Always;
}

impl DynamicGeometryController {
    pub fn new(kind: GeometryType) -> Self {
        Self {
            kind,
            state: GeometryState::Waiting,
            frames_elapsed: 0,
        }
    }

    /// Advance the piece by one simulation step
    pub fn update(
        &mut self,
        body: &mut GeometryBody,
        world: &mut World,
        ctx: &StepContext,
    ) -> UpdateResult {
        let previous = (self.kind, self.state);

        let result = match self.kind {
            GeometryType::FallDownAfterDelayThenSinkIntoGround => {
                self.update_delayed_sinking(body, world)
            }
            GeometryType::BlueKeyDoor => self.update_door(body, world),
            GeometryType::FallDownWhileEarthQuakeActiveThenExplode => {
                self.update_quake_exploding(body, world, ctx)
            }
            GeometryType::FallDownImmediatelyThenStayOnGround => {
                self.update_immediate_resting(body, world)
            }
            GeometryType::FallDownImmediatelyThenExplode => {
                self.update_immediate_exploding(body, world)
            }
            GeometryType::FallDownAfterDelayThenStayOnGround => {
                self.update_delayed_resting(body, world)
            }
        };

        if previous != (self.kind, self.state) || result == UpdateResult::Destroyed {
            log::debug!(
                "Geometry {:?}/{:?} -> {:?}/{:?} ({:?}) at {}",
                previous.0,
                previous.1,
                self.kind,
                self.state,
                result,
                body.link.section
            );
        }

        result
    }

    /// Count frames; cue the sound at `num_frames`, start falling one frame later.
    /// A delay of zero falls on the first frame without the cue.
    fn update_waiting(&mut self, body: &mut GeometryBody, world: &mut World, num_frames: u32) {
        self.frames_elapsed = self.frames_elapsed.saturating_add(1);
        if self.frames_elapsed == num_frames {
            world.play_sound(SoundId::FallingRock);
        } else if self.frames_elapsed > num_frames {
            make_always_active(body);
            self.state = GeometryState::Falling;
        }
    }

    fn update_delayed_sinking(&mut self, body: &mut GeometryBody, world: &mut World) -> UpdateResult {
        match self.state {
            GeometryState::Waiting => {
                let delay = world.settings.fall_delay_frames;
                self.update_waiting(body, world, delay);
                UpdateResult::Alive
            }
            GeometryState::Falling => {
                if fall(body, &mut world.map, world.settings.fall_speed) {
                    self.state = GeometryState::Sinking;
                    do_burn_effect(&body.link.section, world);
                    sink(body, world)
                } else {
                    UpdateResult::Alive
                }
            }
            GeometryState::Sinking => {
                do_burn_effect(&body.link.section, world);
                sink(body, world)
            }
        }
    }

    fn update_quake_exploding(
        &mut self,
        body: &mut GeometryBody,
        world: &mut World,
        ctx: &StepContext,
    ) -> UpdateResult {
        match self.state {
            GeometryState::Waiting => {
                if ctx.is_earth_shaking {
                    let delay = world.settings.quake_delay_frames;
                    self.update_waiting(body, world, delay);
                }
                UpdateResult::Alive
            }
            GeometryState::Falling => {
                if fall(body, &mut world.map, world.settings.fall_speed) {
                    explode(body, world)
                } else {
                    UpdateResult::Alive
                }
            }
            GeometryState::Sinking => UpdateResult::Alive,
        }
    }

    fn update_immediate_resting(&mut self, body: &mut GeometryBody, world: &mut World) -> UpdateResult {
        match self.state {
            GeometryState::Waiting => {
                if !is_on_solid_ground(&body.link.section, &world.map) {
                    make_always_active(body);
                    self.state = GeometryState::Falling;
                    if fall(body, &mut world.map, world.settings.fall_speed) {
                        land(world);
                        self.state = GeometryState::Waiting;
                    }
                }
            }
            GeometryState::Falling => {
                if fall(body, &mut world.map, world.settings.fall_speed) {
                    land(world);
                    self.state = GeometryState::Waiting;
                }
            }
            GeometryState::Sinking => {}
        }

        UpdateResult::Alive
    }

    fn update_immediate_exploding(&mut self, body: &mut GeometryBody, world: &mut World) -> UpdateResult {
        match self.state {
            GeometryState::Waiting => {
                if is_on_solid_ground(&body.link.section, &world.map) {
                    return UpdateResult::Alive;
                }
                make_always_active(body);
                self.state = GeometryState::Falling;
                if fall(body, &mut world.map, world.settings.fall_speed) {
                    return explode(body, world);
                }
                UpdateResult::Alive
            }
            GeometryState::Falling => {
                if fall(body, &mut world.map, world.settings.fall_speed) {
                    explode(body, world)
                } else {
                    UpdateResult::Alive
                }
            }
            GeometryState::Sinking => UpdateResult::Alive,
        }
    }

    /// After landing this piece behaves like one that falls whenever unsupported
    fn update_delayed_resting(&mut self, body: &mut GeometryBody, world: &mut World) -> UpdateResult {
        match self.state {
            GeometryState::Waiting => {
                let delay = world.settings.fall_delay_frames;
                self.update_waiting(body, world, delay);
            }
            GeometryState::Falling => {
                if fall(body, &mut world.map, world.settings.fall_speed) {
                    land(world);
                    self.kind = GeometryType::FallDownImmediatelyThenStayOnGround;
                    self.state = GeometryState::Waiting;
                }
            }
            GeometryState::Sinking => {}
        }

        UpdateResult::Alive
    }

    fn update_door(&mut self, body: &mut GeometryBody, world: &mut World) -> UpdateResult {
        match self.state {
            GeometryState::Waiting => {
                self.frames_elapsed = self.frames_elapsed.saturating_add(1);
                if self.frames_elapsed >= world.settings.door_delay_frames {
                    make_always_active(body);
                    self.state = GeometryState::Falling;
                }
                UpdateResult::Alive
            }
            GeometryState::Falling => {
                if fall(body, &mut world.map, world.settings.fall_speed) {
                    self.state = GeometryState::Sinking;
                    sink(body, world)
                } else {
                    UpdateResult::Alive
                }
            }
            GeometryState::Sinking => sink(body, world),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::sim::map::test_support::*;
    use proptest::prelude::*;

    /// World with a floor at the bottom row and a brick piece at `section`
    fn world_with_piece(width: i32, height: i32, section: Rect) -> (World, GeometryBody) {
        let mut map = map_with_floor(width, height);
        map.fill(0, &section, BRICK);
        (
            World::new(map, 11, Settings::default()),
            GeometryBody::new(section),
        )
    }

    fn step(
        controller: &mut DynamicGeometryController,
        body: &mut GeometryBody,
        world: &mut World,
    ) -> UpdateResult {
        controller.update(body, world, &StepContext::default())
    }

    fn sounds(world: &mut World) -> Vec<SoundId> {
        world
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::PlaySound(sound) => Some(sound),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_corner_ground_check() {
        let mut map = Map::new(10, 10, attribute_table());
        let section = Rect::new(2, 2, 4, 2);
        assert!(!is_on_solid_ground(&section, &map));

        // Only the two bottom corners count
        map.set_tile_at(0, 3, 4, SOLID_BLOCK);
        assert!(!is_on_solid_ground(&section, &map));
        map.set_tile_at(0, 5, 4, PLATFORM);
        assert!(is_on_solid_ground(&section, &map));

        assert!(is_on_solid_ground(&Rect::new(0, 8, 1, 2), &map));
    }

    #[test]
    fn test_fall_moves_tiles_and_position() {
        let (mut world, mut body) = world_with_piece(8, 12, Rect::new(2, 1, 2, 2));

        assert!(!fall(&mut body, &mut world.map, 2));

        assert_eq!(body.link.section, Rect::new(2, 3, 2, 2));
        assert_eq!(body.position, IVec2::new(2, 4));
        assert!(world.map.is_empty_at(2, 1) && world.map.is_empty_at(2, 2));
        assert_eq!(world.map.tile_at(0, 2, 3), BRICK);
        assert_eq!(world.map.tile_at(0, 3, 4), BRICK);
    }

    #[test]
    fn test_door_scenario() {
        let (mut world, mut body) = world_with_piece(8, 10, Rect::new(3, 2, 1, 3));
        let mut door = DynamicGeometryController::new(GeometryType::BlueKeyDoor);

        step(&mut door, &mut body, &mut world);
        assert_eq!(door.state, GeometryState::Waiting);
        step(&mut door, &mut body, &mut world);
        assert_eq!(door.state, GeometryState::Falling);
        assert_eq!(body.activation, ActivationPolicy::Always);

        // Bottom at row 4, floor at row 9: four rows to fall at two per step
        step(&mut door, &mut body, &mut world);
        step(&mut door, &mut body, &mut world);
        assert_eq!(door.state, GeometryState::Falling);
        assert_eq!(body.link.section, Rect::new(3, 6, 1, 3));

        // First ground contact sinks right away
        assert_eq!(step(&mut door, &mut body, &mut world), UpdateResult::Alive);
        assert_eq!(door.state, GeometryState::Sinking);
        assert_eq!(body.link.section, Rect::new(3, 7, 1, 2));

        assert_eq!(step(&mut door, &mut body, &mut world), UpdateResult::Alive);
        assert_eq!(body.link.section.height(), 1);
        assert_eq!(step(&mut door, &mut body, &mut world), UpdateResult::Destroyed);

        assert!((0..9).all(|y| world.map.is_empty_at(3, y)));
        assert_eq!(world.map.tile_at(0, 3, 9), SOLID_BLOCK);
        // No burn effect for doors
        assert!(!world
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::SpawnOneShot { .. })));
    }

    #[test]
    fn test_delayed_sinking_waits_then_burns_into_ground() {
        let (mut world, mut body) = world_with_piece(8, 8, Rect::new(2, 4, 3, 2));
        let mut piece =
            DynamicGeometryController::new(GeometryType::FallDownAfterDelayThenSinkIntoGround);

        for _ in 0..19 {
            step(&mut piece, &mut body, &mut world);
        }
        assert!(sounds(&mut world).is_empty());

        step(&mut piece, &mut body, &mut world);
        assert_eq!(sounds(&mut world), vec![SoundId::FallingRock]);
        assert_eq!(piece.state, GeometryState::Waiting);

        step(&mut piece, &mut body, &mut world);
        assert_eq!(piece.state, GeometryState::Falling);

        // Bottom row 5 -> 6, then lands on the floor at row 7
        step(&mut piece, &mut body, &mut world);
        assert_eq!(piece.state, GeometryState::Sinking);
        assert_eq!(body.link.section, Rect::new(2, 6, 3, 1));
        let events = world.drain_events();
        assert!(events.contains(&GameEvent::ScreenShake { amount: 2 }));
        assert!(events.contains(&GameEvent::PlaySound(SoundId::HammerSmash)));
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::SpawnOneShot { effect: EffectKind::ShotImpact, position }
                if position.y == 7 && (2..5).contains(&position.x)
        )));

        assert_eq!(step(&mut piece, &mut body, &mut world), UpdateResult::Destroyed);
        assert!(Rect::new(2, 0, 3, 7).tiles().all(|p| world.map.is_empty_at(p.x, p.y)));
    }

    #[test]
    fn test_quake_geometry_only_counts_while_shaking() {
        let (mut world, mut body) = world_with_piece(8, 10, Rect::new(2, 1, 2, 2));
        let mut piece =
            DynamicGeometryController::new(GeometryType::FallDownWhileEarthQuakeActiveThenExplode);
        let calm = StepContext::default();
        let quake = StepContext {
            is_earth_shaking: true,
            ..StepContext::default()
        };

        for _ in 0..10 {
            piece.update(&mut body, &mut world, &calm);
        }
        assert_eq!(piece.frames_elapsed, 0);

        piece.update(&mut body, &mut world, &quake);
        piece.update(&mut body, &mut world, &quake);
        assert_eq!(piece.state, GeometryState::Waiting);
        piece.update(&mut body, &mut world, &quake);
        assert_eq!(piece.state, GeometryState::Falling);

        // Keeps falling after the quake stopped, explodes on the floor
        let mut result = UpdateResult::Alive;
        for _ in 0..10 {
            result = piece.update(&mut body, &mut world, &calm);
            if result == UpdateResult::Destroyed {
                break;
            }
        }
        assert_eq!(result, UpdateResult::Destroyed);
        assert_eq!(world.debris.len(), 4);
        assert!(world.map.is_empty_at(2, 8) && world.map.is_empty_at(3, 7));
        let events = world.drain_events();
        assert!(events.contains(&GameEvent::PlaySound(SoundId::BigExplosion)));
        assert!(events.contains(&GameEvent::ScreenFlash));
    }

    #[test]
    fn test_immediate_resting_lands_within_one_step() {
        let (mut world, mut body) = world_with_piece(8, 8, Rect::new(2, 4, 2, 2));
        let mut piece =
            DynamicGeometryController::new(GeometryType::FallDownImmediatelyThenStayOnGround);

        // One row of air below: falls one row and lands in the same step
        step(&mut piece, &mut body, &mut world);
        assert_eq!(piece.state, GeometryState::Waiting);
        assert_eq!(body.link.section, Rect::new(2, 5, 2, 2));
        assert_eq!(
            world.drain_events(),
            vec![
                GameEvent::PlaySound(SoundId::BlueKeyDoorOpened),
                GameEvent::ScreenShake { amount: 7 }
            ]
        );

        // Resting on the ground does nothing
        step(&mut piece, &mut body, &mut world);
        assert!(world.events.is_empty());
        assert_eq!(body.link.section, Rect::new(2, 5, 2, 2));

        // Remove the support and it drops onto the map edge
        world.map.clear_section(0, 7, 8, 1);
        step(&mut piece, &mut body, &mut world);
        assert_eq!(piece.state, GeometryState::Waiting);
        assert_eq!(body.link.section, Rect::new(2, 6, 2, 2));
        assert_eq!(world.events.len(), 2);
    }

    #[test]
    fn test_immediate_exploding_on_ground_waits() {
        let (mut world, mut body) = world_with_piece(8, 8, Rect::new(2, 5, 2, 2));
        let mut piece = DynamicGeometryController::new(GeometryType::FallDownImmediatelyThenExplode);

        assert_eq!(step(&mut piece, &mut body, &mut world), UpdateResult::Alive);
        assert_eq!(piece.state, GeometryState::Waiting);

        world.map.clear_section(0, 7, 8, 1);
        // Now the bottom of the map is the ground; one row to go
        assert_eq!(step(&mut piece, &mut body, &mut world), UpdateResult::Destroyed);
        assert_eq!(world.debris.len(), 4);
    }

    #[test]
    fn test_delayed_resting_turns_into_resting_variant() {
        let (mut world, mut body) = world_with_piece(8, 12, Rect::new(2, 1, 2, 2));
        let mut piece =
            DynamicGeometryController::new(GeometryType::FallDownAfterDelayThenStayOnGround);

        for _ in 0..21 {
            step(&mut piece, &mut body, &mut world);
        }
        assert_eq!(piece.state, GeometryState::Falling);

        while piece.state == GeometryState::Falling {
            step(&mut piece, &mut body, &mut world);
        }

        assert_eq!(piece.kind, GeometryType::FallDownImmediatelyThenStayOnGround);
        assert_eq!(piece.state, GeometryState::Waiting);
        assert_eq!(body.link.section, Rect::new(2, 9, 2, 2));

        // Never counts delay frames again
        let frames = piece.frames_elapsed;
        world.drain_events();
        for _ in 0..30 {
            step(&mut piece, &mut body, &mut world);
        }
        assert_eq!(piece.frames_elapsed, frames);
        assert!(sounds(&mut world).is_empty());
    }

    #[test]
    fn test_zero_delays_fall_on_first_frame() {
        let settings = Settings {
            door_delay_frames: 0,
            fall_delay_frames: 0,
            ..Settings::default()
        };

        let mut map = map_with_floor(8, 10);
        map.fill(0, &Rect::new(3, 2, 1, 3), BRICK);
        let mut world = World::new(map, 11, settings);
        let mut body = GeometryBody::new(Rect::new(3, 2, 1, 3));
        let mut door = DynamicGeometryController::new(GeometryType::BlueKeyDoor);

        step(&mut door, &mut body, &mut world);
        assert_eq!(door.state, GeometryState::Falling);
        assert_eq!(door.frames_elapsed, 1);

        let mut result = UpdateResult::Alive;
        for _ in 0..10 {
            result = step(&mut door, &mut body, &mut world);
            if result == UpdateResult::Destroyed {
                break;
            }
        }
        assert_eq!(result, UpdateResult::Destroyed);
        assert_eq!(door.frames_elapsed, 1);

        let mut piece =
            DynamicGeometryController::new(GeometryType::FallDownAfterDelayThenSinkIntoGround);
        let mut body = GeometryBody::new(Rect::new(5, 1, 1, 1));
        step(&mut piece, &mut body, &mut world);
        assert_eq!(piece.state, GeometryState::Falling);
        // No cue for an immediate fall
        assert!(!sounds(&mut world).contains(&SoundId::FallingRock));
    }

    #[test]
    fn test_non_positive_fall_speed_still_moves() {
        let (mut world, mut body) = world_with_piece(8, 12, Rect::new(2, 1, 2, 2));

        assert!(!fall(&mut body, &mut world.map, 0));
        assert_eq!(body.link.section, Rect::new(2, 2, 2, 2));
        assert!(!fall(&mut body, &mut world.map, -3));
        assert_eq!(body.link.section, Rect::new(2, 3, 2, 2));
    }

    proptest! {
        #[test]
        fn prop_fall_never_passes_ground(
            top in 0i32..6,
            height in 1i32..4,
            ledge in proptest::option::of(8i32..14),
            speed in 1i32..4,
        ) {
            let section = Rect::new(2, top, 3, height);
            let (mut world, mut body) = world_with_piece(8, 16, section);
            if let Some(ledge) = ledge {
                world.map.set_tile_at(1, 4, ledge, PLATFORM);
            }

            let mut landed = false;
            for _ in 0..32 {
                prop_assert!(body.link.section.bottom() < world.map.height());
                if fall(&mut body, &mut world.map, speed) {
                    landed = true;
                    break;
                }
            }

            prop_assert!(landed);
            prop_assert!(is_on_solid_ground(&body.link.section, &world.map));
            let ground_row = ledge.filter(|l| *l > section.bottom()).unwrap_or(15);
            prop_assert_eq!(body.link.section.bottom(), ground_row - 1);
            prop_assert_eq!(body.position.y, body.link.section.bottom());
        }

        #[test]
        fn prop_sink_clears_and_destroys(height in 1i32..7) {
            let section = Rect::new(1, 9 - height, 2, height);
            let (mut world, mut body) = world_with_piece(6, 10, section);

            for _ in 0..height - 1 {
                prop_assert_eq!(sink(&mut body, &mut world), UpdateResult::Alive);
            }
            prop_assert_eq!(sink(&mut body, &mut world), UpdateResult::Destroyed);
            prop_assert!(section.tiles().all(|p| world.map.is_empty_at(p.x, p.y)));
        }
    }
}
