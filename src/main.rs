//! Dynamic geometry demo runner
//!
//! Loads a level (or builds a small built-in one), runs the simulation with a
//! few scripted gameplay events and prints the resulting map.
//!
//! Usage: `dynamic-geometry [level.json]`

use std::path::Path;
use std::process::ExitCode;

use glam::IVec2;

use dynamic_geometry::Settings;
use dynamic_geometry::renderer::{
    DrawList, render_dynamic_background_sections, render_dynamic_foreground_sections,
};
use dynamic_geometry::sim::{
    ActorDesc, ActorKind, EntityId, GameEvent, GameState, GameplayEvent, LevelData, Map, Rect,
    StepContext, TileAttributes, tick,
};

const DEMO_STEPS: u64 = 120;
const DEMO_SEED: u64 = 0x5eed;
const SETTINGS_FILE: &str = "settings.json";

// Built-in level tiles
const SOLID_BLOCK: u16 = 1;
const DECORATION: u16 = 2;
const FLAMMABLE: u16 = 3;
const BRICK: u16 = 4;

fn demo_attributes() -> Vec<TileAttributes> {
    vec![
        TileAttributes::NONE,
        TileAttributes::SOLID,
        TileAttributes::NONE,
        TileAttributes::SOLID | TileAttributes::FLAMMABLE,
        TileAttributes::SOLID,
    ]
}

fn demo_level() -> LevelData {
    let mut map = Map::new(32, 16, demo_attributes());
    map.fill(0, &Rect::new(0, 15, 32, 1), SOLID_BLOCK);
    map.fill(0, &Rect::new(0, 0, 32, 1), SOLID_BLOCK);

    let door = Rect::new(4, 3, 2, 4);
    let sinking = Rect::new(10, 2, 3, 2);
    let quake = Rect::new(16, 1, 2, 2);
    let resting = Rect::new(21, 5, 2, 2);
    let wall = Rect::new(26, 9, 2, 6);
    for area in [door, sinking, quake, resting, wall] {
        map.fill(0, &area, BRICK);
    }
    map.fill(1, &Rect::new(4, 10, 2, 1), DECORATION);
    map.fill(0, &Rect::new(12, 11, 4, 1), FLAMMABLE);

    LevelData {
        map,
        actors: vec![
            ActorDesc::with_area(ActorKind::BlueKeyDoor, door),
            ActorDesc::with_area(ActorKind::SinkingGeometry, sinking),
            ActorDesc::with_area(ActorKind::QuakeGeometry, quake),
            ActorDesc::new(ActorKind::Other, IVec2::new(8, 14)),
            ActorDesc::with_area(ActorKind::RestingGeometry, resting),
            ActorDesc::with_area(ActorKind::ShootableWall, wall),
        ],
    }
}

fn load_level(args: &[String]) -> Result<LevelData, Box<dyn std::error::Error>> {
    match args.get(1) {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            Ok(LevelData::from_json(&json)?)
        }
        None => {
            log::info!("No level given, using the built-in demo level");
            Ok(demo_level())
        }
    }
}

/// Entity created from the actor at `actor_index`
fn piece_for_actor(state: &GameState, actor_index: usize) -> Option<EntityId> {
    state
        .pieces
        .iter()
        .find(|p| p.actor_index == Some(actor_index))
        .map(|p| p.id)
}

/// Gameplay events a player would cause at `step`
fn scripted_events(state: &GameState, step: u64) -> Vec<GameplayEvent> {
    let mut events = Vec::new();
    match step {
        5 => {
            if let Some(entity) = piece_for_actor(state, 0) {
                events.push(GameplayEvent::DoorOpened { entity });
            }
        }
        30 => events.push(GameplayEvent::MissileDetonated {
            impact: IVec2::new(24, 1),
        }),
        50 => events.push(GameplayEvent::TileBurnedAway {
            position: IVec2::new(13, 11),
        }),
        70 => {
            if let Some(entity) = piece_for_actor(state, 5) {
                events.push(GameplayEvent::ShootableKilled { entity });
            }
        }
        _ => {}
    }
    events
}

fn ascii_map(map: &Map) -> String {
    let mut out = String::with_capacity(((map.width() + 1) * map.height()) as usize);
    for y in 0..map.height() {
        for x in 0..map.width() {
            let attributes = map.attributes(x, y);
            out.push(if map.is_empty_at(x, y) {
                '.'
            } else if attributes.is_flammable() {
                '~'
            } else if attributes.contains(TileAttributes::SOLID_TOP) {
                '#'
            } else {
                '+'
            });
        }
        out.push('\n');
    }
    out
}

fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load(Path::new(SETTINGS_FILE))?;
    let level = load_level(args)?;
    let (mut state, static_map) = GameState::from_level(level, DEMO_SEED, settings);
    let screen = state.world.map.bounds();

    log::info!("Static map:\n{}", ascii_map(&static_map));

    let mut draw_list = DrawList::default();
    for step in 1..=DEMO_STEPS {
        for event in scripted_events(&state, step) {
            state.post(event);
        }

        let ctx = StepContext {
            is_earth_shaking: (40..60).contains(&step),
            active_region: Some(screen),
        };
        tick(&mut state, &ctx);

        for event in state.world.drain_events() {
            match event {
                GameEvent::PlaySound(sound) => log::info!("Step {step}: sound {sound:?}"),
                other => log::debug!("Step {step}: {other:?}"),
            }
        }

        draw_list.clear();
        render_dynamic_background_sections(&state, &mut draw_list, &screen, 0.5);
        render_dynamic_foreground_sections(&state, &mut draw_list, &screen, 0.5);
        let tiles: usize = draw_list
            .calls
            .iter()
            .map(|call| call.visible_tiles(&state.world.map))
            .sum();
        log::debug!(
            "Step {step}: {} draw calls, {tiles} tiles, {} pieces, {} debris",
            draw_list.len(),
            state.pieces.len(),
            state.world.debris.len()
        );
    }

    log::info!(
        "Finished after {} steps: {} pieces left, {} simple sections",
        state.time_ticks,
        state.pieces.len(),
        state.simple_sections.len()
    );
    print!("{}", ascii_map(&state.world.map));
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("dynamic-geometry: {e}");
            ExitCode::FAILURE
        }
    }
}
