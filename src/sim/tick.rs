//! Fixed timestep simulation tick
//!
//! Advances the dynamic geometry deterministically: queued gameplay events
//! first, then every active piece in entity order, then tile debris.

use super::behavior::{StepContext, UpdateResult};
use super::state::{EntityId, GameState};

/// Advance the simulation by one step
pub fn tick(state: &mut GameState, ctx: &StepContext) {
    state.time_ticks += 1;

    state.process_pending_events();

    let mut destroyed: Vec<EntityId> = Vec::new();
    for piece in state.pieces.iter_mut() {
        piece.previous_position = piece.body.position;

        let Some(controller) = piece.controller.as_mut() else {
            continue;
        };
        if !piece.body.is_active(ctx.active_region.as_ref()) {
            continue;
        }

        if controller.update(&mut piece.body, &mut state.world, ctx) == UpdateResult::Destroyed {
            destroyed.push(piece.id);
        }
    }

    if !destroyed.is_empty() {
        log::debug!("Tick {}: removing geometry {:?}", state.time_ticks, destroyed);
        state.pieces.retain(|p| !destroyed.contains(&p.id));
    }

    state.world.debris.retain_mut(|debris| debris.update());
}
