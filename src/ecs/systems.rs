#![allow(dead_code)]

use std::collections::HashSet;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use log::{debug, info};
use specs::prelude::*;

use super::{
    components::{ENEMY_ORDER, Enemy, Position, Renderable, SPECIAL_TILE_ORDER, SpecialTile},
    resources::{ActorRegistry, MovementContext, RadarState, TurnClock},
};
use crate::{
    ai::{TurnDecision, advance_state, choose_step},
    events::{EventLog, EventSink},
};

/// Gives every registered enemy one turn, in registration order.
#[derive(Default)]
pub struct EnemyTurnSystem;

impl<'a> System<'a> for EnemyTurnSystem {
    type SystemData = (
        ReadExpect<'a, ActorRegistry>,
        ReadExpect<'a, MovementContext>,
        WriteStorage<'a, Enemy>,
        WriteStorage<'a, Position>,
        WriteExpect<'a, RandomNumberGenerator>,
        WriteExpect<'a, TurnClock>,
    );

    fn run(
        &mut self,
        (registry, movement, mut enemies, mut positions, mut rng, mut clock): Self::SystemData,
    ) {
        let mut occupied: HashSet<Point> = registry
            .actors()
            .iter()
            .filter_map(|entity| positions.get(*entity).map(|pos| pos.point))
            .collect();

        for &entity in registry.actors() {
            let (Some(enemy), Some(pos)) = (enemies.get_mut(entity), positions.get_mut(entity))
            else {
                continue;
            };
            let revealed = movement.is_revealed(pos.point);
            if advance_state(enemy, revealed) != TurnDecision::Act {
                continue;
            }
            let Some(target) = choose_step(pos.point, movement.player_point, &mut rng) else {
                continue;
            };
            if !movement.is_walkable(target)
                || target == movement.player_point
                || occupied.contains(&target)
            {
                continue;
            }
            occupied.remove(&pos.point);
            occupied.insert(target);
            pos.point = target;
        }

        clock.turn = clock.turn.wrapping_add(1);
        clock.pending += 1;
    }
}

/// Counts the radar down once per completed turn and undoes its layering at zero.
#[derive(Default)]
pub struct RadarSystem;

impl<'a> System<'a> for RadarSystem {
    type SystemData = (
        WriteExpect<'a, RadarState>,
        WriteExpect<'a, TurnClock>,
        ReadStorage<'a, Enemy>,
        WriteStorage<'a, SpecialTile>,
        WriteStorage<'a, Renderable>,
        WriteExpect<'a, EventLog>,
    );

    fn run(
        &mut self,
        (mut radar, mut clock, enemies, mut tiles, mut renderables, mut events): Self::SystemData,
    ) {
        let completed = std::mem::take(&mut clock.pending);
        for _ in 0..completed {
            if radar.remaining == 0 {
                break;
            }
            radar.remaining -= 1;
            debug!("radar: {} turns left", radar.remaining);
            if radar.remaining > 0 {
                continue;
            }

            for (_, renderable) in (&enemies, &mut renderables).join() {
                renderable.order = ENEMY_ORDER;
            }
            for (tile, renderable) in (&mut tiles, &mut renderables).join() {
                tile.revealed = false;
                renderable.order = SPECIAL_TILE_ORDER;
            }
            info!("radar expired");
            events.show_message("The radar's effect wore off.", None);
        }
    }
}
