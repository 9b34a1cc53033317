use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::DistanceAlg;
use bracket_random::prelude::RandomNumberGenerator;

use crate::{ecs::components::Enemy, map::CARDINALS};

pub const ENGAGE_RANGE: f32 = 3.0;
pub const PURSUIT_CHANCE: f32 = 0.7;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IdleReason {
    Busy,
    Stunned,
    Hidden,
    Skipped,
    AmbushGrace,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TurnDecision {
    Idle(IdleReason),
    Act,
}

/// One turn of an enemy's suppression checks, in priority order. Stun ticks down
/// even while the enemy is hidden in fog; the ambush grace turn is spent the first
/// time it is seen after being hidden.
pub fn advance_state(enemy: &mut Enemy, revealed: bool) -> TurnDecision {
    if enemy.in_sequence {
        return TurnDecision::Idle(IdleReason::Busy);
    }
    if enemy.stun_turns > 0 {
        enemy.stun_turns -= 1;
        return TurnDecision::Idle(IdleReason::Stunned);
    }
    if !revealed {
        enemy.was_revealed = false;
        return TurnDecision::Idle(IdleReason::Hidden);
    }
    if enemy.skip_next_turn {
        enemy.skip_next_turn = false;
        return TurnDecision::Idle(IdleReason::Skipped);
    }
    if !enemy.was_revealed {
        enemy.was_revealed = true;
        return TurnDecision::Idle(IdleReason::AmbushGrace);
    }
    TurnDecision::Act
}

/// Unit step along the axis with the larger gap to `target`; ties go to Y.
pub fn dominant_step(from: Point, target: Point) -> Point {
    let dx = target.x - from.x;
    let dy = target.y - from.y;
    if dx.abs() > dy.abs() {
        Point::new(dx.signum(), 0)
    } else {
        Point::new(0, if dy >= 0 { 1 } else { -1 })
    }
}

/// Where an acting enemy wants to go, or `None` when the player is out of range.
pub fn choose_step(from: Point, player: Point, rng: &mut RandomNumberGenerator) -> Option<Point> {
    if DistanceAlg::Pythagoras.distance2d(from, player) > ENGAGE_RANGE {
        return None;
    }
    let step = if rng.range(0.0f32, 1.0) < PURSUIT_CHANCE {
        dominant_step(from, player)
    } else {
        CARDINALS[rng.range(0, CARDINALS.len() as i32) as usize]
    };
    Some(Point::new(from.x + step.x, from.y + step.y))
}
