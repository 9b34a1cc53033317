#![allow(dead_code)]

use bracket_geometry::prelude::Point;
use specs::prelude::Entity;

use crate::map::{Grid, fog::FogOfWar};

/// Snapshot of the floor handed to systems for one turn.
#[derive(Clone)]
pub struct MovementContext {
    pub player_point: Point,
    pub width: i32,
    pub height: i32,
    walkable: Vec<bool>,
    revealed: Vec<bool>,
}

impl MovementContext {
    pub fn from_floor(grid: &Grid, fog: &FogOfWar, player_point: Point) -> Self {
        let walkable = grid.points().map(|point| grid.is_floor(point)).collect();
        Self {
            player_point,
            width: grid.width,
            height: grid.height,
            walkable,
            revealed: fog.revealed_mask(),
        }
    }

    fn idx(&self, point: Point) -> Option<usize> {
        if self.in_bounds(point) {
            Some((point.y * self.width + point.x) as usize)
        } else {
            None
        }
    }

    pub fn is_walkable(&self, point: Point) -> bool {
        self.idx(point)
            .and_then(|idx| self.walkable.get(idx).copied())
            .unwrap_or(false)
    }

    pub fn is_revealed(&self, point: Point) -> bool {
        self.idx(point)
            .and_then(|idx| self.revealed.get(idx).copied())
            .unwrap_or(false)
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }
}

/// Enemies in the order they were registered; turns run in this order.
#[derive(Default, Debug)]
pub struct ActorRegistry {
    order: Vec<Entity>,
}

impl ActorRegistry {
    pub fn register(&mut self, entity: Entity) {
        if !self.order.contains(&entity) {
            self.order.push(entity);
        }
    }

    pub fn unregister(&mut self, entity: Entity) {
        self.order.retain(|registered| *registered != entity);
    }

    pub fn actors(&self) -> &[Entity] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Default, Debug)]
pub struct RadarState {
    pub remaining: u32,
}

impl RadarState {
    pub fn active(&self) -> bool {
        self.remaining > 0
    }
}

#[derive(Default, Debug)]
pub struct TurnClock {
    pub turn: u64,
    /// Turn-completed notifications not yet consumed by timers.
    pub pending: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{events::EventLog, map::Cell};
    use specs::prelude::{Builder, World, WorldExt};

    #[test]
    fn context_follows_grid_and_fog() {
        let mut grid = Grid::filled(5, 5);
        grid.set(Point::new(2, 2), Cell::Floor);
        let mut fog = FogOfWar::new(5, 5, true);
        fog.reveal(Point::new(1, 1), false, &mut EventLog::default());

        let ctx = MovementContext::from_floor(&grid, &fog, Point::new(2, 2));
        assert!(ctx.is_walkable(Point::new(2, 2)));
        assert!(!ctx.is_walkable(Point::new(1, 2)));
        assert!(!ctx.is_walkable(Point::new(-1, 2)));
        assert!(ctx.is_revealed(Point::new(2, 2)));
        assert!(!ctx.is_revealed(Point::new(3, 3)));
    }

    #[test]
    fn registry_keeps_order_without_duplicates() {
        let mut world = World::new();
        let a = world.create_entity().build();
        let b = world.create_entity().build();
        let mut registry = ActorRegistry::default();
        registry.register(b);
        registry.register(a);
        registry.register(b);
        assert_eq!(registry.actors(), &[b, a]);
        registry.unregister(b);
        assert_eq!(registry.actors(), &[a]);
    }
}
