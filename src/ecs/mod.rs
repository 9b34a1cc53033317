#![allow(dead_code)]

pub mod components;
pub mod resources;
pub mod systems;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::{RGB, to_cp437};
use log::{debug, info};
use specs::{
    prelude::{
        Builder, Dispatcher, DispatcherBuilder, Entity, Join, World as SpecsWorld, WorldExt,
    },
    shred::FetchMut,
};

use crate::{
    events::{EntityKind, EventLog, EventSink, CoreEvent},
    map::{Grid, fog::FogOfWar, populate::DoorKind},
};

use self::{
    components::{
        ABOVE_FOG_ORDER, BLOOD_ORDER, BloodDecal, Door, ENEMY_ORDER, Enemy, PLAYER_ORDER,
        PROP_ORDER, PlayerTag, Position, Renderable, SPECIAL_TILE_ORDER, Shelf, SpecialTile,
    },
    resources::{ActorRegistry, MovementContext, RadarState, TurnClock},
    systems::{EnemyTurnSystem, RadarSystem},
};

/// Odds for how many enemies a banish removes when no count is forced: 1, 2 or 3.
const BANISH_WEIGHTS: [(u32, f32); 3] = [(1, 0.5), (2, 0.3), (3, 0.2)];

/// Entity registry for one dungeon floor.
pub struct EcsWorld {
    specs_world: SpecsWorld,
    dispatcher: Dispatcher<'static, 'static>,
    player: Entity,
}

impl EcsWorld {
    pub fn new(spawn: Point, seed: u64) -> Self {
        let mut specs_world = SpecsWorld::new();
        Self::register_components(&mut specs_world);
        specs_world.insert(RandomNumberGenerator::seeded(seed));
        specs_world.insert(EventLog::default());
        specs_world.insert(ActorRegistry::default());
        specs_world.insert(RadarState::default());
        specs_world.insert(TurnClock::default());
        let player = Self::spawn_player(&mut specs_world, spawn);
        let dispatcher = DispatcherBuilder::new()
            .with(EnemyTurnSystem, "enemy_turns", &[])
            .with(RadarSystem, "radar", &["enemy_turns"])
            .build();

        Self {
            specs_world,
            dispatcher,
            player,
        }
    }

    fn register_components(world: &mut SpecsWorld) {
        world.register::<Position>();
        world.register::<Renderable>();
        world.register::<PlayerTag>();
        world.register::<Enemy>();
        world.register::<Shelf>();
        world.register::<SpecialTile>();
        world.register::<Door>();
        world.register::<BloodDecal>();
    }

    fn spawn_player(world: &mut SpecsWorld, spawn: Point) -> Entity {
        let player = world
            .create_entity()
            .with(Position { point: spawn })
            .with(Renderable {
                glyph: to_cp437('@'),
                color: RGB::from_u8(255, 255, 255),
                order: PLAYER_ORDER,
            })
            .with(PlayerTag)
            .build();
        world.write_resource::<EventLog>().emit(CoreEvent::EntitySpawned {
            kind: EntityKind::Player,
            point: spawn,
        });
        player
    }

    fn announce(&self, kind: EntityKind, point: Point) {
        self.events()
            .emit(CoreEvent::EntitySpawned { kind, point });
    }

    pub fn spawn_enemy(&mut self, point: Point) -> Entity {
        let entity = self
            .specs_world
            .create_entity()
            .with(Position { point })
            .with(Renderable {
                glyph: to_cp437('g'),
                color: RGB::from_u8(220, 60, 60),
                order: ENEMY_ORDER,
            })
            .with(Enemy::default())
            .build();
        self.specs_world
            .write_resource::<ActorRegistry>()
            .register(entity);
        debug!("enemy spawned at {},{}", point.x, point.y);
        self.announce(EntityKind::Enemy, point);
        entity
    }

    pub fn spawn_shelf(&mut self, point: Point, facing: Point, fixed_item: Option<String>) -> Entity {
        let entity = self
            .specs_world
            .create_entity()
            .with(Position { point })
            .with(Renderable {
                glyph: to_cp437('≡'),
                color: RGB::from_u8(190, 140, 80),
                order: PROP_ORDER,
            })
            .with(Shelf {
                searched: false,
                fixed_item,
                facing,
            })
            .build();
        self.announce(EntityKind::Shelf, point);
        entity
    }

    pub fn spawn_door(&mut self, point: Point, kind: DoorKind) -> Entity {
        let color = match kind {
            DoorKind::Exit => RGB::from_u8(240, 220, 90),
            DoorKind::Shop => RGB::from_u8(80, 140, 255),
        };
        let entity = self
            .specs_world
            .create_entity()
            .with(Position { point })
            .with(Renderable {
                glyph: to_cp437('+'),
                color,
                order: PROP_ORDER,
            })
            .with(Door { kind })
            .build();
        self.announce(EntityKind::Door(kind), point);
        entity
    }

    pub fn spawn_special_tile(&mut self, point: Point) -> Entity {
        let entity = self
            .specs_world
            .create_entity()
            .with(Position { point })
            .with(Renderable {
                glyph: to_cp437('*'),
                color: RGB::from_u8(120, 255, 200),
                order: SPECIAL_TILE_ORDER,
            })
            .with(SpecialTile::default())
            .build();
        self.announce(EntityKind::SpecialTile, point);
        entity
    }

    pub fn spawn_blood(&mut self, point: Point) -> Entity {
        let entity = self
            .specs_world
            .create_entity()
            .with(Position { point })
            .with(Renderable {
                glyph: to_cp437(','),
                color: RGB::from_u8(120, 0, 0),
                order: BLOOD_ORDER,
            })
            .with(BloodDecal)
            .build();
        self.announce(EntityKind::Blood, point);
        entity
    }

    /// Runs one full enemy turn, then lets turn-counted timers react to it.
    pub fn on_player_moved(&mut self, grid: &Grid, fog: &FogOfWar) {
        let context = MovementContext::from_floor(grid, fog, self.player_point());
        self.specs_world.insert(context);
        self.dispatcher.dispatch(&mut self.specs_world);
        self.specs_world.maintain();
    }

    pub fn turn(&self) -> u64 {
        self.specs_world.read_resource::<TurnClock>().turn
    }

    pub fn events(&self) -> FetchMut<'_, EventLog> {
        self.specs_world.write_resource::<EventLog>()
    }

    pub fn rng(&self) -> FetchMut<'_, RandomNumberGenerator> {
        self.specs_world.write_resource::<RandomNumberGenerator>()
    }

    pub fn drain_events(&mut self) -> Vec<CoreEvent> {
        self.events().drain()
    }

    pub fn player_entity(&self) -> Entity {
        self.player
    }

    pub fn player_point(&self) -> Point {
        self.point_of(self.player).unwrap_or(Point::new(0, 0))
    }

    pub fn set_player_point(&mut self, point: Point) {
        self.move_entity(self.player, point);
    }

    pub fn point_of(&self, entity: Entity) -> Option<Point> {
        self.specs_world
            .read_component::<Position>()
            .get(entity)
            .map(|pos| pos.point)
    }

    pub fn move_entity(&mut self, entity: Entity, point: Point) {
        let mut positions = self.specs_world.write_component::<Position>();
        if let Some(pos) = positions.get_mut(entity) {
            pos.point = point;
        }
    }

    /// Registered enemies in turn order.
    pub fn enemies(&self) -> Vec<(Entity, Point)> {
        let registry = self.specs_world.read_resource::<ActorRegistry>();
        let positions = self.specs_world.read_component::<Position>();
        registry
            .actors()
            .iter()
            .filter_map(|entity| positions.get(*entity).map(|pos| (*entity, pos.point)))
            .collect()
    }

    pub fn live_enemy_count(&self) -> usize {
        self.specs_world.read_resource::<ActorRegistry>().len()
    }

    pub fn enemy_at(&self, point: Point) -> Option<Entity> {
        self.enemies()
            .into_iter()
            .find(|(_, at)| *at == point)
            .map(|(entity, _)| entity)
    }

    pub fn enemy_state(&self, entity: Entity) -> Option<Enemy> {
        self.specs_world.read_component::<Enemy>().get(entity).cloned()
    }

    fn with_enemy<F: FnOnce(&mut Enemy)>(&mut self, entity: Entity, f: F) {
        let mut enemies = self.specs_world.write_component::<Enemy>();
        if let Some(enemy) = enemies.get_mut(entity) {
            f(enemy);
        }
    }

    pub fn stun(&mut self, entity: Entity, turns: u32) {
        self.with_enemy(entity, |enemy| enemy.stun_turns = turns);
        debug!("enemy {entity:?} stunned for {turns} turns");
    }

    pub fn stun_all(&mut self, turns: u32) {
        let mut enemies = self.specs_world.write_component::<Enemy>();
        for enemy in (&mut enemies).join() {
            enemy.stun_turns = turns;
        }
        info!("all enemies stunned for {turns} turns");
    }

    pub fn skip_next_turn(&mut self, entity: Entity) {
        self.with_enemy(entity, |enemy| enemy.skip_next_turn = true);
    }

    pub fn set_in_sequence(&mut self, entity: Entity, busy: bool) {
        self.with_enemy(entity, |enemy| enemy.in_sequence = busy);
    }

    pub fn remove_entity(&mut self, entity: Entity) {
        self.specs_world
            .write_resource::<ActorRegistry>()
            .unregister(entity);
        let _ = self.specs_world.delete_entity(entity);
    }

    /// Removes random enemies: `max` of them if given, otherwise 1-3 by weighted odds.
    /// Returns how many were actually removed.
    pub fn banish_enemies(&mut self, max: Option<u32>) -> usize {
        let mut pool: Vec<Entity> = self
            .specs_world
            .read_resource::<ActorRegistry>()
            .actors()
            .to_vec();
        if pool.is_empty() {
            return 0;
        }

        let wanted = match max {
            Some(count) if count > 0 => count,
            _ => {
                let roll = self.rng().range(0.0f32, 1.0);
                let mut cumulative = 0.0;
                let mut pick = BANISH_WEIGHTS[BANISH_WEIGHTS.len() - 1].0;
                for (count, weight) in BANISH_WEIGHTS {
                    cumulative += weight;
                    if roll < cumulative {
                        pick = count;
                        break;
                    }
                }
                pick
            }
        };

        let mut removed = 0;
        while removed < wanted as usize && !pool.is_empty() {
            let idx = self.rng().range(0, pool.len() as i32) as usize;
            let target = pool.swap_remove(idx);
            self.remove_entity(target);
            removed += 1;
        }
        self.specs_world.maintain();
        info!("banished {removed} enemies");
        removed
    }

    /// Draws enemies and special tiles above the fog and marks every special tile
    /// found, for `turns` completed turns.
    pub fn activate_radar(&mut self, turns: u32) {
        self.specs_world.write_resource::<RadarState>().remaining = turns;
        let enemies = self.specs_world.read_component::<Enemy>();
        let mut tiles = self.specs_world.write_component::<SpecialTile>();
        let mut renderables = self.specs_world.write_component::<Renderable>();
        for (_, renderable) in (&enemies, &mut renderables).join() {
            renderable.order = ABOVE_FOG_ORDER;
        }
        for (tile, renderable) in (&mut tiles, &mut renderables).join() {
            tile.revealed = true;
            renderable.order = ABOVE_FOG_ORDER;
        }
        info!("radar active for {turns} turns");
    }

    pub fn radar_remaining(&self) -> u32 {
        self.specs_world.read_resource::<RadarState>().remaining
    }

    pub fn door_at(&self, point: Point) -> Option<DoorKind> {
        let positions = self.specs_world.read_component::<Position>();
        let doors = self.specs_world.read_component::<Door>();
        (&positions, &doors)
            .join()
            .find(|(pos, _)| pos.point == point)
            .map(|(_, door)| door.kind)
    }

    pub fn has_prop_at(&self, point: Point) -> bool {
        let positions = self.specs_world.read_component::<Position>();
        let doors = self.specs_world.read_component::<Door>();
        let shelves = self.specs_world.read_component::<Shelf>();
        let door_here = (&positions, &doors).join().any(|(pos, _)| pos.point == point);
        door_here || (&positions, &shelves).join().any(|(pos, _)| pos.point == point)
    }

    /// Marks the unsearched shelf at `point` as searched and hands back its fixed item.
    /// `None` when there is nothing left to search there.
    pub fn search_shelf(&mut self, point: Point) -> Option<Option<String>> {
        let positions = self.specs_world.read_component::<Position>();
        let mut shelves = self.specs_world.write_component::<Shelf>();
        let shelf = (&positions, &mut shelves)
            .join()
            .find(|(pos, shelf)| pos.point == point && !shelf.searched)
            .map(|(_, shelf)| shelf)?;
        shelf.searched = true;
        Some(shelf.fixed_item.clone())
    }

    /// Marks the interactable special tile at `point` as searched.
    pub fn search_special_tile(&mut self, point: Point) -> Option<Entity> {
        let entities = self.specs_world.entities();
        let positions = self.specs_world.read_component::<Position>();
        let mut tiles = self.specs_world.write_component::<SpecialTile>();
        let (entity, _, tile) = (&entities, &positions, &mut tiles)
            .join()
            .find(|(_, pos, tile)| pos.point == point && tile.can_interact())?;
        tile.searched = true;
        Some(entity)
    }

    pub fn special_tiles(&self) -> Vec<(Entity, SpecialTile)> {
        let entities = self.specs_world.entities();
        let tiles = self.specs_world.read_component::<SpecialTile>();
        (&entities, &tiles)
            .join()
            .map(|(entity, tile)| (entity, tile.clone()))
            .collect()
    }

    pub fn shelves(&self) -> Vec<(Point, Shelf)> {
        let positions = self.specs_world.read_component::<Position>();
        let shelves = self.specs_world.read_component::<Shelf>();
        (&positions, &shelves)
            .join()
            .map(|(pos, shelf)| (pos.point, shelf.clone()))
            .collect()
    }

    pub fn renderable_of(&self, entity: Entity) -> Option<Renderable> {
        self.specs_world
            .read_component::<Renderable>()
            .get(entity)
            .cloned()
    }

    /// Visits renderables lowest order first.
    pub fn each_renderable<F: FnMut(Point, &Renderable)>(&self, mut f: F) {
        let positions = self.specs_world.read_component::<Position>();
        let renderables = self.specs_world.read_component::<Renderable>();
        let mut drawn: Vec<(&Position, &Renderable)> = (&positions, &renderables).join().collect();
        drawn.sort_by_key(|(_, renderable)| renderable.order);
        for (pos, renderable) in drawn {
            f(pos.point, renderable);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Room;

    fn open_floor() -> (Grid, FogOfWar) {
        let mut grid = Grid::filled(20, 20);
        grid.carve_room(&Room::new(1, 1, 18, 18));
        let fog = FogOfWar::new(20, 20, false);
        (grid, fog)
    }

    #[test]
    fn stunned_enemy_acts_on_fourth_turn() {
        let (grid, fog) = open_floor();
        let mut ecs = EcsWorld::new(Point::new(10, 10), 5);
        // Bystanders far from the player never get close enough to act.
        ecs.spawn_enemy(Point::new(2, 2));
        let target = ecs.spawn_enemy(Point::new(10, 12));
        ecs.spawn_enemy(Point::new(17, 17));
        ecs.stun(target, 2);

        for expected_stun in [1, 0, 0] {
            ecs.on_player_moved(&grid, &fog);
            let state = ecs.enemy_state(target).unwrap();
            assert_eq!(state.stun_turns, expected_stun);
            assert_eq!(ecs.point_of(target), Some(Point::new(10, 12)));
        }
        let state = ecs.enemy_state(target).unwrap();
        assert!(state.was_revealed);
        assert!(!state.skip_next_turn);

        // Every neighbour is open floor and the player is two cells away, so any
        // action is a committed step.
        ecs.on_player_moved(&grid, &fog);
        assert_ne!(ecs.point_of(target), Some(Point::new(10, 12)));
        assert_eq!(ecs.turn(), 4);
    }

    #[test]
    fn enemies_never_step_onto_the_player_or_each_other() {
        let (grid, fog) = open_floor();
        let mut ecs = EcsWorld::new(Point::new(10, 10), 17);
        let ring = [
            Point::new(10, 11),
            Point::new(11, 10),
            Point::new(9, 10),
            Point::new(10, 9),
        ];
        for point in ring {
            let enemy = ecs.spawn_enemy(point);
            ecs.with_enemy(enemy, |state| state.was_revealed = true);
        }
        for _ in 0..30 {
            ecs.on_player_moved(&grid, &fog);
            let points: Vec<Point> = ecs.enemies().into_iter().map(|(_, p)| p).collect();
            assert!(!points.contains(&Point::new(10, 10)));
            for (i, a) in points.iter().enumerate() {
                assert!(!points[i + 1..].contains(a));
            }
        }
    }

    #[test]
    fn banish_removes_one_to_three() {
        let mut ecs = EcsWorld::new(Point::new(1, 1), 23);
        for x in 0..5 {
            ecs.spawn_enemy(Point::new(5 + x, 5));
        }
        let removed = ecs.banish_enemies(None);
        assert!((1..=3).contains(&removed));
        assert_eq!(ecs.live_enemy_count(), 5 - removed);
        assert_eq!(ecs.enemies().len(), 5 - removed);
    }

    #[test]
    fn banish_is_capped_by_live_count() {
        let mut ecs = EcsWorld::new(Point::new(1, 1), 4);
        ecs.spawn_enemy(Point::new(3, 3));
        assert_eq!(ecs.banish_enemies(Some(3)), 1);
        assert_eq!(ecs.banish_enemies(None), 0);
    }

    #[test]
    fn radar_rehides_special_tiles_exactly_on_expiry() {
        let (grid, fog) = open_floor();
        let mut ecs = EcsWorld::new(Point::new(10, 10), 8);
        let tile = ecs.spawn_special_tile(Point::new(3, 3));
        let enemy = ecs.spawn_enemy(Point::new(17, 2));
        ecs.activate_radar(3);
        assert!(ecs.special_tiles()[0].1.revealed);
        assert!(ecs.renderable_of(enemy).unwrap().above_fog());

        for _ in 0..2 {
            ecs.on_player_moved(&grid, &fog);
            assert!(ecs.special_tiles()[0].1.revealed);
        }
        ecs.on_player_moved(&grid, &fog);
        assert_eq!(ecs.radar_remaining(), 0);
        assert!(!ecs.special_tiles()[0].1.revealed);
        assert_eq!(ecs.renderable_of(tile).unwrap().order, SPECIAL_TILE_ORDER);
        assert_eq!(ecs.renderable_of(enemy).unwrap().order, ENEMY_ORDER);
        assert!(
            ecs.drain_events()
                .iter()
                .any(|e| matches!(e, CoreEvent::Message { text, .. } if text.contains("wore off")))
        );
    }

    #[test]
    fn shelves_search_once() {
        let mut ecs = EcsWorld::new(Point::new(1, 1), 1);
        ecs.spawn_shelf(Point::new(4, 4), Point::new(-1, 0), Some("key".to_string()));
        assert_eq!(ecs.search_shelf(Point::new(4, 4)), Some(Some("key".to_string())));
        assert_eq!(ecs.search_shelf(Point::new(4, 4)), None);
        assert!(ecs.has_prop_at(Point::new(4, 4)));
    }

    #[test]
    fn hidden_special_tiles_cannot_be_searched() {
        let mut ecs = EcsWorld::new(Point::new(1, 1), 1);
        ecs.spawn_special_tile(Point::new(6, 6));
        assert!(ecs.search_special_tile(Point::new(6, 6)).is_none());
        ecs.activate_radar(5);
        assert!(ecs.search_special_tile(Point::new(6, 6)).is_some());
        assert!(ecs.search_special_tile(Point::new(6, 6)).is_none());
    }
}
