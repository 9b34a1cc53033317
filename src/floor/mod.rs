#![allow(dead_code)]

pub mod deferred;

use std::collections::HashSet;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use log::{info, warn};
use specs::prelude::Entity;

use crate::{
    data::{
        GameConfig,
        items::{
            BLUEBOX, DropItem, ItemDatabase, KEY, MAP, MIGAWARI, NOTHING, RADAR, RADIO, REPORT,
            TALISMAN, WARP_GUN, WARPCOIN,
        },
    },
    ecs::EcsWorld,
    economy::Session,
    events::{CoreEvent, EventSink},
    map::{
        GenerationReport, Grid, Room,
        classify::{TileKind, visible_walls},
        fog::FogOfWar,
        generator::Layout,
        offset,
        populate::{DoorKind, populate},
        random_walkable_point,
    },
};

use self::deferred::{DeferredAction, DeferredQueue};

pub const MAP_REVEAL_DELAY_TICKS: u32 = 15;
pub const WARP_PHASE_TICKS: u32 = 8;
pub const FADE_TICKS: u32 = 15;
pub const DOLL_DELAY_TICKS: u32 = 15;
pub const DOLL_STUN_TURNS: u32 = 5;
const WARP_TRIES: usize = 20;
const DEFAULT_MAP_AREAS: u32 = 3;
const DEFAULT_EFFECT_TURNS: u32 = 10;

const SHOP_DOOR_OFFSETS: [Point; 9] = [
    Point { x: 0, y: 0 },
    Point { x: 0, y: -1 },
    Point { x: 0, y: 1 },
    Point { x: -1, y: 0 },
    Point { x: 1, y: 0 },
    Point { x: 1, y: 1 },
    Point { x: 1, y: -1 },
    Point { x: -1, y: 1 },
    Point { x: -1, y: -1 },
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub fn delta(self) -> Point {
        match self {
            Direction::North => Point::new(0, -1),
            Direction::South => Point::new(0, 1),
            Direction::East => Point::new(1, 0),
            Direction::West => Point::new(-1, 0),
            Direction::NorthEast => Point::new(1, -1),
            Direction::NorthWest => Point::new(-1, -1),
            Direction::SouthEast => Point::new(1, 1),
            Direction::SouthWest => Point::new(-1, 1),
        }
    }

    /// Collapses diagonals onto one axis; even splits go vertical.
    pub fn cardinal_step(self) -> Point {
        let delta = self.delta();
        if delta.x.abs() > delta.y.abs() {
            Point::new(delta.x, 0)
        } else {
            Point::new(0, delta.y)
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Locked,
    Blocked,
    Moved,
    NeedKey,
    ReachedExit,
    ReachedShop,
    Shielded,
    GameOver,
    Fired,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractOutcome {
    Locked,
    Nothing,
    Shelf(String),
    SpecialTile(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UseOutcome {
    Locked,
    NotHeld,
    CannotUse,
    Failed,
    Aiming,
    Used,
}

/// One live dungeon floor. Replaced wholesale on every floor transition.
pub struct Floor {
    pub number: u32,
    pub profile: Option<String>,
    pub grid: Grid,
    pub rooms: Vec<Room>,
    pub fog: FogOfWar,
    pub ecs: EcsWorld,
    pub report: GenerationReport,
    deferred: DeferredQueue,
    input_locked: bool,
    aiming: bool,
}

impl Floor {
    pub fn generate(config: &GameConfig, number: u32, seed: u64) -> Self {
        let mut rng = RandomNumberGenerator::seeded(seed);
        let (generation, profile) = config.generation_for(number, &mut rng);
        let layout = Layout::procedural(&generation, &mut rng);
        let placements = populate(&layout.grid, &layout.rooms, &generation, &mut rng);
        let spawn = layout.spawn_point();

        let mut ecs = EcsWorld::new(spawn, rng.next_u64());
        {
            let mut events = ecs.events();
            for point in layout.grid.floor_points() {
                events.emit(CoreEvent::TileCreated {
                    kind: TileKind::Floor,
                    point,
                });
            }
            for point in visible_walls(&layout.grid) {
                events.emit(CoreEvent::TileCreated {
                    kind: TileKind::Wall,
                    point,
                });
            }
        }

        for point in &placements.blood {
            ecs.spawn_blood(*point);
        }
        for shelf in &placements.shelves {
            ecs.spawn_shelf(shelf.spot.point, shelf.spot.facing, shelf.fixed_item.clone());
        }
        for door in &placements.doors {
            ecs.spawn_door(door.point, door.kind);
        }

        let mut fog = FogOfWar::new(layout.grid.width, layout.grid.height, config.fog_enabled);
        fog.reveal(spawn, false, &mut *ecs.events());

        for point in &placements.enemies {
            ecs.spawn_enemy(*point);
        }
        for point in &placements.special_tiles {
            ecs.spawn_special_tile(*point);
        }

        info!(
            "floor {number} ready: {} rooms, {} enemies, key placed: {}",
            layout.rooms.len(),
            placements.enemies.len(),
            placements.key_shelf().is_some()
        );
        let mut report = layout.report;
        report.merge(placements.report);

        Self {
            number,
            profile,
            grid: layout.grid,
            rooms: layout.rooms,
            fog,
            ecs,
            report,
            deferred: DeferredQueue::default(),
            input_locked: false,
            aiming: false,
        }
    }

    pub fn player_point(&self) -> Point {
        self.ecs.player_point()
    }

    pub fn is_input_locked(&self) -> bool {
        self.input_locked
    }

    pub fn is_aiming(&self) -> bool {
        self.aiming
    }

    pub fn has_pending_sequences(&self) -> bool {
        !self.deferred.is_empty()
    }

    pub fn drain_events(&mut self) -> Vec<CoreEvent> {
        self.ecs.drain_events()
    }

    fn message(&self, text: &str, item: Option<&str>) {
        self.ecs.events().show_message(text, item);
    }

    /// Player step. Walls block; enemies do not, but whoever is stepped on loses
    /// its next turn. Enemies take their turn while the player still occupies the
    /// old tile, so they may walk into the destination. Contact is resolved before
    /// any door on the destination.
    pub fn try_move(&mut self, direction: Direction, session: &mut Session) -> MoveOutcome {
        if self.input_locked || session.game_over {
            return MoveOutcome::Locked;
        }
        if self.aiming {
            self.fire_warp_gun(direction, session);
            return MoveOutcome::Fired;
        }

        let target = offset(self.player_point(), direction.cardinal_step());
        if !self.grid.is_floor(target) {
            return MoveOutcome::Blocked;
        }
        if let Some(enemy) = self.ecs.enemy_at(target) {
            self.ecs.skip_next_turn(enemy);
        }

        self.fog.reveal(target, true, &mut *self.ecs.events());
        self.ecs.on_player_moved(&self.grid, &self.fog);
        self.ecs.set_player_point(target);

        match self.check_contact(session) {
            MoveOutcome::Moved => self.check_door(session).unwrap_or(MoveOutcome::Moved),
            outcome => outcome,
        }
    }

    fn check_door(&mut self, session: &mut Session) -> Option<MoveOutcome> {
        let kind = self.ecs.door_at(self.player_point())?;
        if !session.inventory.has_item(KEY) {
            self.message("You need a key.", None);
            return Some(MoveOutcome::NeedKey);
        }
        match kind {
            DoorKind::Shop => {
                session.next_stage_is_shop = true;
                info!("shop door opened on floor {}", self.number);
                Some(MoveOutcome::ReachedShop)
            }
            DoorKind::Exit => {
                info!("exit door opened on floor {}", self.number);
                Some(MoveOutcome::ReachedExit)
            }
        }
    }

    fn check_contact(&mut self, session: &mut Session) -> MoveOutcome {
        let player = self.player_point();
        let Some(enemy) = self.ecs.enemy_at(player) else {
            return MoveOutcome::Moved;
        };

        if session.inventory.has_item(MIGAWARI) {
            self.message("The stand-in doll took the hit for you!", Some(MIGAWARI));
            self.ecs.events().show_floating_item(MIGAWARI, player);
            self.input_locked = true;
            self.deferred
                .schedule(DeferredAction::ConsumeDoll { enemy }, DOLL_DELAY_TICKS);
            self.deferred
                .schedule(DeferredAction::UnlockInput, DOLL_DELAY_TICKS);
            return MoveOutcome::Shielded;
        }

        info!("caught by an enemy on floor {}", self.number);
        self.ecs.events().emit(CoreEvent::GameOver);
        session.game_over = true;
        MoveOutcome::GameOver
    }

    /// Searches whatever sits under the player: an unsearched shelf first, then a
    /// revealed special tile.
    pub fn interact(&mut self, session: &mut Session, db: &ItemDatabase) -> InteractOutcome {
        if self.input_locked || session.game_over {
            return InteractOutcome::Locked;
        }
        let player = self.player_point();

        if let Some(fixed) = self.ecs.search_shelf(player) {
            let item = match fixed {
                Some(key) => db.resolve_fixed(&key).clone(),
                None => db.roll_normal(&mut self.ecs.rng()).clone(),
            };
            self.resolve_find(&item, player, session, db);
            return InteractOutcome::Shelf(item.key);
        }

        if let Some(entity) = self.ecs.search_special_tile(player) {
            let item = db.roll_special(&mut self.ecs.rng()).clone();
            self.resolve_find(&item, player, session, db);
            self.deferred
                .schedule(DeferredAction::RemoveEntity(entity), FADE_TICKS);
            return InteractOutcome::SpecialTile(item.key);
        }

        InteractOutcome::Nothing
    }

    fn resolve_find(&mut self, item: &DropItem, at: Point, session: &mut Session, db: &ItemDatabase) {
        match item.key.as_str() {
            NOTHING => self.message("Found nothing.", None),
            MAP => {
                let areas = if item.effect_value > 0 {
                    item.effect_value as u32
                } else {
                    DEFAULT_MAP_AREAS
                };
                self.message(&format!("Found a {}!", item.name), Some(MAP));
                self.input_locked = true;
                self.deferred.schedule(
                    DeferredAction::RevealRandomAreas { count: areas },
                    MAP_REVEAL_DELAY_TICKS,
                );
                self.deferred.schedule(
                    DeferredAction::ShowMessage {
                        text: "The map fills itself in.".to_string(),
                        item: Some(MAP.to_string()),
                    },
                    MAP_REVEAL_DELAY_TICKS,
                );
                self.deferred
                    .schedule(DeferredAction::UnlockInput, MAP_REVEAL_DELAY_TICKS);
            }
            REPORT => {
                session
                    .inventory
                    .add_item(REPORT, db, &mut *self.ecs.events());
                self.message(&format!("Found a {}!", item.name), Some(REPORT));
            }
            key => {
                let mut events = self.ecs.events();
                if session.inventory.add_item(key, db, &mut *events) {
                    events.show_message(&format!("Found {}!", item.name), Some(key));
                    events.show_floating_item(key, at);
                }
            }
        }
    }

    pub fn use_item(&mut self, key: &str, session: &mut Session, db: &ItemDatabase) -> UseOutcome {
        if self.input_locked || session.game_over {
            return UseOutcome::Locked;
        }
        if !session.inventory.has_item(key) {
            self.message("You don't have that.", Some(key));
            return UseOutcome::NotHeld;
        }

        let usage = db
            .usage_message(key, &mut self.ecs.rng())
            .map(str::to_string);
        let effect = db.effect_value(key);
        let turns = if effect > 0 { effect as u32 } else { DEFAULT_EFFECT_TURNS };

        match key {
            WARPCOIN => self.use_warpcoin(session, usage),
            WARP_GUN => {
                self.aiming = true;
                let text = usage.unwrap_or_else(|| "Warp gun ready. Pick a direction!".to_string());
                self.message(&text, Some(key));
                UseOutcome::Aiming
            }
            RADIO => {
                self.ecs.stun_all(turns);
                let text = usage.unwrap_or_else(|| format!("Every enemy freezes for {turns} turns!"));
                self.message(&text, Some(key));
                session.inventory.remove_item(key);
                UseOutcome::Used
            }
            MAP => {
                let areas = if effect > 0 { effect as u32 } else { DEFAULT_MAP_AREAS };
                {
                    let mut rng = self.ecs.rng();
                    let mut events = self.ecs.events();
                    self.fog
                        .reveal_random_areas(areas, &self.grid, &self.rooms, &mut rng, &mut *events);
                }
                let text = usage.unwrap_or_else(|| "The map fills itself in.".to_string());
                self.message(&text, Some(key));
                session.inventory.remove_item(key);
                UseOutcome::Used
            }
            RADAR => {
                self.ecs.activate_radar(turns);
                let text = usage.unwrap_or_else(|| format!("Enemies show up on the radar ({turns} turns)."));
                self.message(&text, Some(key));
                session.inventory.remove_item(key);
                UseOutcome::Used
            }
            TALISMAN => {
                let banished = self.ecs.banish_enemies(None);
                if banished > 0 {
                    let text = usage
                        .unwrap_or_else(|| format!("The ominous presence fades! ({banished} gone)"));
                    self.message(&text, Some(key));
                } else {
                    self.message("But nothing happened...", Some(key));
                }
                session.inventory.remove_item(key);
                UseOutcome::Used
            }
            BLUEBOX => {
                if self.summon_shop_door(self.player_point()).is_some() {
                    let text = usage.unwrap_or_else(|| "A strange door appears...".to_string());
                    self.message(&text, Some(key));
                    session.inventory.remove_item(key);
                    UseOutcome::Used
                } else {
                    self.message("There's no room for a door here.", Some(key));
                    UseOutcome::Failed
                }
            }
            _ => {
                self.message("Can't use that right now.", Some(key));
                UseOutcome::CannotUse
            }
        }
    }

    fn use_warpcoin(&mut self, session: &mut Session, usage: Option<String>) -> UseOutcome {
        let enemies: HashSet<Point> = self.ecs.enemies().into_iter().map(|(_, p)| p).collect();
        let destination = {
            let mut rng = self.ecs.rng();
            (0..WARP_TRIES)
                .filter_map(|_| random_walkable_point(&self.grid, &self.rooms, &mut rng))
                .find(|point| !enemies.contains(point))
        };

        let Some(target) = destination else {
            self.message("The warp failed.", Some(WARPCOIN));
            return UseOutcome::Failed;
        };
        self.input_locked = true;
        self.deferred
            .schedule(DeferredAction::FinishPlayerWarp { target }, WARP_PHASE_TICKS);
        self.deferred
            .schedule(DeferredAction::UnlockInput, WARP_PHASE_TICKS * 2);
        let text = usage.unwrap_or_else(|| "You warped!".to_string());
        self.message(&text, Some(WARPCOIN));
        session.inventory.remove_item(WARPCOIN);
        UseOutcome::Used
    }

    /// Sends a beam along the grid; the first enemy it meets before a wall is warped away.
    fn fire_warp_gun(&mut self, direction: Direction, session: &mut Session) {
        self.aiming = false;
        session.inventory.remove_item(WARP_GUN);
        self.message("Warp beam fired!", Some(WARP_GUN));

        let step = direction.cardinal_step();
        let mut cursor = self.player_point();
        loop {
            cursor = offset(cursor, step);
            if !self.grid.is_floor(cursor) {
                return;
            }
            if let Some(enemy) = self.ecs.enemy_at(cursor) {
                self.warp_enemy(enemy);
                return;
            }
        }
    }

    /// Starts a warp sequence for `enemy`. Refused while one is already running.
    pub fn warp_enemy(&mut self, enemy: Entity) -> bool {
        match self.ecs.enemy_state(enemy) {
            Some(state) if !state.in_sequence => {}
            _ => return false,
        }

        let mut occupied: HashSet<Point> = self.ecs.enemies().into_iter().map(|(_, p)| p).collect();
        occupied.insert(self.player_point());
        let target = {
            let mut rng = self.ecs.rng();
            let free = (0..WARP_TRIES)
                .filter_map(|_| random_walkable_point(&self.grid, &self.rooms, &mut rng))
                .find(|point| !occupied.contains(point));
            free.or_else(|| random_walkable_point(&self.grid, &self.rooms, &mut rng))
        };
        let Some(target) = target else {
            return false;
        };

        self.ecs.set_in_sequence(enemy, true);
        self.deferred.schedule(
            DeferredAction::FinishEnemyWarp {
                entity: enemy,
                target,
            },
            WARP_PHASE_TICKS * 2,
        );
        true
    }

    fn target_room(&self, at: Point) -> Option<&Room> {
        if let Some(room) = self.rooms.iter().find(|room| room.contains(at)) {
            return Some(room);
        }
        self.rooms.iter().min_by_key(|room| {
            let center = room.center();
            (center.x - at.x).pow(2) + (center.y - at.y).pow(2)
        })
    }

    /// Puts a shop door near the center of the room around `at` (or the closest room).
    pub fn summon_shop_door(&mut self, at: Point) -> Option<Point> {
        let center = self.target_room(at)?.center();
        let spot = SHOP_DOOR_OFFSETS
            .iter()
            .map(|delta| offset(center, *delta))
            .find(|point| self.grid.is_floor(*point) && !self.ecs.has_prop_at(*point));

        match spot {
            Some(point) => {
                self.ecs.spawn_door(point, DoorKind::Shop);
                info!("shop door summoned at {},{}", point.x, point.y);
                Some(point)
            }
            None => {
                warn!("no free spot for a shop door near {},{}", center.x, center.y);
                None
            }
        }
    }

    /// Per-frame presentation tick. Only queued sequences touch floor state here.
    pub fn tick(&mut self, session: &mut Session) {
        for action in self.deferred.tick() {
            self.apply_deferred(action, session);
        }
    }

    fn apply_deferred(&mut self, action: DeferredAction, session: &mut Session) {
        match action {
            DeferredAction::RevealRandomAreas { count } => {
                let mut rng = self.ecs.rng();
                let mut events = self.ecs.events();
                self.fog
                    .reveal_random_areas(count, &self.grid, &self.rooms, &mut rng, &mut *events);
            }
            DeferredAction::ShowMessage { text, item } => {
                self.message(&text, item.as_deref());
            }
            DeferredAction::RemoveEntity(entity) => self.ecs.remove_entity(entity),
            DeferredAction::FinishPlayerWarp { target } => {
                self.ecs.set_player_point(target);
                self.fog.reveal(target, true, &mut *self.ecs.events());
            }
            DeferredAction::FinishEnemyWarp { entity, target } => {
                self.ecs.move_entity(entity, target);
                self.ecs.set_in_sequence(entity, false);
            }
            DeferredAction::ConsumeDoll { enemy } => {
                session.inventory.remove_item(MIGAWARI);
                self.ecs.stun(enemy, DOLL_STUN_TURNS);
            }
            DeferredAction::UnlockInput => self.input_locked = false,
        }
    }
}
