use std::collections::HashSet;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use log::{debug, info};

use super::{
    Anomaly, GenerationReport, Grid, Room,
    chance,
    classify::{ShelfSpot, door_anchor, shelf_candidates},
};
use crate::data::{GenerationConfig, MAX_SPECIAL_TILES, items::KEY};

pub const MAX_ENEMIES_PER_ROOM: usize = 2;
pub const SPAWN_SAFE_RADIUS: i32 = 2;
const ENEMY_ATTEMPTS_PER_TARGET: i32 = 20;
const ENEMY_TRIES_PER_ROOM: usize = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DoorKind {
    Exit,
    Shop,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DoorPlacement {
    pub kind: DoorKind,
    pub point: Point,
    pub room: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShelfPlacement {
    pub spot: ShelfSpot,
    pub room: usize,
    pub fixed_item: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct Placements {
    pub doors: Vec<DoorPlacement>,
    pub shelves: Vec<ShelfPlacement>,
    pub enemies: Vec<Point>,
    pub special_tiles: Vec<Point>,
    pub blood: Vec<Point>,
    pub report: GenerationReport,
}

impl Placements {
    pub fn key_shelf(&self) -> Option<&ShelfPlacement> {
        self.shelves
            .iter()
            .find(|shelf| shelf.fixed_item.as_deref() == Some(KEY))
    }

    pub fn door(&self, kind: DoorKind) -> Option<&DoorPlacement> {
        self.doors.iter().find(|door| door.kind == kind)
    }
}

fn chebyshev(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// Places every floor entity. The spawn room is `rooms[0]`.
pub fn populate(
    grid: &Grid,
    rooms: &[Room],
    config: &GenerationConfig,
    rng: &mut RandomNumberGenerator,
) -> Placements {
    let mut placements = Placements {
        blood: place_blood(grid, config.blood_chance, rng),
        ..Placements::default()
    };
    let Some(spawn_room) = rooms.first() else {
        return placements;
    };

    placements.shelves = place_shelves(grid, rooms, config, rng, &mut placements.report);
    placements.doors = place_doors(rooms, config.shop_door_chance, rng);
    placements.enemies = place_enemies(
        grid,
        rooms,
        spawn_room.center(),
        config,
        &placements.doors,
        rng,
        &mut placements.report,
    );

    let mut occupied: HashSet<Point> = HashSet::new();
    occupied.insert(spawn_room.center());
    occupied.extend(placements.shelves.iter().map(|shelf| shelf.spot.point));
    occupied.extend(placements.doors.iter().map(|door| door.point));
    occupied.extend(placements.enemies.iter().copied());
    placements.special_tiles =
        place_special_tiles(grid, &occupied, config.special_tile_count, rng);

    info!(
        "populated {} doors, {} shelves, {} enemies, {} special tiles, {} blood decals",
        placements.doors.len(),
        placements.shelves.len(),
        placements.enemies.len(),
        placements.special_tiles.len(),
        placements.blood.len()
    );
    placements
}

fn place_blood(grid: &Grid, blood_chance: f32, rng: &mut RandomNumberGenerator) -> Vec<Point> {
    grid.floor_points()
        .into_iter()
        .filter(|_| chance(rng, blood_chance))
        .collect()
}

fn place_shelves(
    grid: &Grid,
    rooms: &[Room],
    config: &GenerationConfig,
    rng: &mut RandomNumberGenerator,
    report: &mut GenerationReport,
) -> Vec<ShelfPlacement> {
    let mut shelves = Vec::new();
    for (room_idx, room) in rooms.iter().enumerate() {
        let mut candidates = shelf_candidates(grid, room);
        let wanted = config.shelves_per_room.roll(rng).max(0) as usize;
        let mut placed = 0;
        while placed < wanted && !candidates.is_empty() {
            let pick = rng.range(0, candidates.len() as i32) as usize;
            let spot = candidates.swap_remove(pick);
            shelves.push(ShelfPlacement {
                spot,
                room: room_idx,
                fixed_item: None,
            });
            placed += 1;
        }
    }

    if shelves.is_empty() {
        report.record(Anomaly::KeyUnplaced);
    } else {
        let key_idx = rng.range(0, shelves.len() as i32) as usize;
        shelves[key_idx].fixed_item = Some(KEY.to_string());
        debug!("key hidden in shelf at {:?}", shelves[key_idx].spot.point);
    }
    shelves
}

/// At most one shop door and one exit door, never in the spawn room and never sharing a room.
fn place_doors(
    rooms: &[Room],
    shop_door_chance: f32,
    rng: &mut RandomNumberGenerator,
) -> Vec<DoorPlacement> {
    let mut pool: Vec<usize> = (1..rooms.len()).collect();
    let mut doors = Vec::new();
    if pool.is_empty() {
        return doors;
    }

    if chance(rng, shop_door_chance) {
        let pick = rng.range(0, pool.len() as i32) as usize;
        let room = pool.remove(pick);
        doors.push(DoorPlacement {
            kind: DoorKind::Shop,
            point: door_anchor(&rooms[room]),
            room,
        });
    }

    if !pool.is_empty() {
        let room = pool[rng.range(0, pool.len() as i32) as usize];
        doors.push(DoorPlacement {
            kind: DoorKind::Exit,
            point: door_anchor(&rooms[room]),
            room,
        });
    }
    doors
}

fn place_enemies(
    grid: &Grid,
    rooms: &[Room],
    spawn_center: Point,
    config: &GenerationConfig,
    doors: &[DoorPlacement],
    rng: &mut RandomNumberGenerator,
    report: &mut GenerationReport,
) -> Vec<Point> {
    let target = config.enemies.roll(rng).max(0);
    let budget = target * ENEMY_ATTEMPTS_PER_TARGET;
    let mut per_room = vec![0usize; rooms.len()];
    let mut enemies: Vec<Point> = Vec::new();
    let mut attempts = 0;

    while (enemies.len() as i32) < target && attempts < budget {
        attempts += 1;
        let room_idx = rng.range(0, rooms.len() as i32) as usize;
        if per_room[room_idx] >= MAX_ENEMIES_PER_ROOM {
            continue;
        }
        for _ in 0..ENEMY_TRIES_PER_ROOM {
            let Some(point) = rooms[room_idx].random_interior(rng) else {
                break;
            };
            if chebyshev(point, spawn_center) <= SPAWN_SAFE_RADIUS
                || !grid.is_floor(point)
                || enemies.contains(&point)
                || doors.iter().any(|door| door.point == point)
            {
                continue;
            }
            enemies.push(point);
            per_room[room_idx] += 1;
            break;
        }
    }

    if (enemies.len() as i32) < target {
        report.record(Anomaly::FewerEnemies {
            requested: target,
            placed: enemies.len(),
        });
    }
    enemies
}

fn place_special_tiles(
    grid: &Grid,
    occupied: &HashSet<Point>,
    requested: i32,
    rng: &mut RandomNumberGenerator,
) -> Vec<Point> {
    let mut pool: Vec<Point> = grid
        .floor_points()
        .into_iter()
        .filter(|point| !occupied.contains(point))
        .collect();
    let count = (requested.clamp(0, MAX_SPECIAL_TILES) as usize).min(pool.len());
    let mut tiles = Vec::with_capacity(count);
    for _ in 0..count {
        let pick = rng.range(0, pool.len() as i32) as usize;
        tiles.push(pool.swap_remove(pick));
    }
    tiles
}
