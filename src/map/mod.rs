#![allow(dead_code)]

pub mod classify;
pub mod fog;
pub mod generator;
pub mod populate;

use bracket_geometry::prelude::{Point, Rect};
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, DijkstraMap, DistanceAlg};
use bracket_random::prelude::RandomNumberGenerator;
use log::{error, warn};
use smallvec::SmallVec;

pub const CARDINALS: [Point; 4] = [
    Point { x: 0, y: -1 },
    Point { x: 0, y: 1 },
    Point { x: -1, y: 0 },
    Point { x: 1, y: 0 },
];

const RANDOM_POINT_TRIES: usize = 20;

/// Uniform draw from `[min, max)`; `None` when the range is empty.
pub fn roll_below(rng: &mut RandomNumberGenerator, min: i32, max: i32) -> Option<i32> {
    if max <= min {
        None
    } else {
        Some(rng.range(min, max))
    }
}

pub fn chance(rng: &mut RandomNumberGenerator, probability: f32) -> bool {
    rng.range(0.0f32, 1.0) < probability
}

pub fn offset(point: Point, delta: Point) -> Point {
    Point::new(point.x + delta.x, point.y + delta.y)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Floor,
}

#[derive(Clone, Debug)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn filled(width: i32, height: i32) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            cells: vec![Cell::Wall; size],
        }
    }

    fn idx(&self, point: Point) -> Option<usize> {
        if self.in_bounds(point) {
            Some((point.y * self.width + point.x) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn cell_at(&self, point: Point) -> Option<Cell> {
        self.idx(point).map(|idx| self.cells[idx])
    }

    pub fn set(&mut self, point: Point, cell: Cell) {
        if let Some(idx) = self.idx(point) {
            self.cells[idx] = cell;
        }
    }

    pub fn is_floor(&self, point: Point) -> bool {
        self.cell_at(point) == Some(Cell::Floor)
    }

    pub fn is_wall(&self, point: Point) -> bool {
        self.cell_at(point) == Some(Cell::Wall)
    }

    pub fn carve_room(&mut self, room: &Room) {
        for point in room.points() {
            self.set(point, Cell::Floor);
        }
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Point::new(x, y)))
    }

    pub fn floor_points(&self) -> Vec<Point> {
        self.points().filter(|point| self.is_floor(*point)).collect()
    }

    pub fn floor_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell == Cell::Floor).count()
    }

    /// Four-way flood fill over Floor cells, indexed like the grid.
    pub fn reachable_from(&self, start: Point) -> Vec<bool> {
        let Some(start_idx) = self.idx(start) else {
            return vec![false; self.cells.len()];
        };
        if !self.is_floor(start) {
            return vec![false; self.cells.len()];
        }
        let max_depth = (self.width * self.height) as f32;
        let dijkstra = DijkstraMap::new(self.width, self.height, &[start_idx], self, max_depth);
        dijkstra
            .map
            .iter()
            .map(|distance| *distance < f32::MAX)
            .collect()
    }

    pub fn is_reachable(&self, from: Point, to: Point) -> bool {
        let reach = self.reachable_from(from);
        self.idx(to).is_some_and(|idx| reach[idx])
    }
}

impl BaseMap for Grid {
    fn is_opaque(&self, idx: usize) -> bool {
        self.cells.get(idx).is_none_or(|cell| *cell == Cell::Wall)
    }

    fn get_available_exits(&self, idx: usize) -> SmallVec<[(usize, f32); 10]> {
        let mut exits = SmallVec::new();
        let point = self.index_to_point2d(idx);
        for dir in CARDINALS {
            let dest = offset(point, dir);
            if let Some(dest_idx) = self.idx(dest) {
                if self.cells[dest_idx] == Cell::Floor {
                    exits.push((dest_idx, 1.0));
                }
            }
        }
        exits
    }

    fn get_pathing_distance(&self, idx1: usize, idx2: usize) -> f32 {
        let p1 = self.index_to_point2d(idx1);
        let p2 = self.index_to_point2d(idx2);
        DistanceAlg::Pythagoras.distance2d(p1, p2)
    }
}

impl Algorithm2D for Grid {
    fn dimensions(&self) -> Point {
        Point::new(self.width, self.height)
    }

    fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Room {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    /// True when the rooms touch or sit closer than one cell apart.
    pub fn overlaps(&self, other: &Room) -> bool {
        !(self.x + self.width + 1 < other.x
            || other.x + other.width + 1 < self.x
            || self.y + self.height + 1 < other.y
            || other.y + other.height + 1 < self.y)
    }

    pub fn rect(&self) -> Rect {
        Rect::with_size(self.x, self.y, self.width, self.height)
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (self.y..self.y + self.height)
            .flat_map(move |y| (self.x..self.x + self.width).map(move |x| Point::new(x, y)))
    }

    /// Random cell inside the room's outer ring, if the room has an inside.
    pub fn random_interior(&self, rng: &mut RandomNumberGenerator) -> Option<Point> {
        let x = roll_below(rng, self.x + 1, self.x + self.width - 1)?;
        let y = roll_below(rng, self.y + 1, self.y + self.height - 1)?;
        Some(Point::new(x, y))
    }
}

/// Interior floor cell of a random room, falling back to the spawn room's center.
pub fn random_walkable_point(
    grid: &Grid,
    rooms: &[Room],
    rng: &mut RandomNumberGenerator,
) -> Option<Point> {
    let first = rooms.first()?;
    for _ in 0..RANDOM_POINT_TRIES {
        let room = &rooms[rng.range(0, rooms.len() as i32) as usize];
        if let Some(point) = room.random_interior(rng) {
            if grid.is_floor(point) {
                return Some(point);
            }
        }
    }
    Some(first.center())
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    Degraded,
    Critical,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Anomaly {
    FewerRooms { requested: i32, placed: usize },
    FewerEnemies { requested: i32, placed: usize },
    KeyUnplaced,
}

impl Anomaly {
    pub fn severity(&self) -> Severity {
        match self {
            Anomaly::KeyUnplaced => Severity::Critical,
            Anomaly::FewerRooms { .. } | Anomaly::FewerEnemies { .. } => Severity::Degraded,
        }
    }
}

/// Everything that went less than perfectly while building a floor.
#[derive(Clone, Debug, Default)]
pub struct GenerationReport {
    pub anomalies: Vec<Anomaly>,
}

impl GenerationReport {
    pub fn record(&mut self, anomaly: Anomaly) {
        match &anomaly {
            Anomaly::FewerRooms { requested, placed } => {
                warn!("placed {placed} of {requested} requested rooms")
            }
            Anomaly::FewerEnemies { requested, placed } => {
                warn!("spawned {placed} of {requested} requested enemies")
            }
            Anomaly::KeyUnplaced => {
                error!("no shelves spawned; the key cannot be placed and the floor is unsolvable")
            }
        }
        self.anomalies.push(anomaly);
    }

    pub fn has_critical(&self) -> bool {
        self.anomalies
            .iter()
            .any(|anomaly| anomaly.severity() == Severity::Critical)
    }

    pub fn merge(&mut self, other: GenerationReport) {
        self.anomalies.extend(other.anomalies);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rooms_with_one_cell_gap_still_overlap() {
        let a = Room::new(1, 1, 4, 4);
        let touching_gap = Room::new(6, 1, 4, 4);
        let clear = Room::new(7, 1, 4, 4);
        assert!(a.overlaps(&touching_gap));
        assert!(!a.overlaps(&clear));
        assert!(!clear.overlaps(&a));
    }

    #[test]
    fn center_uses_integer_halves() {
        assert_eq!(Room::new(2, 3, 5, 4).center(), Point::new(4, 5));
    }

    #[test]
    fn flood_fill_stops_at_walls() {
        let mut grid = Grid::filled(10, 5);
        grid.carve_room(&Room::new(1, 1, 3, 3));
        grid.carve_room(&Room::new(6, 1, 3, 3));
        assert!(grid.is_reachable(Point::new(1, 1), Point::new(3, 3)));
        assert!(!grid.is_reachable(Point::new(1, 1), Point::new(7, 2)));

        for x in 4..6 {
            grid.set(Point::new(x, 2), Cell::Floor);
        }
        assert!(grid.is_reachable(Point::new(1, 1), Point::new(7, 2)));
    }

    #[test]
    fn random_walkable_point_stays_inside_rooms() {
        let mut grid = Grid::filled(20, 20);
        let rooms = vec![Room::new(2, 2, 5, 5), Room::new(10, 10, 6, 4)];
        for room in &rooms {
            grid.carve_room(room);
        }
        let mut rng = RandomNumberGenerator::seeded(7);
        for _ in 0..100 {
            let point = random_walkable_point(&grid, &rooms, &mut rng).unwrap();
            assert!(grid.is_floor(point));
            assert!(rooms.iter().any(|room| room.contains(point)));
        }
        assert_eq!(random_walkable_point(&grid, &[], &mut rng), None);
    }

    #[test]
    fn degenerate_rooms_fall_back_to_first_center() {
        let mut grid = Grid::filled(10, 10);
        let rooms = vec![Room::new(3, 3, 2, 2)];
        grid.carve_room(&rooms[0]);
        let mut rng = RandomNumberGenerator::seeded(1);
        assert_eq!(
            random_walkable_point(&grid, &rooms, &mut rng),
            Some(rooms[0].center())
        );
    }

    #[test]
    fn key_unplaced_is_the_only_critical_anomaly() {
        let mut report = GenerationReport::default();
        report.record(Anomaly::FewerRooms {
            requested: 8,
            placed: 3,
        });
        assert!(!report.has_critical());
        report.record(Anomaly::KeyUnplaced);
        assert!(report.has_critical());
    }
}
