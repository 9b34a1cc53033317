use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use log::{debug, info};

use super::{Anomaly, Cell, Grid, GenerationReport, Room, roll_below};
use crate::data::{CountRange, GenerationConfig};

const LOOP_THRESHOLD: usize = 3;

/// L-shaped walk from `start` toward `end`, X first. The destination itself is not included.
pub fn corridor_path(start: Point, end: Point) -> Vec<Point> {
    let mut path = Vec::new();
    let mut cursor = start;

    while cursor.x != end.x {
        path.push(cursor);
        cursor.x += if end.x > cursor.x { 1 } else { -1 };
    }

    while cursor.y != end.y {
        path.push(cursor);
        cursor.y += if end.y > cursor.y { 1 } else { -1 };
    }

    path
}

/// Stamps a 2x2 floor brush, clamped so the outer wall ring survives.
fn stamp_brush(grid: &mut Grid, at: Point) {
    for dy in 0..2 {
        for dx in 0..2 {
            let x = (at.x + dx).clamp(1, grid.width - 2);
            let y = (at.y + dy).clamp(1, grid.height - 2);
            grid.set(Point::new(x, y), Cell::Floor);
        }
    }
}

pub fn carve_corridor(grid: &mut Grid, start: Point, end: Point) {
    for step in corridor_path(start, end) {
        stamp_brush(grid, step);
    }
}

#[derive(Clone, Debug)]
pub struct Layout {
    pub grid: Grid,
    pub rooms: Vec<Room>,
    pub requested_rooms: i32,
    pub attempts: u32,
    pub loop_links: Vec<(usize, usize)>,
    pub report: GenerationReport,
}

impl Layout {
    pub fn procedural(config: &GenerationConfig, rng: &mut RandomNumberGenerator) -> Self {
        let mut grid = Grid::filled(config.grid_width, config.grid_height);
        let requested_rooms = config.rooms.roll(rng);
        let mut rooms: Vec<Room> = Vec::new();
        let mut attempts = 0;

        while (rooms.len() as i32) < requested_rooms && attempts < config.max_room_attempts {
            attempts += 1;
            let Some(candidate) = sample_room(&grid, config.room_size, rng) else {
                continue;
            };
            if rooms.iter().any(|room| room.overlaps(&candidate)) {
                continue;
            }

            grid.carve_room(&candidate);
            if let Some(previous) = rooms.last() {
                carve_corridor(&mut grid, previous.center(), candidate.center());
            }
            debug!(
                "room {} at {},{} size {}x{}",
                rooms.len(),
                candidate.x,
                candidate.y,
                candidate.width,
                candidate.height
            );
            rooms.push(candidate);
        }

        let mut report = GenerationReport::default();
        if (rooms.len() as i32) < requested_rooms {
            report.record(Anomaly::FewerRooms {
                requested: requested_rooms,
                placed: rooms.len(),
            });
        }

        let loop_links = add_loop_links(&mut grid, &rooms, rng);
        info!(
            "generated {}x{} grid with {} rooms ({} attempts, {} loop links)",
            grid.width,
            grid.height,
            rooms.len(),
            attempts,
            loop_links.len()
        );

        Self {
            grid,
            rooms,
            requested_rooms,
            attempts,
            loop_links,
            report,
        }
    }

    pub fn spawn_point(&self) -> Point {
        self.rooms
            .first()
            .map(|room| room.center())
            .unwrap_or(Point::new(self.grid.width / 2, self.grid.height / 2))
    }
}

fn sample_room(grid: &Grid, size: CountRange, rng: &mut RandomNumberGenerator) -> Option<Room> {
    let width = size.roll(rng);
    let height = size.roll(rng);
    let x = roll_below(rng, 1, grid.width - width - 1)?;
    let y = roll_below(rng, 1, grid.height - height - 1)?;
    Some(Room::new(x, y, width, height))
}

/// Extra random room-to-room corridors so the layout has cycles. Repeated pairs are
/// allowed and just re-carve the same floor; self-pairs are skipped.
fn add_loop_links(
    grid: &mut Grid,
    rooms: &[Room],
    rng: &mut RandomNumberGenerator,
) -> Vec<(usize, usize)> {
    let count = rooms.len();
    if count <= LOOP_THRESHOLD {
        return Vec::new();
    }

    let extra = CountRange::new((count / 3) as i32, (count / 2) as i32).roll(rng);
    let mut links = Vec::new();
    for _ in 0..extra {
        let a = rng.range(0, count as i32) as usize;
        let b = rng.range(0, count as i32) as usize;
        if a == b {
            continue;
        }
        carve_corridor(grid, rooms[a].center(), rooms[b].center());
        links.push((a, b));
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn layout(seed: u64) -> Layout {
        let mut rng = RandomNumberGenerator::seeded(seed);
        Layout::procedural(&GenerationConfig::default(), &mut rng)
    }

    #[test]
    fn corridor_goes_x_then_y_and_stops_short() {
        let path = corridor_path(Point::new(2, 2), Point::new(4, 5));
        assert_eq!(
            path,
            vec![
                Point::new(2, 2),
                Point::new(3, 2),
                Point::new(4, 2),
                Point::new(4, 3),
                Point::new(4, 4),
            ]
        );
        assert!(corridor_path(Point::new(3, 3), Point::new(3, 3)).is_empty());
    }

    #[test]
    fn brush_is_two_wide_and_clamped() {
        let mut grid = Grid::filled(6, 6);
        carve_corridor(&mut grid, Point::new(4, 1), Point::new(1, 1));
        for x in 1..=4 {
            assert!(grid.is_floor(Point::new(x, 1)));
            assert!(grid.is_floor(Point::new(x, 2)));
        }
        assert!(!grid.is_floor(Point::new(5, 1)));
        assert!(!grid.is_floor(Point::new(0, 1)));
    }

    #[test]
    fn twenty_five_square_scenario() {
        let generated = layout(20240611);
        let count = generated.rooms.len();
        assert!((5..=10).contains(&count), "room count {count}");
        for (i, a) in generated.rooms.iter().enumerate() {
            for b in generated.rooms.iter().skip(i + 1) {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn impossible_rooms_degrade_instead_of_failing() {
        let config = GenerationConfig {
            grid_width: 12,
            grid_height: 12,
            rooms: CountRange::new(9, 9),
            room_size: CountRange::new(5, 5),
            max_room_attempts: 50,
            ..GenerationConfig::default()
        };
        let mut rng = RandomNumberGenerator::seeded(9);
        let generated = Layout::procedural(&config, &mut rng);
        assert!(!generated.rooms.is_empty());
        assert!(generated.rooms.len() < 9);
        assert_eq!(generated.attempts, 50);
        assert!(matches!(
            generated.report.anomalies[0],
            Anomaly::FewerRooms { requested: 9, .. }
        ));
        assert!(!generated.report.has_critical());
    }

    #[test]
    fn small_layouts_get_no_loops() {
        let config = GenerationConfig {
            rooms: CountRange::new(3, 3),
            ..GenerationConfig::default()
        };
        let mut rng = RandomNumberGenerator::seeded(2);
        let generated = Layout::procedural(&config, &mut rng);
        assert!(generated.loop_links.is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn border_ring_is_never_floor(seed in any::<u64>()) {
            let generated = layout(seed);
            let grid = &generated.grid;
            for point in grid.points() {
                let on_border = point.x == 0
                    || point.y == 0
                    || point.x == grid.width - 1
                    || point.y == grid.height - 1;
                if on_border {
                    prop_assert!(!grid.is_floor(point), "border floor at {:?}", point);
                }
            }
        }

        #[test]
        fn every_room_is_reachable_from_spawn(seed in any::<u64>()) {
            let generated = layout(seed);
            prop_assume!(generated.rooms.len() >= 2);
            let grid = &generated.grid;
            let reach = grid.reachable_from(generated.spawn_point());
            for room in &generated.rooms {
                let center = room.center();
                let idx = (center.y * grid.width + center.x) as usize;
                prop_assert!(reach[idx], "room {:?} unreachable", room);
            }
        }

        #[test]
        fn accepted_rooms_never_overlap(seed in any::<u64>()) {
            let generated = layout(seed);
            for (i, a) in generated.rooms.iter().enumerate() {
                for b in generated.rooms.iter().skip(i + 1) {
                    prop_assert!(!a.overlaps(b));
                }
            }
        }
    }
}
