use bracket_geometry::prelude::Point;

use super::{Cell, Grid, Room, offset};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TileKind {
    Floor,
    Wall,
    InteriorWall,
}

/// A perimeter floor cell that backs onto a wall. `facing` points at that wall.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ShelfSpot {
    pub point: Point,
    pub facing: Point,
}

/// A wall whose in-bounds neighbours (diagonals included) are all walls.
pub fn is_interior_wall(grid: &Grid, point: Point) -> bool {
    if !grid.is_wall(point) {
        return false;
    }
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            if grid.is_floor(Point::new(point.x + dx, point.y + dy)) {
                return false;
            }
        }
    }
    true
}

pub fn tile_kind(grid: &Grid, point: Point) -> Option<TileKind> {
    match grid.cell_at(point)? {
        Cell::Floor => Some(TileKind::Floor),
        Cell::Wall if is_interior_wall(grid, point) => Some(TileKind::InteriorWall),
        Cell::Wall => Some(TileKind::Wall),
    }
}

fn shelf_spot(grid: &Grid, point: Point, facing: Point) -> Option<ShelfSpot> {
    let behind = offset(point, facing);
    if grid.is_floor(point) && grid.in_bounds(behind) && grid.is_wall(behind) {
        Some(ShelfSpot { point, facing })
    } else {
        None
    }
}

/// Perimeter cells of `room` that can hold a shelf. Side columns are scanned over
/// the full height; top and bottom rows only over the inner x-range so corners are
/// not counted twice.
pub fn shelf_candidates(grid: &Grid, room: &Room) -> Vec<ShelfSpot> {
    let mut spots = Vec::new();
    let left = room.x;
    let right = room.x + room.width - 1;
    let low = room.y;
    let high = room.y + room.height - 1;

    for y in low..=high {
        spots.extend(shelf_spot(grid, Point::new(left, y), Point::new(-1, 0)));
        spots.extend(shelf_spot(grid, Point::new(right, y), Point::new(1, 0)));
    }
    for x in left + 1..right {
        spots.extend(shelf_spot(grid, Point::new(x, low), Point::new(0, -1)));
        spots.extend(shelf_spot(grid, Point::new(x, high), Point::new(0, 1)));
    }
    spots
}

pub fn door_anchor(room: &Room) -> Point {
    room.center()
}

/// Walls a player could ever see, i.e. everything except interior walls.
pub fn visible_walls(grid: &Grid) -> Vec<Point> {
    grid.points()
        .filter(|point| grid.is_wall(*point) && !is_interior_wall(grid, *point))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_room() -> (Grid, Room) {
        let mut grid = Grid::filled(10, 10);
        let room = Room::new(2, 2, 4, 4);
        grid.carve_room(&room);
        (grid, room)
    }

    #[test]
    fn sealed_room_perimeter_is_all_candidates() {
        let (grid, room) = single_room();
        let spots = shelf_candidates(&grid, &room);
        // 4 rows x 2 sides + 2 inner columns x 2 rows.
        assert_eq!(spots.len(), 12);
        assert!(spots.contains(&ShelfSpot {
            point: Point::new(2, 2),
            facing: Point::new(-1, 0),
        }));
        assert!(spots.contains(&ShelfSpot {
            point: Point::new(3, 5),
            facing: Point::new(0, 1),
        }));
        assert!(!spots.iter().any(|spot| spot.point == Point::new(3, 3)));
    }

    #[test]
    fn corridor_openings_are_not_candidates() {
        let (mut grid, room) = single_room();
        grid.set(Point::new(1, 3), Cell::Floor);
        grid.set(Point::new(3, 6), Cell::Floor);
        let spots = shelf_candidates(&grid, &room);
        assert_eq!(spots.len(), 10);
        assert!(!spots.iter().any(|spot| spot.point == Point::new(2, 3) && spot.facing.x == -1));
        assert!(!spots.iter().any(|spot| spot.point == Point::new(3, 5)));
    }

    #[test]
    fn interior_walls_have_no_floor_neighbours() {
        let (grid, _) = single_room();
        assert!(is_interior_wall(&grid, Point::new(8, 8)));
        assert!(!is_interior_wall(&grid, Point::new(1, 1)));
        assert!(!is_interior_wall(&grid, Point::new(3, 3)));
        assert!(is_interior_wall(&grid, Point::new(0, 0)));
        assert_eq!(tile_kind(&grid, Point::new(6, 6)), Some(TileKind::Wall));
        assert_eq!(tile_kind(&grid, Point::new(3, 3)), Some(TileKind::Floor));
        assert_eq!(tile_kind(&grid, Point::new(-1, 0)), None);
    }

    #[test]
    fn door_sits_on_room_center() {
        assert_eq!(door_anchor(&Room::new(4, 6, 5, 5)), Point::new(6, 8));
    }
}
