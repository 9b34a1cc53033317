use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;

use super::{Grid, Room, random_walkable_point};
use crate::events::{CoreEvent, EventSink};

pub const EXPLORATION_SCORE: i32 = 10;

/// Rounds a continuous world position to the grid cell it falls in.
pub fn nearest_tile(x: f32, y: f32) -> Point {
    Point::new(x.round() as i32, y.round() as i32)
}

#[derive(Clone, Debug)]
pub struct FogOfWar {
    width: i32,
    height: i32,
    enabled: bool,
    hidden: Vec<bool>,
}

impl FogOfWar {
    pub fn new(width: i32, height: i32, enabled: bool) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            enabled,
            hidden: vec![true; size],
        }
    }

    fn idx(&self, point: Point) -> Option<usize> {
        if point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height {
            Some((point.y * self.width + point.x) as usize)
        } else {
            None
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Clears the 3x3 block around `center`. Returns how many cells were newly cleared;
    /// each of those awards exploration score when `award` is set.
    pub fn reveal(&mut self, center: Point, award: bool, sink: &mut dyn EventSink) -> usize {
        if !self.enabled {
            return 0;
        }
        let mut cleared = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let point = Point::new(center.x + dx, center.y + dy);
                let Some(idx) = self.idx(point) else {
                    continue;
                };
                if !self.hidden[idx] {
                    continue;
                }
                self.hidden[idx] = false;
                cleared += 1;
                sink.emit(CoreEvent::Revealed(point));
                if award {
                    sink.add_score(EXPLORATION_SCORE);
                }
            }
        }
        cleared
    }

    pub fn reveal_at(&mut self, x: f32, y: f32, award: bool, sink: &mut dyn EventSink) -> usize {
        self.reveal(nearest_tile(x, y), award, sink)
    }

    pub fn is_revealed(&self, point: Point) -> bool {
        if !self.enabled {
            return true;
        }
        self.idx(point).is_some_and(|idx| !self.hidden[idx])
    }

    /// `count` independent scored reveals at random walkable cells. Areas may overlap.
    pub fn reveal_random_areas(
        &mut self,
        count: u32,
        grid: &Grid,
        rooms: &[Room],
        rng: &mut RandomNumberGenerator,
        sink: &mut dyn EventSink,
    ) -> usize {
        let mut cleared = 0;
        for _ in 0..count {
            if let Some(point) = random_walkable_point(grid, rooms, rng) {
                cleared += self.reveal(point, true, sink);
            }
        }
        cleared
    }

    pub fn revealed_count(&self) -> usize {
        self.hidden.iter().filter(|hidden| !**hidden).count()
    }

    /// Per-cell revealed flags, indexed like the grid.
    pub fn revealed_mask(&self) -> Vec<bool> {
        if !self.enabled {
            return vec![true; self.hidden.len()];
        }
        self.hidden.iter().map(|hidden| !hidden).collect()
    }
}
