#![allow(dead_code)]

pub mod items;

use std::{fs, path::Path};

use bracket_random::prelude::RandomNumberGenerator;
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid range for {field}: {min}..={max}")]
    InvalidRange {
        field: &'static str,
        min: i32,
        max: i32,
    },

    #[error("{field} must be a probability, got {value}")]
    InvalidChance { field: &'static str, value: f32 },

    #[error("grid {width}x{height} is too small to hold a room")]
    GridTooSmall { width: i32, height: i32 },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Inclusive integer range.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: i32,
    pub max: i32,
}

impl CountRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn roll(&self, rng: &mut RandomNumberGenerator) -> i32 {
        if self.max <= self.min {
            self.min
        } else {
            rng.range(self.min, self.max + 1)
        }
    }

    fn check(&self, field: &'static str, floor: i32) -> Result<()> {
        if self.min < floor || self.max < self.min {
            return Err(ConfigError::InvalidRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

pub const MAX_SPECIAL_TILES: i32 = 10;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub grid_width: i32,
    pub grid_height: i32,
    pub rooms: CountRange,
    pub room_size: CountRange,
    pub max_room_attempts: u32,
    pub enemies: CountRange,
    pub shelves_per_room: CountRange,
    pub special_tile_count: i32,
    pub blood_chance: f32,
    pub shop_door_chance: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            grid_width: 25,
            grid_height: 25,
            rooms: CountRange::new(5, 10),
            room_size: CountRange::new(4, 6),
            max_room_attempts: 100,
            enemies: CountRange::new(2, 5),
            shelves_per_room: CountRange::new(0, 7),
            special_tile_count: 0,
            blood_chance: 0.05,
            shop_door_chance: 0.5,
        }
    }
}

impl GenerationConfig {
    /// Copy of this config with every positive profile field applied; zero means inherit.
    pub fn with_profile(&self, profile: &DungeonProfile) -> Self {
        fn pick(base: i32, over: i32) -> i32 {
            if over > 0 { over } else { base }
        }

        Self {
            grid_width: pick(self.grid_width, profile.grid_width),
            grid_height: pick(self.grid_height, profile.grid_height),
            rooms: CountRange::new(
                pick(self.rooms.min, profile.min_rooms),
                pick(self.rooms.max, profile.max_rooms),
            ),
            room_size: CountRange::new(
                pick(self.room_size.min, profile.min_room_size),
                pick(self.room_size.max, profile.max_room_size),
            ),
            enemies: CountRange::new(
                pick(self.enemies.min, profile.min_enemies),
                pick(self.enemies.max, profile.max_enemies),
            ),
            shelves_per_room: CountRange::new(
                pick(self.shelves_per_room.min, profile.min_shelves_per_room),
                pick(self.shelves_per_room.max, profile.max_shelves_per_room),
            ),
            special_tile_count: pick(self.special_tile_count, profile.special_tile_count),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.rooms.check("rooms", 1)?;
        self.room_size.check("room_size", 1)?;
        self.enemies.check("enemies", 0)?;
        self.shelves_per_room.check("shelves_per_room", 0)?;
        if self.grid_width < self.room_size.min + 3 || self.grid_height < self.room_size.min + 3 {
            return Err(ConfigError::GridTooSmall {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        for (field, value) in [
            ("blood_chance", self.blood_chance),
            ("shop_door_chance", self.shop_door_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidChance { field, value });
            }
        }
        Ok(())
    }
}

/// A weighted variant of the generation parameters. Zero-valued overrides inherit
/// the base configuration, so zero can never be set through a profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonProfile {
    pub id: String,
    pub weight: i32,
    pub start_floor: u32,
    pub grid_width: i32,
    pub grid_height: i32,
    pub min_rooms: i32,
    pub max_rooms: i32,
    pub min_room_size: i32,
    pub max_room_size: i32,
    pub min_enemies: i32,
    pub max_enemies: i32,
    pub min_shelves_per_room: i32,
    pub max_shelves_per_room: i32,
    pub special_tile_count: i32,
}

impl DungeonProfile {
    pub fn is_eligible(&self, floor: u32) -> bool {
        floor >= self.start_floor
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub generation: GenerationConfig,
    pub profiles: Vec<DungeonProfile>,
    pub default_profile_weight: i32,
    pub max_item_count: u32,
    pub fog_enabled: bool,
    pub shop_slots: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            profiles: Vec::new(),
            default_profile_weight: 50,
            max_item_count: 9,
            fog_enabled: true,
            shop_slots: 3,
        }
    }
}

impl GameConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.generation.validate()?;
        for profile in &self.profiles {
            self.generation.with_profile(profile).validate()?;
        }
        Ok(())
    }

    /// Weighted pick among profiles unlocked at `floor`; `None` means the base config.
    pub fn select_profile(
        &self,
        floor: u32,
        rng: &mut RandomNumberGenerator,
    ) -> Option<&DungeonProfile> {
        let eligible: Vec<&DungeonProfile> = self
            .profiles
            .iter()
            .filter(|profile| profile.is_eligible(floor) && profile.weight > 0)
            .collect();
        let default_weight = i64::from(self.default_profile_weight.max(0));
        let total = default_weight
            + eligible
                .iter()
                .map(|profile| i64::from(profile.weight))
                .sum::<i64>();
        if total <= 0 {
            return None;
        }

        let mut point = rng.range(0, total);
        if point < default_weight {
            return None;
        }
        point -= default_weight;
        for profile in eligible {
            let weight = i64::from(profile.weight);
            if point < weight {
                return Some(profile);
            }
            point -= weight;
        }
        None
    }

    /// Generation parameters for `floor`, plus the id of the profile that shaped them.
    pub fn generation_for(
        &self,
        floor: u32,
        rng: &mut RandomNumberGenerator,
    ) -> (GenerationConfig, Option<String>) {
        match self.select_profile(floor, rng) {
            Some(profile) => {
                info!("floor {floor}: using dungeon profile '{}'", profile.id);
                (
                    self.generation.with_profile(profile),
                    Some(profile.id.clone()),
                )
            }
            None => {
                info!("floor {floor}: using default generation settings");
                (self.generation.clone(), None)
            }
        }
    }
}
