#![allow(dead_code)]

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::RGB;
use specs::prelude::{Component, NullStorage, VecStorage};

use crate::map::populate::DoorKind;

pub const BASE_ORDER: i32 = 0;
pub const BLOOD_ORDER: i32 = 1;
pub const SPECIAL_TILE_ORDER: i32 = 5;
pub const PROP_ORDER: i32 = 10;
pub const ENEMY_ORDER: i32 = 20;
pub const PLAYER_ORDER: i32 = 30;
pub const FOG_ORDER: i32 = 100;
pub const ABOVE_FOG_ORDER: i32 = 101;

#[derive(Clone, Debug)]
pub struct Position {
    pub point: Point,
}

impl Component for Position {
    type Storage = VecStorage<Self>;
}

/// `order` above `FOG_ORDER` draws even where the fog has not been cleared.
#[derive(Clone, Debug)]
pub struct Renderable {
    pub glyph: u16,
    pub color: RGB,
    pub order: i32,
}

impl Renderable {
    pub fn above_fog(&self) -> bool {
        self.order > FOG_ORDER
    }
}

impl Component for Renderable {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, Default)]
pub struct PlayerTag;

impl Component for PlayerTag {
    type Storage = NullStorage<Self>;
}

#[derive(Clone, Debug, Default)]
pub struct Enemy {
    pub stun_turns: u32,
    pub skip_next_turn: bool,
    pub was_revealed: bool,
    /// Set while a warp sequence owns this enemy's position.
    pub in_sequence: bool,
}

impl Component for Enemy {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Shelf {
    pub searched: bool,
    pub fixed_item: Option<String>,
    pub facing: Point,
}

impl Component for Shelf {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, Default)]
pub struct SpecialTile {
    pub revealed: bool,
    pub searched: bool,
}

impl SpecialTile {
    pub fn can_interact(&self) -> bool {
        self.revealed && !self.searched
    }
}

impl Component for SpecialTile {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Door {
    pub kind: DoorKind,
}

impl Component for Door {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, Default)]
pub struct BloodDecal;

impl Component for BloodDecal {
    type Storage = NullStorage<Self>;
}
