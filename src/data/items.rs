#![allow(dead_code)]

use bracket_random::prelude::RandomNumberGenerator;
use serde::{Deserialize, Serialize};

use super::Result;

pub const NOTHING: &str = "nothing";
pub const KEY: &str = "key";
pub const REPORT: &str = "report";
pub const RADAR: &str = "radar";
pub const WARPCOIN: &str = "warpcoin";
pub const MAP: &str = "map";
pub const WARP_GUN: &str = "warp_gun";
pub const MIGAWARI: &str = "migawari";
pub const RADIO: &str = "radio";
pub const TALISMAN: &str = "talisman";
pub const BLUEBOX: &str = "bluebox";

pub const DEFAULT_SHOP_RESET_PRICE: u32 = 5000;

fn default_usage_messages() -> Vec<String> {
    vec![String::new()]
}

fn default_shop_reset_price() -> u32 {
    DEFAULT_SHOP_RESET_PRICE
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DropItem {
    pub key: String,
    pub name: String,
    pub weight: u32,
    #[serde(default)]
    pub special_tile_weight: u32,
    #[serde(default)]
    pub price: u32,
    #[serde(default)]
    pub sell_price: u32,
    #[serde(default)]
    pub effect_value: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_usage_messages")]
    pub usage_messages: Vec<String>,
}

impl DropItem {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        key: &str,
        name: &str,
        weight: u32,
        special_tile_weight: u32,
        price: u32,
        sell_price: u32,
        effect_value: i32,
        description: &str,
        usage_messages: &[&str],
    ) -> Self {
        let mut item = Self {
            key: key.to_string(),
            name: name.to_string(),
            weight,
            special_tile_weight,
            price,
            sell_price,
            effect_value,
            description: description.to_string(),
            usage_messages: usage_messages.iter().map(|m| m.to_string()).collect(),
        };
        item.normalize();
        item
    }

    fn normalize(&mut self) {
        if self.usage_messages.is_empty() {
            self.usage_messages = default_usage_messages();
        }
    }

    fn key_item() -> Self {
        Self::new(KEY, "Key", 0, 0, 0, 0, 0, "Opens the way down.", &[])
    }

    fn nothing_item() -> Self {
        Self::new(NOTHING, "Nothing", 0, 0, 0, 0, 0, "", &[])
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WeightChannel {
    Shelf,
    SpecialTile,
}

#[derive(Deserialize)]
struct RawTable {
    items: Vec<DropItem>,
    #[serde(default = "default_shop_reset_price")]
    shop_reset_price: u32,
}

/// The loot table. `nothing` and `key` are always present; `key` never wins a roll.
#[derive(Clone, Debug)]
pub struct ItemDatabase {
    items: Vec<DropItem>,
    nothing_idx: usize,
    pub shop_reset_price: u32,
}

impl ItemDatabase {
    pub fn new(mut items: Vec<DropItem>, shop_reset_price: u32) -> Self {
        items.iter_mut().for_each(DropItem::normalize);
        if !items.iter().any(|item| item.key == KEY) {
            items.push(DropItem::key_item());
        }
        let nothing_idx = match items.iter().position(|item| item.key == NOTHING) {
            Some(idx) => idx,
            None => {
                items.push(DropItem::nothing_item());
                items.len() - 1
            }
        };
        Self {
            items,
            nothing_idx,
            shop_reset_price,
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: RawTable = serde_json::from_str(text)?;
        Ok(Self::new(raw.items, raw.shop_reset_price))
    }

    pub fn builtin() -> Self {
        let items = vec![
            DropItem::new(NOTHING, "Nothing", 1200, 10, 0, 0, 0, "", &[]),
            DropItem::new(
                REPORT,
                "Field Report",
                100,
                10,
                0,
                0,
                0,
                "Someone's notes. Score +100.",
                &[],
            ),
            DropItem::new(
                RADAR,
                "Radar",
                100,
                15,
                3000,
                1500,
                10,
                "Shows every enemy and hidden tile for a while.",
                &["The radar hums. Enemies show up through the dark!"],
            ),
            DropItem::new(
                WARPCOIN,
                "Warp Coin",
                100,
                15,
                4000,
                2000,
                0,
                "Flip it to land somewhere random on this floor.",
                &["You warped!"],
            ),
            DropItem::new(
                MAP,
                "Map Scrap",
                100,
                5,
                0,
                0,
                3,
                "Fills in a few random patches of the map.",
                &["The map fills itself in."],
            ),
            DropItem::new(
                WARP_GUN,
                "Warp Gun",
                100,
                10,
                4000,
                2000,
                0,
                "Shoots an enemy somewhere else.",
                &["Warp gun ready. Pick a direction to fire!"],
            ),
            DropItem::new(
                MIGAWARI,
                "Stand-in Doll",
                80,
                20,
                8000,
                4000,
                1,
                "Takes one hit for you and dazes the attacker.",
                &[],
            ),
            DropItem::new(
                RADIO,
                "Radio",
                80,
                5,
                6000,
                3000,
                10,
                "Blasts a strange sound that freezes every enemy.",
                &[
                    "Static pours out. Every enemy freezes!",
                    "A horrible jingle plays. The enemies stop to listen.",
                    "Feedback screeches through the halls!",
                    "A weather report drones on. Nobody moves.",
                    "An old song crackles out. The enemies sway in place.",
                ],
            ),
            DropItem::new(
                TALISMAN,
                "Talisman",
                50,
                20,
                10000,
                5000,
                3,
                "Banishes a few enemies from the floor.",
                &[],
            ),
            DropItem::new(
                BLUEBOX,
                "Blue Box",
                50,
                5,
                12000,
                6000,
                0,
                "Opens a door to the shop right here.",
                &["A strange door appears..."],
            ),
        ];
        Self::new(items, DEFAULT_SHOP_RESET_PRICE)
    }

    pub fn items(&self) -> &[DropItem] {
        &self.items
    }

    pub fn get(&self, key: &str) -> Option<&DropItem> {
        self.items.iter().find(|item| item.key == key)
    }

    pub fn nothing(&self) -> &DropItem {
        &self.items[self.nothing_idx]
    }

    fn weight_of(item: &DropItem, channel: WeightChannel) -> u64 {
        if item.key == KEY {
            return 0;
        }
        let weight = match channel {
            WeightChannel::Shelf => item.weight,
            WeightChannel::SpecialTile => item.special_tile_weight,
        };
        weight as u64
    }

    /// Channel total, widened so tables of large `u32` weights cannot overflow.
    pub fn total_weight(&self, channel: WeightChannel) -> u64 {
        self.items
            .iter()
            .map(|item| Self::weight_of(item, channel))
            .sum()
    }

    /// Cumulative-weight pick in declaration order; the first entry whose running
    /// total is strictly greater than the draw wins.
    pub fn roll(&self, channel: WeightChannel, rng: &mut RandomNumberGenerator) -> &DropItem {
        let total = self.total_weight(channel);
        if total == 0 {
            return self.nothing();
        }
        let draw = rng.range(0, total as i64) as u64;
        let mut cumulative = 0u64;
        for item in &self.items {
            cumulative += Self::weight_of(item, channel);
            if draw < cumulative {
                return item;
            }
        }
        self.nothing()
    }

    pub fn roll_normal(&self, rng: &mut RandomNumberGenerator) -> &DropItem {
        self.roll(WeightChannel::Shelf, rng)
    }

    pub fn roll_special(&self, rng: &mut RandomNumberGenerator) -> &DropItem {
        self.roll(WeightChannel::SpecialTile, rng)
    }

    pub fn resolve_fixed(&self, key: &str) -> &DropItem {
        self.get(key).unwrap_or_else(|| self.nothing())
    }

    pub fn name(&self, key: &str) -> String {
        self.get(key)
            .map(|item| item.name.clone())
            .unwrap_or_else(|| key.to_string())
    }

    pub fn usage_message(&self, key: &str, rng: &mut RandomNumberGenerator) -> Option<&str> {
        let item = self.get(key)?;
        let pick = rng.range(0, item.usage_messages.len() as i32) as usize;
        let message = item.usage_messages[pick].as_str();
        if message.is_empty() { None } else { Some(message) }
    }

    pub fn effect_value(&self, key: &str) -> i32 {
        self.get(key).map_or(0, |item| item.effect_value)
    }

    pub fn price(&self, key: &str) -> u32 {
        self.get(key).map_or(0, |item| item.price)
    }

    pub fn sell_price(&self, key: &str) -> u32 {
        self.get(key).map_or(0, |item| item.sell_price)
    }

    /// Everything the shop may stock: priced items that are not loot-only.
    pub fn shop_candidates(&self) -> Vec<&DropItem> {
        self.items
            .iter()
            .filter(|item| ![NOTHING, KEY, REPORT, MAP].contains(&item.key.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_frequency_converges_to_its_weight_share() {
        let db = ItemDatabase::builtin();
        let total = db.total_weight(WeightChannel::Shelf) as f64;
        let expected = db.nothing().weight as f64 / total;
        let mut rng = RandomNumberGenerator::seeded(42);
        let rolls = 40_000;
        let hits = (0..rolls)
            .filter(|_| db.roll_normal(&mut rng).key == NOTHING)
            .count();
        let observed = hits as f64 / rolls as f64;
        assert!(
            (observed - expected).abs() < 0.02,
            "observed {observed:.3}, expected {expected:.3}"
        );
    }

    #[test]
    fn key_is_never_rolled() {
        let db = ItemDatabase::new(
            vec![DropItem::new(KEY, "Key", 1000, 1000, 0, 0, 0, "", &[])],
            DEFAULT_SHOP_RESET_PRICE,
        );
        let mut rng = RandomNumberGenerator::seeded(1);
        for _ in 0..100 {
            assert_eq!(db.roll_normal(&mut rng).key, NOTHING);
            assert_eq!(db.roll_special(&mut rng).key, NOTHING);
        }
        assert_eq!(db.resolve_fixed(KEY).name, "Key");
    }

    #[test]
    fn empty_table_resolves_to_nothing() {
        let db = ItemDatabase::new(Vec::new(), DEFAULT_SHOP_RESET_PRICE);
        let mut rng = RandomNumberGenerator::seeded(1);
        assert_eq!(db.total_weight(WeightChannel::Shelf), 0);
        assert_eq!(db.roll_normal(&mut rng).key, NOTHING);
        assert!(db.get(KEY).is_some());
    }

    #[test]
    fn channels_use_their_own_weights() {
        let db = ItemDatabase::new(
            vec![
                DropItem::new("shelf_only", "A", 10, 0, 0, 0, 0, "", &[]),
                DropItem::new("tile_only", "B", 0, 10, 0, 0, 0, "", &[]),
            ],
            DEFAULT_SHOP_RESET_PRICE,
        );
        let mut rng = RandomNumberGenerator::seeded(9);
        for _ in 0..50 {
            assert_eq!(db.roll_normal(&mut rng).key, "shelf_only");
            assert_eq!(db.roll_special(&mut rng).key, "tile_only");
        }
    }

    #[test]
    fn lookups_fall_back_gracefully() {
        let db = ItemDatabase::builtin();
        assert_eq!(db.name(KEY), "Key");
        assert_eq!(db.name("mystery"), "mystery");
        assert_eq!(db.effect_value(RADIO), 10);
        assert_eq!(db.sell_price(TALISMAN), 5000);
        assert_eq!(db.shop_reset_price, 5000);
        let mut rng = RandomNumberGenerator::seeded(2);
        assert!(db.usage_message(RADIO, &mut rng).is_some());
        assert!(db.usage_message(TALISMAN, &mut rng).is_none());
    }

    #[test]
    fn shop_never_stocks_loot_only_items() {
        let db = ItemDatabase::builtin();
        let keys: Vec<&str> = db.shop_candidates().iter().map(|i| i.key.as_str()).collect();
        for banned in [NOTHING, KEY, REPORT, MAP] {
            assert!(!keys.contains(&banned));
        }
        assert!(keys.contains(&BLUEBOX));
    }

    #[test]
    fn json_table_gets_reserved_entries() {
        let db = ItemDatabase::from_json_str(
            r#"{ "items": [ { "key": "gem", "name": "Gem", "weight": 5, "usage_messages": [] } ] }"#,
        )
        .unwrap();
        assert_eq!(db.shop_reset_price, DEFAULT_SHOP_RESET_PRICE);
        assert!(db.get(NOTHING).is_some());
        assert_eq!(db.get("gem").unwrap().usage_messages, vec![String::new()]);
    }

    #[test]
    fn huge_json_weights_roll_without_overflow() {
        let db = ItemDatabase::from_json_str(
            r#"{ "items": [
                { "key": "gem", "name": "Gem", "weight": 3000000000 },
                { "key": "ore", "name": "Ore", "weight": 3000000000 }
            ] }"#,
        )
        .unwrap();
        assert!(db.total_weight(WeightChannel::Shelf) >= 6_000_000_000);
        let mut rng = RandomNumberGenerator::seeded(11);
        for _ in 0..200 {
            let item = db.roll_normal(&mut rng);
            assert!(item.weight > 0, "rolled zero-weight {}", item.key);
        }
    }
}
