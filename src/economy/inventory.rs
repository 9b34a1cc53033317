use serde::{Deserialize, Serialize};

use crate::{
    data::items::{ItemDatabase, NOTHING, REPORT},
    events::EventSink,
};

pub const DEFAULT_MAX_ITEM_COUNT: u32 = 9;
pub const PICKUP_SCORE: i32 = 10;
pub const REPORT_SCORE: i32 = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySlot {
    pub key: String,
    pub count: u32,
}

/// Item counts in pickup order, capped per key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<InventorySlot>,
    pub max_item_count: u32,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITEM_COUNT)
    }
}

impl Inventory {
    pub fn new(max_item_count: u32) -> Self {
        Self {
            slots: Vec::new(),
            max_item_count,
        }
    }

    /// Adds one `key`. Reports are cashed in for score instead of stored. At the cap
    /// nothing changes and the player is told they can't carry more.
    pub fn add_item(&mut self, key: &str, db: &ItemDatabase, sink: &mut dyn EventSink) -> bool {
        if key.is_empty() || key == NOTHING {
            return false;
        }
        if key == REPORT {
            sink.add_score(REPORT_SCORE);
            return true;
        }

        let count = self.count(key);
        if count >= self.max_item_count {
            sink.show_message(&format!("{} can't carry any more!", db.name(key)), Some(key));
            return false;
        }

        match self.slots.iter_mut().find(|slot| slot.key == key) {
            Some(slot) => slot.count += 1,
            None => self.slots.push(InventorySlot {
                key: key.to_string(),
                count: 1,
            }),
        }
        sink.add_score(PICKUP_SCORE);
        true
    }

    pub fn remove_item(&mut self, key: &str) -> bool {
        let Some(idx) = self.slots.iter().position(|slot| slot.key == key) else {
            return false;
        };
        self.slots[idx].count -= 1;
        if self.slots[idx].count == 0 {
            self.slots.remove(idx);
        }
        true
    }

    pub fn has_item(&self, key: &str) -> bool {
        self.count(key) > 0
    }

    pub fn count(&self, key: &str) -> u32 {
        self.slots
            .iter()
            .find(|slot| slot.key == key)
            .map_or(0, |slot| slot.count)
    }

    pub fn slots(&self) -> &[InventorySlot] {
        &self.slots
    }

    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.slots.get(index).map(|slot| slot.key.as_str())
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
