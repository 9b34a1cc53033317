use bracket_geometry::prelude::Point;

use crate::map::{classify::TileKind, populate::DoorKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Enemy,
    Shelf,
    Door(DoorKind),
    SpecialTile,
    Blood,
}

/// Notifications the core raises for presentation and economy collaborators.
/// Nothing the core does depends on how (or whether) these are consumed.
#[derive(Clone, Debug, PartialEq)]
pub enum CoreEvent {
    TileCreated { kind: TileKind, point: Point },
    EntitySpawned { kind: EntityKind, point: Point },
    Revealed(Point),
    ScoreAdded(i32),
    Message { text: String, item: Option<String> },
    FloatingItem { key: String, point: Point },
    GameOver,
}

pub trait EventSink {
    fn emit(&mut self, event: CoreEvent);

    fn add_score(&mut self, amount: i32) {
        self.emit(CoreEvent::ScoreAdded(amount));
    }

    fn show_message(&mut self, text: &str, item: Option<&str>) {
        self.emit(CoreEvent::Message {
            text: text.to_string(),
            item: item.map(str::to_string),
        });
    }

    fn show_floating_item(&mut self, key: &str, point: Point) {
        self.emit(CoreEvent::FloatingItem {
            key: key.to_string(),
            point,
        });
    }
}

#[derive(Default, Debug)]
pub struct EventLog {
    pub entries: Vec<CoreEvent>,
}

impl EventSink for EventLog {
    fn emit(&mut self, event: CoreEvent) {
        self.entries.push(event);
    }
}

impl EventLog {
    pub fn drain(&mut self) -> Vec<CoreEvent> {
        std::mem::take(&mut self.entries)
    }

    pub fn score_total(&self) -> i32 {
        self.entries
            .iter()
            .map(|event| match event {
                CoreEvent::ScoreAdded(amount) => *amount,
                _ => 0,
            })
            .sum()
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|event| match event {
            CoreEvent::Message { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
