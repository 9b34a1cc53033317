use log::info;

use super::Inventory;
use crate::{data::items::KEY, events::CoreEvent};

pub const FLOOR_CLEAR_BONUS: i64 = 300;

/// State that survives floor regeneration.
#[derive(Clone, Debug)]
pub struct Session {
    pub floor: u32,
    pub total_score: i64,
    pub stage_score: i64,
    pub points: i64,
    pub inventory: Inventory,
    pub next_stage_is_shop: bool,
    pub game_over: bool,
}

impl Session {
    pub fn new(max_item_count: u32) -> Self {
        Self {
            floor: 1,
            total_score: 0,
            stage_score: 0,
            points: 0,
            inventory: Inventory::new(max_item_count),
            next_stage_is_shop: false,
            game_over: false,
        }
    }

    pub fn add_score(&mut self, amount: i64) {
        self.total_score += amount;
        self.stage_score += amount;
        self.points += amount;
    }

    pub fn apply(&mut self, event: &CoreEvent) {
        match event {
            CoreEvent::ScoreAdded(amount) => self.add_score(*amount as i64),
            CoreEvent::GameOver => self.game_over = true,
            _ => {}
        }
    }

    pub fn try_spend(&mut self, cost: i64) -> bool {
        if cost < 0 || self.points < cost {
            return false;
        }
        self.points -= cost;
        true
    }

    pub fn advance_floor(&mut self) {
        self.add_score(FLOOR_CLEAR_BONUS);
        self.floor += 1;
        self.stage_score = 0;
        self.inventory.remove_item(KEY);
        info!(
            "advanced to floor {} with {} total score",
            self.floor, self.total_score
        );
    }

    pub fn restart(&mut self) {
        info!("restarting run from floor 1");
        self.floor = 1;
        self.total_score = 0;
        self.stage_score = 0;
        self.points = 0;
        self.inventory.clear();
        self.next_stage_is_shop = false;
        self.game_over = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::items::ItemDatabase, events::EventLog};

    #[test]
    fn score_events_credit_every_counter() {
        let mut session = Session::new(9);
        session.apply(&CoreEvent::ScoreAdded(40));
        session.apply(&CoreEvent::Revealed(bracket_geometry::prelude::Point::new(1, 1)));
        assert_eq!(session.total_score, 40);
        assert_eq!(session.stage_score, 40);
        assert_eq!(session.points, 40);
    }

    #[test]
    fn spending_never_goes_negative() {
        let mut session = Session::new(9);
        session.add_score(100);
        assert!(!session.try_spend(150));
        assert_eq!(session.points, 100);
        assert!(session.try_spend(100));
        assert_eq!(session.points, 0);
        assert_eq!(session.total_score, 100);
    }

    #[test]
    fn advancing_pays_bonus_and_drops_the_key() {
        let db = ItemDatabase::builtin();
        let mut session = Session::new(9);
        session
            .inventory
            .add_item(KEY, &db, &mut EventLog::default());
        session.stage_score = 70;
        session.advance_floor();
        assert_eq!(session.floor, 2);
        assert_eq!(session.stage_score, 0);
        assert_eq!(session.total_score, FLOOR_CLEAR_BONUS);
        assert!(!session.inventory.has_item(KEY));
    }

    #[test]
    fn restart_resets_run() {
        let db = ItemDatabase::builtin();
        let mut session = Session::new(9);
        session.floor = 4;
        session.apply(&CoreEvent::GameOver);
        session
            .inventory
            .add_item("radar", &db, &mut EventLog::default());
        session.restart();
        assert_eq!(session.floor, 1);
        assert!(!session.game_over);
        assert!(session.inventory.slots().is_empty());
    }
}
