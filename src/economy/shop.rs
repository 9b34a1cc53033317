use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use log::debug;

use super::Session;
use crate::{data::items::ItemDatabase, events::EventSink};

/// Shop screen contents. A bought slot stays empty until the next reroll.
#[derive(Clone, Debug, Default)]
pub struct ShopStock {
    pub slots: Vec<Option<String>>,
}

impl ShopStock {
    pub fn roll(slot_count: usize, db: &ItemDatabase, rng: &mut RandomNumberGenerator) -> Self {
        let candidates = db.shop_candidates();
        let slots = (0..slot_count)
            .map(|_| {
                if candidates.is_empty() {
                    None
                } else {
                    let pick = rng.range(0, candidates.len() as i32) as usize;
                    Some(candidates[pick].key.clone())
                }
            })
            .collect();
        Self { slots }
    }

    pub fn purchase(
        &mut self,
        slot: usize,
        session: &mut Session,
        db: &ItemDatabase,
        sink: &mut dyn EventSink,
    ) -> bool {
        let Some(key) = self.slots.get(slot).cloned().flatten() else {
            return false;
        };
        let price = db.price(&key) as i64;
        if session.inventory.count(&key) >= session.inventory.max_item_count {
            sink.show_message(&format!("{} can't carry any more!", db.name(&key)), Some(&key));
            return false;
        }
        if !session.try_spend(price) {
            sink.show_message(
                &format!("Not enough points ({price} needed)."),
                Some(&key),
            );
            return false;
        }

        session.inventory.add_item(&key, db, sink);
        sink.show_message("Thanks for your purchase!", Some(&key));
        sink.show_floating_item(&key, Point::new(slot as i32, 0));
        debug!("bought {key} for {price}");
        self.slots[slot] = None;
        true
    }

    pub fn reroll(
        &mut self,
        session: &mut Session,
        db: &ItemDatabase,
        rng: &mut RandomNumberGenerator,
        sink: &mut dyn EventSink,
    ) -> bool {
        let cost = db.shop_reset_price as i64;
        if !session.try_spend(cost) {
            sink.show_message(&format!("Not enough points ({cost} needed)."), None);
            return false;
        }
        *self = Self::roll(self.slots.len(), db, rng);
        true
    }

    /// The trash can: trade one held item for its sell price.
    pub fn sell(
        &self,
        key: &str,
        session: &mut Session,
        db: &ItemDatabase,
        sink: &mut dyn EventSink,
    ) -> bool {
        if !session.inventory.remove_item(key) {
            sink.show_message("You don't have that.", Some(key));
            return false;
        }
        let payout = db.sell_price(key) as i64;
        session.points += payout;
        sink.show_message(&format!("Sold {} for {payout}.", db.name(key)), Some(key));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::items::{RADAR, TALISMAN},
        events::EventLog,
    };

    fn stocked(key: &str) -> ShopStock {
        ShopStock {
            slots: vec![Some(key.to_string()), None],
        }
    }

    #[test]
    fn short_on_points_changes_nothing() {
        let db = ItemDatabase::builtin();
        let mut session = Session::new(9);
        session.add_score(2999);
        let mut shop = stocked(RADAR);
        let mut log = EventLog::default();
        assert!(!shop.purchase(0, &mut session, &db, &mut log));
        assert_eq!(session.points, 2999);
        assert!(!session.inventory.has_item(RADAR));
        assert_eq!(shop.slots[0].as_deref(), Some(RADAR));
        assert_eq!(
            log.messages().collect::<Vec<_>>(),
            vec!["Not enough points (3000 needed)."]
        );
    }

    #[test]
    fn purchase_deducts_and_stores() {
        let db = ItemDatabase::builtin();
        let mut session = Session::new(9);
        session.add_score(3500);
        let mut shop = stocked(RADAR);
        let mut log = EventLog::default();
        assert!(shop.purchase(0, &mut session, &db, &mut log));
        assert_eq!(session.points, 500);
        assert_eq!(session.inventory.count(RADAR), 1);
        assert!(shop.slots[0].is_none());
        assert!(!shop.purchase(1, &mut session, &db, &mut log));
    }

    #[test]
    fn reroll_costs_the_reset_price() {
        let db = ItemDatabase::builtin();
        let mut rng = RandomNumberGenerator::seeded(3);
        let mut session = Session::new(9);
        let mut shop = ShopStock::roll(3, &db, &mut rng);
        let mut log = EventLog::default();
        assert!(!shop.reroll(&mut session, &db, &mut rng, &mut log));
        session.add_score(6000);
        assert!(shop.reroll(&mut session, &db, &mut rng, &mut log));
        assert_eq!(session.points, 1000);
        assert_eq!(shop.slots.len(), 3);
        assert!(shop.slots.iter().all(Option::is_some));
    }

    #[test]
    fn selling_pays_out_sell_price() {
        let db = ItemDatabase::builtin();
        let mut session = Session::new(9);
        let shop = ShopStock::default();
        let mut log = EventLog::default();
        assert!(!shop.sell(TALISMAN, &mut session, &db, &mut log));
        session.inventory.add_item(TALISMAN, &db, &mut log);
        assert!(shop.sell(TALISMAN, &mut session, &db, &mut log));
        assert_eq!(session.points, 5000);
        assert!(!session.inventory.has_item(TALISMAN));
    }
}
