use bracket_geometry::prelude::Point;
use specs::prelude::Entity;

/// Follow-up work that lands a number of presentation ticks after it was queued.
#[derive(Clone, Debug, PartialEq)]
pub enum DeferredAction {
    RevealRandomAreas { count: u32 },
    ShowMessage { text: String, item: Option<String> },
    RemoveEntity(Entity),
    FinishPlayerWarp { target: Point },
    FinishEnemyWarp { entity: Entity, target: Point },
    ConsumeDoll { enemy: Entity },
    UnlockInput,
}

#[derive(Default, Debug)]
pub struct DeferredQueue {
    pending: Vec<(DeferredAction, u32)>,
}

impl DeferredQueue {
    /// Queues `action` to fire on the `ticks`-th call to `tick` from now (at least the next one).
    pub fn schedule(&mut self, action: DeferredAction, ticks: u32) {
        self.pending.push((action, ticks.max(1)));
    }

    /// Advances every pending action by one tick and returns those that came due,
    /// in the order they were queued.
    pub fn tick(&mut self) -> Vec<DeferredAction> {
        let mut due = Vec::new();
        let mut waiting = Vec::with_capacity(self.pending.len());
        for (action, remaining) in self.pending.drain(..) {
            if remaining <= 1 {
                due.push(action);
            } else {
                waiting.push((action, remaining - 1));
            }
        }
        self.pending = waiting;
        due
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_on_the_nth_tick_not_before() {
        let mut queue = DeferredQueue::default();
        queue.schedule(DeferredAction::UnlockInput, 3);
        assert!(queue.tick().is_empty());
        assert!(queue.tick().is_empty());
        assert_eq!(queue.tick(), vec![DeferredAction::UnlockInput]);
        assert!(queue.is_empty());
    }

    #[test]
    fn same_tick_actions_keep_queue_order() {
        let mut queue = DeferredQueue::default();
        queue.schedule(DeferredAction::RevealRandomAreas { count: 3 }, 2);
        queue.schedule(DeferredAction::UnlockInput, 2);
        queue.schedule(DeferredAction::UnlockInput, 0);
        assert_eq!(queue.tick(), vec![DeferredAction::UnlockInput]);
        assert_eq!(
            queue.tick(),
            vec![
                DeferredAction::RevealRandomAreas { count: 3 },
                DeferredAction::UnlockInput,
            ]
        );
    }
}
