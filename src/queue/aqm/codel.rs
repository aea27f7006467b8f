//! Controlled Delay (CoDel) over sojourn time.
//!
//! Refer to <https://queue.acm.org/appendices/codel.html> for the reference
//! pseudocode. Once the oldest item has stayed at or above `target_ms` for a
//! full `interval_ms`, the controller enters a dropping episode and sheds
//! head items spaced `interval_ms / sqrt(count)` apart. Leaving and quickly
//! re-entering the episode resumes `count` with a small decay instead of
//! restarting the ramp.

use std::collections::VecDeque;

use crate::queue::item::Item;

#[derive(Debug)]
pub struct CodelState {
    target_ms: u64,
    interval_ms: u64,
    /// Instant the current above-target excursion counts as a full
    /// interval; 0 while the head is below target.
    first_above_at: u64,
    /// Next scheduled drop while in a dropping episode.
    drop_next: u64,
    /// Drops in the current episode.
    count: u32,
    dropping: bool,
}

impl CodelState {
    pub fn new(target_ms: u64, interval_ms: u64) -> Self {
        Self {
            target_ms,
            interval_ms,
            first_above_at: 0,
            drop_next: 0,
            count: 0,
            dropping: false,
        }
    }

    /// Episode drop counter, exposed to verify decay/resume behaviour.
    #[cfg(test)]
    pub(crate) fn count(&self) -> u32 {
        self.count
    }

    /// True when the oldest item has been above target for a full interval.
    fn ok_to_drop(&mut self, now: u64, queue: &VecDeque<Item>) -> bool {
        let sojourn = match queue.front() {
            Some(head) => head.sojourn_ms(now),
            None => {
                self.first_above_at = 0;
                return false;
            }
        };
        if sojourn < self.target_ms {
            self.first_above_at = 0;
            return false;
        }
        if self.first_above_at == 0 {
            self.first_above_at = now + self.interval_ms;
            return false;
        }
        now >= self.first_above_at
    }

    /// `reference + interval / sqrt(count)`, advancing at least 1 ms so a
    /// long episode cannot stall the schedule.
    fn control_law(&self, reference: u64) -> u64 {
        let step = (self.interval_ms as f64 / f64::from(self.count.max(1)).sqrt()) as u64;
        reference + step.max(1)
    }

    pub(super) fn run(&mut self, now: u64, queue: &mut VecDeque<Item>) -> Vec<Item> {
        let mut dropped = Vec::new();
        let ok = self.ok_to_drop(now, queue);

        if self.dropping {
            if !ok {
                self.dropping = false;
            } else {
                // Catch up on every drop the schedule owes us, walking
                // drop_next forward from its own prior value.
                while self.dropping && now >= self.drop_next {
                    dropped.extend(queue.pop_front());
                    self.count += 1;
                    if self.ok_to_drop(now, queue) {
                        self.drop_next = self.control_law(self.drop_next);
                    } else {
                        self.dropping = false;
                    }
                }
            }
        } else if ok {
            dropped.extend(queue.pop_front());
            self.dropping = true;
            // Resume the ramp when the last episode ended less than one
            // interval ago, otherwise start over.
            self.count = if now.saturating_sub(self.drop_next) < self.interval_ms && self.count > 2
            {
                self.count - 2
            } else {
                1
            };
            self.drop_next = self.control_law(now);
        }

        dropped
    }

    pub(super) fn join(&mut self) {
        self.first_above_at = 0;
        self.drop_next = 0;
        self.count = 0;
        self.dropping = false;
    }
}
