//! Entity id assignment
//!
//! Ids are decimal Unix-millisecond timestamps. Two creations in the same
//! millisecond still get distinct ids because every id is at least one past
//! the previous one.

use std::sync::atomic::{AtomicI64, Ordering};

/// Largest stored id treated as one of ours: 9999-12-31T23:59:59.999Z in ms.
/// Larger numeric ids are foreign and do not advance the clock.
const MAX_SEED_ID: i64 = 253_402_300_799_999;

/// Monotonic, timestamp-derived id source
#[derive(Debug)]
pub struct IdClock {
    last: AtomicI64,
}

impl IdClock {
    /// Clock that never hands out an id at or below any numeric id in `existing`
    pub fn after<'a>(existing: impl IntoIterator<Item = &'a str>) -> Self {
        let last = existing
            .into_iter()
            .filter_map(|id| id.parse::<i64>().ok())
            .filter(|id| *id <= MAX_SEED_ID)
            .max()
            .unwrap_or(0);
        Self {
            last: AtomicI64::new(last),
        }
    }

    /// Next id: `max(now_ms, last + 1)`
    pub fn next_id(&self) -> String {
        let now = chrono::Utc::now().timestamp_millis();
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        now.max(prev.saturating_add(1)).to_string()
    }
}

impl Default for IdClock {
    fn default() -> Self {
        Self::after(std::iter::empty())
    }
}
