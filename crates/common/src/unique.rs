//! Unique identifiers for generated test data
//!
//! Ids are wall-clock milliseconds plus a process-local counter. Every issued
//! id is also strictly greater than the previous one, so two calls in the
//! same millisecond, or across a clock step backwards, never collide.

use std::sync::atomic::{AtomicU64, Ordering};

static GLOBAL: UniqueIds = UniqueIds::new();

/// Monotonic id source
#[derive(Debug, Default)]
pub struct UniqueIds {
    counter: AtomicU64,
    last: AtomicU64,
}

impl UniqueIds {
    pub const fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
            last: AtomicU64::new(0),
        }
    }

    /// Issue the next id
    pub fn next(&self) -> u64 {
        let sequence = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let candidate = now_millis().saturating_add(sequence);

        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let id = candidate.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, id, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return id,
                Err(current) => last = current,
            }
        }
    }
}

/// Next id from the process-wide source
pub fn next_id() -> u64 {
    GLOBAL.next()
}

/// A `test-<id>` label for tagging requests
pub fn test_id() -> String {
    format!("test-{}", next_id())
}

fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
