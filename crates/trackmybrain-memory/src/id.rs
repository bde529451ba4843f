//! Millisecond-timestamp record ids that never repeat within a process.

use chrono::Utc;
use parking_lot::Mutex;

/// Hands out `(id, created_at)` pairs from the wall clock.
///
/// Two calls in the same millisecond would collide under a plain
/// `now_ms` scheme; here the second call is bumped to `last + 1`, so ids
/// stay strictly increasing and still parse as unix milliseconds.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: Mutex<i64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id and the creation timestamp it encodes.
    pub fn next(&self) -> (String, i64) {
        self.next_at(Utc::now().timestamp_millis())
    }

    /// Next id given the current clock reading in milliseconds.
    pub fn next_at(&self, now_ms: i64) -> (String, i64) {
        let mut last = self.last.lock();
        let value = if now_ms > *last { now_ms } else { *last + 1 };
        *last = value;
        (value.to_string(), value)
    }
}
