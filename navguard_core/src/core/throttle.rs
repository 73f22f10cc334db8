use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Keyed time-window limiter for log messages
///
/// Sustained fault conditions (no pose, failing queries, repeated collisions)
/// would otherwise emit one log line per command. Each key may fire at most
/// once per period; suppressed occurrences are counted and reported on the
/// next allowed emission.
#[derive(Debug, Default, Clone)]
pub struct LogThrottle {
    entries: HashMap<String, ThrottleEntry>,
}

#[derive(Debug, Clone)]
struct ThrottleEntry {
    last_emit: Instant,
    suppressed: u64,
}

impl LogThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Some(suppressed)` if a message for `key` may be emitted now,
    /// where `suppressed` is the number of occurrences swallowed since the
    /// previous emission. Returns `None` while the key is inside its window.
    pub fn check(&mut self, key: &str, period: Duration) -> Option<u64> {
        self.check_at(key, period, Instant::now())
    }

    pub(crate) fn check_at(&mut self, key: &str, period: Duration, now: Instant) -> Option<u64> {
        match self.entries.get_mut(key) {
            Some(entry) => {
                if now.duration_since(entry.last_emit) >= period {
                    let suppressed = entry.suppressed;
                    entry.last_emit = now;
                    entry.suppressed = 0;
                    Some(suppressed)
                } else {
                    entry.suppressed += 1;
                    None
                }
            }
            None => {
                self.entries.insert(
                    key.to_string(),
                    ThrottleEntry {
                        last_emit: now,
                        suppressed: 0,
                    },
                );
                Some(0)
            }
        }
    }

    /// Forget all keys
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}
