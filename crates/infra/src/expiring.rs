//! Values that clear themselves after a fixed time-to-live.
//!
//! Used for the service's "latest error" slot: a transient failure is visible
//! for a short while and then disappears without anyone having to reset it.

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Slot<T> {
    value: T,
    set_at: Instant,
}

/// Thread-safe single value with an optional time-to-live.
///
/// With `ttl == None` the value stays until replaced or cleared.
#[derive(Debug)]
pub struct ExpiringValue<T> {
    ttl: Option<Duration>,
    slot: Mutex<Option<Slot<T>>>,
}

impl<T: Clone> ExpiringValue<T> {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn set(&self, value: T) {
        self.set_at(value, Instant::now());
    }

    pub fn set_at(&self, value: T, now: Instant) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(Slot { value, set_at: now });
        }
    }

    pub fn get(&self) -> Option<T> {
        self.get_at(Instant::now())
    }

    /// Current value as seen at `now`; an expired value is dropped on read.
    pub fn get_at(&self, now: Instant) -> Option<T> {
        let mut slot = self.slot.lock().ok()?;
        let expired = match (slot.as_ref(), self.ttl) {
            (Some(s), Some(ttl)) => now.saturating_duration_since(s.set_at) >= ttl,
            _ => false,
        };
        if expired {
            *slot = None;
        }
        slot.as_ref().map(|s| s.value.clone())
    }

    pub fn clear(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}
