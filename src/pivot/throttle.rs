//! A trailing-edge throttle driven by caller-supplied timestamps.

use std::time::{Duration, Instant};

/// The minimum spacing between drag rectangle recomputations.
pub const DRAG_THROTTLE_INTERVAL: Duration = Duration::from_millis(16);

/// Rate limits a stream of values.
///
/// The first value is emitted immediately. Values offered before `interval`
/// has passed since the last emission are held back, and only the newest one
/// is kept. The held value is emitted by the next offer after the interval, or
/// by [Throttle::flush] when the stream ends.
///
/// The throttle never reads the clock itself; callers pass in the time of
/// each event.
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    interval: Duration,
    last_emit: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    /// Create a throttle that emits at most once per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
            pending: None,
        }
    }

    /// Offer `value` at time `now`, returning the value to act on, if any.
    pub fn offer(&mut self, now: Instant, value: T) -> Option<T> {
        let ready = self
            .last_emit
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);

        if ready {
            self.last_emit = Some(now);
            self.pending = None;
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    /// Take the value held back by the last offer, if any.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Forget the held value and the last emission time.
    pub fn reset(&mut self) {
        self.last_emit = None;
        self.pending = None;
    }
}
