//! Production implementations of the environment traits.

use festpulse_core::environment::{CrowdFluctuation, IdGenerator};
use rand::Rng;

/// Alert identifiers backed by random UUIDs (`alert-<uuid>`)
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidAlertIds;

impl IdGenerator for UuidAlertIds {
    fn next_id(&self) -> String {
        format!("alert-{}", uuid::Uuid::new_v4())
    }
}

/// Uniform random crowd movement in `[-max_delta, max_delta]`
#[derive(Debug, Clone, Copy)]
pub struct RandomFluctuation {
    max_delta: i32,
}

impl RandomFluctuation {
    /// Movement bounded by `max_delta` in either direction
    ///
    /// Negative bounds are treated as positive.
    #[must_use]
    pub const fn new(max_delta: i32) -> Self {
        Self {
            max_delta: max_delta.saturating_abs(),
        }
    }

    /// The bound passed at construction
    #[must_use]
    pub const fn max_delta(&self) -> i32 {
        self.max_delta
    }
}

impl Default for RandomFluctuation {
    fn default() -> Self {
        Self::new(10)
    }
}

impl CrowdFluctuation for RandomFluctuation {
    fn delta(&self) -> i32 {
        rand::thread_rng().gen_range(-self.max_delta..=self.max_delta)
    }
}
