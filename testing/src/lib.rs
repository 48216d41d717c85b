//! # FestPulse Testing
//!
//! Testing utilities for the FestPulse crowd monitor.
//!
//! This crate provides:
//! - Deterministic implementations of the environment traits
//! - A Given/When/Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use festpulse_testing::{ScriptedFluctuation, SequentialIds, test_clock};
//!
//! let env = OccupancyEnvironment::new(
//!     Arc::new(test_clock()),
//!     Arc::new(SequentialIds::new("alert")),
//!     Arc::new(ScriptedFluctuation::new([10, -10])),
//! );
//! ```

use chrono::{DateTime, Utc};
use festpulse_core::environment::{Clock, CrowdFluctuation, IdGenerator};


pub use reducer_test::{ReducerTest, assertions};

/// Deterministic environment implementations
pub mod mocks {
    use super::{Clock, CrowdFluctuation, DateTime, IdGenerator, Utc};
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use festpulse_testing::mocks::FixedClock;
    /// use festpulse_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2026-02-14 18:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(test_time())
    }

    /// The instant [`test_clock`] is frozen at
    #[must_use]
    pub fn test_time() -> DateTime<Utc> {
        DateTime::from_timestamp(1_771_092_000, 0).unwrap_or_default()
    }

    /// Predictable identifiers: `{prefix}-1`, `{prefix}-2`, ...
    #[derive(Debug)]
    pub struct SequentialIds {
        prefix: String,
        next: AtomicU64,
    }

    impl SequentialIds {
        /// Start a sequence at 1 with the given prefix
        #[must_use]
        pub fn new(prefix: impl Into<String>) -> Self {
            Self {
                prefix: prefix.into(),
                next: AtomicU64::new(1),
            }
        }
    }

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::Relaxed);
            format!("{}-{n}", self.prefix)
        }
    }

    /// Replays a fixed list of deltas, wrapping around at the end
    ///
    /// An empty script always yields 0, i.e. a tick that moves nobody.
    ///
    /// ```
    /// use festpulse_testing::mocks::ScriptedFluctuation;
    /// use festpulse_core::environment::CrowdFluctuation;
    ///
    /// let script = ScriptedFluctuation::new([3, -2]);
    /// assert_eq!(script.delta(), 3);
    /// assert_eq!(script.delta(), -2);
    /// assert_eq!(script.delta(), 3);
    /// ```
    #[derive(Debug)]
    pub struct ScriptedFluctuation {
        deltas: Vec<i32>,
        cursor: AtomicUsize,
    }

    impl ScriptedFluctuation {
        /// Script the given deltas
        #[must_use]
        pub fn new(deltas: impl IntoIterator<Item = i32>) -> Self {
            Self {
                deltas: deltas.into_iter().collect(),
                cursor: AtomicUsize::new(0),
            }
        }

        /// The same delta on every call
        #[must_use]
        pub fn constant(delta: i32) -> Self {
            Self::new([delta])
        }

        /// No movement at all
        #[must_use]
        pub fn still() -> Self {
            Self::new([])
        }
    }

    impl CrowdFluctuation for ScriptedFluctuation {
        fn delta(&self) -> i32 {
            if self.deltas.is_empty() {
                return 0;
            }
            let i = self.cursor.fetch_add(1, Ordering::Relaxed) % self.deltas.len();
            self.deltas[i]
        }
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, ScriptedFluctuation, SequentialIds, test_clock, test_time};
