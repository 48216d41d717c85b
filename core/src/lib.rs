//! # FestPulse Core
//!
//! Core traits and types for the FestPulse crowd monitor.
//!
//! The monitor is built as a functional core with an imperative shell:
//! all crowd-count and alert logic lives in pure reducers, and everything
//! that touches time, randomness or identifiers is injected through an
//! environment.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state owned by a store (venues, alert feed)
//! - **Action**: Every input the state reacts to (scans, ticks, acknowledgements)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions, executed by the runtime
//! - **Environment**: Injected dependencies via traits
//!
//! ## Example
//!
//! ```
//! use festpulse_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Default)]
//! struct Turnstile {
//!     inside: u32,
//! }
//!
//! enum TurnstileAction {
//!     Enter,
//! }
//!
//! struct TurnstileReducer;
//!
//! impl Reducer for TurnstileReducer {
//!     type State = Turnstile;
//!     type Action = TurnstileAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut Turnstile,
//!         action: TurnstileAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<TurnstileAction>; 4]> {
//!         match action {
//!             TurnstileAction::Enter => state.inside += 1,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = Turnstile::default();
//! TurnstileReducer.reduce(&mut state, TurnstileAction::Enter, &());
//! assert_eq!(state.inside, 1);
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::{SmallVec, smallvec};

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They hold all business rules and are deterministic given their environment.
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Implementations update `state` in place and return descriptions
        /// of any work the runtime should perform afterwards. Reducers must
        /// not block, perform I/O or panic.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects are values returned from reducers. The runtime executes them and
/// feeds any produced action back into the store.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects concurrently
        Parallel(Vec<Effect<Action>>),

        /// Dispatch an action after a delay
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run concurrently
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Whether executing this effect does nothing
        #[must_use]
        pub fn is_none(&self) -> bool {
            match self {
                Effect::None => true,
                Effect::Parallel(effects) => effects.iter().all(Effect::is_none),
                Effect::Delay { .. } | Effect::Future(_) => false,
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// Everything non-deterministic a reducer needs (the current time, fresh
/// identifiers, random crowd movement) is reached through these traits so
/// tests can substitute fixed or scripted implementations.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock used in production
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Produces identifiers for newly created records
    ///
    /// Identifiers must be unique in practice; implementations are not
    /// required to rule out collisions entirely.
    pub trait IdGenerator: Send + Sync {
        /// Next identifier
        fn next_id(&self) -> String;
    }

    /// Source of the random crowd movement applied on every tick
    pub trait CrowdFluctuation: Send + Sync {
        /// Signed change in head count for one venue on one tick
        fn delta(&self) -> i32;
    }
}
