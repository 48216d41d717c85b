//! Periodic action scheduling bound to a store.
//!
//! A [`Ticker`] owns a background task that sends one action into a store
//! on a fixed interval. The schedule lives exactly as long as the `Ticker`
//! value: dropping it (including during unwinding or an early `?` return)
//! aborts the task, so no recurring callback outlives its owner.

use crate::{Store, StoreError};
use festpulse_core::reducer::Reducer;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Shortest period a ticker accepts
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle to a running periodic schedule
///
/// # Example
///
/// ```ignore
/// let ticker = Ticker::spawn(store.clone(), Duration::from_secs(5), || OccupancyAction::Tick);
/// // ...
/// ticker.stop(); // or just let it go out of scope
/// ```
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Start sending `make_action()` into `store` every `period`
    ///
    /// The first action is sent one full period after spawning. Periods
    /// shorter than [`MIN_PERIOD`] are raised to it. When the store starts
    /// shutting down the schedule ends on its own.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn<S, A, E, R, F>(store: Store<S, A, E, R>, period: Duration, make_action: F) -> Self
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
        F: Fn() -> A + Send + 'static,
    {
        if period < MIN_PERIOD {
            tracing::warn!(?period, "Ticker period too short, clamping to {:?}", MIN_PERIOD);
        }
        let period = period.max(MIN_PERIOD);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            // A slow reducer must not cause a burst of catch-up ticks
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                metrics::counter!(crate::metrics::TICKER_TICKS_TOTAL).increment(1);

                match store.send(make_action()).await {
                    Ok(()) => {},
                    Err(StoreError::ShutdownInProgress) => {
                        tracing::debug!("Store shutting down, ticker exiting");
                        break;
                    },
                    Err(error) => {
                        tracing::warn!(%error, "Tick rejected by store");
                    },
                }
            }
        });

        tracing::info!(?period, "Ticker started");

        Self {
            period,
            task: Some(task),
        }
    }

    /// Interval between actions
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Whether the background task is still scheduled
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancel the schedule now
    pub fn stop(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!(period = ?self.period, "Ticker stopped");
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}
