//! The festival monitor: an occupancy store with a managed tick lifecycle.
//!
//! [`FestivalMonitor`] is a cheap, cloneable handle. Views hold a handle and
//! read snapshots from it; they never see the state mutably. Every mutation
//! goes through the store, so ticks and scans from different tasks are
//! serialized by the store's write lock.

use crate::dashboard::DashboardStats;
use crate::reducer::{OccupancyEnvironment, OccupancyReducer};
use crate::types::{
    Alert, AlertId, OccupancyAction, OccupancyState, ScanDirection, Venue, VenueId,
};
use chrono::{DateTime, Utc};
use festpulse_runtime::{Store, StoreError, Ticker};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::broadcast;

/// The store type backing a [`FestivalMonitor`]
pub type OccupancyStore =
    Store<OccupancyState, OccupancyAction, OccupancyEnvironment, OccupancyReducer>;

/// Handle to the live occupancy state
#[derive(Clone)]
pub struct FestivalMonitor {
    store: OccupancyStore,
}

impl FestivalMonitor {
    /// Monitor over an explicit initial state
    ///
    /// Alerts are evaluated once before the store takes the state, so a
    /// venue that starts overcrowded is flagged without waiting for a tick.
    #[must_use]
    pub fn new(mut state: OccupancyState, env: OccupancyEnvironment) -> Self {
        OccupancyReducer::evaluate_alerts(&mut state, &env);
        Self {
            store: Store::new(state, OccupancyReducer::new(), env),
        }
    }

    /// Monitor over the seeded festival venues and alerts
    #[must_use]
    pub fn festival(env: OccupancyEnvironment) -> Self {
        let now = env.clock.now();
        Self::new(OccupancyState::festival(now), env)
    }

    /// Seeded festival with a custom alert feed size
    #[must_use]
    pub fn festival_with_cap(env: OccupancyEnvironment, alert_cap: usize) -> Self {
        let now = env.clock.now();
        Self::new(OccupancyState::festival_with_cap(now, alert_cap), env)
    }

    /// The underlying store
    #[must_use]
    pub const fn store(&self) -> &OccupancyStore {
        &self.store
    }

    /// All venues, in registry order
    pub async fn venues(&self) -> Vec<Venue> {
        self.store.state(|s| s.venues().to_vec()).await
    }

    /// One venue by id
    pub async fn venue(&self, id: &VenueId) -> Option<Venue> {
        self.store.state(|s| s.venue(id).cloned()).await
    }

    /// The alert feed, newest first
    pub async fn alerts(&self) -> Vec<Alert> {
        self.store.state(|s| s.alerts().to_vec()).await
    }

    /// Sum of all venue head counts
    pub async fn total_attendees(&self) -> u64 {
        self.store.state(OccupancyState::total_attendees).await
    }

    /// Number of alerts not yet acknowledged
    pub async fn unacknowledged_count(&self) -> usize {
        self.store.state(OccupancyState::unacknowledged_count).await
    }

    /// Consistent copy of everything a view renders, taken under one read lock
    pub async fn snapshot(&self) -> MonitorSnapshot {
        let taken_at = self.store.environment().clock.now();
        self.store
            .state(|s| MonitorSnapshot {
                venues: s.venues().to_vec(),
                alerts: s.alerts().to_vec(),
                total_attendees: s.total_attendees(),
                unacknowledged_count: s.unacknowledged_count(),
                taken_at,
            })
            .await
    }

    /// Receive every action after the store has applied it
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<OccupancyAction> {
        self.store.subscribe_actions()
    }

    /// Record one entry at a venue
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the monitor is shutting down.
    /// Unknown or full venues are not errors.
    pub async fn scan_entry(&self, venue_id: &VenueId) -> Result<(), StoreError> {
        self.scan(ScanDirection::Entry, venue_id).await
    }

    /// Record one exit at a venue
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the monitor is shutting down.
    /// Unknown or empty venues are not errors.
    pub async fn scan_exit(&self, venue_id: &VenueId) -> Result<(), StoreError> {
        self.scan(ScanDirection::Exit, venue_id).await
    }

    /// Record one scan in the given direction
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the monitor is shutting down.
    pub async fn scan(
        &self,
        direction: ScanDirection,
        venue_id: &VenueId,
    ) -> Result<(), StoreError> {
        self.store.send(direction.action(venue_id.clone())).await
    }

    /// Mark an alert as acknowledged
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the monitor is shutting down.
    /// Unknown or already acknowledged alerts are not errors.
    pub async fn acknowledge_alert(&self, alert_id: &AlertId) -> Result<(), StoreError> {
        self.store
            .send(OccupancyAction::AcknowledgeAlert {
                alert_id: alert_id.clone(),
            })
            .await
    }

    /// Run one simulation step now, outside the periodic schedule
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the monitor is shutting down.
    pub async fn tick(&self) -> Result<(), StoreError> {
        self.store.send(OccupancyAction::Tick).await
    }

    /// Start ticking every `interval`
    ///
    /// The schedule runs until the returned session is dropped or stopped,
    /// or until the monitor shuts down. Must be called inside a tokio runtime.
    #[must_use = "dropping the session stops the ticker immediately"]
    pub fn start(&self, interval: Duration) -> MonitorSession {
        MonitorSession {
            ticker: Ticker::spawn(self.store.clone(), interval, || OccupancyAction::Tick),
        }
    }

    /// Reject further actions and wait for in-flight work to finish
    ///
    /// Any running session stops at its next tick.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if work is still pending after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.store.shutdown(timeout).await
    }
}

impl std::fmt::Debug for FestivalMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FestivalMonitor")
            .field("shutting_down", &self.store.is_shutting_down())
            .finish_non_exhaustive()
    }
}

/// A running tick schedule; dropping it stops the ticks
#[derive(Debug)]
pub struct MonitorSession {
    ticker: Ticker,
}

impl MonitorSession {
    /// Time between ticks
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.ticker.period()
    }

    /// Whether ticks are still being delivered
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.ticker.is_running()
    }

    /// Stop ticking now
    pub fn stop(self) {
        self.ticker.stop();
    }
}

/// Point-in-time copy of the monitor state
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSnapshot {
    /// Venues, in registry order
    pub venues: Vec<Venue>,
    /// Alerts, newest first
    pub alerts: Vec<Alert>,
    /// Sum of all head counts
    pub total_attendees: u64,
    /// Alerts awaiting acknowledgement
    pub unacknowledged_count: usize,
    /// When the copy was taken
    pub taken_at: DateTime<Utc>,
}

impl MonitorSnapshot {
    /// Dashboard figures derived from the venues
    #[must_use]
    pub fn stats(&self) -> DashboardStats {
        DashboardStats::from_venues(&self.venues)
    }
}
