//! Reducer logic for venue occupancy and alerts.
//!
//! Every input is total: unknown venues, full venues, empty venues and
//! unknown alerts are absorbed as no-ops and logged at `debug`. A scan or a
//! tick is followed by alert evaluation inside the same `reduce` call, so the
//! store applies the mutation and its alerts as one atomic step.

use crate::alerts::critical_message;
use crate::environment::{RandomFluctuation, UuidAlertIds};
use crate::status::Tier;
use crate::types::{
    Alert, AlertId, AlertKind, OccupancyAction, OccupancyState, ScanDirection, VenueId,
};
use festpulse_core::environment::{Clock, CrowdFluctuation, IdGenerator, SystemClock};
use festpulse_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use crate::metrics::{FESTIVAL_ALERTS_RAISED, FESTIVAL_ATTENDEES_TOTAL, FESTIVAL_SCANS_TOTAL};
use std::sync::Arc;

/// Environment dependencies for the occupancy reducer
#[derive(Clone)]
pub struct OccupancyEnvironment {
    /// Timestamps for venue updates and alerts
    pub clock: Arc<dyn Clock>,
    /// Alert identifiers
    pub ids: Arc<dyn IdGenerator>,
    /// Per-venue movement applied on each tick
    pub fluctuation: Arc<dyn CrowdFluctuation>,
}

impl OccupancyEnvironment {
    /// Creates a new `OccupancyEnvironment`
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        fluctuation: Arc<dyn CrowdFluctuation>,
    ) -> Self {
        Self {
            clock,
            ids,
            fluctuation,
        }
    }

    /// Wall clock, UUID alert ids and uniform ±10 crowd movement
    #[must_use]
    pub fn production() -> Self {
        Self::with_tick_delta(10)
    }

    /// Like [`OccupancyEnvironment::production`] with a custom movement bound
    #[must_use]
    pub fn with_tick_delta(max_delta: i32) -> Self {
        Self::new(
            Arc::new(SystemClock),
            Arc::new(UuidAlertIds),
            Arc::new(RandomFluctuation::new(max_delta)),
        )
    }
}

impl std::fmt::Debug for OccupancyEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OccupancyEnvironment").finish_non_exhaustive()
    }
}

/// Why an action left state unchanged
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoOpReason {
    /// The venue id is not in the registry
    UnknownVenue,
    /// Entry attempted at full capacity
    CapacitySaturated,
    /// Exit attempted with nobody inside
    AlreadyEmpty,
    /// The alert id is not in the feed
    UnknownAlert,
    /// The alert was acknowledged before
    AlreadyAcknowledged,
}

impl NoOpReason {
    /// Lowercase name, used for log fields and metric labels
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownVenue => "unknown_venue",
            Self::CapacitySaturated => "capacity_saturated",
            Self::AlreadyEmpty => "already_empty",
            Self::UnknownAlert => "unknown_alert",
            Self::AlreadyAcknowledged => "already_acknowledged",
        }
    }
}

impl std::fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reducer for venue occupancy and the alert feed
#[derive(Clone, Copy, Debug, Default)]
pub struct OccupancyReducer;

impl OccupancyReducer {
    /// Creates a new `OccupancyReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Move one person through a venue's turnstile
    fn scan(
        state: &mut OccupancyState,
        direction: ScanDirection,
        venue_id: &VenueId,
        env: &OccupancyEnvironment,
    ) -> Result<(), NoOpReason> {
        let venue = state.venue_mut(venue_id).ok_or(NoOpReason::UnknownVenue)?;
        let now = env.clock.now();
        let (applied, refusal) = match direction {
            ScanDirection::Entry => (venue.admit(now), NoOpReason::CapacitySaturated),
            ScanDirection::Exit => (venue.release(now), NoOpReason::AlreadyEmpty),
        };
        if applied { Ok(()) } else { Err(refusal) }
    }

    fn acknowledge(state: &mut OccupancyState, alert_id: &AlertId) -> Result<(), NoOpReason> {
        match state.alerts_mut().acknowledge(alert_id) {
            Some(true) => Ok(()),
            Some(false) => Err(NoOpReason::AlreadyAcknowledged),
            None => Err(NoOpReason::UnknownAlert),
        }
    }

    /// Shift every venue by a fresh delta, clamped to its bounds
    fn tick(state: &mut OccupancyState, env: &OccupancyEnvironment) {
        let now = env.clock.now();
        for venue in state.venues_mut() {
            venue.shift(env.fluctuation.delta(), now);
        }
    }

    /// Raise a critical alert for every critical venue without an open one
    ///
    /// Returns the number of alerts raised.
    pub fn evaluate_alerts(state: &mut OccupancyState, env: &OccupancyEnvironment) -> usize {
        let critical: Vec<(String, u32)> = state
            .venues()
            .iter()
            .filter(|venue| venue.tier() == Tier::Critical)
            .map(|venue| (venue.name().to_string(), venue.rounded_percent()))
            .collect();

        let mut raised = 0;
        for (venue_name, percent) in critical {
            if state.alerts().has_open_critical(&venue_name) {
                continue;
            }

            let alert = Alert::new(
                AlertId::new(env.ids.next_id()),
                AlertKind::Critical,
                venue_name,
                critical_message(percent),
                env.clock.now(),
            );
            tracing::warn!(
                alert_id = %alert.id,
                venue = %alert.venue_name,
                percent,
                "Critical capacity alert raised"
            );
            state.alerts_mut().push(alert);
            raised += 1;
        }

        if raised > 0 {
            metrics::counter!(FESTIVAL_ALERTS_RAISED).increment(raised as u64);
        }
        raised
    }
}

impl Reducer for OccupancyReducer {
    type State = OccupancyState;
    type Action = OccupancyAction;
    type Environment = OccupancyEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            OccupancyAction::ScanEntry { venue_id } => {
                let result = Self::scan(state, ScanDirection::Entry, &venue_id, env);
                record_scan(ScanDirection::Entry, &venue_id, result);
                Self::evaluate_alerts(state, env);
            },
            OccupancyAction::ScanExit { venue_id } => {
                let result = Self::scan(state, ScanDirection::Exit, &venue_id, env);
                record_scan(ScanDirection::Exit, &venue_id, result);
                Self::evaluate_alerts(state, env);
            },
            OccupancyAction::Tick => {
                Self::tick(state, env);
                tracing::trace!(total = state.total_attendees(), "Tick applied");
                Self::evaluate_alerts(state, env);
            },
            OccupancyAction::EvaluateAlerts => {
                Self::evaluate_alerts(state, env);
            },
            // Acknowledging never touches venues, so there is nothing to re-evaluate
            OccupancyAction::AcknowledgeAlert { alert_id } => {
                match Self::acknowledge(state, &alert_id) {
                    Ok(()) => tracing::info!(%alert_id, "Alert acknowledged"),
                    Err(reason) => tracing::debug!(%alert_id, %reason, "Acknowledge ignored"),
                }
            },
        }

        #[allow(clippy::cast_precision_loss)] // Head counts are far below 2^52
        let total = state.total_attendees() as f64;
        metrics::gauge!(FESTIVAL_ATTENDEES_TOTAL).set(total);

        smallvec![Effect::None]
    }
}

fn record_scan(direction: ScanDirection, venue_id: &VenueId, result: Result<(), NoOpReason>) {
    let outcome = match result {
        Ok(()) => {
            tracing::debug!(%venue_id, %direction, "Scan applied");
            "applied"
        },
        Err(reason) => {
            tracing::debug!(%venue_id, %direction, %reason, "Scan ignored");
            reason.as_str()
        },
    };
    metrics::counter!(
        FESTIVAL_SCANS_TOTAL,
        "direction" => direction.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}
