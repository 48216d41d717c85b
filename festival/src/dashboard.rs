//! Read-only projections computed from venue snapshots.
//!
//! Nothing in here mutates state; views call these on the output of
//! [`crate::FestivalMonitor::venues`] or [`crate::MonitorSnapshot`].

use crate::status::{Tier, WARNING_THRESHOLD_PERCENT};
use crate::types::Venue;
use serde::Serialize;

/// Headline figures for the dashboard
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Sum of all head counts
    pub total_attendees: u64,
    /// Largest single head count (0 without venues)
    pub peak_crowd: u32,
    /// Mean of the per-venue occupancy percentages, rounded (0 without venues)
    pub average_occupancy: u32,
    /// Venues currently in the critical tier
    pub critical_venues: usize,
}

impl DashboardStats {
    /// Compute the figures for `venues`
    #[must_use]
    pub fn from_venues(venues: &[Venue]) -> Self {
        Self {
            total_attendees: venues.iter().map(|v| u64::from(v.current_crowd())).sum(),
            peak_crowd: venues.iter().map(Venue::current_crowd).max().unwrap_or(0),
            average_occupancy: average_occupancy(venues),
            critical_venues: venues.iter().filter(|v| v.tier() == Tier::Critical).count(),
        }
    }

    /// Whether the average is in the warning range or above
    #[must_use]
    pub const fn occupancy_is_high(&self) -> bool {
        self.average_occupancy >= WARNING_THRESHOLD_PERCENT
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn average_occupancy(venues: &[Venue]) -> u32 {
    if venues.is_empty() {
        return 0;
    }
    let sum: f64 = venues.iter().map(Venue::occupancy_percent).sum();
    // Each percentage is within [0, 100], so the rounded mean fits
    (sum / venues.len() as f64).round() as u32
}

/// Which venues the attendee directory lists
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueFilter {
    /// Every venue matching the query
    #[default]
    All,
    /// Only venues in the safe tier
    Recommended,
}

/// Venues whose name contains `query` (case-insensitive), least crowded first
///
/// Venues with equal occupancy keep their registry order.
#[must_use]
pub fn browse<'a>(venues: &'a [Venue], query: &str, filter: VenueFilter) -> Vec<&'a Venue> {
    let needle = query.to_lowercase();
    let mut matches: Vec<&Venue> = venues
        .iter()
        .filter(|v| v.name().to_lowercase().contains(&needle))
        .filter(|v| filter == VenueFilter::All || v.tier() == Tier::Safe)
        .collect();
    matches.sort_by(|a, b| a.occupancy_ratio().total_cmp(&b.occupancy_ratio()));
    matches
}

/// The least occupied venue; the earliest one wins a tie
#[must_use]
pub fn recommended_venue(venues: &[Venue]) -> Option<&Venue> {
    venues
        .iter()
        .min_by(|a, b| a.occupancy_ratio().total_cmp(&b.occupancy_ratio()))
}
