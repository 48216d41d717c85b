//! Domain types for the festival crowd monitor.
//!
//! Venues carry a fixed capacity and a live head count; alerts are
//! notifications raised when a venue becomes overcrowded. The
//! [`OccupancyState`] owns both collections and is only ever mutated by the
//! occupancy reducer running inside a store.

use crate::alerts::AlertFeed;
use crate::status::{self, Tier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier of a venue
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VenueId(String);

impl VenueId {
    /// Wrap a registry identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VenueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VenueId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for VenueId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of an alert in the feed
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(String);

impl AlertId {
    /// Wrap an identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AlertId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AlertId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Map position of a venue on the festival grounds
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

/// Pictogram shown next to a venue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueIcon {
    /// Microphone (stages)
    Mic,
    /// Note (dance floors)
    Music,
    /// Cutlery (food)
    Utensils,
    /// Gamepad (gaming)
    Gamepad,
    /// Palette (art)
    Palette,
    /// Headphones (lounges)
    Headphones,
}

/// A physical zone with a fixed capacity and a live head count
///
/// Every mutator keeps `0 <= current_crowd <= capacity`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    id: VenueId,
    name: String,
    icon: VenueIcon,
    capacity: u32,
    current_crowd: u32,
    location: Coordinates,
    last_updated: DateTime<Utc>,
}

impl Venue {
    /// Create a venue; a head count above capacity is clamped to capacity
    #[must_use]
    pub fn new(
        id: impl Into<VenueId>,
        name: impl Into<String>,
        icon: VenueIcon,
        capacity: u32,
        current_crowd: u32,
        location: Coordinates,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon,
            capacity,
            current_crowd: current_crowd.min(capacity),
            location,
            last_updated,
        }
    }

    /// Registry identifier
    #[must_use]
    pub const fn id(&self) -> &VenueId {
        &self.id
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pictogram
    #[must_use]
    pub const fn icon(&self) -> VenueIcon {
        self.icon
    }

    /// Maximum head count
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Current head count
    #[must_use]
    pub const fn current_crowd(&self) -> u32 {
        self.current_crowd
    }

    /// Map position
    #[must_use]
    pub const fn location(&self) -> Coordinates {
        self.location
    }

    /// Time of the most recent mutation
    #[must_use]
    pub const fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Head count as a fraction of capacity (1.0 when capacity is zero)
    #[must_use]
    pub fn occupancy_ratio(&self) -> f64 {
        if self.capacity == 0 {
            return 1.0;
        }
        f64::from(self.current_crowd) / f64::from(self.capacity)
    }

    /// Head count as a percentage of capacity
    #[must_use]
    pub fn occupancy_percent(&self) -> f64 {
        self.occupancy_ratio() * 100.0
    }

    /// Occupancy percentage rounded to the nearest whole number
    #[must_use]
    pub fn rounded_percent(&self) -> u32 {
        status::rounded_percent(self.current_crowd, self.capacity)
    }

    /// Safety tier of the current head count
    #[must_use]
    pub fn tier(&self) -> Tier {
        status::classify(self.current_crowd, self.capacity)
    }

    /// Whether no one else can be admitted
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.current_crowd >= self.capacity
    }

    /// Let one person in. Returns `false` (and changes nothing) when full.
    pub fn admit(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_full() {
            return false;
        }
        self.current_crowd += 1;
        self.last_updated = now;
        true
    }

    /// Let one person out. Returns `false` (and changes nothing) when empty.
    pub fn release(&mut self, now: DateTime<Utc>) -> bool {
        if self.current_crowd == 0 {
            return false;
        }
        self.current_crowd -= 1;
        self.last_updated = now;
        true
    }

    /// Move the head count by `delta`, clamped into `[0, capacity]`
    pub fn shift(&mut self, delta: i32, now: DateTime<Utc>) {
        let shifted = i64::from(self.current_crowd) + i64::from(delta);
        let clamped = shifted.clamp(0, i64::from(self.capacity));
        // Clamped into [0, capacity], so it fits in u32
        self.current_crowd = u32::try_from(clamped).unwrap_or(self.capacity);
        self.last_updated = now;
    }
}

/// Severity of an alert
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// A venue reached critical occupancy
    Critical,
    /// Something worth watching
    Warning,
    /// Informational notice
    Info,
}

/// A notification tied to a venue
///
/// `venue_name` is a copy taken when the alert is raised, not a live
/// reference to the venue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Unique identifier
    pub id: AlertId,
    /// Severity
    pub kind: AlertKind,
    /// Name of the venue at the time the alert was raised
    pub venue_name: String,
    /// Human-readable description
    pub message: String,
    /// When the alert was raised
    pub timestamp: DateTime<Utc>,
    /// Whether an operator has acknowledged it
    pub acknowledged: bool,
}

impl Alert {
    /// A fresh, unacknowledged alert
    #[must_use]
    pub fn new(
        id: AlertId,
        kind: AlertKind,
        venue_name: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind,
            venue_name: venue_name.into(),
            message: message.into(),
            timestamp,
            acknowledged: false,
        }
    }

    /// Same alert, already acknowledged
    #[must_use]
    pub fn acknowledged(mut self) -> Self {
        self.acknowledged = true;
        self
    }

    /// Whether this is an open critical alert for `venue_name`
    #[must_use]
    pub fn is_open_critical_for(&self, venue_name: &str) -> bool {
        self.kind == AlertKind::Critical && !self.acknowledged && self.venue_name == venue_name
    }
}

/// State owned by the occupancy store
///
/// Venues keep the order of the registry they were built from. The alert
/// feed is newest first.
#[derive(Clone, Debug, Default)]
pub struct OccupancyState {
    venues: Vec<Venue>,
    alerts: AlertFeed,
}

impl OccupancyState {
    /// Build state from venues and an existing feed
    #[must_use]
    pub const fn new(venues: Vec<Venue>, alerts: AlertFeed) -> Self {
        Self { venues, alerts }
    }

    /// Venues with an empty alert feed of default size
    #[must_use]
    pub fn with_venues(venues: Vec<Venue>) -> Self {
        Self::new(venues, AlertFeed::default())
    }

    /// All venues, in registry order
    #[must_use]
    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    /// Look a venue up by id
    #[must_use]
    pub fn venue(&self, id: &VenueId) -> Option<&Venue> {
        self.venues.iter().find(|v| &v.id == id)
    }

    pub(crate) fn venue_mut(&mut self, id: &VenueId) -> Option<&mut Venue> {
        self.venues.iter_mut().find(|v| &v.id == id)
    }

    pub(crate) fn venues_mut(&mut self) -> impl Iterator<Item = &mut Venue> {
        self.venues.iter_mut()
    }

    /// The alert feed
    #[must_use]
    pub const fn alerts(&self) -> &AlertFeed {
        &self.alerts
    }

    pub(crate) fn alerts_mut(&mut self) -> &mut AlertFeed {
        &mut self.alerts
    }

    /// Sum of all venue head counts
    #[must_use]
    pub fn total_attendees(&self) -> u64 {
        self.venues.iter().map(|v| u64::from(v.current_crowd)).sum()
    }

    /// Number of alerts not yet acknowledged
    #[must_use]
    pub fn unacknowledged_count(&self) -> usize {
        self.alerts.unacknowledged_count()
    }
}

/// Every input the occupancy store reacts to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OccupancyAction {
    /// One person entered through a venue's turnstile
    ScanEntry {
        /// Venue scanned at
        venue_id: VenueId,
    },
    /// One person left through a venue's turnstile
    ScanExit {
        /// Venue scanned at
        venue_id: VenueId,
    },
    /// An operator acknowledged an alert
    AcknowledgeAlert {
        /// Alert to acknowledge
        alert_id: AlertId,
    },
    /// Periodic random crowd movement across all venues
    Tick,
    /// Re-run the alert rule without changing any head count
    EvaluateAlerts,
}

/// Direction of a turnstile scan
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanDirection {
    /// Entering the venue
    Entry,
    /// Leaving the venue
    Exit,
}

impl ScanDirection {
    /// The store action for a scan in this direction
    #[must_use]
    pub fn action(self, venue_id: VenueId) -> OccupancyAction {
        match self {
            Self::Entry => OccupancyAction::ScanEntry { venue_id },
            Self::Exit => OccupancyAction::ScanExit { venue_id },
        }
    }

    /// Lowercase name, used for log fields and metric labels
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Exit => "exit",
        }
    }
}

impl std::fmt::Display for ScanDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
