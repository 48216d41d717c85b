//! The festival's venues and the alerts the dashboard opens with.

use crate::alerts::{ALERT_FEED_CAP, AlertFeed};
use crate::types::{
    Alert, AlertId, AlertKind, Coordinates, OccupancyState, Venue, VenueIcon,
};
use chrono::{DateTime, Duration, Utc};

// (id, name, icon, capacity, current crowd, lat, lng)
const VENUES: [(&str, &str, VenueIcon, u32, u32, f64, f64); 6] = [
    ("1", "Main Stage", VenueIcon::Mic, 5000, 4200, 15.4279, 73.9870),
    ("2", "Dance Arena", VenueIcon::Music, 3000, 1800, 15.4289, 73.9880),
    ("3", "Food Court", VenueIcon::Utensils, 2000, 1950, 15.4269, 73.9860),
    ("4", "Gaming Zone", VenueIcon::Gamepad, 1500, 800, 15.4299, 73.9890),
    ("5", "Art Gallery", VenueIcon::Palette, 1000, 350, 15.4259, 73.9850),
    ("6", "Music Lounge", VenueIcon::Headphones, 1200, 1100, 15.4309, 73.9900),
];

/// The six festival venues, in registry order, all stamped `now`
#[must_use]
pub fn initial_venues(now: DateTime<Utc>) -> Vec<Venue> {
    VENUES
        .iter()
        .map(|&(id, name, icon, capacity, crowd, lat, lng)| {
            Venue::new(id, name, icon, capacity, crowd, Coordinates { lat, lng }, now)
        })
        .collect()
}

/// Alerts already on the board when the monitor opens, newest first
#[must_use]
pub fn initial_alerts(now: DateTime<Utc>) -> Vec<Alert> {
    vec![
        Alert::new(
            AlertId::new("1"),
            AlertKind::Critical,
            "Food Court",
            "Approaching maximum capacity (97%)",
            now - Duration::minutes(2),
        ),
        Alert::new(
            AlertId::new("2"),
            AlertKind::Warning,
            "Music Lounge",
            "Crowd growing rapidly (+80 in 5 mins)",
            now - Duration::minutes(5),
        ),
        Alert::new(
            AlertId::new("3"),
            AlertKind::Info,
            "Main Stage",
            "Performance starting in 15 minutes",
            now - Duration::minutes(10),
        )
        .acknowledged(),
    ]
}

impl OccupancyState {
    /// The seeded festival: registry venues plus the opening alerts
    #[must_use]
    pub fn festival(now: DateTime<Utc>) -> Self {
        Self::festival_with_cap(now, ALERT_FEED_CAP)
    }

    /// Same as [`OccupancyState::festival`] with a custom alert feed size
    #[must_use]
    pub fn festival_with_cap(now: DateTime<Utc>, alert_cap: usize) -> Self {
        Self::new(
            initial_venues(now),
            AlertFeed::seeded(alert_cap, initial_alerts(now)),
        )
    }
}
