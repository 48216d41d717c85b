//! The alert feed and its retention policy.
//!
//! The feed is newest first and bounded. Pushing past the cap evicts the
//! oldest entries regardless of whether they were acknowledged. At most one
//! unacknowledged critical alert may exist per venue name; the reducer
//! checks [`AlertFeed::has_open_critical`] before raising another.

use crate::types::{Alert, AlertId};
use std::collections::VecDeque;

/// Default number of alerts kept
pub const ALERT_FEED_CAP: usize = 10;

/// Message for a critical alert at `percent` occupancy
#[must_use]
pub fn critical_message(percent: u32) -> String {
    format!("Critical: {percent}% capacity reached!")
}

/// Bounded, newest-first list of alerts
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertFeed {
    entries: VecDeque<Alert>,
    cap: usize,
}

impl AlertFeed {
    /// Empty feed holding at most `cap` alerts (at least one)
    #[must_use]
    pub fn with_cap(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            entries: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Feed pre-filled with `alerts`, given newest first
    ///
    /// Entries beyond the cap are dropped from the old end.
    #[must_use]
    pub fn seeded(cap: usize, alerts: impl IntoIterator<Item = Alert>) -> Self {
        let mut feed = Self::with_cap(cap);
        feed.entries.extend(alerts);
        feed.entries.truncate(feed.cap);
        feed
    }

    /// Maximum number of alerts kept
    #[must_use]
    pub const fn cap(&self) -> usize {
        self.cap
    }

    /// Add an alert as the newest entry, evicting the oldest past the cap
    pub fn push(&mut self, alert: Alert) {
        self.entries.push_front(alert);
        self.entries.truncate(self.cap);
    }

    /// Whether an unacknowledged critical alert already exists for `venue_name`
    #[must_use]
    pub fn has_open_critical(&self, venue_name: &str) -> bool {
        self.entries.iter().any(|a| a.is_open_critical_for(venue_name))
    }

    /// Mark the alert with `id` as acknowledged
    ///
    /// Returns `None` if no such alert is in the feed, otherwise whether the
    /// call changed anything (`false` when it was already acknowledged).
    pub fn acknowledge(&mut self, id: &AlertId) -> Option<bool> {
        let alert = self.entries.iter_mut().find(|a| &a.id == id)?;
        let changed = !alert.acknowledged;
        alert.acknowledged = true;
        Some(changed)
    }

    /// Look an alert up by id
    #[must_use]
    pub fn get(&self, id: &AlertId) -> Option<&Alert> {
        self.entries.iter().find(|a| &a.id == id)
    }

    /// Number of alerts not yet acknowledged
    #[must_use]
    pub fn unacknowledged_count(&self) -> usize {
        self.entries.iter().filter(|a| !a.acknowledged).count()
    }

    /// Alerts, newest first
    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.entries.iter()
    }

    /// Number of alerts in the feed
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the feed is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the feed, newest first
    #[must_use]
    pub fn to_vec(&self) -> Vec<Alert> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for AlertFeed {
    fn default() -> Self {
        Self::with_cap(ALERT_FEED_CAP)
    }
}

impl<'a> IntoIterator for &'a AlertFeed {
    type Item = &'a Alert;
    type IntoIter = std::collections::vec_deque::Iter<'a, Alert>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AlertKind;
    use chrono::{DateTime, Utc};

    fn alert(id: &str, kind: AlertKind, venue: &str) -> Alert {
        Alert::new(
            AlertId::new(id),
            kind,
            venue,
            "test",
            DateTime::<Utc>::default(),
        )
    }

    #[test]
    fn fifteen_pushes_keep_the_ten_newest_in_reverse_order() {
        let mut feed = AlertFeed::default();
        for i in 1..=15 {
            feed.push(alert(&i.to_string(), AlertKind::Info, "Main Stage"));
        }

        let ids: Vec<_> = feed.iter().map(|a| a.id.as_str().to_string()).collect();
        let expected: Vec<_> = (6..=15).rev().map(|i| i.to_string()).collect();
        assert_eq!(feed.len(), 10);
        assert_eq!(ids, expected);
    }

    #[test]
    fn eviction_ignores_acknowledgement() {
        let mut feed = AlertFeed::with_cap(2);
        feed.push(alert("old-open", AlertKind::Critical, "Food Court"));
        feed.push(alert("acked", AlertKind::Critical, "Main Stage").acknowledged());
        feed.push(alert("new", AlertKind::Critical, "Dance Arena"));

        assert!(feed.get(&AlertId::new("old-open")).is_none());
        assert!(feed.get(&AlertId::new("acked")).is_some());
        assert_eq!(feed.len(), 2);
    }

    #[test]
    fn open_critical_requires_unacknowledged_critical_for_that_venue() {
        let mut feed = AlertFeed::default();
        feed.push(alert("w", AlertKind::Warning, "Food Court"));
        assert!(!feed.has_open_critical("Food Court"));

        feed.push(alert("c", AlertKind::Critical, "Food Court"));
        assert!(feed.has_open_critical("Food Court"));
        assert!(!feed.has_open_critical("Main Stage"));

        assert_eq!(feed.acknowledge(&AlertId::new("c")), Some(true));
        assert!(!feed.has_open_critical("Food Court"));
    }

    #[test]
    fn acknowledge_is_idempotent() {
        let mut feed = AlertFeed::default();
        feed.push(alert("a", AlertKind::Critical, "Food Court"));

        assert_eq!(feed.acknowledge(&AlertId::new("a")), Some(true));
        let after_first = feed.clone();
        assert_eq!(feed.acknowledge(&AlertId::new("a")), Some(false));
        assert_eq!(feed, after_first);
        assert_eq!(feed.unacknowledged_count(), 0);
    }

    #[test]
    fn acknowledging_unknown_alert_changes_nothing() {
        let mut feed = AlertFeed::default();
        feed.push(alert("a", AlertKind::Critical, "Food Court"));
        let before = feed.clone();

        assert_eq!(feed.acknowledge(&AlertId::new("missing")), None);
        assert_eq!(feed, before);
    }

    #[test]
    fn seeded_feed_is_truncated_to_cap() {
        let feed = AlertFeed::seeded(
            2,
            ["a", "b", "c"].map(|id| alert(id, AlertKind::Info, "Main Stage")),
        );
        let ids: Vec<_> = feed.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn zero_cap_is_raised_to_one() {
        let mut feed = AlertFeed::with_cap(0);
        feed.push(alert("a", AlertKind::Info, "Main Stage"));
        feed.push(alert("b", AlertKind::Info, "Main Stage"));
        assert_eq!(feed.cap(), 1);
        assert_eq!(feed.to_vec()[0].id.as_str(), "b");
    }

    #[test]
    fn critical_message_format() {
        assert_eq!(critical_message(98), "Critical: 98% capacity reached!");
    }
}
