//! Scanner station: payload labels and the per-operator scan session.
//!
//! A scanned payload only ever produces a cosmetic label for the "last
//! scanned" indicator. The store receives nothing but a venue id and a
//! direction.

use crate::monitor::FestivalMonitor;
use crate::types::{OccupancyAction, ScanDirection, VenueId};
use chrono::{DateTime, Utc};
use festpulse_runtime::StoreError;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Label shown when a scan carried no payload
pub const MANUAL_SCAN_LABEL: &str = "Manual Scan";

/// Errors a scanner station reports to its operator
#[derive(Error, Debug)]
pub enum ScanError {
    /// No venue picked before scanning
    #[error("Select a venue before scanning")]
    NoVenueSelected,

    /// The monitor no longer accepts scans
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Display label extracted from a scanned payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScanLabel(String);

impl ScanLabel {
    /// Extract a label from raw scanner output
    ///
    /// JSON objects are searched for a `name`, then a `sid`; anything else
    /// is shown verbatim. Empty payloads yield `None`.
    ///
    /// ```
    /// use festpulse::scan::ScanLabel;
    ///
    /// let label = ScanLabel::from_payload(r#"{"name":"Asha","sid":"T-1"}"#);
    /// assert_eq!(label.as_ref().map(ScanLabel::as_str), Some("Asha"));
    ///
    /// let label = ScanLabel::from_payload("TICKET-0042");
    /// assert_eq!(label.as_ref().map(ScanLabel::as_str), Some("TICKET-0042"));
    /// ```
    #[must_use]
    pub fn from_payload(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        let label = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(fields)) => ["name", "sid"]
                .iter()
                .find_map(|key| fields.get(*key).and_then(field_label))
                .unwrap_or_else(|| raw.to_string()),
            _ => raw.to_string(),
        };
        Some(Self(label))
    }

    /// The label text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScanLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// Empty strings, zero and non-scalar values don't count as a label
fn field_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(f64::is_normal) => Some(n.to_string()),
        _ => None,
    }
}

/// One completed scan
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    /// Entry or exit
    pub direction: ScanDirection,
    /// Venue scanned at
    pub venue_id: VenueId,
    /// Label from the payload, if any
    pub label: Option<ScanLabel>,
    /// When the scan happened
    pub scanned_at: DateTime<Utc>,
}

impl ScanRecord {
    /// Text for the "last scanned" indicator
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label.as_ref().map_or(MANUAL_SCAN_LABEL, ScanLabel::as_str)
    }

    /// The store action this scan stands for
    #[must_use]
    pub fn action(&self) -> OccupancyAction {
        self.direction.action(self.venue_id.clone())
    }
}

/// State of one scanner station
#[derive(Clone, Debug)]
pub struct ScanSession {
    selected: Option<VenueId>,
    direction: ScanDirection,
    scan_count: u64,
    last: Option<ScanRecord>,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSession {
    /// A fresh station: no venue selected, scanning entries
    #[must_use]
    pub const fn new() -> Self {
        Self {
            selected: None,
            direction: ScanDirection::Entry,
            scan_count: 0,
            last: None,
        }
    }

    /// Pick the venue subsequent scans apply to
    pub fn select_venue(&mut self, venue_id: VenueId) {
        self.selected = Some(venue_id);
    }

    /// Forget the selected venue
    pub fn clear_venue(&mut self) {
        self.selected = None;
    }

    /// Venue scans currently apply to
    #[must_use]
    pub const fn selected_venue(&self) -> Option<&VenueId> {
        self.selected.as_ref()
    }

    /// Switch between entry and exit scanning
    pub fn set_direction(&mut self, direction: ScanDirection) {
        self.direction = direction;
    }

    /// Current scan direction
    #[must_use]
    pub const fn direction(&self) -> ScanDirection {
        self.direction
    }

    /// Scans completed at this station
    #[must_use]
    pub const fn scan_count(&self) -> u64 {
        self.scan_count
    }

    /// The most recent scan
    #[must_use]
    pub const fn last_scan(&self) -> Option<&ScanRecord> {
        self.last.as_ref()
    }

    /// Text for the "last scanned" indicator
    #[must_use]
    pub fn last_label(&self) -> &str {
        self.last.as_ref().map_or(MANUAL_SCAN_LABEL, ScanRecord::display_label)
    }

    /// Record a scan at the selected venue
    ///
    /// The returned record's [`ScanRecord::action`] is what the store
    /// should receive.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NoVenueSelected`] when no venue is selected;
    /// the session is left unchanged.
    pub fn record(
        &mut self,
        payload: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ScanRecord, ScanError> {
        let venue_id = self.selected.clone().ok_or(ScanError::NoVenueSelected)?;
        let record = ScanRecord {
            direction: self.direction,
            venue_id,
            label: payload.and_then(ScanLabel::from_payload),
            scanned_at: now,
        };
        tracing::debug!(
            venue_id = %record.venue_id,
            direction = %record.direction,
            label = record.display_label(),
            "Scan recorded"
        );

        self.scan_count += 1;
        self.last = Some(record.clone());
        Ok(record)
    }

    /// Record a scan and apply it to `monitor`
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NoVenueSelected`] without a selected venue, or
    /// [`ScanError::Store`] once the monitor is shutting down.
    pub async fn submit(
        &mut self,
        monitor: &FestivalMonitor,
        payload: Option<&str>,
    ) -> Result<ScanRecord, ScanError> {
        let now = monitor.store().environment().clock.now();
        let record = self.record(payload, now)?;
        monitor.store().send(record.action()).await?;
        Ok(record)
    }
}
