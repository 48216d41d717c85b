//! Festival crowd monitor built on the FestPulse store.
//!
//! Tracks the head count of every venue on the festival grounds, classifies
//! each venue as safe, near capacity or overcrowded, and raises a critical
//! alert the first time a venue becomes overcrowded. It demonstrates:
//!
//! - A total reducer: bad scans and unknown ids are no-ops, never errors
//! - Timer-driven and user-driven mutations serialized by one store
//! - A scoped tick schedule that stops when its session is dropped
//! - Read-only dashboard projections over state snapshots
//!
//! # Quick Start
//!
//! ```no_run
//! use festpulse::{FestivalMonitor, OccupancyEnvironment, VenueId};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let monitor = FestivalMonitor::festival(OccupancyEnvironment::production());
//! let session = monitor.start(Duration::from_secs(5));
//!
//! monitor.scan_entry(&VenueId::new("3")).await?;
//! println!("Attendees: {}", monitor.total_attendees().await);
//! println!("Open alerts: {}", monitor.unacknowledged_count().await);
//!
//! drop(session);
//! monitor.shutdown(Duration::from_secs(5)).await?;
//! # Ok(())
//! # }
//! ```

pub mod alerts;
pub mod config;
pub mod dashboard;
pub mod environment;
pub mod forecast;
pub mod metrics;
pub mod monitor;
pub mod reducer;
pub mod registry;
pub mod scan;
pub mod status;
pub mod types;

// Re-export commonly used types
pub use alerts::AlertFeed;
pub use config::{Config, ConfigError};
pub use dashboard::{DashboardStats, VenueFilter};
pub use monitor::{FestivalMonitor, MonitorSession, MonitorSnapshot};
pub use reducer::{OccupancyEnvironment, OccupancyReducer};
pub use scan::{ScanError, ScanLabel, ScanSession};
pub use status::Tier;
pub use types::{
    Alert, AlertId, AlertKind, OccupancyAction, OccupancyState, ScanDirection, Venue, VenueId,
};
