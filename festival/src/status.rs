//! Occupancy status classification.
//!
//! Pure functions only; nothing here touches a store. Thresholds are
//! inclusive lower bounds: exactly 70% is already `Warning` and exactly 90%
//! is already `Critical`. Comparisons are done in integer arithmetic so the
//! boundaries are exact.

use serde::{Deserialize, Serialize};

/// Occupancy percentage at which a venue becomes `Warning`
pub const WARNING_THRESHOLD_PERCENT: u32 = 70;

/// Occupancy percentage at which a venue becomes `Critical`
pub const CRITICAL_THRESHOLD_PERCENT: u32 = 90;

/// Safety tier derived from a venue's occupancy ratio
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Below 70%
    Safe,
    /// 70% up to (not including) 90%
    Warning,
    /// 90% and above
    Critical,
}

impl Tier {
    /// Label shown to operators and attendees
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::Warning => "Near Capacity",
            Self::Critical => "Overcrowded",
        }
    }

    /// Lowercase name, used for log fields and metric labels
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a head count against a capacity
///
/// A zero-capacity venue is always `Critical`.
///
/// ```
/// use festpulse::status::{classify, Tier};
///
/// assert_eq!(classify(69, 100), Tier::Safe);
/// assert_eq!(classify(70, 100), Tier::Warning);
/// assert_eq!(classify(89, 100), Tier::Warning);
/// assert_eq!(classify(90, 100), Tier::Critical);
/// ```
#[must_use]
pub fn classify(current_crowd: u32, capacity: u32) -> Tier {
    if at_least_percent(current_crowd, capacity, CRITICAL_THRESHOLD_PERCENT) {
        Tier::Critical
    } else if at_least_percent(current_crowd, capacity, WARNING_THRESHOLD_PERCENT) {
        Tier::Warning
    } else {
        Tier::Safe
    }
}

/// Occupancy percentage rounded half up, as shown in alert messages
///
/// A zero-capacity venue reads as 100%.
#[must_use]
pub fn rounded_percent(current_crowd: u32, capacity: u32) -> u32 {
    if capacity == 0 {
        return 100;
    }
    let numerator = u64::from(current_crowd) * 200 + u64::from(capacity);
    let rounded = numerator / (u64::from(capacity) * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

// current / capacity >= percent / 100, without division
fn at_least_percent(current_crowd: u32, capacity: u32, percent: u32) -> bool {
    u64::from(current_crowd) * 100 >= u64::from(capacity) * u64::from(percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_belong_to_the_higher_tier() {
        assert_eq!(classify(90, 100), Tier::Critical);
        assert_eq!(classify(89, 100), Tier::Warning);
        assert_eq!(classify(70, 100), Tier::Warning);
        assert_eq!(classify(69, 100), Tier::Safe);
    }

    #[test]
    fn boundaries_hold_for_awkward_capacities() {
        // 0.7 and 0.9 are not exact in binary floating point
        assert_eq!(classify(2100, 3000), Tier::Warning);
        assert_eq!(classify(2099, 3000), Tier::Safe);
        assert_eq!(classify(2700, 3000), Tier::Critical);
        assert_eq!(classify(2699, 3000), Tier::Warning);
        assert_eq!(classify(63, 70), Tier::Critical);
        assert_eq!(classify(62, 70), Tier::Warning);
    }

    #[test]
    fn extremes() {
        assert_eq!(classify(0, 100), Tier::Safe);
        assert_eq!(classify(100, 100), Tier::Critical);
        assert_eq!(classify(0, 0), Tier::Critical);
        assert_eq!(classify(u32::MAX, u32::MAX), Tier::Critical);
    }

    #[test]
    fn seeded_venues_classify_as_on_the_dashboard() {
        assert_eq!(classify(4200, 5000), Tier::Warning); // Main Stage, 84%
        assert_eq!(classify(1800, 3000), Tier::Safe); // Dance Arena, 60%
        assert_eq!(classify(1950, 2000), Tier::Critical); // Food Court, 97.5%
        assert_eq!(classify(1100, 1200), Tier::Critical); // Music Lounge, 91.7%
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(rounded_percent(1950, 2000), 98);
        assert_eq!(rounded_percent(1, 200), 1); // 0.5%
        assert_eq!(rounded_percent(1, 300), 0); // 0.33%
        assert_eq!(rounded_percent(1100, 1200), 92);
        assert_eq!(rounded_percent(0, 0), 100);
    }

    #[test]
    fn labels() {
        assert_eq!(Tier::Safe.label(), "Safe");
        assert_eq!(Tier::Warning.label(), "Near Capacity");
        assert_eq!(Tier::Critical.label(), "Overcrowded");
    }

    #[test]
    fn tiers_order_by_severity() {
        assert!(Tier::Safe < Tier::Warning);
        assert!(Tier::Warning < Tier::Critical);
    }
}
