//! Placeholder crowd forecast for the analytics view.
//!
//! The curve is a sine wave plus uniform noise. It has no predictive value
//! and only exists so the analytics chart has a series to draw.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;

/// Hours of history before `now` (inclusive of `now` itself: 13 points)
pub const HISTORY_HOURS: u32 = 12;

/// Hours projected past `now`
pub const FUTURE_HOURS: u32 = 4;

/// One hourly point on the forecast chart
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    /// The hour this point describes
    pub timestamp: DateTime<Utc>,
    /// Axis label, `HH:MM`
    pub hour_label: String,
    /// Observed head count; `None` for future hours
    pub actual: Option<u32>,
    /// Forecast head count
    pub predicted: u32,
}

/// Build the 17-point chart series around `now`, oldest first
pub fn crowd_forecast<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Vec<ForecastPoint> {
    let mut points: Vec<_> = (0..=HISTORY_HOURS)
        .rev()
        .map(|i| {
            let base = 2000.0 + wave(i) * 1500.0;
            let actual = noisy(base, 500.0, &mut *rng);
            let predicted = noisy(base, 300.0, &mut *rng);
            point(now - Duration::hours(i64::from(i)), Some(actual), predicted)
        })
        .collect();

    points.extend((1..=FUTURE_HOURS).map(|i| {
        let base = 3000.0 + wave(HISTORY_HOURS + i) * 1500.0;
        point(now + Duration::hours(i64::from(i)), None, noisy(base, 400.0, &mut *rng))
    }));
    points
}

fn wave(i: u32) -> f64 {
    (f64::from(i) / 3.0).sin()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn noisy<R: Rng + ?Sized>(base: f64, spread: f64, rng: &mut R) -> u32 {
    // base is at least 500, so the rounded value is positive
    (base + rng.gen_range(0.0..spread)).round() as u32
}

fn point(timestamp: DateTime<Utc>, actual: Option<u32>, predicted: u32) -> ForecastPoint {
    ForecastPoint {
        hour_label: timestamp.format("%H:%M").to_string(),
        timestamp,
        actual,
        predicted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::rngs::mock::StepRng;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_771_092_000, 0).unwrap_or_default()
    }

    #[test]
    fn thirteen_observed_then_four_projected() {
        let points = crowd_forecast(now(), &mut StdRng::seed_from_u64(7));
        assert_eq!(points.len(), 17);
        assert!(points[..13].iter().all(|p| p.actual.is_some()));
        assert!(points[13..].iter().all(|p| p.actual.is_none()));
        assert!(points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(points[12].timestamp, now());
    }

    #[test]
    fn labels_are_hours() {
        let points = crowd_forecast(now(), &mut StdRng::seed_from_u64(7));
        assert_eq!(points[0].hour_label, "06:00");
        assert_eq!(points[12].hour_label, "18:00");
        assert_eq!(points[16].hour_label, "22:00");
    }

    #[test]
    fn zero_noise_follows_the_wave() {
        let points = crowd_forecast(now(), &mut StepRng::new(0, 0));
        // i = 0: base 2000
        assert_eq!(points[12].actual, Some(2000));
        assert_eq!(points[12].predicted, 2000);
        // i = 3 hours ago: 2000 + sin(1) * 1500
        assert_eq!(points[9].predicted, 3262);
        // 1 hour ahead: 3000 + sin(13 / 3) * 1500
        assert_eq!(points[13].predicted, 1606);
    }

    #[test]
    fn noise_stays_within_its_spread() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let points = crowd_forecast(now(), &mut rng);
            for (i, p) in (0..=HISTORY_HOURS).rev().zip(&points) {
                let base = 2000.0 + wave(i) * 1500.0;
                let actual = f64::from(p.actual.unwrap_or_default());
                let predicted = f64::from(p.predicted);
                assert!(actual >= base.round() && actual <= (base + 500.0).round());
                assert!(predicted >= base.round() && predicted <= (base + 300.0).round());
            }
        }
    }
}
