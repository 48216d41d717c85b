//! Headless festival monitor.
//!
//! Runs the occupancy simulation, logs a dashboard line every report period
//! and every newly raised alert, and shuts down cleanly on Ctrl+C.

use anyhow::Context;
use festpulse::config::DEFAULT_LOG_FILTER;
use festpulse::{
    AlertId, Config, DashboardStats, FestivalMonitor, OccupancyAction, OccupancyEnvironment,
};
use std::collections::HashSet;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize tracing before anything can log
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    festpulse_runtime::metrics::register_metrics();
    festpulse::metrics::register_metrics();

    let config = Config::from_env();
    info!(
        tick_interval = ?config.tick_interval,
        tick_delta = config.tick_delta,
        alert_feed_cap = config.alert_feed_cap,
        log_filter = %config.log_filter,
        "Configuration loaded"
    );

    let env = OccupancyEnvironment::with_tick_delta(config.tick_delta);
    let monitor = FestivalMonitor::festival_with_cap(env, config.alert_feed_cap);

    let mut actions = monitor.subscribe();
    // Open alerts from startup, including any raised for the seeded venues
    let mut seen: HashSet<AlertId> = HashSet::new();
    announce_new_alerts(&monitor, &mut seen).await;
    report(&monitor).await;

    let session = monitor.start(config.tick_interval);
    info!("Monitoring started, press Ctrl+C to stop");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut ticks: u32 = 0;

    loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                signal.context("Failed to listen for Ctrl+C")?;
                info!("Shutdown requested");
                break;
            }
            received = actions.recv() => match received {
                Ok(action) => {
                    announce_new_alerts(&monitor, &mut seen).await;
                    if action == OccupancyAction::Tick {
                        ticks = ticks.wrapping_add(1);
                        if ticks % config.report_every_ticks.max(1) == 0 {
                            report(&monitor).await;
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Monitor output fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    session.stop();
    monitor
        .shutdown(config.shutdown_timeout)
        .await
        .context("Monitor did not shut down cleanly")?;
    report(&monitor).await;
    info!("Monitor stopped");
    Ok(())
}

async fn report(monitor: &FestivalMonitor) {
    let snapshot = monitor.snapshot().await;
    let DashboardStats {
        total_attendees,
        peak_crowd,
        average_occupancy,
        critical_venues,
    } = snapshot.stats();
    info!(
        total_attendees,
        peak_crowd,
        average_occupancy,
        critical_venues,
        unacknowledged_alerts = snapshot.unacknowledged_count,
        "Dashboard"
    );
}

async fn announce_new_alerts(monitor: &FestivalMonitor, seen: &mut HashSet<AlertId>) {
    let alerts = monitor.alerts().await;
    for alert in alerts.iter().rev().filter(|a| !a.acknowledged && !seen.contains(&a.id)) {
        warn!(
            alert_id = %alert.id,
            venue = %alert.venue_name,
            message = %alert.message,
            "New alert"
        );
    }
    // Evicted alerts never come back, so only the current feed needs remembering
    *seen = alerts.into_iter().map(|a| a.id).collect();
}
