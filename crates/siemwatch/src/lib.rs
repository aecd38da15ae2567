//! One poll → correlate → upsert cycle.
//!
//! The binary runs exactly one cycle and exits; scheduling and overlap
//! protection belong to the external scheduler. Subsystem failures (catalog
//! missing, search rejected, tracker auth failed) end the cycle cleanly with
//! an error log; only unexpected failures bubble up to the caller's critical
//! boundary in `main`.

pub mod config;
pub mod teams;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use siemwatch_core::interval::{DEFAULT_QUERY_INTERVAL_MIN, MAX_QUERY_INTERVAL_MIN};
use siemwatch_core::{correlate, load_catalog, plan_next_interval, IntervalOutcome, WatchDefinition};
use siemwatch_qradar::QRadarClient;
use siemwatch_redmine::{IssueTemplate, IssueTracker, RedmineClient, UpsertEngine};

use crate::config::{QRadarSettings, Settings};
use crate::teams::TeamsNotifier;

/// Delay between Ariel search status polls.
const SEARCH_POLL_DELAY: Duration = Duration::from_millis(800);

/// Run one full cycle against the configured SIEM and tracker.
pub async fn run_cycle(settings: &Settings, config_path: &Path) -> Result<()> {
    let mut catalog = match load_catalog(&settings.catalog_path) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!(error = %e, "cannot load watch catalog, ending cycle");
            return Ok(());
        }
    };

    let qradar = QRadarClient::new(
        &settings.qradar.url,
        &settings.qradar.username,
        &settings.qradar.password,
    )
    .context("building qradar client")?;

    let query = build_query(&settings.qradar, &catalog);
    let search_id = match qradar.submit_search(&query).await {
        Ok(id) => id,
        Err(e) => {
            error!(error = %e, "search submission failed, ending cycle");
            return Ok(());
        }
    };
    if let Err(e) = qradar.await_completion(&search_id, SEARCH_POLL_DELAY).await {
        error!(error = %e, search_id, "search never completed, ending cycle");
        return Ok(());
    }

    let rows = qradar.fetch_results(&search_id).await;
    info!(rows = rows.len(), "correlating search results");
    for row in &rows {
        correlate(row, &mut catalog);
    }

    let found_any = catalog.iter().any(WatchDefinition::has_events);
    let plan = plan_next_interval(
        settings.qradar.query_interval,
        DEFAULT_QUERY_INTERVAL_MIN,
        MAX_QUERY_INTERVAL_MIN,
        found_any,
    );
    config::store_query_interval(config_path, plan.interval_minutes)
        .context("persisting poll interval")?;

    match plan.outcome {
        IntervalOutcome::Widened => {
            warn!(
                searched_minutes = settings.qradar.query_interval,
                next_minutes = plan.interval_minutes,
                "no watched events found, widening lookback window"
            );
            return Ok(());
        }
        IntervalOutcome::Saturated => {
            warn!(
                next_minutes = plan.interval_minutes,
                "no watched events found for a full day, lookback window reset"
            );
            return Ok(());
        }
        IntervalOutcome::Reset => {}
    }

    let project = settings.project();
    let redmine = RedmineClient::new(
        &settings.redmine.url,
        &settings.redmine.api_key,
        project.id,
        settings.redmine.tracker_id,
    )
    .context("building redmine client")?;

    let user = match redmine.current_user().await {
        Ok(user) => user,
        Err(e) => {
            error!(error = %e, "redmine authentication failed, ending cycle");
            return Ok(());
        }
    };

    let template = IssueTemplate::new(settings.redmine.template_mode.parse()?)?;
    let notifier = TeamsNotifier::new(&settings.teams)?;
    let engine = UpsertEngine::new(&redmine, &template, &notifier);

    for def in catalog.iter().filter(|d| d.has_events()) {
        engine.upsert(def, &user).await;
    }

    info!(project = %project.name, "cycle complete");
    Ok(())
}

/// Substitute the catalog's event ids and the query bounds into the
/// configured AQL template.
fn build_query(qradar: &QRadarSettings, catalog: &[WatchDefinition]) -> String {
    let event_ids = catalog
        .iter()
        .map(|d| d.event_id.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    qradar
        .aql_query
        .replace("{event_ids}", &event_ids)
        .replace("{query_interval}", &qradar.query_interval.to_string())
        .replace("{limit}", &qradar.query_limit.to_string())
}
