//! siemwatch binary entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use siemwatch::config::{self, Settings, DEFAULT_ENV};
use siemwatch::teams::TeamsNotifier;

/// siemwatch - QRadar to Redmine triage for Windows Security Events.
///
/// Runs exactly one poll-correlate-upsert cycle and exits; run it from a
/// scheduler that guarantees non-overlapping invocations.
#[derive(Parser, Debug)]
#[command(name = "siemwatch", version, about)]
struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config/siemwatch.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Log filter priority: SIEMWATCH_LOG env var > log_level in the config
    // file > default env filter.
    let env_filter = EnvFilter::try_from_env("SIEMWATCH_LOG").unwrap_or_else(|_| {
        match config::read_log_level(&args.config) {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::from_default_env(),
        }
    });
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut settings = match Settings::load(&args.config) {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "configuration error, nothing to do");
            return ExitCode::FAILURE;
        }
    };

    if !["dev", "prod"].contains(&settings.env.as_str()) {
        warn!(
            env = %settings.env,
            fallback = DEFAULT_ENV,
            "invalid environment mode, falling back"
        );
        settings.env = DEFAULT_ENV.to_string();
        if let Err(e) = config::store_env(&args.config, DEFAULT_ENV) {
            warn!(error = %e, "could not persist corrected environment mode");
        }
    }

    info!(env = %settings.env, "running one siemwatch cycle");
    match siemwatch::run_cycle(&settings, &args.config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "critical: cycle aborted");
            match TeamsNotifier::new(&settings.teams) {
                Ok(notifier) => notifier.send(&format!("critical error occurred `{e}`")).await,
                Err(build_err) => {
                    error!(error = %build_err, "could not build teams notifier for critical alert");
                }
            }
            ExitCode::FAILURE
        }
    }
}
