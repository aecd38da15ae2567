//! Application settings and TOML configuration parsing.
//!
//! The settings file doubles as the job's only persistent state: the poll
//! interval controller rewrites `qradar.query_interval` after every cycle.
//! Rewrites go through a `toml::Table` round-trip so keys this version does
//! not know about survive.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use siemwatch_core::interval::DEFAULT_QUERY_INTERVAL_MIN;

pub const DEFAULT_ENV: &str = "dev";

/// Top-level siemwatch configuration, loaded from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Environment mode: `dev` or `prod`. Selects the tracker project.
    #[serde(default = "default_env")]
    pub env: String,

    /// Log filter used when the `SIEMWATCH_LOG` env var is not set.
    #[serde(default)]
    pub log_level: Option<String>,

    /// Path to the watch catalog JSON file.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    pub qradar: QRadarSettings,
    pub redmine: RedmineSettings,

    #[serde(default)]
    pub teams: TeamsSettings,
}

/// QRadar console connection and query settings.
#[derive(Debug, Clone, Deserialize)]
pub struct QRadarSettings {
    pub url: String,
    pub username: String,
    pub password: String,

    /// AQL query template; `{event_ids}`, `{query_interval}` and `{limit}`
    /// placeholders are substituted before submission.
    pub aql_query: String,

    /// Lookback window in minutes; rewritten by the interval controller.
    #[serde(default = "default_query_interval")]
    pub query_interval: u64,

    /// Row cap substituted into the query template.
    #[serde(default = "default_query_limit")]
    pub query_limit: u64,
}

/// A tracker project reference.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRef {
    pub id: u32,
    pub name: String,
}

/// Redmine connection settings, with one project per environment.
#[derive(Debug, Clone, Deserialize)]
pub struct RedmineSettings {
    pub url: String,
    pub api_key: String,
    pub tracker_id: u32,

    /// Issue description template variant: `light` or `dark`.
    #[serde(default = "default_template_mode")]
    pub template_mode: String,

    pub dev_project: ProjectRef,
    pub prod_project: ProjectRef,
}

/// MS Teams workflow notification settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamsSettings {
    #[serde(default)]
    pub workflow_url: Option<String>,
    #[serde(default = "default_teams_title")]
    pub title: String,
}

impl Default for TeamsSettings {
    fn default() -> Self {
        Self {
            workflow_url: None,
            title: default_teams_title(),
        }
    }
}

fn default_env() -> String {
    DEFAULT_ENV.to_string()
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/windows_security_events.json")
}

fn default_query_interval() -> u64 {
    DEFAULT_QUERY_INTERVAL_MIN
}

fn default_query_limit() -> u64 {
    1000
}

fn default_template_mode() -> String {
    "light".to_string()
}

fn default_teams_title() -> String {
    "siemwatch-wse-automation".to_string()
}

impl Settings {
    /// Load and validate settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("qradar.url", &self.qradar.url),
            ("qradar.username", &self.qradar.username),
            ("qradar.password", &self.qradar.password),
            ("qradar.aql_query", &self.qradar.aql_query),
            ("redmine.url", &self.redmine.url),
            ("redmine.api_key", &self.redmine.api_key),
        ] {
            if value.trim().is_empty() {
                bail!("config key {key} must not be empty");
            }
        }
        self.redmine
            .template_mode
            .parse::<siemwatch_redmine::TemplateMode>()?;
        Ok(())
    }

    pub fn is_prod(&self) -> bool {
        self.env == "prod"
    }

    /// The tracker project for the active environment.
    pub fn project(&self) -> &ProjectRef {
        if self.is_prod() {
            &self.redmine.prod_project
        } else {
            &self.redmine.dev_project
        }
    }
}

/// Persist a new poll interval into the config file.
pub fn store_query_interval(path: &Path, minutes: u64) -> Result<()> {
    rewrite(path, |table| {
        let qradar = table
            .entry("qradar")
            .or_insert_with(|| toml::Value::Table(Default::default()));
        if let Some(t) = qradar.as_table_mut() {
            t.insert("query_interval".into(), toml::Value::Integer(minutes as i64));
        }
    })
}

/// Persist a corrected environment mode into the config file.
pub fn store_env(path: &Path, env: &str) -> Result<()> {
    rewrite(path, |table| {
        table.insert("env".into(), toml::Value::String(env.to_string()));
    })
}

fn rewrite(path: &Path, mutate: impl FnOnce(&mut toml::Table)) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let mut table: toml::Table = toml::from_str(&content)
        .with_context(|| format!("parsing config file {}", path.display()))?;
    mutate(&mut table);
    let out = toml::to_string_pretty(&table).context("serializing config")?;
    std::fs::write(path, out)
        .with_context(|| format!("writing config file {}", path.display()))?;
    Ok(())
}

/// Best-effort read of the `log_level` key, used before full settings
/// loading so tracing can be initialized first.
pub fn read_log_level(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let table: toml::Table = toml::from_str(&content).ok()?;
    table.get("log_level")?.as_str().map(str::to_string)
}
