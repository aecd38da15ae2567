//! Watch catalog: the list of Windows Security Event definitions to detect.
//!
//! The catalog is a JSON array loaded once per run. Each definition carries
//! the event id to match, optional include/exclude filters on the user and
//! group fields, a per-row text template, and the subject/description/priority
//! of the tracker issue the events roll up into. Catalog **order matters**:
//! the correlation engine takes the first satisfying definition, so narrower
//! definitions sharing an event id must precede broader ones in the file.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{CoreError, Result};

/// One watched-event definition, plus the events accumulated for it this run.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchDefinition {
    /// Vendor event identifier, e.g. `"4720"`.
    pub event_id: String,

    /// Rows whose source user equals any of these are rejected.
    #[serde(default)]
    pub excluded_src_users: HashSet<String>,
    /// Rows whose destination user equals any of these are rejected.
    #[serde(default)]
    pub excluded_dst_users: HashSet<String>,
    /// Rows whose group equals any of these are rejected.
    #[serde(default)]
    pub excluded_groups: HashSet<String>,

    /// When non-empty, the source user must be one of these.
    #[serde(default)]
    pub included_src_users: HashSet<String>,
    /// When non-empty, the destination user must be one of these.
    #[serde(default)]
    pub included_dst_users: HashSet<String>,
    /// When non-empty, the group must be one of these.
    #[serde(default)]
    pub included_groups: HashSet<String>,

    /// Per-row description template with `{src_user}`-style placeholders.
    pub event_text: String,

    /// Subject of the tracker issue this definition rolls up into.
    pub issue_subject: String,
    /// Human description embedded in the issue body.
    pub issue_description: String,
    /// Tracker priority id; the tracker default applies when absent.
    #[serde(default)]
    pub issue_priority_id: Option<u32>,

    /// Deduplicated rendered event texts accumulated this run.
    #[serde(skip)]
    pub events: BTreeSet<String>,
    /// Raw log payload of the last matched row (last-write-wins).
    #[serde(skip)]
    pub event_log: String,
}

impl WatchDefinition {
    /// Whether any row matched this definition during correlation.
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }
}

/// Load the watch catalog from a JSON file.
///
/// A missing file or an empty array is an error: running a cycle with nothing
/// to watch is always a deployment mistake.
pub fn load_catalog(path: &Path) -> Result<Vec<WatchDefinition>> {
    if !path.exists() {
        return Err(CoreError::CatalogNotFound(path.to_path_buf()));
    }
    let data = std::fs::read_to_string(path)?;
    let catalog: Vec<WatchDefinition> = serde_json::from_str(&data)?;
    if catalog.is_empty() {
        return Err(CoreError::CatalogEmpty(path.to_path_buf()));
    }
    info!(count = catalog.len(), path = %path.display(), "loaded watch catalog");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_catalog(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("catalog.json");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_definitions_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_catalog(
            &dir,
            r#"[{
                "event_id": "4720",
                "event_text": "User {src_user} created {dst_user}\n",
                "issue_subject": "New local users",
                "issue_description": "A user account was created"
            }]"#,
        );

        let catalog = load_catalog(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        let def = &catalog[0];
        assert_eq!(def.event_id, "4720");
        assert!(def.excluded_src_users.is_empty());
        assert!(def.included_groups.is_empty());
        assert!(def.issue_priority_id.is_none());
        assert!(def.events.is_empty());
        assert_eq!(def.event_log, "");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = load_catalog(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CoreError::CatalogNotFound(_)));
    }

    #[test]
    fn empty_array_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_catalog(&dir, "[]");
        let err = load_catalog(&path).unwrap_err();
        assert!(matches!(err, CoreError::CatalogEmpty(_)));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_catalog(&dir, "{ not json");
        let err = load_catalog(&path).unwrap_err();
        assert!(matches!(err, CoreError::DeserializeError(_)));
    }

    #[test]
    fn catalog_order_is_preserved() {
        let dir = TempDir::new().unwrap();
        let path = write_catalog(
            &dir,
            r#"[
                {"event_id": "4728", "included_groups": ["Domain Admins"],
                 "event_text": "a", "issue_subject": "s1", "issue_description": "d"},
                {"event_id": "4728",
                 "event_text": "b", "issue_subject": "s2", "issue_description": "d"}
            ]"#,
        );
        let catalog = load_catalog(&path).unwrap();
        assert_eq!(catalog[0].issue_subject, "s1");
        assert_eq!(catalog[1].issue_subject, "s2");
    }
}
