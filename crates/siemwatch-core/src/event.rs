//! SIEM search result row as returned by the Ariel results endpoint.

use serde::Deserialize;

/// One row of a completed Ariel search.
///
/// Every field is optional on the wire; the correlation engine canonicalizes
/// blanks before matching. Rows are ephemeral: built by the search client,
/// consumed once by [`crate::correlate::correlate`], then dropped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRow {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub src_user: Option<String>,
    #[serde(default)]
    pub dst_user: Option<String>,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub log: Option<String>,
}
