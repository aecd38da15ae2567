//! Ariel API wire types. Only the fields the client reads are modeled.

use serde::Deserialize;
use siemwatch_core::SearchRow;

/// Response body of `POST /api/ariel/searches` and the per-search status GET.
#[derive(Debug, Clone, Deserialize)]
pub struct ArielSearch {
    #[serde(default)]
    pub search_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub record_count: Option<u64>,
}

/// Response body of `GET /api/ariel/searches/{id}/results`.
#[derive(Debug, Clone, Deserialize)]
pub struct ArielResults {
    #[serde(default)]
    pub events: Vec<SearchRow>,
}
