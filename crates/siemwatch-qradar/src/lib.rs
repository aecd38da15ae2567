//! QRadar Ariel search client.
//!
//! Thin async wrapper over the [Ariel searches API]: submit an AQL query,
//! poll the search until it completes, fetch the result rows. The polling
//! state machine (`SUBMITTED → POLLING → {COMPLETED, FAILED}`) lives in
//! [`client::QRadarClient`].
//!
//! [Ariel searches API]: https://ibmsecuritydocs.github.io/qradar_api_16.0

pub mod client;
pub mod error;
pub mod types;

pub use client::QRadarClient;
pub use error::QRadarError;
