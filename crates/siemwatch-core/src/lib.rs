//! Core logic for the siemwatch batch job.
//!
//! This crate provides:
//! - Watch catalog type definitions and JSON loading
//! - Blank-field canonicalization for SIEM result rows
//! - The correlation engine (first-match-wins, set-deduplicated)
//! - The poll-interval backoff planner
//! - The `Notifier` capability trait implemented by outbound channels
//!
//! Nothing in here touches the network; the SIEM and tracker clients live in
//! their own crates and depend on this one.

pub mod catalog;
pub mod correlate;
pub mod error;
pub mod event;
pub mod interval;
pub mod normalize;
pub mod notify;

// Re-export key types at crate root for convenience.
pub use catalog::{load_catalog, WatchDefinition};
pub use correlate::correlate;
pub use error::CoreError;
pub use event::SearchRow;
pub use interval::{plan_next_interval, IntervalOutcome, IntervalPlan};
pub use normalize::{normalize_field, MISSING_FIELD};
pub use notify::Notifier;
