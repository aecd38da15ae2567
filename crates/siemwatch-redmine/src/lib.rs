//! Redmine tracker integration.
//!
//! This crate provides:
//! - The [`IssueTracker`] capability trait the upsert engine is written
//!   against (composition over an adapter, never a concrete SDK type)
//! - [`RedmineClient`], the REST implementation of that trait
//! - Issue description rendering (light/dark HTML templates)
//! - [`UpsertEngine`], the create-vs-append-vs-skip decision logic

pub mod client;
pub mod error;
pub mod template;
pub mod tracker;
pub mod types;
pub mod upsert;

pub use client::RedmineClient;
pub use error::RedmineError;
pub use template::{IssueContext, IssueTemplate, TemplateMode};
pub use tracker::IssueTracker;
pub use types::{Issue, IssueDraft, IssueNote, Journal, User};
pub use upsert::UpsertEngine;
