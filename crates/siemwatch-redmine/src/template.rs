//! Issue description rendering.
//!
//! Descriptions and appended notes go through the same handlebars template,
//! embedded in the binary in a light and a dark variant. All fields are
//! emitted raw except the raw log payload, which handlebars HTML-escapes;
//! the rendered output is wrapped in Redmine's `{{html ... }}` wiki macro by
//! code so the template file stays plain HTML.

use std::str::FromStr;

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::{RedmineError, Result};

const LIGHT_TEMPLATE: &str = include_str!("../templates/light_issue_description.hbs");
const DARK_TEMPLATE: &str = include_str!("../templates/dark_issue_description.hbs");

/// Which of the embedded template variants to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateMode {
    #[default]
    Light,
    Dark,
}

impl TemplateMode {
    fn name(self) -> &'static str {
        match self {
            TemplateMode::Light => "light",
            TemplateMode::Dark => "dark",
        }
    }
}

impl FromStr for TemplateMode {
    type Err = RedmineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "light" => Ok(TemplateMode::Light),
            "dark" => Ok(TemplateMode::Dark),
            other => Err(RedmineError::UnknownTemplateMode(other.to_string())),
        }
    }
}

/// Everything the issue description template interpolates.
#[derive(Debug, Serialize)]
pub struct IssueContext<'a> {
    pub date: String,
    pub created_by: String,
    pub subject: &'a str,
    pub status: &'a str,
    pub priority: &'a str,
    pub event_id: &'a str,
    pub event_description: &'a str,
    /// Rendered event texts, already joined.
    pub events: String,
    /// Raw log payload; escaped by the template.
    pub event_log: &'a str,
    /// Next-issue-number hint (create) or the issue's own id (update).
    pub issue_id: u64,
}

/// Compiled issue description template.
pub struct IssueTemplate {
    registry: Handlebars<'static>,
    mode: TemplateMode,
}

impl IssueTemplate {
    pub fn new(mode: TemplateMode) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry
            .register_template_string("light", LIGHT_TEMPLATE)
            .map_err(Box::new)?;
        registry
            .register_template_string("dark", DARK_TEMPLATE)
            .map_err(Box::new)?;
        Ok(Self { registry, mode })
    }

    /// Render an issue description, wrapped in the Redmine html macro.
    pub fn render(&self, ctx: &IssueContext<'_>) -> Result<String> {
        let body = self.registry.render(self.mode.name(), ctx)?;
        Ok(format!("{{{{html\n{body}\n}}}}"))
    }
}
