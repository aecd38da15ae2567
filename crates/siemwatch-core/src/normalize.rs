//! Blank-field canonicalization.
//!
//! QRadar hands back a mix of empty strings and placeholder markers for
//! fields it could not populate. Matching and rendering both want a single
//! canonical form, so every blank variant collapses to [`MISSING_FIELD`].

/// Sentinel substituted for blank or placeholder field values.
pub const MISSING_FIELD: &str = "( not exists )";

/// Placeholder strings QRadar emits for absent fields.
const BLANK_MARKERS: [&str; 5] = ["N/A", "n/a", "-", " - ", "None"];

/// Canonicalize a raw row field.
///
/// `None`, empty or whitespace-only strings, and the known placeholder
/// markers all map to [`MISSING_FIELD`]; any other value passes through
/// unchanged.
pub fn normalize_field(raw: Option<&str>) -> String {
    match raw {
        None => MISSING_FIELD.to_string(),
        Some(s) if s.trim().is_empty() || BLANK_MARKERS.contains(&s) => {
            MISSING_FIELD.to_string()
        }
        Some(s) => s.to_string(),
    }
}
