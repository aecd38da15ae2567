//! Event correlation engine.
//!
//! Matches SIEM search rows against the watch catalog and accumulates
//! rendered, deduplicated event texts onto the matching definitions.
//!
//! Matching is an ordered scan with early return: the *first* definition
//! whose event id and include/exclude filters accept the row wins, and a row
//! contributes to at most one definition. This is deliberate — overlapping
//! definitions (same event id, different include lists) rely on file order,
//! so no map shortcut is taken here.

use tracing::{debug, trace};

use crate::catalog::WatchDefinition;
use crate::event::SearchRow;
use crate::normalize::normalize_field;

/// Correlate one search row against the catalog, mutating it in place.
///
/// On a match the definition's `event_text` template is rendered with the
/// row's normalized fields, the result is inserted into its `events` set
/// (textually identical renders collapse to one entry), and `event_log` is
/// overwritten with the row's raw log. A row matching nothing is dropped
/// with no side effect.
pub fn correlate(row: &SearchRow, catalog: &mut [WatchDefinition]) {
    let Some(event_id) = row.event_id.as_deref() else {
        trace!("row without event_id, skipping");
        return;
    };

    let src_user = normalize_field(row.src_user.as_deref());
    let dst_user = normalize_field(row.dst_user.as_deref());
    let group_name = normalize_field(row.group_name.as_deref());
    let event_log = normalize_field(row.log.as_deref());

    let Some(def) = catalog.iter_mut().find(|def| {
        def.event_id == event_id
            && !def.excluded_src_users.contains(&src_user)
            && !def.excluded_dst_users.contains(&dst_user)
            && !def.excluded_groups.contains(&group_name)
            && (def.included_src_users.is_empty() || def.included_src_users.contains(&src_user))
            && (def.included_dst_users.is_empty() || def.included_dst_users.contains(&dst_user))
            && (def.included_groups.is_empty() || def.included_groups.contains(&group_name))
    }) else {
        trace!(event_id, "row matched no watch definition");
        return;
    };

    let text = render_event_text(
        &def.event_text,
        event_id,
        &src_user,
        &dst_user,
        &group_name,
        &event_log,
    );
    debug!(event_id, subject = %def.issue_subject, "row matched watch definition");

    def.events.insert(text);
    def.event_log = event_log;
}

/// Substitute the row's normalized fields into an `event_text` template.
///
/// The catalog file uses single-brace placeholders (`{src_user}`); unknown
/// placeholders are left untouched rather than erroring, since the template
/// is operator-authored data.
fn render_event_text(
    template: &str,
    event_id: &str,
    src_user: &str,
    dst_user: &str,
    group_name: &str,
    event_log: &str,
) -> String {
    template
        .replace("{event_id}", event_id)
        .replace("{src_user}", src_user)
        .replace("{dst_user}", dst_user)
        .replace("{group_name}", group_name)
        .replace("{event_log}", event_log)
}
