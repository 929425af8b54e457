//! Event-name translation — pipeline event names → Woopra event names.
//!
//! Translation rules:
//!   name (or event_type when name is empty) → resolved name
//!   "/some/path"                            → pv (title + url added to the record)
//!   problem_check (server side)             → lt.problem_check
//!   problem_check (anything else)           → not tracked
//!   (all others)                            → unchanged

use serde_json::Value;

use super::{str_field, Event, PAGE_VIEW_EVENT, PROBLEM_CHECK_EVENT, TRACKED_EVENT_PREFIX};

/// Resolve the event name: `name`, falling back to `event_type` when empty.
pub fn resolve_event_name(event: &Event) -> &str {
    match str_field(event, "name") {
        "" => str_field(event, "event_type"),
        name => name,
    }
}

/// Rewrite page-path style events into a Woopra page view.
///
/// Names starting with `/` become [`PAGE_VIEW_EVENT`]; the original name is
/// kept as `title` and the referer as `url` on the outgoing record. Any other
/// name is returned untouched and the record is left alone.
pub fn apply_page_view(event_name: String, record: &mut Event) -> String {
    if !event_name.starts_with('/') {
        return event_name;
    }

    let referer = str_field(record, "referer").to_string();
    record.insert("title".to_string(), Value::String(event_name));
    record.insert("url".to_string(), Value::String(referer));
    PAGE_VIEW_EVENT.to_string()
}

/// Whether and under which name an event is tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackRoute {
    Forward(String),
    Suppress,
}

/// Decide the tracked name for an event that already passed gating.
///
/// `problem_check` is emitted by both the browser and the server for the same
/// submission; only the server copy (raw `event_type` also `problem_check` and
/// `event_source == "server"`) is tracked, under the `lt.` namespace.
pub fn route_track(event_name: String, event: &Event) -> TrackRoute {
    if event_name != PROBLEM_CHECK_EVENT {
        return TrackRoute::Forward(event_name);
    }

    if str_field(event, "event_type") == PROBLEM_CHECK_EVENT
        && str_field(event, "event_source") == "server"
    {
        TrackRoute::Forward(format!("{TRACKED_EVENT_PREFIX}{PROBLEM_CHECK_EVENT}"))
    } else {
        TrackRoute::Suppress
    }
}
