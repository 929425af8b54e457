//! Event records — accessors, name resolution and user-property derivation.
//!
//! Event records arrive from the upstream tracking pipeline as untyped JSON
//! objects. Everything in this module is a pure function over those records;
//! the forwarder in [`crate::backend`] sequences them.

pub mod properties;
pub mod translation;

use serde_json::{Map, Value};

pub use properties::{build_user_properties, course_started_property};
pub use translation::{apply_page_view, resolve_event_name, route_track, TrackRoute};

/// One event record as emitted by the tracking pipeline.
pub type Event = Map<String, Value>;

/// Visitor attributes sent with `identify`.
pub type UserProperties = Map<String, Value>;

/// Emitted when a user edits an account setting.
pub const SETTINGS_CHANGED_EVENT: &str = "edx.user.settings.changed";

/// Emitted for every problem submission, from both browser and server.
pub const PROBLEM_CHECK_EVENT: &str = "problem_check";

/// Substring identifying courseware navigation events.
pub const COURSEWARE_EVENT: &str = "courseware";

/// Name sent to Woopra for page-path style events.
pub const PAGE_VIEW_EVENT: &str = "pv";

/// Prefix applied to server-side problem checks before tracking.
pub const TRACKED_EVENT_PREFIX: &str = "lt.";

/// Events whose embedded `user_properties` are merged into the visitor.
pub const BULK_MERGE_EVENTS: &[&str] = &[
    "lt.progress_summary",
    "lt.feed.create_user",
    "lt.feed.update_user",
    "lt.feed.deactivate_user",
];

/// Text value of a top-level field, empty when absent or not text.
pub fn str_field<'a>(event: &'a Event, key: &str) -> &'a str {
    event.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Nested mapping under `key`, if the field is an object.
pub fn nested<'a>(event: &'a Event, key: &str) -> Option<&'a Map<String, Value>> {
    event.get(key).and_then(Value::as_object)
}

/// Non-null value at `outer.inner`.
pub fn nested_value<'a>(event: &'a Event, outer: &str, inner: &str) -> Option<&'a Value> {
    nested(event, outer)
        .and_then(|map| map.get(inner))
        .filter(|value| !value.is_null())
}
