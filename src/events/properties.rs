//! Visitor properties derived from an event record.

use serde_json::Value;

use super::{
    nested, nested_value, Event, UserProperties, BULK_MERGE_EVENTS, COURSEWARE_EVENT,
    SETTINGS_CHANGED_EVENT,
};

/// Build the visitor properties sent with `identify`.
///
/// Always carries `id` and `username`; the rest depends on the event:
/// `context.user_id`, the changed setting for settings events, the embedded
/// `user_properties` for bulk-merge events, and a `<course>_started` flag for
/// courseware events.
pub fn build_user_properties(username: &str, event_name: &str, event: &Event) -> UserProperties {
    let mut properties = UserProperties::new();
    properties.insert("id".to_string(), Value::from(username));
    properties.insert("username".to_string(), Value::from(username));

    if let Some(user_id) = nested_value(event, "context", "user_id") {
        properties.insert("user_id".to_string(), user_id.clone());
    }

    if event_name == SETTINGS_CHANGED_EVENT {
        let setting = nested_value(event, "event", "setting").and_then(Value::as_str);
        if let Some(setting) = setting {
            let new_value = nested_value(event, "event", "new")
                .cloned()
                .unwrap_or(Value::Null);
            properties.insert(setting.to_string(), new_value);
        }
    }

    if BULK_MERGE_EVENTS.contains(&event_name) {
        if let Some(embedded) = nested(event, "user_properties") {
            for (key, value) in embedded {
                properties.insert(key.clone(), value.clone());
            }
        }
    }

    if event_name.contains(COURSEWARE_EVENT) {
        let course_id = nested_value(event, "context", "course_id").and_then(Value::as_str);
        if let Some(course_id) = course_id {
            properties.insert(course_started_property(course_id), Value::from(1));
        }
    }

    properties
}

/// Property flagging that the visitor started a course.
///
/// `course-v1:GOS+GOS101+2017_T2` → `gos101_2017_t2_started`. Everything up to
/// and including the first `+` is dropped; ids without `+` are used whole.
pub fn course_started_property(course_id: &str) -> String {
    let course_id = course_id.to_lowercase();
    let run = match course_id.split_once('+') {
        Some((_, rest)) => rest,
        None => course_id.as_str(),
    };
    format!("{}_started", run.replace('+', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn event(value: Value) -> Event {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_seeded_with_username() {
        let props = build_user_properties("alice", "seq_goto", &event(json!({})));
        assert_eq!(Value::Object(props), json!({"id": "alice", "username": "alice"}));
    }

    #[test]
    fn test_user_id_from_context() {
        let e = event(json!({"context": {"user_id": 42}}));
        let props = build_user_properties("alice", "seq_goto", &e);
        assert_eq!(props["user_id"], 42);
    }

    #[test]
    fn test_settings_changed_sets_dynamic_property() {
        let e = event(json!({"event": {"setting": "lang", "new": "fr", "old": "en"}}));
        let props = build_user_properties("u", SETTINGS_CHANGED_EVENT, &e);
        assert_eq!(
            Value::Object(props),
            json!({"id": "u", "username": "u", "lang": "fr"})
        );
    }

    #[test]
    fn test_settings_only_for_settings_event() {
        let e = event(json!({"event": {"setting": "lang", "new": "fr"}}));
        let props = build_user_properties("u", "seq_goto", &e);
        assert!(!props.contains_key("lang"));
    }

    #[test]
    fn test_settings_without_setting_name() {
        let e = event(json!({"event": {"new": "fr"}}));
        let props = build_user_properties("u", SETTINGS_CHANGED_EVENT, &e);
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn test_bulk_merge_overwrites() {
        let e = event(json!({
            "user_properties": {"progress": 75, "username": "renamed", "cohort": "a"}
        }));
        for name in BULK_MERGE_EVENTS {
            let props = build_user_properties("u", name, &e);
            assert_eq!(props["progress"], 75);
            assert_eq!(props["cohort"], "a");
            assert_eq!(props["username"], "renamed");
            assert_eq!(props["id"], "u");
        }
    }

    #[test]
    fn test_user_properties_ignored_for_other_events() {
        let e = event(json!({"user_properties": {"progress": 75}}));
        let props = build_user_properties("u", "lt.something_else", &e);
        assert!(!props.contains_key("progress"));
    }

    #[test]
    fn test_courseware_flag() {
        let e = event(json!({"context": {"course_id": "course-v1:GOS+GOS101+2017_T2"}}));
        let props = build_user_properties("u", "edx.ui.lms.courseware.opened", &e);
        assert_eq!(props["gos101_2017_t2_started"], 1);
    }

    #[test]
    fn test_courseware_substring_not_prefix() {
        let e = event(json!({"context": {"course_id": "course-v1:A+B+C"}}));
        let props = build_user_properties("u", "/courses/x/courseware/ch1/", &e);
        assert_eq!(props["b_c_started"], 1);
    }

    #[test]
    fn test_courseware_without_course_id() {
        let e = event(json!({"context": {}}));
        let props = build_user_properties("u", "courseware", &e);
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn test_course_property_without_plus() {
        assert_eq!(course_started_property("Demo_Course"), "demo_course_started");
    }

    #[test]
    fn test_course_property_old_style_id() {
        assert_eq!(course_started_property("edX/DemoX/Demo_Course"), "edx/demox/demo_course_started");
    }

    proptest! {
        #[test]
        fn prop_course_property_shape(course_id in "[A-Za-z0-9:_+.-]{0,40}") {
            let prop = course_started_property(&course_id);
            prop_assert!(prop.ends_with("_started"));
            prop_assert!(!prop.contains('+'));
            prop_assert_eq!(prop.to_lowercase(), prop.clone());
        }
    }
}
