//! Accessors for raw entry and asset records.

use serde_json::Value;

/// The record's `uid`, if it is a non-empty string.
pub fn record_uid(data: &Value) -> Option<&str> {
    data.get("uid")
        .and_then(Value::as_str)
        .filter(|uid| !uid.is_empty())
}

/// The locale a record was published in.
///
/// Published records carry it in `publish_details.locale`; unpublish and
/// delete events only carry a top-level `locale`. Checking both in that order
/// keeps identities identical across the publish and delete paths.
pub fn record_locale(data: &Value) -> Option<&str> {
    let published = match data.get("publish_details") {
        Some(Value::Object(details)) => details.get("locale").and_then(Value::as_str),
        Some(Value::Array(details)) => details
            .first()
            .and_then(|d| d.get("locale"))
            .and_then(Value::as_str),
        _ => None,
    };

    published
        .or_else(|| data.get("locale").and_then(Value::as_str))
        .filter(|locale| !locale.is_empty())
}
