//! Raw passthrough projection: field filtering plus routing.

use lsfbeat_domain::{FieldMap, OutgoingMessage, ParsedEvent, Topic};

use crate::routing;

/// Keep only `include` fields. An empty list keeps everything.
pub fn filter_include(mut fields: FieldMap, include: &[String]) -> FieldMap {
    if include.is_empty() {
        return fields;
    }
    include
        .iter()
        .filter_map(|k| fields.remove_entry(k))
        .collect()
}

/// Drop every `exclude` field.
pub fn filter_exclude(mut fields: FieldMap, exclude: &[String]) -> FieldMap {
    for k in exclude {
        fields.remove(k);
    }
    fields
}

/// Project `event` for a raw topic. The body is the include-then-exclude
/// filtered record; routing sees the full record, so key fields need not
/// be part of the body.
///
/// # Errors
/// Returns a `serde_json::Error` if the filtered record cannot be encoded.
pub fn project_raw(
    event: &ParsedEvent,
    topic: &Topic,
) -> Result<OutgoingMessage, serde_json::Error> {
    let body = filter_include(event.fields().clone(), &topic.include_fields);
    let body = filter_exclude(body, &topic.exclude_fields);
    let text = serde_json::to_string(&body)?;

    Ok(OutgoingMessage {
        text,
        topic: topic.topic_name.clone(),
        routing_key: routing::routing_key(event.fields(), &topic.routing_keys),
        properties: routing::properties(event.fields(), &topic.routing_keys),
    })
}
