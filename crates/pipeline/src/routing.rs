//! Routing key and property derivation from a topic's ordered key fields.

use std::collections::BTreeMap;

use lsfbeat_domain::FieldMap;

/// Routing keys longer than this many characters are dropped; brokers reject
/// them.
pub const MAX_ROUTING_KEY_CHARS: usize = 255;

/// Dot-joined values of `keys` taken from `fields`.
///
/// Absent fields leave an empty segment (`"c1."`), so the position of each
/// key is preserved. No keys, or a key over the length limit, give `""`.
pub fn routing_key(fields: &FieldMap, keys: &[String]) -> String {
    let segments: Vec<String> = keys
        .iter()
        .map(|k| fields.get(k).map(ToString::to_string).unwrap_or_default())
        .collect();
    let key = segments.join(".");

    let len = key.chars().count();
    if len > MAX_ROUTING_KEY_CHARS {
        tracing::warn!(routing_key = %key, len, "routing key too long, dropping");
        return String::new();
    }
    key
}

/// Stringified values of every key field present in `fields`. `None` when
/// the topic has no key fields.
pub fn properties(fields: &FieldMap, keys: &[String]) -> Option<BTreeMap<String, String>> {
    if keys.is_empty() {
        return None;
    }
    Some(
        keys.iter()
            .filter_map(|k| fields.get(k).map(|v| (k.clone(), v.to_string())))
            .collect(),
    )
}
