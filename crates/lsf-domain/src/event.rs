use crate::error::DomainError;
use crate::keys::fields;
use crate::value::{FieldMap, FieldValue};

/// One decoded scheduler record: a flat, string-keyed map of field values.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ParsedEvent {
    fields: FieldMap,
}

impl ParsedEvent {
    /// Decode parser output. Anything other than a JSON object is rejected.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidJson` if the text does not parse, or
    /// `DomainError::NotAnObject` if it parses to a non-object value.
    pub fn from_json(text: &str) -> Result<Self, DomainError> {
        let value: serde_json::Value = serde_json::from_str(text.trim())?;
        match FieldValue::from(value) {
            FieldValue::Map(fields) => Ok(Self { fields }),
            _ => Err(DomainError::NotAnObject),
        }
    }

    /// Serialize to compact JSON with keys in sorted order.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if a value cannot be encoded.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.fields)
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// String form of a field; missing fields yield an empty string.
    pub fn get_str(&self, key: &str) -> String {
        self.fields
            .get(key)
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Integer form of a field; missing or non-numeric fields yield `-1`.
    pub fn get_int(&self, key: &str) -> i64 {
        self.fields
            .get(key)
            .and_then(FieldValue::as_i64)
            .unwrap_or(-1)
    }

    pub fn event_type(&self) -> String {
        self.get_str(fields::EVENT_TYPE)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Merge `extra` into this event, overwriting existing keys.
    pub fn extend(&mut self, extra: &FieldMap) {
        for (k, v) in extra {
            self.fields.insert(k.clone(), v.clone());
        }
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
