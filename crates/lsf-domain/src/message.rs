use std::collections::BTreeMap;

use bytes::Bytes;

/// One unit of output for the broker stage: body text, destination, and
/// addressing derived from the topic's routing keys.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    pub topic: String,
    /// Empty when the topic has no routing keys or the key was too long.
    pub routing_key: String,
    /// `None` when the topic has no routing keys.
    pub properties: Option<BTreeMap<String, String>>,
}

impl OutgoingMessage {
    /// Body bytes for brokers that publish raw payloads.
    pub fn payload(&self) -> Bytes {
        Bytes::from(self.text.clone())
    }

    /// Decode the body back into JSON.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if the body is not valid JSON.
    pub fn body(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.text)
    }
}
