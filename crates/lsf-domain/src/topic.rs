use crate::value::FieldMap;

/// How a topic projects a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TopicKind {
    /// Field-filtered passthrough of the parsed record.
    #[serde(rename = "job.raw")]
    Raw,
    /// One message per detected job state change.
    #[serde(rename = "job.status.trace")]
    StatusTrace,
    /// Any other type string. Kept so one bad entry does not reject the whole
    /// topic list; the pipeline skips these.
    #[serde(other)]
    Unsupported,
}

/// A named projection of scheduler records onto a broker destination.
/// Deserializable from YAML or JSON config files.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Topic {
    pub topic_name: String,
    #[serde(rename = "type")]
    pub kind: TopicKind,
    /// Fields to keep. Empty keeps everything.
    #[serde(default)]
    pub include_fields: Vec<String>,
    /// Fields to drop after the include filter.
    #[serde(default)]
    pub exclude_fields: Vec<String>,
    /// Static fields injected into each record before projection.
    #[serde(default)]
    pub add_fields: FieldMap,
    /// Ordered fields that build the routing key and property map.
    #[serde(default)]
    pub routing_keys: Vec<String>,
}

impl Topic {
    pub fn new(topic_name: impl Into<String>, kind: TopicKind) -> Self {
        Self {
            topic_name: topic_name.into(),
            kind,
            include_fields: Vec::new(),
            exclude_fields: Vec::new(),
            add_fields: FieldMap::new(),
            routing_keys: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_include_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_exclude_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_routing_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.routing_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_add_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<crate::FieldValue>,
    ) -> Self {
        self.add_fields.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldValue;

    const TOPICS_YAML: &str = r#"
- topic_name: lsf.raw
  type: job.raw
  include_fields: [event_type, job_id, cluster]
  exclude_fields: [cluster]
  routing_keys: [event_type]
- topic_name: lsf.trace
  type: job.status.trace
  include_fields: [queue_name, site]
  add_fields:
    site: east
    priority: 3
  routing_keys: [cluster, user_name]
"#;

    #[test]
    fn parse_topics_from_yaml() {
        let topics: Vec<Topic> = serde_yaml::from_str(TOPICS_YAML).unwrap();
        assert_eq!(topics.len(), 2);

        assert_eq!(topics[0].topic_name, "lsf.raw");
        assert_eq!(topics[0].kind, TopicKind::Raw);
        assert_eq!(topics[0].include_fields, ["event_type", "job_id", "cluster"]);
        assert_eq!(topics[0].exclude_fields, ["cluster"]);
        assert!(topics[0].add_fields.is_empty());

        assert_eq!(topics[1].kind, TopicKind::StatusTrace);
        assert_eq!(topics[1].add_fields["site"], FieldValue::from("east"));
        assert_eq!(topics[1].add_fields["priority"], FieldValue::Int(3));
        assert_eq!(topics[1].routing_keys, ["cluster", "user_name"]);
    }

    #[test]
    fn lists_default_to_empty() {
        let topic: Topic =
            serde_json::from_str(r#"{"topic_name":"t","type":"job.raw"}"#).unwrap();
        assert!(topic.include_fields.is_empty());
        assert!(topic.exclude_fields.is_empty());
        assert!(topic.routing_keys.is_empty());
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let topic: Topic =
            serde_json::from_str(r#"{"topic_name":"t","type":"job.metrics"}"#).unwrap();
        assert_eq!(topic.kind, TopicKind::Unsupported);
    }

    #[test]
    fn missing_name_is_rejected() {
        assert!(serde_json::from_str::<Topic>(r#"{"type":"job.raw"}"#).is_err());
    }
}
