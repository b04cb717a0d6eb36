use std::borrow::Cow;
use std::sync::Arc;

use lsfbeat_domain::{OutgoingMessage, ParsedEvent, Topic, TopicKind};

use crate::detector::TransitionDetector;
use crate::parser::{FileType, RecordParser};
use crate::projector;

/// Parses one raw record and fans it out across topics. Runs synchronously;
/// the pipeline worker serializes calls.
pub struct RecordProcessor {
    parser: Arc<dyn RecordParser>,
    detector: TransitionDetector,
}

impl RecordProcessor {
    pub fn new(parser: Arc<dyn RecordParser>, detector: TransitionDetector) -> Self {
        Self { parser, detector }
    }

    /// Messages produced by `raw` for each topic, in topic order. Parser
    /// output that is not a JSON object produces no messages.
    pub fn process(
        &self,
        raw: &str,
        file_type: FileType,
        topics: &[Topic],
    ) -> Vec<OutgoingMessage> {
        let output = self.parser.parse(raw, file_type);
        let event = match ParsedEvent::from_json(&output) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(file_type = %file_type, error = %e, "discarding unparsable record");
                return Vec::new();
            }
        };

        let mut messages = Vec::with_capacity(topics.len());
        for topic in topics {
            // Injected fields are scoped to this topic's projection.
            let scoped = if topic.add_fields.is_empty() {
                Cow::Borrowed(&event)
            } else {
                let mut owned = event.clone();
                owned.extend(&topic.add_fields);
                Cow::Owned(owned)
            };

            let result = match topic.kind {
                TopicKind::Raw => projector::project_raw(&scoped, topic).map(Some),
                TopicKind::StatusTrace => self.detector.process(&scoped, topic),
                TopicKind::Unsupported => {
                    tracing::warn!(topic = %topic.topic_name, "unsupported topic type, skipping");
                    continue;
                }
            };

            match result {
                Ok(Some(msg)) => {
                    tracing::debug!(topic = %msg.topic, text = %msg.text, "message produced");
                    messages.push(msg);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        topic = %topic.topic_name,
                        error = %e,
                        "failed to encode message"
                    );
                }
            }
        }
        messages
    }
}
