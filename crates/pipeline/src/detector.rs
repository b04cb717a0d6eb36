//! Job state-change detection for `job.status.trace` topics.

use std::sync::Arc;

use lsfbeat_domain::keys::{PROPERTY_FIELDS, event_types, fields};
use lsfbeat_domain::{
    FieldMap, FieldValue, JobIdentity, LifecycleState, OutgoingMessage, ParsedEvent, Topic,
    classify, state_name,
};
use lsfbeat_state_store::{JobStateStore, PropertyCache, PropertySnapshot};

use crate::routing;

/// A reportable transition for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub identity: JobIdentity,
    /// Previously reported state code; `None` on first observation.
    pub last_code: Option<i64>,
    pub current: LifecycleState,
    pub reason: String,
    /// Creation-time properties, read before any terminal cleanup.
    pub properties: Option<PropertySnapshot>,
}

/// Decides whether an event is a new state for its job, keeping the state
/// store and property cache in step.
#[derive(Clone)]
pub struct TransitionDetector {
    states: Arc<JobStateStore>,
    properties: Arc<PropertyCache>,
}

impl TransitionDetector {
    pub fn new(states: Arc<JobStateStore>, properties: Arc<PropertyCache>) -> Self {
        Self { states, properties }
    }

    pub fn states(&self) -> &Arc<JobStateStore> {
        &self.states
    }

    pub fn properties(&self) -> &Arc<PropertyCache> {
        &self.properties
    }

    /// Capture the descriptive fields of a job-creation event. Overwrites any
    /// earlier snapshot for the same identity.
    pub fn record_properties(&self, event: &ParsedEvent) {
        if event.event_type() != event_types::JOB_NEW {
            return;
        }
        let identity = JobIdentity::from_event(event);
        let snapshot: PropertySnapshot = PROPERTY_FIELDS
            .iter()
            .map(|name| ((*name).to_string(), event.get_str(name)))
            .collect();
        self.properties.write(identity.key(), snapshot);
    }

    /// Apply `event` to the stores and return the transition it represents,
    /// if any. Repeats of the stored state and unclassifiable events yield
    /// `None`.
    pub fn detect(&self, event: &ParsedEvent) -> Option<StateChange> {
        self.record_properties(event);

        let classification = classify(event)?;
        let identity = JobIdentity::from_event(event);
        let key = identity.key();
        let code = classification.state.code();
        let properties = self.properties.read(&key);

        let last_code = match self.states.read(&key) {
            None => {
                if !classification.state.is_terminal_class() {
                    self.states.write(key, code);
                }
                None
            }
            Some(prev) if prev == code => {
                tracing::debug!(job = %identity, state = %classification.state, "state unchanged");
                return None;
            }
            Some(prev) => {
                if classification.state.is_terminal_class() {
                    self.states.delete(&key);
                    self.properties.delete(&key);
                } else {
                    self.states.write(key, code);
                }
                Some(prev)
            }
        };

        Some(StateChange {
            identity,
            last_code,
            current: classification.state,
            reason: classification.reason,
            properties,
        })
    }

    /// Detect a transition and shape it into a message for `topic`.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if the message body cannot be encoded.
    pub fn process(
        &self,
        event: &ParsedEvent,
        topic: &Topic,
    ) -> Result<Option<OutgoingMessage>, serde_json::Error> {
        match self.detect(event) {
            Some(change) => build_message(&change, event, topic).map(Some),
            None => Ok(None),
        }
    }
}

/// Build the change message. Property fields feed the routing key and
/// property map but are left out of the body text.
pub fn build_message(
    change: &StateChange,
    event: &ParsedEvent,
    topic: &Topic,
) -> Result<OutgoingMessage, serde_json::Error> {
    let mut body = FieldMap::new();
    body.insert(
        fields::CLUSTER.to_string(),
        FieldValue::from(change.identity.cluster.as_str()),
    );
    body.insert(
        fields::JOB_ID.to_string(),
        FieldValue::Int(change.identity.job_id),
    );
    body.insert(
        fields::JOB_INDEX.to_string(),
        FieldValue::Int(change.identity.job_index),
    );
    if let Some(last) = change.last_code {
        body.insert(fields::LAST_STATUS.to_string(), state_name(last).into());
    }
    body.insert(
        fields::CURRENT_STATUS.to_string(),
        change.current.as_str().into(),
    );
    body.insert(
        fields::CHANGE_REASON.to_string(),
        change.reason.as_str().into(),
    );

    for name in &topic.include_fields {
        if let Some(v) = event.get(name).or_else(|| topic.add_fields.get(name)) {
            body.insert(name.clone(), v.clone());
        }
    }

    let text = serde_json::to_string(&body)?;

    let mut routed = body;
    if let Some(props) = &change.properties {
        for name in PROPERTY_FIELDS {
            let value = props.get(name).cloned().unwrap_or_default();
            routed.insert(name.to_string(), FieldValue::Str(value));
        }
    }

    Ok(OutgoingMessage {
        text,
        topic: topic.topic_name.clone(),
        routing_key: routing::routing_key(&routed, &topic.routing_keys),
        properties: routing::properties(&routed, &topic.routing_keys),
    })
}
