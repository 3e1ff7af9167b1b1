use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{AggregateId, EventLogError, Topic};

/// Unique identifier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of an event within its topic.
///
/// The log assigns sequences at append time, starting at 1 for the first
/// event on a topic and increasing by 1 for each subsequent event. An
/// envelope that has not been published yet carries [`Sequence::unassigned`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Sequence(u64);

impl Sequence {
    /// Creates a sequence from a raw value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The sequence of an envelope that has not been appended yet.
    pub fn unassigned() -> Self {
        Self(0)
    }

    /// The sequence of the first event on a topic.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next sequence.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw sequence value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An event together with the metadata the log needs to route and replay it.
///
/// The payload is the serialized domain event. Envelopes are immutable once
/// appended; subscribers only ever see shared references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique identifier for this event.
    pub event_id: EventId,

    /// The topic the event was published on. Stamped by the log.
    pub topic: Topic,

    /// The kind of the event (e.g., "PizzaBakeStarted").
    pub event_type: String,

    /// The aggregate this event concerns.
    pub aggregate_id: AggregateId,

    /// The type of aggregate (e.g., "Pizza", "KitchenOrder").
    pub aggregate_type: String,

    /// Position within the topic. Stamped by the log.
    pub sequence: Sequence,

    /// When the event was created.
    pub timestamp: DateTime<Utc>,

    /// The event payload as JSON.
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    /// Creates a new event envelope builder.
    pub fn builder() -> EventEnvelopeBuilder {
        EventEnvelopeBuilder::default()
    }

    /// Deserializes the payload into a typed event.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }

    /// Returns true if this envelope concerns the given aggregate.
    pub fn is_for(&self, aggregate_id: AggregateId) -> bool {
        self.aggregate_id == aggregate_id
    }
}

/// Builder for constructing event envelopes.
#[derive(Debug, Default)]
pub struct EventEnvelopeBuilder {
    event_type: Option<String>,
    aggregate_id: Option<AggregateId>,
    aggregate_type: Option<String>,
    payload: Option<serde_json::Value>,
}

impl EventEnvelopeBuilder {
    /// Sets the event type.
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Sets the aggregate ID.
    pub fn aggregate_id(mut self, id: impl Into<AggregateId>) -> Self {
        self.aggregate_id = Some(id.into());
        self
    }

    /// Sets the aggregate type.
    pub fn aggregate_type(mut self, aggregate_type: impl Into<String>) -> Self {
        self.aggregate_type = Some(aggregate_type.into());
        self
    }

    /// Sets the payload from a serializable value.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    /// Sets the payload from a raw JSON value.
    pub fn payload_raw(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Builds the event envelope.
    ///
    /// Fails with [`EventLogError::MissingField`] if the event type, aggregate
    /// ID, aggregate type or payload were not set. A fresh event ID and the
    /// current time are stamped here; topic and sequence are left for the log
    /// to stamp on publish.
    pub fn build(self) -> Result<EventEnvelope, EventLogError> {
        Ok(EventEnvelope {
            event_id: EventId::new(),
            topic: Topic::from_static(""),
            event_type: self
                .event_type
                .ok_or(EventLogError::MissingField("event_type"))?,
            aggregate_id: self
                .aggregate_id
                .ok_or(EventLogError::MissingField("aggregate_id"))?,
            aggregate_type: self
                .aggregate_type
                .ok_or(EventLogError::MissingField("aggregate_type"))?,
            sequence: Sequence::unassigned(),
            timestamp: Utc::now(),
            payload: self.payload.ok_or(EventLogError::MissingField("payload"))?,
        })
    }
}
