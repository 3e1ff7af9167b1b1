//! Core aggregate and domain event traits.

use std::fmt;

use common::AggregateRef;
use event_log::{EventEnvelope, Topic};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::DomainError;

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone + fmt::Debug {
    /// Returns the event type name.
    ///
    /// This is the kind tag recorded on the envelope.
    fn event_type(&self) -> &'static str;

    /// Every kind tag this event enum can decode.
    const EVENT_TYPES: &'static [&'static str];

    /// Returns true for the event that introduces an aggregate to its topic.
    fn is_added(&self) -> bool;
}

/// Trait for aggregates in an event-sourced system.
///
/// An aggregate's state is a pure function of its event history: folding the
/// history through [`apply`](Aggregate::apply), starting from
/// [`identity`](Aggregate::identity), always yields the live instance.
pub trait Aggregate: Clone + fmt::Debug + Send + Sync + Sized + 'static {
    /// Identity type of this aggregate.
    type Ref: AggregateRef;

    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Serializable snapshot of the aggregate's durable attributes.
    type Projection: Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync;

    /// The type of errors this aggregate's transitions can produce.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the aggregate type name.
    fn aggregate_type() -> &'static str;

    /// Returns the topic this aggregate's events are published on.
    fn topic() -> Topic;

    /// Returns the empty seed instance that replay folds from.
    ///
    /// The identity carries nil refs and is never handed out as an entity.
    fn identity() -> Self;

    /// Returns the aggregate's ref.
    fn reference(&self) -> Self::Ref;

    /// Returns the current projection.
    fn projection(&self) -> Self::Projection;

    /// Returns the event announcing this instance to its topic.
    fn added_event(&self) -> Self::Event;

    /// Folds one event into the aggregate.
    ///
    /// This function must be pure and deterministic. It is total over
    /// [`Self::Event`]; event kinds outside that enum are rejected when the
    /// envelope is decoded.
    fn apply(self, event: Self::Event) -> Self;

    /// Folds a sequence of events starting from [`identity`](Aggregate::identity).
    fn replay(events: impl IntoIterator<Item = Self::Event>) -> Self {
        events
            .into_iter()
            .fold(Self::identity(), |aggregate, event| aggregate.apply(event))
    }

    /// Decodes an envelope from this aggregate's topic into a typed event.
    ///
    /// Kinds outside [`DomainEvent::EVENT_TYPES`] are rejected as unknown; a
    /// known kind whose payload does not decode is a serialization error.
    fn decode_event(envelope: &EventEnvelope) -> Result<Self::Event, DomainError> {
        if !<Self::Event as DomainEvent>::EVENT_TYPES.contains(&envelope.event_type.as_str()) {
            return Err(DomainError::UnknownEventKind {
                aggregate_type: Self::aggregate_type(),
                event_type: envelope.event_type.clone(),
            });
        }
        Ok(envelope.decode()?)
    }
}
