use std::sync::Arc;

use parking_lot::ReentrantMutexGuard;

use crate::{AggregateId, BoxError, EventEnvelope, Result, Sequence, Topic};

/// Outcome of a subscriber handling one event.
pub type HandlerResult = std::result::Result<(), BoxError>;

/// A subscriber callback registered on a topic.
pub type Handler = Arc<dyn Fn(&EventEnvelope) -> HandlerResult + Send + Sync>;

/// Core trait for event log implementations.
///
/// The log is partitioned by [`Topic`]. Publishing appends the event to the
/// topic's history and then dispatches it synchronously to every subscriber
/// of that topic before returning. Handlers may publish further events; those
/// nested publishes complete (including their own dispatch) before the
/// handler returns.
pub trait EventLog: Send + Sync {
    /// Appends an event to `topic` and dispatches it to the topic's
    /// subscribers in subscription order.
    ///
    /// Returns the sequence assigned to the event. If a subscriber fails,
    /// dispatch stops and the failure is returned as
    /// [`EventLogError::Handler`](crate::EventLogError::Handler); the event
    /// remains appended.
    fn publish(&self, topic: &Topic, event: EventEnvelope) -> Result<Sequence>;

    /// Registers a handler for every future event on `topic`.
    ///
    /// Subscriptions last as long as the log and never see events published
    /// before they were registered.
    fn subscribe(&self, topic: &Topic, handler: Handler);

    /// Returns the topic's history in publish order.
    fn events(&self, topic: &Topic) -> Vec<EventEnvelope>;

    /// Returns the events on `topic` that concern one aggregate, in publish order.
    ///
    /// Implementations that can filter without copying the whole topic
    /// should override this.
    fn events_for_aggregate(&self, topic: &Topic, aggregate_id: AggregateId) -> Vec<EventEnvelope> {
        self.events(topic)
            .into_iter()
            .filter(|e| e.is_for(aggregate_id))
            .collect()
    }

    /// Returns the number of events appended to `topic`.
    fn event_count(&self, topic: &Topic) -> usize {
        self.events(topic).len()
    }

    /// Excludes other threads from publishing while the guard is held.
    ///
    /// The guard is re-entrant: the holding thread, and handlers it
    /// dispatches to, may publish freely. `publish` takes it for the whole
    /// cascade, and callers take it to keep a state change and the event
    /// recording it in the same order as every other thread's changes. Logs
    /// that offer no exclusion return [`CascadeGuard::unguarded`].
    fn cascade(&self) -> CascadeGuard<'_> {
        CascadeGuard::unguarded()
    }
}

/// Held while a thread owns the log's cascade. See [`EventLog::cascade`].
#[must_use = "the cascade is released as soon as the guard is dropped"]
pub struct CascadeGuard<'a> {
    _guard: Option<ReentrantMutexGuard<'a, ()>>,
}

impl<'a> CascadeGuard<'a> {
    /// Wraps a held re-entrant lock.
    pub fn new(guard: ReentrantMutexGuard<'a, ()>) -> Self {
        Self {
            _guard: Some(guard),
        }
    }

    /// A guard that excludes nothing.
    pub fn unguarded() -> Self {
        Self { _guard: None }
    }
}

/// Extension trait providing convenience methods for event logs.
pub trait EventLogExt: EventLog {
    /// Registers a closure as a handler.
    fn subscribe_fn<F>(&self, topic: &Topic, handler: F)
    where
        F: Fn(&EventEnvelope) -> HandlerResult + Send + Sync + 'static,
    {
        self.subscribe(topic, Arc::new(handler));
    }
}

// Blanket implementation for all EventLog implementations
impl<T: EventLog + ?Sized> EventLogExt for T {}
