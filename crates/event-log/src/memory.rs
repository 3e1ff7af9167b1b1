use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};

use crate::{
    AggregateId, EventEnvelope, EventLogError, Result, Sequence, Topic,
    log::{CascadeGuard, EventLog, Handler},
};

#[derive(Default)]
struct Partition {
    events: Vec<EventEnvelope>,
    subscribers: Vec<Handler>,
}

impl Partition {
    fn next_sequence(&self) -> Sequence {
        self.events
            .last()
            .map(|e| e.sequence.next())
            .unwrap_or_else(Sequence::first)
    }
}

/// In-memory event log.
///
/// Histories and subscriber lists live behind a single lock that is released
/// before any handler runs, so handlers can publish and subscribe re-entrantly.
/// A separate re-entrant lock is held for each whole cascade, so cascades
/// started on different threads never interleave.
/// Cloning the log yields another handle to the same partitions.
#[derive(Clone, Default)]
pub struct InMemoryEventLog {
    topics: Arc<RwLock<HashMap<Topic, Partition>>>,
    cascade: Arc<ReentrantMutex<()>>,
}

impl InMemoryEventLog {
    /// Creates a new empty in-memory event log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of handlers subscribed to `topic`.
    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        self.topics
            .read()
            .get(topic)
            .map(|p| p.subscribers.len())
            .unwrap_or(0)
    }

    /// Returns the total number of events across all topics.
    pub fn total_event_count(&self) -> usize {
        self.topics.read().values().map(|p| p.events.len()).sum()
    }
}

impl std::fmt::Debug for InMemoryEventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let topics = self.topics.read();
        let mut map = f.debug_map();
        for (topic, partition) in topics.iter() {
            map.entry(&topic.as_str(), &partition.events.len());
        }
        map.finish()
    }
}

impl EventLog for InMemoryEventLog {
    fn publish(&self, topic: &Topic, mut event: EventEnvelope) -> Result<Sequence> {
        let _cascade = self.cascade();
        let (sequence, subscribers) = {
            let mut topics = self.topics.write();
            let partition = topics.entry(topic.clone()).or_default();
            let sequence = partition.next_sequence();
            event.topic = topic.clone();
            event.sequence = sequence;
            partition.events.push(event.clone());
            (sequence, partition.subscribers.clone())
        };

        metrics::counter!("event_log_events_published_total", "topic" => topic.to_string())
            .increment(1);
        tracing::debug!(
            %topic,
            event_id = %event.event_id,
            event_type = %event.event_type,
            aggregate_id = %event.aggregate_id,
            %sequence,
            subscribers = subscribers.len(),
            "event published"
        );

        for handler in &subscribers {
            if let Err(source) = handler(&event) {
                metrics::counter!("event_log_handler_failures_total", "topic" => topic.to_string())
                    .increment(1);
                tracing::error!(
                    %topic,
                    event_type = %event.event_type,
                    %sequence,
                    error = %source,
                    "subscriber failed, aborting dispatch"
                );
                return Err(EventLogError::Handler {
                    topic: topic.clone(),
                    event_type: event.event_type.clone(),
                    source,
                });
            }
        }

        Ok(sequence)
    }

    fn subscribe(&self, topic: &Topic, handler: Handler) {
        self.topics
            .write()
            .entry(topic.clone())
            .or_default()
            .subscribers
            .push(handler);
        tracing::debug!(%topic, "subscriber registered");
    }

    fn events(&self, topic: &Topic) -> Vec<EventEnvelope> {
        self.topics
            .read()
            .get(topic)
            .map(|p| p.events.clone())
            .unwrap_or_default()
    }

    fn events_for_aggregate(&self, topic: &Topic, aggregate_id: AggregateId) -> Vec<EventEnvelope> {
        self.topics
            .read()
            .get(topic)
            .map(|p| {
                p.events
                    .iter()
                    .filter(|e| e.is_for(aggregate_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn event_count(&self, topic: &Topic) -> usize {
        self.topics
            .read()
            .get(topic)
            .map(|p| p.events.len())
            .unwrap_or(0)
    }

    fn cascade(&self) -> CascadeGuard<'_> {
        CascadeGuard::new(self.cascade.lock())
    }
}
