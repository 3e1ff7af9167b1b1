//! Generic event-sourced repository.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use common::{AggregateId, AggregateRef};
use event_log::{EventEnvelope, EventLog, EventLogExt};
use parking_lot::Mutex;

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;

/// Repository that persists an aggregate type purely as events on its topic.
///
/// The repository is responsible for:
/// 1. Allocating refs
/// 2. Publishing the added event that makes an instance discoverable
/// 3. Rebuilding instances by replaying their history on a cache miss
/// 4. Running transitions: validate, fold into the cached instance, publish
///
/// The cache lock is never held while an event is dispatched, so subscribers
/// reacting to an event may look up or transition aggregates of the same
/// repository. Additions and transitions run under the log's cascade guard,
/// so concurrent callers record events in the order they changed state.
pub struct EventSourcedRepository<A, L>
where
    A: Aggregate,
    L: EventLog,
{
    log: L,
    cache: Mutex<HashMap<A::Ref, A>>,
    // Every aggregate with history on the topic.
    known: Arc<Mutex<HashSet<AggregateId>>>,
}

impl<A, L> EventSourcedRepository<A, L>
where
    A: Aggregate,
    L: EventLog,
{
    /// Creates a new repository on the given event log.
    ///
    /// Reads the topic's existing history once to learn which refs are
    /// taken, then tracks new ones as they are published.
    pub fn new(log: L) -> Self {
        let known: Arc<Mutex<HashSet<AggregateId>>> = Arc::default();

        let sink = Arc::clone(&known);
        log.subscribe_fn(&A::topic(), move |envelope| {
            sink.lock().insert(envelope.aggregate_id);
            Ok(())
        });
        known
            .lock()
            .extend(log.events(&A::topic()).iter().map(|e| e.aggregate_id));

        Self {
            log,
            cache: Mutex::new(HashMap::new()),
            known,
        }
    }

    /// Returns a reference to the underlying event log.
    pub fn log(&self) -> &L {
        &self.log
    }

    /// Allocates a fresh ref for a new instance.
    pub fn next_identity(&self) -> A::Ref {
        A::Ref::generate()
    }

    /// Publishes the added event for a freshly built instance.
    ///
    /// This is the only way an instance becomes visible to
    /// [`find_by_ref`](Self::find_by_ref). Fails before publishing if the ref
    /// was already added or is the identity ref.
    #[tracing::instrument(
        skip(self, aggregate),
        fields(aggregate_type = A::aggregate_type(), reference = %aggregate.reference())
    )]
    pub fn add(&self, aggregate: A) -> Result<(), DomainError> {
        let _cascade = self.log.cascade();
        let reference = aggregate.reference();
        if reference.is_identity() {
            return Err(DomainError::IdentityNotAddable {
                aggregate_type: A::aggregate_type(),
            });
        }
        if self.is_known(reference) {
            return Err(DomainError::AlreadyAdded {
                aggregate_type: A::aggregate_type(),
                aggregate_id: reference.to_string(),
            });
        }

        let envelope = Self::envelope(reference, &aggregate.added_event())?;
        self.log.publish(&A::topic(), envelope)?;

        // Subscribers may already have loaded and advanced the instance.
        self.cache.lock().entry(reference).or_insert(aggregate);
        tracing::debug!("aggregate added");
        Ok(())
    }

    /// Returns the current instance, or `None` if it was never added.
    ///
    /// Cached instances are returned directly; anything else is rebuilt from
    /// the log and cached.
    pub fn find_by_ref(&self, reference: A::Ref) -> Result<Option<A>, DomainError> {
        if let Some(aggregate) = self.cache.lock().get(&reference) {
            return Ok(Some(aggregate.clone()));
        }

        let Some(aggregate) = self.replay(reference)? else {
            return Ok(None);
        };
        Ok(Some(
            self.cache
                .lock()
                .entry(reference)
                .or_insert(aggregate)
                .clone(),
        ))
    }

    /// Rebuilds an instance from its history, bypassing the cache.
    ///
    /// Fails if the history does not start with exactly one added event or
    /// contains an event kind the aggregate does not know.
    #[tracing::instrument(skip(self), fields(aggregate_type = A::aggregate_type()))]
    pub fn replay(&self, reference: A::Ref) -> Result<Option<A>, DomainError> {
        let envelopes = self
            .log
            .events_for_aggregate(&A::topic(), reference.aggregate_id());
        if envelopes.is_empty() {
            return Ok(None);
        }

        metrics::counter!("repository_replays_total", "aggregate_type" => A::aggregate_type())
            .increment(1);

        let mut aggregate = A::identity();
        for (index, envelope) in envelopes.iter().enumerate() {
            let event = A::decode_event(envelope)?;
            match (index, event.is_added()) {
                (0, false) => {
                    return Err(Self::corrupt(
                        reference,
                        "history does not start with an added event",
                    ));
                }
                (1.., true) => {
                    return Err(Self::corrupt(
                        reference,
                        "history contains a second added event",
                    ));
                }
                _ => {}
            }
            aggregate = aggregate.apply(event);
        }

        tracing::debug!(events = envelopes.len(), "aggregate replayed");
        Ok(Some(aggregate))
    }

    /// Runs a transition against an existing instance.
    ///
    /// The command inspects the current instance and returns exactly one
    /// event, or an error if the transition is not legal, in which case
    /// nothing is published. The event is folded into the cached instance
    /// before it is published, so subscribers observe the new state. Returns
    /// the instance as it stood right after this transition.
    #[tracing::instrument(
        skip(self, command),
        fields(aggregate_type = A::aggregate_type(), %reference)
    )]
    pub fn execute<F>(&self, reference: A::Ref, command: F) -> Result<A, DomainError>
    where
        F: FnOnce(&A) -> Result<A::Event, A::Error>,
        DomainError: From<A::Error>,
    {
        // Held until the event is published, so no other thread's transition
        // lands between the cache update and the append.
        let _cascade = self.log.cascade();
        let (updated, envelope) = {
            let mut cache = self.cache.lock();
            let current = match cache.get(&reference) {
                Some(aggregate) => aggregate.clone(),
                None => self
                    .replay(reference)?
                    .ok_or_else(|| DomainError::AggregateNotFound {
                        aggregate_type: A::aggregate_type(),
                        aggregate_id: reference.to_string(),
                    })?,
            };

            let event = command(&current)?;
            let envelope = Self::envelope(reference, &event)?;
            let updated = current.apply(event);
            cache.insert(reference, updated.clone());
            (updated, envelope)
        };

        tracing::debug!(event_type = %envelope.event_type, "transition applied");
        self.log.publish(&A::topic(), envelope)?;
        Ok(updated)
    }

    /// Calls `handler` with the freshly added instance for every added event
    /// on the aggregate's topic.
    ///
    /// Concrete repositories use this to maintain their secondary indexes.
    /// Other event kinds are ignored; an event that does not decode fails the
    /// publish that carried it.
    pub fn on_added<F>(&self, handler: F)
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        self.log.subscribe_fn(&A::topic(), move |envelope| {
            let event = A::decode_event(envelope)?;
            if event.is_added() {
                handler(&A::identity().apply(event));
            }
            Ok(())
        });
    }

    /// Returns true if the instance is currently held in the cache.
    pub fn is_cached(&self, reference: A::Ref) -> bool {
        self.cache.lock().contains_key(&reference)
    }

    /// Drops every cached instance; later lookups replay from the log.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    fn is_known(&self, reference: A::Ref) -> bool {
        self.known.lock().contains(&reference.aggregate_id())
    }

    fn envelope(reference: A::Ref, event: &A::Event) -> Result<EventEnvelope, DomainError> {
        Ok(EventEnvelope::builder()
            .event_type(event.event_type())
            .aggregate_id(reference.aggregate_id())
            .aggregate_type(A::aggregate_type())
            .payload(event)?
            .build()?)
    }

    fn corrupt(reference: A::Ref, reason: &'static str) -> DomainError {
        DomainError::CorruptHistory {
            aggregate_type: A::aggregate_type(),
            aggregate_id: reference.to_string(),
            reason,
        }
    }
}
