//! Wiring services to topics without keeping them alive.

use std::sync::{Arc, Weak};

use event_log::{EventEnvelope, EventLog, EventLogExt, Topic};

use crate::error::DomainError;

/// Subscribes `handler` on behalf of `service`, holding only a weak reference.
///
/// Once the last strong reference to the service is dropped the subscription
/// stays registered but ignores every event.
pub(crate) fn subscribe_weak<S, L, F>(log: &L, topic: &Topic, service: &Arc<S>, handler: F)
where
    S: Send + Sync + 'static,
    L: EventLog + ?Sized,
    F: Fn(&S, &EventEnvelope) -> Result<(), DomainError> + Send + Sync + 'static,
{
    let service: Weak<S> = Arc::downgrade(service);
    log.subscribe_fn(topic, move |envelope| match service.upgrade() {
        Some(service) => handler(service.as_ref(), envelope).map_err(Into::into),
        None => Ok(()),
    });
}
