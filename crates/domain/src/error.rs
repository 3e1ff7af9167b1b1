//! Domain error types.

use event_log::EventLogError;
use thiserror::Error;

use crate::delivery::DeliveryOrderError;
use crate::kitchen::{KitchenOrderError, PizzaError};
use crate::ordering::OrderingError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the event log, including failures of subscribers
    /// further down a cascade.
    #[error("Event log error: {0}")]
    EventLog(#[from] EventLogError),

    /// A pizza rejected an operation.
    #[error("Pizza error: {0}")]
    Pizza(#[from] PizzaError),

    /// A kitchen order rejected an operation.
    #[error("Kitchen order error: {0}")]
    KitchenOrder(#[from] KitchenOrderError),

    /// A delivery order rejected an operation.
    #[error("Delivery order error: {0}")]
    DeliveryOrder(#[from] DeliveryOrderError),

    /// The ordering collaborator could not satisfy a lookup.
    #[error("Ordering error: {0}")]
    Ordering(#[from] OrderingError),

    /// Aggregate not found.
    #[error("Aggregate not found: {aggregate_type} with id {aggregate_id}")]
    AggregateNotFound {
        aggregate_type: &'static str,
        aggregate_id: String,
    },

    /// An instance with this ref has already been added.
    #[error("Aggregate already added: {aggregate_type} with id {aggregate_id}")]
    AlreadyAdded {
        aggregate_type: &'static str,
        aggregate_id: String,
    },

    /// The identity seed cannot be added as an entity.
    #[error("Cannot add the identity instance of {aggregate_type}")]
    IdentityNotAddable { aggregate_type: &'static str },

    /// An event on the aggregate's topic is not a kind the aggregate knows.
    #[error("Unknown {aggregate_type} event kind {event_type}")]
    UnknownEventKind {
        aggregate_type: &'static str,
        event_type: String,
    },

    /// An aggregate's history violates the added-event invariant.
    #[error("Corrupt history for {aggregate_type} {aggregate_id}: {reason}")]
    CorruptHistory {
        aggregate_type: &'static str,
        aggregate_id: String,
        reason: &'static str,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Walks nested subscriber failures down to the error that started them.
    ///
    /// A transition rejected deep inside a cascade reaches the outermost
    /// publisher wrapped once per dispatch level; this returns the innermost
    /// domain error.
    pub fn root_cause(&self) -> &DomainError {
        let mut current = self;
        while let DomainError::EventLog(EventLogError::Handler { source, .. }) = current {
            match source.downcast_ref::<DomainError>() {
                Some(inner) => current = inner,
                None => break,
            }
        }
        current
    }

    /// Returns true if the root cause is a rejected state transition.
    pub fn is_invalid_transition(&self) -> bool {
        matches!(
            self.root_cause(),
            DomainError::Pizza(PizzaError::InvalidStateTransition { .. })
                | DomainError::KitchenOrder(KitchenOrderError::InvalidStateTransition { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kitchen::PizzaState;
    use event_log::Topic;

    fn rejected() -> DomainError {
        DomainError::Pizza(PizzaError::InvalidStateTransition {
            current_state: PizzaState::New,
            action: "finish bake",
        })
    }

    #[test]
    fn root_cause_unwraps_nested_handler_failures() {
        let nested = DomainError::EventLog(EventLogError::Handler {
            topic: Topic::from_static("pizzas"),
            event_type: "PizzaPrepFinished".to_string(),
            source: Box::new(DomainError::EventLog(EventLogError::Handler {
                topic: Topic::from_static("kitchen_orders"),
                event_type: "KitchenOrderPrepStarted".to_string(),
                source: Box::new(rejected()),
            })),
        });

        assert!(matches!(
            nested.root_cause(),
            DomainError::Pizza(PizzaError::InvalidStateTransition { .. })
        ));
        assert!(nested.is_invalid_transition());
    }

    #[test]
    fn root_cause_stops_at_foreign_errors() {
        let err = DomainError::EventLog(EventLogError::Handler {
            topic: Topic::from_static("pizzas"),
            event_type: "PizzaAdded".to_string(),
            source: "not a domain error".into(),
        });

        assert!(std::ptr::eq(err.root_cause(), &err));
        assert!(!err.is_invalid_transition());
    }

    #[test]
    fn root_cause_of_plain_error_is_itself() {
        let err = rejected();
        assert!(std::ptr::eq(err.root_cause(), &err));
    }

    #[test]
    fn display_includes_transition_detail() {
        assert_eq!(
            rejected().to_string(),
            "Pizza error: Invalid state transition: cannot finish bake from NEW state"
        );
    }
}
