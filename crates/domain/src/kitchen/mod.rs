//! Kitchen aggregates, repositories and coordination.

mod events;
mod order;
mod pizza;
mod repository;
mod service;
mod state;

pub use events::{KitchenOrderEvent, PizzaEvent};
pub use order::{KitchenOrder, KitchenOrderBuilder, KitchenOrderProjection, OrderedPizza};
pub use pizza::{Pizza, PizzaBuilder, PizzaProjection};
pub use repository::{KitchenOrderRepository, PizzaRepository};
pub use service::KitchenService;
pub use state::{KitchenOrderState, PizzaState};

use thiserror::Error;

/// Errors that can occur during pizza operations.
#[derive(Debug, Error)]
pub enum PizzaError {
    /// Pizza is not in the expected state.
    #[error("Invalid state transition: cannot {action} from {current_state} state")]
    InvalidStateTransition {
        current_state: PizzaState,
        action: &'static str,
    },

    /// A required field was not set on the builder.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Errors that can occur during kitchen order operations.
#[derive(Debug, Error)]
pub enum KitchenOrderError {
    /// Kitchen order is not in the expected state.
    #[error("Invalid state transition: cannot {action} from {current_state} state")]
    InvalidStateTransition {
        current_state: KitchenOrderState,
        action: &'static str,
    },

    /// A required field was not set on the builder.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
