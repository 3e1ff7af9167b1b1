//! Delivery orders created from assembled kitchen orders.

mod order;
mod repository;
mod service;

pub use order::{
    DeliveryOrder, DeliveryOrderBuilder, DeliveryOrderEvent, DeliveryOrderProjection,
    DeliveryOrderState, DeliveryPizza,
};
pub use repository::DeliveryOrderRepository;
pub use service::DeliveryService;

use thiserror::Error;

/// Errors that can occur during delivery order operations.
#[derive(Debug, Error)]
pub enum DeliveryOrderError {
    /// A required field was not set on the builder.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
