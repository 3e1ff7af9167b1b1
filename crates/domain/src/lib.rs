//! Domain layer for the pizza shop kitchen.
//!
//! This crate provides:
//! - Aggregate and DomainEvent traits for event-sourced entities
//! - A generic repository that persists aggregates purely as events
//! - The Pizza, KitchenOrder and DeliveryOrder state machines
//! - KitchenService and DeliveryService, which turn one aggregate's events
//!   into transitions on others

pub mod aggregate;
pub mod delivery;
pub mod error;
pub mod kitchen;
pub mod ordering;
pub mod repository;
mod subscriber;
pub mod topics;

pub use aggregate::{Aggregate, DomainEvent};
pub use delivery::{
    DeliveryOrder, DeliveryOrderError, DeliveryOrderEvent, DeliveryOrderProjection,
    DeliveryOrderRepository, DeliveryOrderState, DeliveryPizza, DeliveryService,
};
pub use error::DomainError;
pub use kitchen::{
    KitchenOrder, KitchenOrderError, KitchenOrderEvent, KitchenOrderProjection,
    KitchenOrderRepository, KitchenOrderState, KitchenService, OrderedPizza, Pizza, PizzaError,
    PizzaEvent, PizzaProjection, PizzaRepository, PizzaState,
};
pub use ordering::{
    InMemoryOrderingService, OnlineOrder, OnlineOrderPizza, OrderingError, OrderingEvent,
    OrderingService,
};
pub use repository::EventSourcedRepository;
