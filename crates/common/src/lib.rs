//! Shared types for the pizza kitchen event-sourcing kernel.
//!
//! Every aggregate is identified by a typed ref (a UUID newtype per aggregate
//! type). Refs convert into the untyped [`AggregateId`] carried on event
//! envelopes, which is what the event log filters on during replay.

pub mod size;
pub mod types;

pub use size::{ParseSizeError, Size};
pub use types::{
    AggregateId, AggregateRef, DeliveryOrderRef, KitchenOrderRef, OnlineOrderRef, PizzaRef,
};
