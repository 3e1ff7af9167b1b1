//! Boundary to the ordering subsystem.
//!
//! The kitchen only consumes ordering: it reacts to
//! [`OrderingEvent::OnlineOrderPaid`] on the [`ORDERING`](crate::topics::ORDERING)
//! topic and pulls the paid order's pizzas through [`OrderingService`].

use std::collections::HashMap;
use std::sync::Arc;

use common::{AggregateRef, OnlineOrderRef, Size};
use event_log::{EventEnvelope, EventLog};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::DomainError;
use crate::topics;

/// Errors raised at the ordering boundary.
#[derive(Debug, Error)]
pub enum OrderingError {
    /// The ordering subsystem has no order with this ref.
    #[error("Online order not found: {0}")]
    OnlineOrderNotFound(OnlineOrderRef),
}

/// A pizza line on an online order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineOrderPizza {
    pub size: Size,
}

/// Projection of an online order as exposed by the ordering subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineOrder {
    pub reference: OnlineOrderRef,
    pub pizzas: Vec<OnlineOrderPizza>,
}

/// Events the ordering subsystem publishes that the kitchen consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderingEvent {
    /// The online order was paid for and can be cooked.
    OnlineOrderPaid { online_order_ref: OnlineOrderRef },
}

impl OrderingEvent {
    /// Kind tag of [`OrderingEvent::OnlineOrderPaid`].
    pub const ONLINE_ORDER_PAID: &'static str = "OnlineOrderPaid";

    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            OrderingEvent::OnlineOrderPaid { .. } => Self::ONLINE_ORDER_PAID,
        }
    }

    /// Wraps the event in an envelope for the ordering topic.
    pub fn to_envelope(&self) -> Result<EventEnvelope, DomainError> {
        let OrderingEvent::OnlineOrderPaid { online_order_ref } = self;
        Ok(EventEnvelope::builder()
            .event_type(self.event_type())
            .aggregate_id(online_order_ref.aggregate_id())
            .aggregate_type("OnlineOrder")
            .payload(self)?
            .build()?)
    }
}

/// Read access to online orders.
pub trait OrderingService: Send + Sync {
    /// Returns the online order, or `None` if the ref is unknown.
    fn find_by_ref(&self, reference: OnlineOrderRef) -> Option<OnlineOrder>;
}

/// In-memory ordering subsystem for tests and the demo.
///
/// Orders are registered directly; paying for one publishes
/// [`OrderingEvent::OnlineOrderPaid`] on the ordering topic.
#[derive(Clone)]
pub struct InMemoryOrderingService<L: EventLog> {
    log: L,
    orders: Arc<RwLock<HashMap<OnlineOrderRef, OnlineOrder>>>,
}

impl<L: EventLog> InMemoryOrderingService<L> {
    /// Creates an ordering service publishing on the given log.
    pub fn new(log: L) -> Self {
        Self {
            log,
            orders: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Records a new online order for the given pizza sizes.
    pub fn place_order(&self, sizes: impl IntoIterator<Item = Size>) -> OnlineOrderRef {
        let reference = OnlineOrderRef::generate();
        let order = OnlineOrder {
            reference,
            pizzas: sizes
                .into_iter()
                .map(|size| OnlineOrderPizza { size })
                .collect(),
        };
        self.orders.write().insert(reference, order);
        reference
    }

    /// Publishes the paid event for an order and runs the resulting cascade.
    #[tracing::instrument(skip(self))]
    pub fn pay(&self, reference: OnlineOrderRef) -> Result<(), DomainError> {
        if !self.orders.read().contains_key(&reference) {
            return Err(OrderingError::OnlineOrderNotFound(reference).into());
        }
        let envelope = OrderingEvent::OnlineOrderPaid {
            online_order_ref: reference,
        }
        .to_envelope()?;
        self.log.publish(&topics::ORDERING, envelope)?;
        Ok(())
    }
}

impl<L: EventLog> OrderingService for InMemoryOrderingService<L> {
    fn find_by_ref(&self, reference: OnlineOrderRef) -> Option<OnlineOrder> {
        self.orders.read().get(&reference).cloned()
    }
}
