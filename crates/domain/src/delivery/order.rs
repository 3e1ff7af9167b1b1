//! Delivery order aggregate implementation.

use common::{AggregateRef, DeliveryOrderRef, KitchenOrderRef, OnlineOrderRef, Size};
use event_log::Topic;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::topics;

use super::DeliveryOrderError;

/// The state of a delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryOrderState {
    /// Assembled and waiting for a driver.
    #[default]
    ReadyForDelivery,
}

impl DeliveryOrderState {
    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryOrderState::ReadyForDelivery => "READY_FOR_DELIVERY",
        }
    }
}

impl std::fmt::Display for DeliveryOrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A pizza line on a delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryPizza {
    pub size: Size,
}

/// Events that can occur on a delivery order aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DeliveryOrderEvent {
    /// An assembled kitchen order was handed to delivery.
    DeliveryOrderAdded {
        delivery_order_ref: DeliveryOrderRef,
        projection: DeliveryOrderProjection,
    },
}

impl DomainEvent for DeliveryOrderEvent {
    const EVENT_TYPES: &'static [&'static str] = &["DeliveryOrderAdded"];

    fn event_type(&self) -> &'static str {
        match self {
            DeliveryOrderEvent::DeliveryOrderAdded { .. } => "DeliveryOrderAdded",
        }
    }

    fn is_added(&self) -> bool {
        matches!(self, DeliveryOrderEvent::DeliveryOrderAdded { .. })
    }
}

/// An order that has left the kitchen.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryOrder {
    reference: DeliveryOrderRef,
    kitchen_order_ref: KitchenOrderRef,
    online_order_ref: OnlineOrderRef,
    pizzas: Vec<DeliveryPizza>,
    state: DeliveryOrderState,
}

/// Serializable snapshot of a delivery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOrderProjection {
    pub reference: DeliveryOrderRef,
    pub kitchen_order_ref: KitchenOrderRef,
    pub online_order_ref: OnlineOrderRef,
    pub pizzas: Vec<DeliveryPizza>,
    pub state: DeliveryOrderState,
}

impl From<DeliveryOrderProjection> for DeliveryOrder {
    fn from(projection: DeliveryOrderProjection) -> Self {
        DeliveryOrder {
            reference: projection.reference,
            kitchen_order_ref: projection.kitchen_order_ref,
            online_order_ref: projection.online_order_ref,
            pizzas: projection.pizzas,
            state: projection.state,
        }
    }
}

impl Aggregate for DeliveryOrder {
    type Ref = DeliveryOrderRef;
    type Event = DeliveryOrderEvent;
    type Projection = DeliveryOrderProjection;
    type Error = DeliveryOrderError;

    fn aggregate_type() -> &'static str {
        "DeliveryOrder"
    }

    fn topic() -> Topic {
        topics::DELIVERY_ORDERS
    }

    fn identity() -> Self {
        DeliveryOrder {
            reference: DeliveryOrderRef::identity(),
            kitchen_order_ref: KitchenOrderRef::identity(),
            online_order_ref: OnlineOrderRef::identity(),
            pizzas: Vec::new(),
            state: DeliveryOrderState::ReadyForDelivery,
        }
    }

    fn reference(&self) -> DeliveryOrderRef {
        self.reference
    }

    fn projection(&self) -> DeliveryOrderProjection {
        DeliveryOrderProjection {
            reference: self.reference,
            kitchen_order_ref: self.kitchen_order_ref,
            online_order_ref: self.online_order_ref,
            pizzas: self.pizzas.clone(),
            state: self.state,
        }
    }

    fn added_event(&self) -> DeliveryOrderEvent {
        DeliveryOrderEvent::DeliveryOrderAdded {
            delivery_order_ref: self.reference,
            projection: self.projection(),
        }
    }

    fn apply(self, event: DeliveryOrderEvent) -> Self {
        match event {
            DeliveryOrderEvent::DeliveryOrderAdded { projection, .. } => {
                DeliveryOrder::from(projection)
            }
        }
    }
}

impl DeliveryOrder {
    /// Creates a builder for a new delivery order.
    pub fn builder() -> DeliveryOrderBuilder {
        DeliveryOrderBuilder::default()
    }

    pub fn kitchen_order_ref(&self) -> KitchenOrderRef {
        self.kitchen_order_ref
    }

    pub fn online_order_ref(&self) -> OnlineOrderRef {
        self.online_order_ref
    }

    pub fn pizzas(&self) -> &[DeliveryPizza] {
        &self.pizzas
    }

    pub fn state(&self) -> DeliveryOrderState {
        self.state
    }
}

/// Builder for [`DeliveryOrder`].
#[derive(Debug, Default)]
pub struct DeliveryOrderBuilder {
    reference: Option<DeliveryOrderRef>,
    kitchen_order_ref: Option<KitchenOrderRef>,
    online_order_ref: Option<OnlineOrderRef>,
    pizzas: Vec<DeliveryPizza>,
}

impl DeliveryOrderBuilder {
    pub fn reference(mut self, reference: DeliveryOrderRef) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn kitchen_order_ref(mut self, kitchen_order_ref: KitchenOrderRef) -> Self {
        self.kitchen_order_ref = Some(kitchen_order_ref);
        self
    }

    pub fn online_order_ref(mut self, online_order_ref: OnlineOrderRef) -> Self {
        self.online_order_ref = Some(online_order_ref);
        self
    }

    /// Adds one pizza per size.
    pub fn pizzas(mut self, sizes: impl IntoIterator<Item = Size>) -> Self {
        self.pizzas
            .extend(sizes.into_iter().map(|size| DeliveryPizza { size }));
        self
    }

    /// Builds a delivery order ready for delivery.
    pub fn build(self) -> Result<DeliveryOrder, DeliveryOrderError> {
        Ok(DeliveryOrder {
            reference: self
                .reference
                .ok_or(DeliveryOrderError::MissingField("reference"))?,
            kitchen_order_ref: self
                .kitchen_order_ref
                .ok_or(DeliveryOrderError::MissingField("kitchen_order_ref"))?,
            online_order_ref: self
                .online_order_ref
                .ok_or(DeliveryOrderError::MissingField("online_order_ref"))?,
            pizzas: self.pizzas,
            state: DeliveryOrderState::ReadyForDelivery,
        })
    }
}
