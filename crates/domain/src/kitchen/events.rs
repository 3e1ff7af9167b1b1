//! Kitchen domain events.

use common::{KitchenOrderRef, PizzaRef};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::{KitchenOrderProjection, PizzaProjection};

/// Events that can occur on a pizza aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PizzaEvent {
    /// Pizza was added to the kitchen.
    PizzaAdded {
        pizza_ref: PizzaRef,
        projection: PizzaProjection,
    },

    /// Prep started.
    PizzaPrepStarted { pizza_ref: PizzaRef },

    /// Prep finished.
    PizzaPrepFinished { pizza_ref: PizzaRef },

    /// Pizza went into the oven.
    PizzaBakeStarted { pizza_ref: PizzaRef },

    /// Pizza came out of the oven.
    PizzaBakeFinished { pizza_ref: PizzaRef },
}

impl PizzaEvent {
    /// Returns the ref of the pizza this event belongs to.
    pub fn pizza_ref(&self) -> PizzaRef {
        match self {
            PizzaEvent::PizzaAdded { pizza_ref, .. }
            | PizzaEvent::PizzaPrepStarted { pizza_ref }
            | PizzaEvent::PizzaPrepFinished { pizza_ref }
            | PizzaEvent::PizzaBakeStarted { pizza_ref }
            | PizzaEvent::PizzaBakeFinished { pizza_ref } => *pizza_ref,
        }
    }
}

impl DomainEvent for PizzaEvent {
    const EVENT_TYPES: &'static [&'static str] = &[
        "PizzaAdded",
        "PizzaPrepStarted",
        "PizzaPrepFinished",
        "PizzaBakeStarted",
        "PizzaBakeFinished",
    ];

    fn event_type(&self) -> &'static str {
        match self {
            PizzaEvent::PizzaAdded { .. } => "PizzaAdded",
            PizzaEvent::PizzaPrepStarted { .. } => "PizzaPrepStarted",
            PizzaEvent::PizzaPrepFinished { .. } => "PizzaPrepFinished",
            PizzaEvent::PizzaBakeStarted { .. } => "PizzaBakeStarted",
            PizzaEvent::PizzaBakeFinished { .. } => "PizzaBakeFinished",
        }
    }

    fn is_added(&self) -> bool {
        matches!(self, PizzaEvent::PizzaAdded { .. })
    }
}

/// Events that can occur on a kitchen order aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum KitchenOrderEvent {
    /// Kitchen order was created for a paid online order.
    KitchenOrderAdded {
        kitchen_order_ref: KitchenOrderRef,
        projection: KitchenOrderProjection,
    },

    /// The order's pizzas are being prepped.
    KitchenOrderPrepStarted { kitchen_order_ref: KitchenOrderRef },

    /// The first pizza went into the oven.
    KitchenOrderBakeStarted { kitchen_order_ref: KitchenOrderRef },

    /// The first pizza came out of the oven.
    KitchenOrderAssemblyStarted { kitchen_order_ref: KitchenOrderRef },

    /// Every pizza is out of the oven.
    KitchenOrderAssemblyFinished { kitchen_order_ref: KitchenOrderRef },
}

impl KitchenOrderEvent {
    /// Returns the ref of the kitchen order this event belongs to.
    pub fn kitchen_order_ref(&self) -> KitchenOrderRef {
        match self {
            KitchenOrderEvent::KitchenOrderAdded {
                kitchen_order_ref, ..
            }
            | KitchenOrderEvent::KitchenOrderPrepStarted { kitchen_order_ref }
            | KitchenOrderEvent::KitchenOrderBakeStarted { kitchen_order_ref }
            | KitchenOrderEvent::KitchenOrderAssemblyStarted { kitchen_order_ref }
            | KitchenOrderEvent::KitchenOrderAssemblyFinished { kitchen_order_ref } => {
                *kitchen_order_ref
            }
        }
    }
}

impl DomainEvent for KitchenOrderEvent {
    const EVENT_TYPES: &'static [&'static str] = &[
        "KitchenOrderAdded",
        "KitchenOrderPrepStarted",
        "KitchenOrderBakeStarted",
        "KitchenOrderAssemblyStarted",
        "KitchenOrderAssemblyFinished",
    ];

    fn event_type(&self) -> &'static str {
        match self {
            KitchenOrderEvent::KitchenOrderAdded { .. } => "KitchenOrderAdded",
            KitchenOrderEvent::KitchenOrderPrepStarted { .. } => "KitchenOrderPrepStarted",
            KitchenOrderEvent::KitchenOrderBakeStarted { .. } => "KitchenOrderBakeStarted",
            KitchenOrderEvent::KitchenOrderAssemblyStarted { .. } => "KitchenOrderAssemblyStarted",
            KitchenOrderEvent::KitchenOrderAssemblyFinished { .. } => {
                "KitchenOrderAssemblyFinished"
            }
        }
    }

    fn is_added(&self) -> bool {
        matches!(self, KitchenOrderEvent::KitchenOrderAdded { .. })
    }
}
