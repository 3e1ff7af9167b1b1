use std::collections::HashMap;
use std::sync::Arc;

use common::{DeliveryOrderRef, KitchenOrderRef};
use event_log::EventLog;
use parking_lot::RwLock;

use crate::aggregate::Aggregate;
use crate::error::DomainError;
use crate::repository::EventSourcedRepository;

use super::DeliveryOrder;

/// Delivery orders, indexed by the kitchen order they were assembled from.
pub struct DeliveryOrderRepository<L: EventLog> {
    inner: EventSourcedRepository<DeliveryOrder, L>,
    by_kitchen_order: Arc<RwLock<HashMap<KitchenOrderRef, DeliveryOrderRef>>>,
}

impl<L: EventLog> DeliveryOrderRepository<L> {
    /// Creates the repository and subscribes its index to the delivery order topic.
    pub fn new(log: L) -> Self {
        let inner = EventSourcedRepository::new(log);
        let by_kitchen_order: Arc<RwLock<HashMap<KitchenOrderRef, DeliveryOrderRef>>> =
            Arc::default();

        let index = Arc::clone(&by_kitchen_order);
        inner.on_added(move |order: &DeliveryOrder| {
            index
                .write()
                .insert(order.kitchen_order_ref(), order.reference());
        });

        Self {
            inner,
            by_kitchen_order,
        }
    }

    pub fn log(&self) -> &L {
        self.inner.log()
    }

    pub fn next_identity(&self) -> DeliveryOrderRef {
        self.inner.next_identity()
    }

    pub fn add(&self, order: DeliveryOrder) -> Result<(), DomainError> {
        self.inner.add(order)
    }

    pub fn find_by_ref(
        &self,
        reference: DeliveryOrderRef,
    ) -> Result<Option<DeliveryOrder>, DomainError> {
        self.inner.find_by_ref(reference)
    }

    /// Returns the delivery order created for a kitchen order, if any.
    pub fn find_by_kitchen_order_ref(
        &self,
        kitchen_order_ref: KitchenOrderRef,
    ) -> Result<Option<DeliveryOrder>, DomainError> {
        let reference = self.by_kitchen_order.read().get(&kitchen_order_ref).copied();
        match reference {
            Some(reference) => self.find_by_ref(reference),
            None => Ok(None),
        }
    }

    pub fn replay(&self, reference: DeliveryOrderRef) -> Result<Option<DeliveryOrder>, DomainError> {
        self.inner.replay(reference)
    }
}
