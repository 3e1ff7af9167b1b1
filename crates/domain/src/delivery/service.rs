use std::sync::Arc;

use common::{DeliveryOrderRef, KitchenOrderRef};
use event_log::{EventEnvelope, EventLog};

use crate::aggregate::Aggregate;
use crate::error::DomainError;
use crate::kitchen::{KitchenOrder, KitchenOrderEvent, KitchenOrderRepository};
use crate::subscriber::subscribe_weak;
use crate::topics;

use super::{DeliveryOrder, DeliveryOrderRepository};

/// Hands assembled kitchen orders over to delivery.
pub struct DeliveryService<L: EventLog> {
    kitchen_orders: Arc<KitchenOrderRepository<L>>,
    delivery_orders: Arc<DeliveryOrderRepository<L>>,
}

impl<L: EventLog + 'static> DeliveryService<L> {
    /// Creates the service and subscribes it to the kitchen order topic.
    pub fn new(
        kitchen_orders: Arc<KitchenOrderRepository<L>>,
        delivery_orders: Arc<DeliveryOrderRepository<L>>,
    ) -> Arc<Self> {
        let service = Arc::new(Self {
            kitchen_orders,
            delivery_orders,
        });

        subscribe_weak(
            service.kitchen_orders.log(),
            &topics::KITCHEN_ORDERS,
            &service,
            Self::on_kitchen_order_event,
        );

        service
    }

    pub fn find_delivery_order_by_ref(
        &self,
        reference: DeliveryOrderRef,
    ) -> Result<Option<DeliveryOrder>, DomainError> {
        self.delivery_orders.find_by_ref(reference)
    }

    pub fn find_delivery_order_by_kitchen_order_ref(
        &self,
        kitchen_order_ref: KitchenOrderRef,
    ) -> Result<Option<DeliveryOrder>, DomainError> {
        self.delivery_orders
            .find_by_kitchen_order_ref(kitchen_order_ref)
    }

    fn on_kitchen_order_event(&self, envelope: &EventEnvelope) -> Result<(), DomainError> {
        match KitchenOrder::decode_event(envelope)? {
            KitchenOrderEvent::KitchenOrderAssemblyFinished { kitchen_order_ref } => {
                self.on_kitchen_order_assembled(kitchen_order_ref)
            }
            _ => Ok(()),
        }
    }

    fn on_kitchen_order_assembled(
        &self,
        kitchen_order_ref: KitchenOrderRef,
    ) -> Result<(), DomainError> {
        if self
            .delivery_orders
            .find_by_kitchen_order_ref(kitchen_order_ref)?
            .is_some()
        {
            return Ok(());
        }

        let kitchen_order = self
            .kitchen_orders
            .find_by_ref(kitchen_order_ref)?
            .ok_or_else(|| DomainError::AggregateNotFound {
                aggregate_type: KitchenOrder::aggregate_type(),
                aggregate_id: kitchen_order_ref.to_string(),
            })?;

        let order = DeliveryOrder::builder()
            .reference(self.delivery_orders.next_identity())
            .kitchen_order_ref(kitchen_order_ref)
            .online_order_ref(kitchen_order.online_order_ref())
            .pizzas(kitchen_order.pizzas().iter().map(|pizza| pizza.size))
            .build()?;
        let reference = order.reference();
        self.delivery_orders.add(order)?;

        metrics::counter!("delivery_orders_created_total").increment(1);
        tracing::info!(
            %kitchen_order_ref,
            delivery_order_ref = %reference,
            "delivery order ready"
        );
        Ok(())
    }
}
