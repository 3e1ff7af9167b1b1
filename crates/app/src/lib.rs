//! Composition root for the pizza shop.
//!
//! Wires the ordering boundary, the kitchen and delivery onto one shared
//! in-memory event log, and drives orders through the kitchen the way the
//! demo binary does.

pub mod config;
pub mod error;
pub mod telemetry;

use std::sync::Arc;
use std::time::Instant;

use common::{OnlineOrderRef, Size};
use domain::{
    Aggregate, DeliveryOrder, DeliveryOrderRepository, DeliveryService, DomainError,
    InMemoryOrderingService, KitchenOrder, KitchenOrderRepository, KitchenService, PizzaRepository,
};
use event_log::InMemoryEventLog;

pub use config::{Config, ConfigError, LogFormat};
pub use error::AppError;

/// Ordering boundary used by the shop.
pub type ShopOrdering = InMemoryOrderingService<InMemoryEventLog>;

/// Kitchen service used by the shop.
pub type ShopKitchen = KitchenService<InMemoryEventLog, ShopOrdering>;

/// Delivery service used by the shop.
pub type ShopDelivery = DeliveryService<InMemoryEventLog>;

/// What became of one order driven through the shop.
#[derive(Debug, Clone)]
pub struct OrderOutcome {
    pub online_order_ref: OnlineOrderRef,
    pub kitchen_order: KitchenOrder,
    pub delivery_order: Option<DeliveryOrder>,
}

/// The whole shop on one event log.
pub struct PizzaShop {
    log: InMemoryEventLog,
    ordering: ShopOrdering,
    kitchen: Arc<ShopKitchen>,
    delivery: Arc<ShopDelivery>,
}

impl PizzaShop {
    /// Creates a shop on a fresh event log.
    pub fn new() -> Self {
        Self::with_log(InMemoryEventLog::new())
    }

    /// Creates a shop on an existing event log.
    ///
    /// Repositories subscribe before services so their indexes are current
    /// by the time a service reacts to an added event.
    pub fn with_log(log: InMemoryEventLog) -> Self {
        let ordering = InMemoryOrderingService::new(log.clone());
        let kitchen_orders = Arc::new(KitchenOrderRepository::new(log.clone()));
        let pizzas = Arc::new(PizzaRepository::new(log.clone()));
        let delivery_orders = Arc::new(DeliveryOrderRepository::new(log.clone()));

        let kitchen = KitchenService::new(Arc::clone(&kitchen_orders), pizzas, ordering.clone());
        let delivery = DeliveryService::new(kitchen_orders, delivery_orders);

        Self {
            log,
            ordering,
            kitchen,
            delivery,
        }
    }

    pub fn log(&self) -> &InMemoryEventLog {
        &self.log
    }

    pub fn ordering(&self) -> &ShopOrdering {
        &self.ordering
    }

    pub fn kitchen(&self) -> &ShopKitchen {
        &self.kitchen
    }

    pub fn delivery(&self) -> &ShopDelivery {
        &self.delivery
    }

    /// Places and pays for an online order, returning the kitchen order the
    /// payment produced.
    pub fn place_and_pay(
        &self,
        sizes: &[Size],
    ) -> Result<(OnlineOrderRef, KitchenOrder), DomainError> {
        let online_order_ref = self.ordering.place_order(sizes.iter().copied());
        self.ordering.pay(online_order_ref)?;

        let kitchen_order = self
            .kitchen
            .find_kitchen_order_by_online_order_ref(online_order_ref)?
            .ok_or_else(|| DomainError::AggregateNotFound {
                aggregate_type: KitchenOrder::aggregate_type(),
                aggregate_id: online_order_ref.to_string(),
            })?;
        Ok((online_order_ref, kitchen_order))
    }

    /// Drives one order from payment to delivery, prepping and baking every
    /// pizza in turn.
    #[tracing::instrument(skip(self))]
    pub fn run_order(&self, sizes: &[Size]) -> Result<OrderOutcome, DomainError> {
        let started = Instant::now();
        let (online_order_ref, kitchen_order) = self.place_and_pay(sizes)?;
        let kitchen_order_ref = kitchen_order.reference();

        for pizza in self
            .kitchen
            .find_pizzas_by_kitchen_order_ref(kitchen_order_ref)?
        {
            self.kitchen.finish_pizza_prep(pizza.reference())?;
            self.kitchen.remove_pizza_from_oven(pizza.reference())?;
        }

        let kitchen_order = self
            .kitchen
            .find_kitchen_order_by_ref(kitchen_order_ref)?
            .unwrap_or(kitchen_order);
        let delivery_order = self
            .delivery
            .find_delivery_order_by_kitchen_order_ref(kitchen_order_ref)?;

        metrics::histogram!("shop_order_duration_seconds").record(started.elapsed().as_secs_f64());
        tracing::info!(
            %online_order_ref,
            %kitchen_order_ref,
            state = %kitchen_order.state(),
            delivered = delivery_order.is_some(),
            "order finished"
        );

        Ok(OrderOutcome {
            online_order_ref,
            kitchen_order,
            delivery_order,
        })
    }
}

impl Default for PizzaShop {
    fn default() -> Self {
        Self::new()
    }
}
