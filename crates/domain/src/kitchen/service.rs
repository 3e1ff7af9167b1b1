//! Kitchen coordination.

use std::sync::Arc;

use common::{KitchenOrderRef, OnlineOrderRef, PizzaRef};
use event_log::{EventEnvelope, EventLog};

use crate::aggregate::Aggregate;
use crate::error::DomainError;
use crate::ordering::{OrderingError, OrderingEvent, OrderingService};
use crate::subscriber::subscribe_weak;
use crate::topics;

use super::{
    KitchenOrder, KitchenOrderEvent, KitchenOrderRepository, KitchenOrderState, Pizza, PizzaEvent,
    PizzaRepository,
};

/// Drives kitchen orders and their pizzas from payment to assembly.
///
/// The service reacts to three topics:
/// - `ordering`: a paid online order becomes a kitchen order that starts prep
/// - `kitchen_orders`: an order that starts prep gets one pizza per line
/// - `pizzas`: pizzas go into the oven once prepped, and their oven progress
///   advances the owning order
///
/// Prep and baking completion are driven from outside through
/// [`finish_pizza_prep`](Self::finish_pizza_prep) and
/// [`remove_pizza_from_oven`](Self::remove_pizza_from_oven).
pub struct KitchenService<L, O>
where
    L: EventLog,
    O: OrderingService,
{
    kitchen_orders: Arc<KitchenOrderRepository<L>>,
    pizzas: Arc<PizzaRepository<L>>,
    ordering: O,
}

impl<L, O> KitchenService<L, O>
where
    L: EventLog + 'static,
    O: OrderingService + 'static,
{
    /// Creates the service and subscribes it to its topics.
    pub fn new(
        kitchen_orders: Arc<KitchenOrderRepository<L>>,
        pizzas: Arc<PizzaRepository<L>>,
        ordering: O,
    ) -> Arc<Self> {
        let service = Arc::new(Self {
            kitchen_orders,
            pizzas,
            ordering,
        });

        subscribe_weak(
            service.kitchen_orders.log(),
            &topics::ORDERING,
            &service,
            Self::on_ordering_event,
        );
        subscribe_weak(
            service.kitchen_orders.log(),
            &topics::KITCHEN_ORDERS,
            &service,
            Self::on_kitchen_order_event,
        );
        subscribe_weak(
            service.pizzas.log(),
            &topics::PIZZAS,
            &service,
            Self::on_pizza_event,
        );

        service
    }

    /// Starts prep on a kitchen order. Returns `None` if the order is unknown.
    #[tracing::instrument(skip(self))]
    pub fn start_order_prep(
        &self,
        reference: KitchenOrderRef,
    ) -> Result<Option<KitchenOrder>, DomainError> {
        if self.kitchen_orders.find_by_ref(reference)?.is_none() {
            return Ok(None);
        }
        self.kitchen_orders
            .execute(reference, KitchenOrder::start_prep)?;
        self.kitchen_orders.find_by_ref(reference)
    }

    /// Marks a pizza's prep as done, which sends it into the oven.
    ///
    /// Returns the pizza after the resulting cascade, or `None` if the pizza
    /// is unknown.
    #[tracing::instrument(skip(self))]
    pub fn finish_pizza_prep(&self, reference: PizzaRef) -> Result<Option<Pizza>, DomainError> {
        if self.pizzas.find_by_ref(reference)?.is_none() {
            return Ok(None);
        }
        self.pizzas.execute(reference, Pizza::finish_prep)?;
        self.pizzas.find_by_ref(reference)
    }

    /// Takes a pizza out of the oven.
    ///
    /// Returns the pizza after the resulting cascade, or `None` if the pizza
    /// is unknown.
    #[tracing::instrument(skip(self))]
    pub fn remove_pizza_from_oven(
        &self,
        reference: PizzaRef,
    ) -> Result<Option<Pizza>, DomainError> {
        if self.pizzas.find_by_ref(reference)?.is_none() {
            return Ok(None);
        }
        self.pizzas.execute(reference, Pizza::finish_bake)?;
        self.pizzas.find_by_ref(reference)
    }

    pub fn find_kitchen_order_by_ref(
        &self,
        reference: KitchenOrderRef,
    ) -> Result<Option<KitchenOrder>, DomainError> {
        self.kitchen_orders.find_by_ref(reference)
    }

    pub fn find_kitchen_order_by_online_order_ref(
        &self,
        online_order_ref: OnlineOrderRef,
    ) -> Result<Option<KitchenOrder>, DomainError> {
        self.kitchen_orders.find_by_online_order_ref(online_order_ref)
    }

    pub fn find_pizza_by_ref(&self, reference: PizzaRef) -> Result<Option<Pizza>, DomainError> {
        self.pizzas.find_by_ref(reference)
    }

    pub fn find_pizzas_by_kitchen_order_ref(
        &self,
        kitchen_order_ref: KitchenOrderRef,
    ) -> Result<Vec<Pizza>, DomainError> {
        self.pizzas.find_by_kitchen_order_ref(kitchen_order_ref)
    }

    fn on_ordering_event(&self, envelope: &EventEnvelope) -> Result<(), DomainError> {
        if envelope.event_type != OrderingEvent::ONLINE_ORDER_PAID {
            return Ok(());
        }
        match envelope.decode::<OrderingEvent>()? {
            OrderingEvent::OnlineOrderPaid { online_order_ref } => {
                self.on_online_order_paid(online_order_ref)
            }
        }
    }

    fn on_kitchen_order_event(&self, envelope: &EventEnvelope) -> Result<(), DomainError> {
        match KitchenOrder::decode_event(envelope)? {
            KitchenOrderEvent::KitchenOrderPrepStarted { kitchen_order_ref } => {
                self.on_kitchen_order_prep_started(kitchen_order_ref)
            }
            _ => Ok(()),
        }
    }

    fn on_pizza_event(&self, envelope: &EventEnvelope) -> Result<(), DomainError> {
        match Pizza::decode_event(envelope)? {
            PizzaEvent::PizzaPrepFinished { pizza_ref } => {
                self.pizzas.execute(pizza_ref, Pizza::start_bake)?;
                Ok(())
            }
            PizzaEvent::PizzaBakeStarted { pizza_ref } => self.on_pizza_bake_started(pizza_ref),
            PizzaEvent::PizzaBakeFinished { pizza_ref } => self.on_pizza_bake_finished(pizza_ref),
            _ => Ok(()),
        }
    }

    fn on_online_order_paid(&self, online_order_ref: OnlineOrderRef) -> Result<(), DomainError> {
        if self
            .kitchen_orders
            .find_by_online_order_ref(online_order_ref)?
            .is_some()
        {
            tracing::debug!(%online_order_ref, "online order already in the kitchen");
            return Ok(());
        }

        let online_order = self
            .ordering
            .find_by_ref(online_order_ref)
            .ok_or(OrderingError::OnlineOrderNotFound(online_order_ref))?;

        let order = KitchenOrder::builder()
            .reference(self.kitchen_orders.next_identity())
            .online_order_ref(online_order_ref)
            .pizzas(online_order.pizzas.iter().map(|pizza| pizza.size))
            .build()?;
        let reference = order.reference();

        self.kitchen_orders.add(order)?;
        metrics::counter!("kitchen_orders_received_total").increment(1);
        tracing::info!(%online_order_ref, kitchen_order_ref = %reference, "kitchen order received");

        self.kitchen_orders
            .execute(reference, KitchenOrder::start_prep)?;
        Ok(())
    }

    fn on_kitchen_order_prep_started(
        &self,
        kitchen_order_ref: KitchenOrderRef,
    ) -> Result<(), DomainError> {
        let order = self.load_order(kitchen_order_ref)?;

        for ordered in order.pizzas() {
            let pizza = Pizza::builder()
                .reference(self.pizzas.next_identity())
                .kitchen_order_ref(kitchen_order_ref)
                .size(ordered.size)
                .build()?;
            let reference = pizza.reference();
            self.pizzas.add(pizza)?;
            self.pizzas.execute(reference, Pizza::start_prep)?;
        }

        tracing::debug!(%kitchen_order_ref, pizzas = order.pizzas().len(), "pizzas in prep");
        Ok(())
    }

    fn on_pizza_bake_started(&self, pizza_ref: PizzaRef) -> Result<(), DomainError> {
        let order = self.load_order(self.load_pizza(pizza_ref)?.kitchen_order_ref())?;

        if order.state() == KitchenOrderState::Prepping {
            self.kitchen_orders
                .execute(order.reference(), KitchenOrder::start_bake)?;
        }
        Ok(())
    }

    fn on_pizza_bake_finished(&self, pizza_ref: PizzaRef) -> Result<(), DomainError> {
        let kitchen_order_ref = self.load_pizza(pizza_ref)?.kitchen_order_ref();
        let order = self.load_order(kitchen_order_ref)?;

        if order.state() == KitchenOrderState::Baking {
            self.kitchen_orders
                .execute(kitchen_order_ref, KitchenOrder::start_assembly)?;
        }

        let siblings = self.pizzas.find_by_kitchen_order_ref(kitchen_order_ref)?;
        if siblings.iter().all(Pizza::has_finished_baking) {
            self.kitchen_orders
                .execute(kitchen_order_ref, KitchenOrder::finish_assembly)?;
            metrics::counter!("kitchen_orders_assembled_total").increment(1);
            tracing::info!(%kitchen_order_ref, "kitchen order assembled");
        }
        Ok(())
    }

    fn load_order(&self, reference: KitchenOrderRef) -> Result<KitchenOrder, DomainError> {
        self.kitchen_orders
            .find_by_ref(reference)?
            .ok_or_else(|| DomainError::AggregateNotFound {
                aggregate_type: KitchenOrder::aggregate_type(),
                aggregate_id: reference.to_string(),
            })
    }

    fn load_pizza(&self, reference: PizzaRef) -> Result<Pizza, DomainError> {
        self.pizzas
            .find_by_ref(reference)?
            .ok_or_else(|| DomainError::AggregateNotFound {
                aggregate_type: Pizza::aggregate_type(),
                aggregate_id: reference.to_string(),
            })
    }
}
