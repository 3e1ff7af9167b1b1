//! Kitchen repositories with their secondary indexes.

use std::collections::HashMap;
use std::sync::Arc;

use common::{KitchenOrderRef, OnlineOrderRef, PizzaRef};
use event_log::EventLog;
use parking_lot::RwLock;

use crate::aggregate::Aggregate;
use crate::error::DomainError;
use crate::repository::EventSourcedRepository;

use super::{KitchenOrder, KitchenOrderError, KitchenOrderEvent, Pizza, PizzaError, PizzaEvent};

/// Kitchen orders, indexed by the online order they cook.
pub struct KitchenOrderRepository<L: EventLog> {
    inner: EventSourcedRepository<KitchenOrder, L>,
    by_online_order: Arc<RwLock<HashMap<OnlineOrderRef, KitchenOrderRef>>>,
}

impl<L: EventLog> KitchenOrderRepository<L> {
    /// Creates the repository and subscribes its index to the kitchen order topic.
    pub fn new(log: L) -> Self {
        let inner = EventSourcedRepository::new(log);
        let by_online_order: Arc<RwLock<HashMap<OnlineOrderRef, KitchenOrderRef>>> =
            Arc::default();

        let index = Arc::clone(&by_online_order);
        inner.on_added(move |order: &KitchenOrder| {
            index
                .write()
                .insert(order.online_order_ref(), order.reference());
        });

        Self {
            inner,
            by_online_order,
        }
    }

    /// Returns a reference to the underlying event log.
    pub fn log(&self) -> &L {
        self.inner.log()
    }

    pub fn next_identity(&self) -> KitchenOrderRef {
        self.inner.next_identity()
    }

    pub fn add(&self, order: KitchenOrder) -> Result<(), DomainError> {
        self.inner.add(order)
    }

    pub fn find_by_ref(
        &self,
        reference: KitchenOrderRef,
    ) -> Result<Option<KitchenOrder>, DomainError> {
        self.inner.find_by_ref(reference)
    }

    /// Returns the kitchen order created for an online order, if any.
    pub fn find_by_online_order_ref(
        &self,
        online_order_ref: OnlineOrderRef,
    ) -> Result<Option<KitchenOrder>, DomainError> {
        let reference = self.by_online_order.read().get(&online_order_ref).copied();
        match reference {
            Some(reference) => self.find_by_ref(reference),
            None => Ok(None),
        }
    }

    pub fn execute<F>(
        &self,
        reference: KitchenOrderRef,
        command: F,
    ) -> Result<KitchenOrder, DomainError>
    where
        F: FnOnce(&KitchenOrder) -> Result<KitchenOrderEvent, KitchenOrderError>,
    {
        self.inner.execute(reference, command)
    }

    pub fn replay(&self, reference: KitchenOrderRef) -> Result<Option<KitchenOrder>, DomainError> {
        self.inner.replay(reference)
    }

    /// Drops every cached order; the index is kept.
    pub fn clear_cache(&self) {
        self.inner.clear_cache();
    }
}

/// Pizzas, indexed by the kitchen order they belong to.
pub struct PizzaRepository<L: EventLog> {
    inner: EventSourcedRepository<Pizza, L>,
    by_kitchen_order: Arc<RwLock<HashMap<KitchenOrderRef, Vec<PizzaRef>>>>,
}

impl<L: EventLog> PizzaRepository<L> {
    /// Creates the repository and subscribes its index to the pizza topic.
    pub fn new(log: L) -> Self {
        let inner = EventSourcedRepository::new(log);
        let by_kitchen_order: Arc<RwLock<HashMap<KitchenOrderRef, Vec<PizzaRef>>>> =
            Arc::default();

        let index = Arc::clone(&by_kitchen_order);
        inner.on_added(move |pizza: &Pizza| {
            index
                .write()
                .entry(pizza.kitchen_order_ref())
                .or_default()
                .push(pizza.reference());
        });

        Self {
            inner,
            by_kitchen_order,
        }
    }

    /// Returns a reference to the underlying event log.
    pub fn log(&self) -> &L {
        self.inner.log()
    }

    pub fn next_identity(&self) -> PizzaRef {
        self.inner.next_identity()
    }

    pub fn add(&self, pizza: Pizza) -> Result<(), DomainError> {
        self.inner.add(pizza)
    }

    pub fn find_by_ref(&self, reference: PizzaRef) -> Result<Option<Pizza>, DomainError> {
        self.inner.find_by_ref(reference)
    }

    /// Returns every pizza of a kitchen order, in the order they were added.
    pub fn find_by_kitchen_order_ref(
        &self,
        kitchen_order_ref: KitchenOrderRef,
    ) -> Result<Vec<Pizza>, DomainError> {
        let references = self
            .by_kitchen_order
            .read()
            .get(&kitchen_order_ref)
            .cloned()
            .unwrap_or_default();

        let mut pizzas = Vec::with_capacity(references.len());
        for reference in references {
            if let Some(pizza) = self.find_by_ref(reference)? {
                pizzas.push(pizza);
            }
        }
        Ok(pizzas)
    }

    pub fn execute<F>(&self, reference: PizzaRef, command: F) -> Result<Pizza, DomainError>
    where
        F: FnOnce(&Pizza) -> Result<PizzaEvent, PizzaError>,
    {
        self.inner.execute(reference, command)
    }

    pub fn replay(&self, reference: PizzaRef) -> Result<Option<Pizza>, DomainError> {
        self.inner.replay(reference)
    }

    /// Drops every cached pizza; the index is kept.
    pub fn clear_cache(&self) {
        self.inner.clear_cache();
    }
}
