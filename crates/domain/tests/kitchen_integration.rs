//! Integration tests for the kitchen and delivery cascades.
//!
//! These tests drive paid online orders through the shared event log and
//! verify the resulting kitchen, pizza and delivery state.

use std::sync::Arc;

use common::{AggregateRef, OnlineOrderRef, Size};
use domain::{
    Aggregate, DeliveryOrderRepository, DeliveryOrderState, DeliveryService, DomainError,
    InMemoryOrderingService, KitchenOrder, KitchenOrderRepository, KitchenOrderState,
    KitchenService, OrderingError, Pizza, PizzaRepository, PizzaState, topics,
};
use event_log::{EventLog, EventLogError, EventLogExt, InMemoryEventLog, Topic};

type Ordering = InMemoryOrderingService<InMemoryEventLog>;

struct Shop {
    log: InMemoryEventLog,
    ordering: Ordering,
    kitchen_orders: Arc<KitchenOrderRepository<InMemoryEventLog>>,
    pizzas: Arc<PizzaRepository<InMemoryEventLog>>,
    delivery_orders: Arc<DeliveryOrderRepository<InMemoryEventLog>>,
    kitchen: Arc<KitchenService<InMemoryEventLog, Ordering>>,
    delivery: Arc<DeliveryService<InMemoryEventLog>>,
}

/// Helper to wire a shop on a fresh log
fn create_shop() -> Shop {
    let log = InMemoryEventLog::new();
    let ordering = InMemoryOrderingService::new(log.clone());
    let kitchen_orders = Arc::new(KitchenOrderRepository::new(log.clone()));
    let pizzas = Arc::new(PizzaRepository::new(log.clone()));
    let delivery_orders = Arc::new(DeliveryOrderRepository::new(log.clone()));
    let kitchen = KitchenService::new(
        Arc::clone(&kitchen_orders),
        Arc::clone(&pizzas),
        ordering.clone(),
    );
    let delivery = DeliveryService::new(Arc::clone(&kitchen_orders), Arc::clone(&delivery_orders));
    Shop {
        log,
        ordering,
        kitchen_orders,
        pizzas,
        delivery_orders,
        kitchen,
        delivery,
    }
}

impl Shop {
    fn pay_for(&self, sizes: &[Size]) -> (OnlineOrderRef, KitchenOrder) {
        let online_order_ref = self.ordering.place_order(sizes.iter().copied());
        self.ordering.pay(online_order_ref).unwrap();
        let order = self
            .kitchen
            .find_kitchen_order_by_online_order_ref(online_order_ref)
            .unwrap()
            .unwrap();
        (online_order_ref, order)
    }

    fn pizzas_of(&self, order: &KitchenOrder) -> Vec<Pizza> {
        self.kitchen
            .find_pizzas_by_kitchen_order_ref(order.reference())
            .unwrap()
    }

    fn order_state(&self, order: &KitchenOrder) -> KitchenOrderState {
        self.kitchen
            .find_kitchen_order_by_ref(order.reference())
            .unwrap()
            .unwrap()
            .state()
    }

    fn cook(&self, pizza: &Pizza) {
        self.kitchen.finish_pizza_prep(pizza.reference()).unwrap();
        self.kitchen
            .remove_pizza_from_oven(pizza.reference())
            .unwrap();
    }

    fn event_types(&self, topic: &Topic) -> Vec<String> {
        self.log
            .events(topic)
            .into_iter()
            .map(|e| e.event_type)
            .collect()
    }
}

mod scenarios {
    use super::*;

    #[test]
    fn two_small_pizzas_reach_delivery() {
        let shop = create_shop();
        let (online_order_ref, order) = shop.pay_for(&[Size::Small, Size::Small]);
        assert_eq!(order.state(), KitchenOrderState::Prepping);
        assert_eq!(order.online_order_ref(), online_order_ref);

        let pizzas = shop.pizzas_of(&order);
        assert_eq!(pizzas.len(), 2);
        for pizza in &pizzas {
            assert_eq!(pizza.size(), Size::Small);
            assert_eq!(pizza.state(), PizzaState::Prepping);
        }

        // First pizza out of prep goes straight into the oven
        let first = shop
            .kitchen
            .finish_pizza_prep(pizzas[0].reference())
            .unwrap()
            .unwrap();
        assert_eq!(first.state(), PizzaState::Baking);
        assert_eq!(shop.order_state(&order), KitchenOrderState::Baking);

        // First pizza out of the oven starts assembly but does not finish it
        let first = shop
            .kitchen
            .remove_pizza_from_oven(pizzas[0].reference())
            .unwrap()
            .unwrap();
        assert_eq!(first.state(), PizzaState::Baked);
        assert_eq!(shop.order_state(&order), KitchenOrderState::Assembling);
        assert!(
            shop.delivery
                .find_delivery_order_by_kitchen_order_ref(order.reference())
                .unwrap()
                .is_none()
        );

        shop.kitchen
            .finish_pizza_prep(pizzas[1].reference())
            .unwrap();
        assert_eq!(shop.order_state(&order), KitchenOrderState::Assembling);
        shop.kitchen
            .remove_pizza_from_oven(pizzas[1].reference())
            .unwrap();
        assert_eq!(shop.order_state(&order), KitchenOrderState::Assembled);

        let delivery = shop
            .delivery
            .find_delivery_order_by_kitchen_order_ref(order.reference())
            .unwrap()
            .unwrap();
        assert_eq!(delivery.state(), DeliveryOrderState::ReadyForDelivery);
        assert_eq!(delivery.online_order_ref(), online_order_ref);
        let sizes: Vec<_> = delivery.pizzas().iter().map(|p| p.size).collect();
        assert_eq!(sizes, vec![Size::Small, Size::Small]);

        assert_eq!(
            shop.event_types(&topics::KITCHEN_ORDERS),
            vec![
                "KitchenOrderAdded",
                "KitchenOrderPrepStarted",
                "KitchenOrderBakeStarted",
                "KitchenOrderAssemblyStarted",
                "KitchenOrderAssemblyFinished",
            ]
        );
        assert_eq!(shop.event_types(&topics::DELIVERY_ORDERS), vec!["DeliveryOrderAdded"]);
    }

    #[test]
    fn one_pizza_order_passes_through_assembling() {
        let shop = create_shop();
        let (_, order) = shop.pay_for(&[Size::Large]);
        let pizza = shop.pizzas_of(&order).remove(0);

        shop.cook(&pizza);

        assert_eq!(shop.order_state(&order), KitchenOrderState::Assembled);
        let kitchen_events = shop.event_types(&topics::KITCHEN_ORDERS);
        assert_eq!(
            kitchen_events[kitchen_events.len() - 2..].to_vec(),
            vec!["KitchenOrderAssemblyStarted", "KitchenOrderAssemblyFinished"]
        );
        assert_eq!(
            shop.event_types(&topics::PIZZAS),
            vec![
                "PizzaAdded",
                "PizzaPrepStarted",
                "PizzaPrepFinished",
                "PizzaBakeStarted",
                "PizzaBakeFinished",
            ]
        );
        assert!(
            shop.delivery
                .find_delivery_order_by_kitchen_order_ref(order.reference())
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn pizzas_finishing_out_of_order() {
        let shop = create_shop();
        let (_, order) = shop.pay_for(&[Size::Small, Size::Medium, Size::Large]);
        let pizzas = shop.pizzas_of(&order);

        for pizza in &pizzas {
            shop.kitchen.finish_pizza_prep(pizza.reference()).unwrap();
        }
        for pizza in pizzas.iter().rev() {
            shop.kitchen
                .remove_pizza_from_oven(pizza.reference())
                .unwrap();
        }

        assert_eq!(shop.order_state(&order), KitchenOrderState::Assembled);
        let delivery = shop
            .delivery
            .find_delivery_order_by_kitchen_order_ref(order.reference())
            .unwrap()
            .unwrap();
        let sizes: Vec<_> = delivery.pizzas().iter().map(|p| p.size).collect();
        assert_eq!(sizes, vec![Size::Small, Size::Medium, Size::Large]);
    }

    #[test]
    fn empty_order_stays_in_prep() {
        let shop = create_shop();
        let (_, order) = shop.pay_for(&[]);

        assert_eq!(order.state(), KitchenOrderState::Prepping);
        assert!(shop.pizzas_of(&order).is_empty());
        assert_eq!(shop.log.event_count(&topics::PIZZAS), 0);
    }

    #[test]
    fn concurrent_orders_are_kept_apart() {
        let shop = create_shop();
        let (_, first) = shop.pay_for(&[Size::Small]);
        let (_, second) = shop.pay_for(&[Size::Large, Size::Large]);

        shop.cook(&shop.pizzas_of(&first)[0]);

        assert_eq!(shop.order_state(&first), KitchenOrderState::Assembled);
        assert_eq!(shop.order_state(&second), KitchenOrderState::Prepping);
        assert_eq!(shop.pizzas_of(&second).len(), 2);
    }
}

mod lookups {
    use super::*;

    #[test]
    fn find_by_online_order_ref_hit_and_miss() {
        let shop = create_shop();
        let (online_order_ref, order) = shop.pay_for(&[Size::Medium]);

        let found = shop
            .kitchen
            .find_kitchen_order_by_online_order_ref(online_order_ref)
            .unwrap()
            .unwrap();
        assert_eq!(found.projection(), order.projection());

        assert!(
            shop.kitchen
                .find_kitchen_order_by_online_order_ref(OnlineOrderRef::generate())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn lookups_survive_cleared_caches() {
        let shop = create_shop();
        let (online_order_ref, order) = shop.pay_for(&[Size::Small, Size::Small]);
        for pizza in shop.pizzas_of(&order) {
            shop.cook(&pizza);
        }

        shop.kitchen_orders.clear_cache();
        shop.pizzas.clear_cache();

        let found = shop
            .kitchen
            .find_kitchen_order_by_online_order_ref(online_order_ref)
            .unwrap()
            .unwrap();
        assert_eq!(found.state(), KitchenOrderState::Assembled);
        assert!(
            shop.pizzas_of(&order)
                .iter()
                .all(|p| p.state() == PizzaState::Baked)
        );
    }
}

mod invariants {
    use super::*;

    #[test]
    fn order_is_assembled_iff_every_pizza_is_baked() {
        let shop = create_shop();
        let (_, order) = shop.pay_for(&[Size::Small, Size::Medium, Size::Large]);
        let pizzas = shop.pizzas_of(&order);

        for pizza in &pizzas {
            shop.cook(pizza);

            let all_baked = shop
                .pizzas_of(&order)
                .iter()
                .all(|p| p.state() == PizzaState::Baked);
            let assembled = shop.order_state(&order) == KitchenOrderState::Assembled;
            assert_eq!(assembled, all_baked);
        }
    }

    #[test]
    fn replay_matches_live_state() {
        let shop = create_shop();
        let (_, order) = shop.pay_for(&[Size::Small, Size::Large]);
        let pizzas = shop.pizzas_of(&order);
        shop.cook(&pizzas[0]);
        shop.kitchen
            .finish_pizza_prep(pizzas[1].reference())
            .unwrap();

        let live = shop.kitchen_orders.find_by_ref(order.reference()).unwrap();
        assert_eq!(shop.kitchen_orders.replay(order.reference()).unwrap(), live);

        for pizza in &pizzas {
            let live = shop.pizzas.find_by_ref(pizza.reference()).unwrap();
            assert_eq!(shop.pizzas.replay(pizza.reference()).unwrap(), live);
        }
    }

    #[test]
    fn delivery_order_replays_from_its_topic() {
        let shop = create_shop();
        let (_, order) = shop.pay_for(&[Size::Medium]);
        shop.cook(&shop.pizzas_of(&order)[0]);

        let delivery = shop
            .delivery_orders
            .find_by_kitchen_order_ref(order.reference())
            .unwrap()
            .unwrap();
        let replayed = shop
            .delivery_orders
            .replay(delivery.reference())
            .unwrap()
            .unwrap();
        assert_eq!(replayed.projection(), delivery.projection());
    }

    #[test]
    fn sequences_increase_per_topic() {
        let shop = create_shop();
        let (_, order) = shop.pay_for(&[Size::Small, Size::Small]);
        for pizza in shop.pizzas_of(&order) {
            shop.cook(&pizza);
        }

        for topic in [
            topics::ORDERING,
            topics::KITCHEN_ORDERS,
            topics::PIZZAS,
            topics::DELIVERY_ORDERS,
        ] {
            let sequences: Vec<u64> = shop
                .log
                .events(&topic)
                .iter()
                .map(|e| e.sequence.as_u64())
                .collect();
            let expected: Vec<u64> = (1..=sequences.len() as u64).collect();
            assert_eq!(sequences, expected, "topic {topic}");
        }
    }

    #[test]
    fn only_live_refs_are_handed_out() {
        let shop = create_shop();
        let (_, order) = shop.pay_for(&[Size::Small]);

        assert!(!order.reference().is_identity());
        for pizza in shop.pizzas_of(&order) {
            assert!(!pizza.reference().is_identity());
        }
    }
}

mod failures {
    use super::*;

    #[test]
    fn illegal_transition_publishes_nothing() {
        let shop = create_shop();
        let (_, order) = shop.pay_for(&[Size::Small]);
        let pizza = shop.pizzas_of(&order).remove(0);
        let before = shop.log.total_event_count();

        let err = shop
            .kitchen
            .remove_pizza_from_oven(pizza.reference())
            .unwrap_err();

        assert!(err.is_invalid_transition());
        assert_eq!(shop.log.total_event_count(), before);
        assert_eq!(
            shop.kitchen
                .find_pizza_by_ref(pizza.reference())
                .unwrap()
                .unwrap()
                .state(),
            PizzaState::Prepping
        );
    }

    #[test]
    fn restarting_prep_is_rejected() {
        let shop = create_shop();
        let (_, order) = shop.pay_for(&[Size::Small]);

        let err = shop
            .kitchen
            .start_order_prep(order.reference())
            .unwrap_err();
        assert!(err.is_invalid_transition());
    }

    #[test]
    fn subscriber_failure_surfaces_and_keeps_earlier_events() {
        let shop = create_shop();
        let (_, order) = shop.pay_for(&[Size::Small]);
        let pizza = shop.pizzas_of(&order).remove(0);

        shop.log.subscribe_fn(&topics::KITCHEN_ORDERS, |envelope| {
            if envelope.event_type == "KitchenOrderBakeStarted" {
                return Err("oven door jammed".into());
            }
            Ok(())
        });

        let err = shop
            .kitchen
            .finish_pizza_prep(pizza.reference())
            .unwrap_err();

        match err.root_cause() {
            DomainError::EventLog(EventLogError::Handler {
                topic, event_type, ..
            }) => {
                assert_eq!(topic, &topics::KITCHEN_ORDERS);
                assert_eq!(event_type, "KitchenOrderBakeStarted");
            }
            other => panic!("unexpected root cause: {other:?}"),
        }

        // Everything published before the failure stays in the log
        let pizza_events = shop.event_types(&topics::PIZZAS);
        assert_eq!(pizza_events.last().unwrap(), "PizzaBakeStarted");
        let order_events = shop.event_types(&topics::KITCHEN_ORDERS);
        assert_eq!(order_events.last().unwrap(), "KitchenOrderBakeStarted");
        assert_eq!(shop.order_state(&order), KitchenOrderState::Baking);
    }

    #[test]
    fn paid_order_unknown_to_the_kitchen_is_an_error() {
        let shop = create_shop();
        let elsewhere = InMemoryOrderingService::new(shop.log.clone());
        let online_order_ref = elsewhere.place_order([Size::Small]);

        let err = elsewhere.pay(online_order_ref).unwrap_err();

        assert!(matches!(
            err.root_cause(),
            DomainError::Ordering(OrderingError::OnlineOrderNotFound(reference))
                if *reference == online_order_ref
        ));
        assert_eq!(shop.log.event_count(&topics::ORDERING), 1);
        assert_eq!(shop.log.event_count(&topics::KITCHEN_ORDERS), 0);
    }
}
