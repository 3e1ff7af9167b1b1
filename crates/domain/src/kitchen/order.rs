//! Kitchen order aggregate implementation.

use common::{AggregateRef, KitchenOrderRef, OnlineOrderRef, Size};
use event_log::Topic;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;
use crate::topics;

use super::{KitchenOrderError, KitchenOrderEvent, KitchenOrderState};

/// A pizza line on a kitchen order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedPizza {
    pub size: Size,
}

/// The kitchen's view of a paid online order.
///
/// Tracks the order as a whole from prep to assembly. The individual pizzas
/// are separate [`Pizza`](super::Pizza) aggregates created when prep starts.
#[derive(Debug, Clone, PartialEq)]
pub struct KitchenOrder {
    reference: KitchenOrderRef,
    online_order_ref: OnlineOrderRef,
    pizzas: Vec<OrderedPizza>,
    state: KitchenOrderState,
}

/// Serializable snapshot of a kitchen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitchenOrderProjection {
    pub reference: KitchenOrderRef,
    pub online_order_ref: OnlineOrderRef,
    pub pizzas: Vec<OrderedPizza>,
    pub state: KitchenOrderState,
}

impl From<KitchenOrderProjection> for KitchenOrder {
    fn from(projection: KitchenOrderProjection) -> Self {
        KitchenOrder {
            reference: projection.reference,
            online_order_ref: projection.online_order_ref,
            pizzas: projection.pizzas,
            state: projection.state,
        }
    }
}

impl Aggregate for KitchenOrder {
    type Ref = KitchenOrderRef;
    type Event = KitchenOrderEvent;
    type Projection = KitchenOrderProjection;
    type Error = KitchenOrderError;

    fn aggregate_type() -> &'static str {
        "KitchenOrder"
    }

    fn topic() -> Topic {
        topics::KITCHEN_ORDERS
    }

    fn identity() -> Self {
        KitchenOrder {
            reference: KitchenOrderRef::identity(),
            online_order_ref: OnlineOrderRef::identity(),
            pizzas: Vec::new(),
            state: KitchenOrderState::New,
        }
    }

    fn reference(&self) -> KitchenOrderRef {
        self.reference
    }

    fn projection(&self) -> KitchenOrderProjection {
        KitchenOrderProjection {
            reference: self.reference,
            online_order_ref: self.online_order_ref,
            pizzas: self.pizzas.clone(),
            state: self.state,
        }
    }

    fn added_event(&self) -> KitchenOrderEvent {
        KitchenOrderEvent::KitchenOrderAdded {
            kitchen_order_ref: self.reference,
            projection: self.projection(),
        }
    }

    fn apply(self, event: KitchenOrderEvent) -> Self {
        let state = match event {
            KitchenOrderEvent::KitchenOrderAdded { projection, .. } => {
                return KitchenOrder::from(projection);
            }
            KitchenOrderEvent::KitchenOrderPrepStarted { .. } => KitchenOrderState::Prepping,
            KitchenOrderEvent::KitchenOrderBakeStarted { .. } => KitchenOrderState::Baking,
            KitchenOrderEvent::KitchenOrderAssemblyStarted { .. } => KitchenOrderState::Assembling,
            KitchenOrderEvent::KitchenOrderAssemblyFinished { .. } => KitchenOrderState::Assembled,
        };
        KitchenOrder { state, ..self }
    }
}

// Query methods
impl KitchenOrder {
    /// Creates a builder for a new kitchen order.
    pub fn builder() -> KitchenOrderBuilder {
        KitchenOrderBuilder::default()
    }

    /// Returns the online order this kitchen order was created for.
    pub fn online_order_ref(&self) -> OnlineOrderRef {
        self.online_order_ref
    }

    /// Returns the ordered pizzas.
    pub fn pizzas(&self) -> &[OrderedPizza] {
        &self.pizzas
    }

    /// Returns the current state.
    pub fn state(&self) -> KitchenOrderState {
        self.state
    }
}

// Command methods (return events)
impl KitchenOrder {
    /// Starts prepping the order's pizzas.
    pub fn start_prep(&self) -> Result<KitchenOrderEvent, KitchenOrderError> {
        self.ensure(self.state.can_start_prep(), "start prep")?;
        Ok(KitchenOrderEvent::KitchenOrderPrepStarted {
            kitchen_order_ref: self.reference,
        })
    }

    /// Records that the first pizza went into the oven.
    pub fn start_bake(&self) -> Result<KitchenOrderEvent, KitchenOrderError> {
        self.ensure(self.state.can_start_bake(), "start bake")?;
        Ok(KitchenOrderEvent::KitchenOrderBakeStarted {
            kitchen_order_ref: self.reference,
        })
    }

    /// Records that the first pizza came out of the oven.
    pub fn start_assembly(&self) -> Result<KitchenOrderEvent, KitchenOrderError> {
        self.ensure(self.state.can_start_assembly(), "start assembly")?;
        Ok(KitchenOrderEvent::KitchenOrderAssemblyStarted {
            kitchen_order_ref: self.reference,
        })
    }

    /// Records that the order is boxed and ready to leave the kitchen.
    pub fn finish_assembly(&self) -> Result<KitchenOrderEvent, KitchenOrderError> {
        self.ensure(self.state.can_finish_assembly(), "finish assembly")?;
        Ok(KitchenOrderEvent::KitchenOrderAssemblyFinished {
            kitchen_order_ref: self.reference,
        })
    }

    fn ensure(&self, allowed: bool, action: &'static str) -> Result<(), KitchenOrderError> {
        if allowed {
            Ok(())
        } else {
            Err(KitchenOrderError::InvalidStateTransition {
                current_state: self.state,
                action,
            })
        }
    }
}

/// Builder for [`KitchenOrder`].
#[derive(Debug, Default)]
pub struct KitchenOrderBuilder {
    reference: Option<KitchenOrderRef>,
    online_order_ref: Option<OnlineOrderRef>,
    pizzas: Vec<OrderedPizza>,
}

impl KitchenOrderBuilder {
    /// Sets the order's ref.
    pub fn reference(mut self, reference: KitchenOrderRef) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Sets the online order being cooked.
    pub fn online_order_ref(mut self, online_order_ref: OnlineOrderRef) -> Self {
        self.online_order_ref = Some(online_order_ref);
        self
    }

    /// Adds one pizza of the given size.
    pub fn pizza(mut self, size: Size) -> Self {
        self.pizzas.push(OrderedPizza { size });
        self
    }

    /// Adds one pizza per size.
    pub fn pizzas(mut self, sizes: impl IntoIterator<Item = Size>) -> Self {
        self.pizzas
            .extend(sizes.into_iter().map(|size| OrderedPizza { size }));
        self
    }

    /// Builds a kitchen order in the [`KitchenOrderState::New`] state.
    ///
    /// An order without pizzas is accepted.
    pub fn build(self) -> Result<KitchenOrder, KitchenOrderError> {
        Ok(KitchenOrder {
            reference: self
                .reference
                .ok_or(KitchenOrderError::MissingField("reference"))?,
            online_order_ref: self
                .online_order_ref
                .ok_or(KitchenOrderError::MissingField("online_order_ref"))?,
            pizzas: self.pizzas,
            state: KitchenOrderState::New,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_order() -> KitchenOrder {
        KitchenOrder::builder()
            .reference(KitchenOrderRef::generate())
            .online_order_ref(OnlineOrderRef::generate())
            .pizza(Size::Small)
            .pizzas([Size::Medium, Size::Large])
            .build()
            .unwrap()
    }

    fn advance(
        order: KitchenOrder,
        command: fn(&KitchenOrder) -> Result<KitchenOrderEvent, KitchenOrderError>,
    ) -> KitchenOrder {
        let event = command(&order).unwrap();
        order.apply(event)
    }

    #[test]
    fn test_build_order() {
        let order = create_order();
        assert_eq!(order.state(), KitchenOrderState::New);
        let sizes: Vec<_> = order.pizzas().iter().map(|pizza| pizza.size).collect();
        assert_eq!(sizes, vec![Size::Small, Size::Medium, Size::Large]);
    }

    #[test]
    fn test_build_without_online_order_fails() {
        let err = KitchenOrder::builder()
            .reference(KitchenOrderRef::generate())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            KitchenOrderError::MissingField("online_order_ref")
        ));
    }

    #[test]
    fn test_empty_order_is_accepted() {
        let order = KitchenOrder::builder()
            .reference(KitchenOrderRef::generate())
            .online_order_ref(OnlineOrderRef::generate())
            .build()
            .unwrap();
        assert!(order.pizzas().is_empty());
    }

    #[test]
    fn test_full_order_lifecycle() {
        let order = create_order();
        let order = advance(order, KitchenOrder::start_prep);
        assert_eq!(order.state(), KitchenOrderState::Prepping);
        let order = advance(order, KitchenOrder::start_bake);
        assert_eq!(order.state(), KitchenOrderState::Baking);
        let order = advance(order, KitchenOrder::start_assembly);
        assert_eq!(order.state(), KitchenOrderState::Assembling);
        let order = advance(order, KitchenOrder::finish_assembly);
        assert_eq!(order.state(), KitchenOrderState::Assembled);
    }

    #[test]
    fn test_cannot_finish_assembly_before_it_starts() {
        let order = advance(create_order(), KitchenOrder::start_prep);
        let order = advance(order, KitchenOrder::start_bake);

        let err = order.finish_assembly().unwrap_err();
        assert!(matches!(
            err,
            KitchenOrderError::InvalidStateTransition {
                current_state: KitchenOrderState::Baking,
                action: "finish assembly",
            }
        ));
    }

    #[test]
    fn test_cannot_start_prep_twice() {
        let order = advance(create_order(), KitchenOrder::start_prep);
        assert!(order.start_prep().is_err());
    }

    #[test]
    fn test_added_event_carries_projection() {
        let order = create_order();
        match order.added_event() {
            KitchenOrderEvent::KitchenOrderAdded {
                kitchen_order_ref,
                projection,
            } => {
                assert_eq!(kitchen_order_ref, order.reference());
                assert_eq!(projection, order.projection());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_replay_matches_live() {
        let mut live = create_order();
        let mut history = vec![live.added_event()];
        for command in [KitchenOrder::start_prep, KitchenOrder::start_bake] {
            let event = command(&live).unwrap();
            history.push(event.clone());
            live = live.apply(event);
        }

        let replayed = KitchenOrder::replay(history);
        assert_eq!(replayed, live);
    }
}
