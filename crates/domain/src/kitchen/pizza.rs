//! Pizza aggregate implementation.

use common::{AggregateRef, KitchenOrderRef, PizzaRef, Size};
use event_log::Topic;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;
use crate::topics;

use super::{PizzaError, PizzaEvent, PizzaState};

/// A single pizza moving through the kitchen.
///
/// Pizzas are created by the kitchen when their kitchen order starts prep,
/// one per pizza on the order.
#[derive(Debug, Clone, PartialEq)]
pub struct Pizza {
    reference: PizzaRef,
    kitchen_order_ref: KitchenOrderRef,
    size: Size,
    state: PizzaState,
}

/// Serializable snapshot of a pizza.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PizzaProjection {
    pub reference: PizzaRef,
    pub kitchen_order_ref: KitchenOrderRef,
    pub size: Size,
    pub state: PizzaState,
}

impl From<PizzaProjection> for Pizza {
    fn from(projection: PizzaProjection) -> Self {
        Pizza {
            reference: projection.reference,
            kitchen_order_ref: projection.kitchen_order_ref,
            size: projection.size,
            state: projection.state,
        }
    }
}

impl Aggregate for Pizza {
    type Ref = PizzaRef;
    type Event = PizzaEvent;
    type Projection = PizzaProjection;
    type Error = PizzaError;

    fn aggregate_type() -> &'static str {
        "Pizza"
    }

    fn topic() -> Topic {
        topics::PIZZAS
    }

    fn identity() -> Self {
        Pizza {
            reference: PizzaRef::identity(),
            kitchen_order_ref: KitchenOrderRef::identity(),
            size: Size::Small,
            state: PizzaState::New,
        }
    }

    fn reference(&self) -> PizzaRef {
        self.reference
    }

    fn projection(&self) -> PizzaProjection {
        PizzaProjection {
            reference: self.reference,
            kitchen_order_ref: self.kitchen_order_ref,
            size: self.size,
            state: self.state,
        }
    }

    fn added_event(&self) -> PizzaEvent {
        PizzaEvent::PizzaAdded {
            pizza_ref: self.reference,
            projection: self.projection(),
        }
    }

    fn apply(self, event: PizzaEvent) -> Self {
        match event {
            PizzaEvent::PizzaAdded { projection, .. } => Pizza::from(projection),
            PizzaEvent::PizzaPrepStarted { .. } => self.with_state(PizzaState::Prepping),
            PizzaEvent::PizzaPrepFinished { .. } => self.with_state(PizzaState::Prepped),
            PizzaEvent::PizzaBakeStarted { .. } => self.with_state(PizzaState::Baking),
            PizzaEvent::PizzaBakeFinished { .. } => self.with_state(PizzaState::Baked),
        }
    }
}

// Query methods
impl Pizza {
    /// Creates a builder for a new pizza.
    pub fn builder() -> PizzaBuilder {
        PizzaBuilder::default()
    }

    /// Returns the kitchen order this pizza belongs to.
    pub fn kitchen_order_ref(&self) -> KitchenOrderRef {
        self.kitchen_order_ref
    }

    /// Returns the pizza size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns the current state.
    pub fn state(&self) -> PizzaState {
        self.state
    }

    /// Returns true once the pizza is out of the oven.
    pub fn has_finished_baking(&self) -> bool {
        self.state == PizzaState::Baked
    }

    fn with_state(self, state: PizzaState) -> Self {
        Pizza { state, ..self }
    }
}

// Command methods (return events)
impl Pizza {
    /// Starts putting toppings on.
    pub fn start_prep(&self) -> Result<PizzaEvent, PizzaError> {
        self.ensure(self.state.can_start_prep(), "start prep")?;
        Ok(PizzaEvent::PizzaPrepStarted {
            pizza_ref: self.reference,
        })
    }

    /// Marks prep as done.
    pub fn finish_prep(&self) -> Result<PizzaEvent, PizzaError> {
        self.ensure(self.state.can_finish_prep(), "finish prep")?;
        Ok(PizzaEvent::PizzaPrepFinished {
            pizza_ref: self.reference,
        })
    }

    /// Puts the pizza in the oven.
    pub fn start_bake(&self) -> Result<PizzaEvent, PizzaError> {
        self.ensure(self.state.can_start_bake(), "start bake")?;
        Ok(PizzaEvent::PizzaBakeStarted {
            pizza_ref: self.reference,
        })
    }

    /// Takes the pizza out of the oven.
    pub fn finish_bake(&self) -> Result<PizzaEvent, PizzaError> {
        self.ensure(self.state.can_finish_bake(), "finish bake")?;
        Ok(PizzaEvent::PizzaBakeFinished {
            pizza_ref: self.reference,
        })
    }

    fn ensure(&self, allowed: bool, action: &'static str) -> Result<(), PizzaError> {
        if allowed {
            Ok(())
        } else {
            Err(PizzaError::InvalidStateTransition {
                current_state: self.state,
                action,
            })
        }
    }
}

/// Builder for [`Pizza`].
#[derive(Debug, Default)]
pub struct PizzaBuilder {
    reference: Option<PizzaRef>,
    kitchen_order_ref: Option<KitchenOrderRef>,
    size: Option<Size>,
}

impl PizzaBuilder {
    /// Sets the pizza's ref.
    pub fn reference(mut self, reference: PizzaRef) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Sets the owning kitchen order.
    pub fn kitchen_order_ref(mut self, kitchen_order_ref: KitchenOrderRef) -> Self {
        self.kitchen_order_ref = Some(kitchen_order_ref);
        self
    }

    /// Sets the size.
    pub fn size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    /// Builds a pizza in the [`PizzaState::New`] state.
    pub fn build(self) -> Result<Pizza, PizzaError> {
        Ok(Pizza {
            reference: self.reference.ok_or(PizzaError::MissingField("reference"))?,
            kitchen_order_ref: self
                .kitchen_order_ref
                .ok_or(PizzaError::MissingField("kitchen_order_ref"))?,
            size: self.size.ok_or(PizzaError::MissingField("size"))?,
            state: PizzaState::New,
        })
    }
}
