//! Kitchen state machines.

use serde::{Deserialize, Serialize};

/// The state of a pizza in the kitchen.
///
/// State transitions:
/// ```text
/// New ──► Prepping ──► Prepped ──► Baking ──► Baked
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PizzaState {
    /// Pizza was added but prep has not started.
    #[default]
    New,

    /// Toppings are going on.
    Prepping,

    /// Prep finished, waiting for the oven.
    Prepped,

    /// In the oven.
    Baking,

    /// Out of the oven (terminal state).
    Baked,
}

impl PizzaState {
    /// Returns true if prep can start in this state.
    pub fn can_start_prep(&self) -> bool {
        matches!(self, PizzaState::New)
    }

    /// Returns true if prep can finish in this state.
    pub fn can_finish_prep(&self) -> bool {
        matches!(self, PizzaState::Prepping)
    }

    /// Returns true if baking can start in this state.
    pub fn can_start_bake(&self) -> bool {
        matches!(self, PizzaState::Prepped)
    }

    /// Returns true if baking can finish in this state.
    pub fn can_finish_bake(&self) -> bool {
        matches!(self, PizzaState::Baking)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PizzaState::New => "NEW",
            PizzaState::Prepping => "PREPPING",
            PizzaState::Prepped => "PREPPED",
            PizzaState::Baking => "BAKING",
            PizzaState::Baked => "BAKED",
        }
    }
}

impl std::fmt::Display for PizzaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The state of a kitchen order.
///
/// State transitions:
/// ```text
/// New ──► Prepping ──► Baking ──► Assembling ──► Assembled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KitchenOrderState {
    /// Order was added but nothing has started.
    #[default]
    New,

    /// Pizzas are being prepped.
    Prepping,

    /// At least one pizza is in the oven.
    Baking,

    /// At least one pizza is out of the oven.
    Assembling,

    /// Every pizza is out of the oven (terminal state).
    Assembled,
}

impl KitchenOrderState {
    /// Returns true if prep can start in this state.
    pub fn can_start_prep(&self) -> bool {
        matches!(self, KitchenOrderState::New)
    }

    /// Returns true if baking can start in this state.
    pub fn can_start_bake(&self) -> bool {
        matches!(self, KitchenOrderState::Prepping)
    }

    /// Returns true if assembly can start in this state.
    pub fn can_start_assembly(&self) -> bool {
        matches!(self, KitchenOrderState::Baking)
    }

    /// Returns true if assembly can finish in this state.
    pub fn can_finish_assembly(&self) -> bool {
        matches!(self, KitchenOrderState::Assembling)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            KitchenOrderState::New => "NEW",
            KitchenOrderState::Prepping => "PREPPING",
            KitchenOrderState::Baking => "BAKING",
            KitchenOrderState::Assembling => "ASSEMBLING",
            KitchenOrderState::Assembled => "ASSEMBLED",
        }
    }
}

impl std::fmt::Display for KitchenOrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
