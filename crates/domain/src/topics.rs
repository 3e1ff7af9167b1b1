//! Process-wide topic catalog.

use event_log::Topic;

/// Events published by the ordering subsystem.
pub const ORDERING: Topic = Topic::from_static("ordering");

/// Kitchen order lifecycle events.
pub const KITCHEN_ORDERS: Topic = Topic::from_static("kitchen_orders");

/// Pizza lifecycle events.
pub const PIZZAS: Topic = Topic::from_static("pizzas");

/// Delivery order lifecycle events.
pub const DELIVERY_ORDERS: Topic = Topic::from_static("delivery_orders");
