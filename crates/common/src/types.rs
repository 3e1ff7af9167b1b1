use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

/// Untyped identity of an aggregate instance as recorded on the event log.
///
/// Typed refs such as [`PizzaRef`] convert into this so the log can filter a
/// topic's history by aggregate without knowing about domain types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(Uuid);

impl AggregateId {
    /// Creates a new random aggregate ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an aggregate ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AggregateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AggregateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for AggregateId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<AggregateId> for Uuid {
    fn from(id: AggregateId) -> Self {
        id.0
    }
}

/// Typed identity of one aggregate instance.
///
/// A ref is allocated once by its repository and never reused. The nil
/// [`identity`](AggregateRef::identity) value only ever appears on the empty
/// seed instance that replay folds from.
pub trait AggregateRef:
    Copy + Eq + Hash + fmt::Debug + fmt::Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Allocates a fresh, random ref.
    fn generate() -> Self;

    /// The nil ref carried by an aggregate's identity seed.
    fn identity() -> Self;

    /// Returns true for the nil identity ref.
    fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// The untyped ID used on event envelopes.
    fn aggregate_id(&self) -> AggregateId;
}

macro_rules! aggregate_ref {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a ref from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl AggregateRef for $name {
            fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            fn identity() -> Self {
                Self(Uuid::nil())
            }

            fn aggregate_id(&self) -> AggregateId {
                AggregateId::from_uuid(self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for AggregateId {
            fn from(reference: $name) -> Self {
                reference.aggregate_id()
            }
        }
    };
}

aggregate_ref!(
    /// Identity of an online order owned by the ordering subsystem.
    OnlineOrderRef
);

aggregate_ref!(
    /// Identity of a kitchen order.
    KitchenOrderRef
);

aggregate_ref!(
    /// Identity of a single pizza being prepared in the kitchen.
    PizzaRef
);

aggregate_ref!(
    /// Identity of a delivery order.
    DeliveryOrderRef
);
