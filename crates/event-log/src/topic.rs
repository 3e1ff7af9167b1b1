use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// A named partition of the event log.
///
/// Topics compare by name. Static topics can be declared as constants:
///
/// ```
/// use event_log::Topic;
///
/// const PIZZAS: Topic = Topic::from_static("pizzas");
/// assert_eq!(PIZZAS, Topic::new("pizzas"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(Cow<'static, str>);

impl Topic {
    /// Creates a topic from any string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Creates a topic from a static name; usable in constants.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Returns the topic name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&'static str> for Topic {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}
