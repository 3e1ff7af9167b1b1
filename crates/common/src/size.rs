//! Pizza size value object.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Size of a pizza, shared by ordering, kitchen and delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Size {
    Small,
    Medium,
    Large,
}

impl Size {
    /// Returns the size name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Size::Small => "SMALL",
            Size::Medium => "MEDIUM",
            Size::Large => "LARGE",
        }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown size name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSizeError(pub String);

impl std::fmt::Display for ParseSizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown pizza size: {}", self.0)
    }
}

impl std::error::Error for ParseSizeError {}

impl FromStr for Size {
    type Err = ParseSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SMALL" => Ok(Size::Small),
            "MEDIUM" => Ok(Size::Medium),
            "LARGE" => Ok(Size::Large),
            _ => Err(ParseSizeError(s.to_string())),
        }
    }
}
