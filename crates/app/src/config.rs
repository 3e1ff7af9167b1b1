//! Application configuration loaded from environment variables.

use std::str::FromStr;

use common::{ParseSizeError, Size};
use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A demo pizza size could not be parsed.
    #[error("Invalid PIZZASHOP_DEMO_PIZZAS entry: {0}")]
    InvalidSize(#[from] ParseSizeError),

    /// The log format is neither `pretty` nor `json`.
    #[error("Invalid PIZZASHOP_LOG_FORMAT: {0} (expected \"pretty\" or \"json\")")]
    InvalidLogFormat(String),

    /// A boolean flag is not `true` or `false`.
    #[error("Invalid {name}: {value} (expected \"true\" or \"false\")")]
    InvalidFlag { name: &'static str, value: String },
}

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

/// Shop configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `PIZZASHOP_LOG_FORMAT`: `"pretty"` or `"json"` (default: `"pretty"`)
/// - `PIZZASHOP_DEMO_PIZZAS`: comma-separated sizes for the demo order
///   (default: `"small,small"`)
/// - `PIZZASHOP_PRINT_METRICS`: render metrics after the demo (default: `false`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub log_level: String,
    pub log_format: LogFormat,
    pub demo_pizzas: Vec<Size>,
    pub print_metrics: bool,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults for
    /// unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_format = match lookup("PIZZASHOP_LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => defaults.log_format,
        };

        let demo_pizzas = match lookup("PIZZASHOP_DEMO_PIZZAS") {
            Some(value) => parse_sizes(&value)?,
            None => defaults.demo_pizzas,
        };

        let print_metrics = match lookup("PIZZASHOP_PRINT_METRICS") {
            Some(value) => parse_flag("PIZZASHOP_PRINT_METRICS", &value)?,
            None => defaults.print_metrics,
        };

        Ok(Self {
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format,
            demo_pizzas,
            print_metrics,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            demo_pizzas: vec![Size::Small, Size::Small],
            print_metrics: false,
        }
    }
}

fn parse_sizes(value: &str) -> Result<Vec<Size>, ConfigError> {
    value
        .split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| entry.parse::<Size>().map_err(ConfigError::from))
        .collect()
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.demo_pizzas, vec![Size::Small, Size::Small]);
        assert!(!config.print_metrics);
    }

    #[test]
    fn test_unset_variables_use_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_all_variables_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("RUST_LOG", "debug"),
            ("PIZZASHOP_LOG_FORMAT", "JSON"),
            ("PIZZASHOP_DEMO_PIZZAS", "large, medium,small"),
            ("PIZZASHOP_PRINT_METRICS", "true"),
        ]))
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.demo_pizzas,
            vec![Size::Large, Size::Medium, Size::Small]
        );
        assert!(config.print_metrics);
    }

    #[test]
    fn test_empty_pizza_list_is_allowed() {
        let config = Config::from_lookup(lookup(&[("PIZZASHOP_DEMO_PIZZAS", "")])).unwrap();
        assert!(config.demo_pizzas.is_empty());
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let err = Config::from_lookup(lookup(&[("PIZZASHOP_DEMO_PIZZAS", "small,huge")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSize(_)));

        let err = Config::from_lookup(lookup(&[("PIZZASHOP_LOG_FORMAT", "xml")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogFormat(_)));

        let err = Config::from_lookup(lookup(&[("PIZZASHOP_PRINT_METRICS", "maybe")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidFlag {
                name: "PIZZASHOP_PRINT_METRICS",
                ..
            }
        ));
    }
}
