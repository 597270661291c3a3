//! Startup configuration
//!
//! Configuration is read once when the host starts. Environment overrides are
//! optional; anything that fails to parse is logged and ignored.

use thiserror::Error;

/// Default number of instance slots
pub const DEFAULT_MAX_QUANTITY: usize = 16384;

/// Errors raised by `ConfettiConfig::validate`
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Maximum quantity must be at least 1")]
    ZeroCapacity,

    #[error("Canvas size {width}x{height} has no area")]
    EmptyCanvas { width: u32, height: u32 },
}

/// Capacity, seed and initial canvas size
#[derive(Clone, Debug, PartialEq)]
pub struct ConfettiConfig {
    /// Number of random-field slots; quantity is clamped to this
    pub max_quantity: usize,
    /// Seed for the random field and randomized defaults (`None` = entropy)
    pub seed: Option<u64>,
    /// Initial canvas width in pixels
    pub width: u32,
    /// Initial canvas height in pixels
    pub height: u32,
}

impl Default for ConfettiConfig {
    fn default() -> Self {
        Self {
            max_quantity: DEFAULT_MAX_QUANTITY,
            seed: None,
            width: 800,
            height: 600,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a valid value", name, raw);
            None
        }
    }
}

impl ConfettiConfig {
    /// Defaults overlaid with `CONFETTI_SEED`, `CONFETTI_WIDTH`,
    /// `CONFETTI_HEIGHT` and `CONFETTI_MAX_QUANTITY`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env` with a custom variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(seed) = parse_var("CONFETTI_SEED", lookup("CONFETTI_SEED")) {
            config.seed = Some(seed);
        }
        if let Some(width) = parse_var("CONFETTI_WIDTH", lookup("CONFETTI_WIDTH")) {
            config.width = width;
        }
        if let Some(height) = parse_var("CONFETTI_HEIGHT", lookup("CONFETTI_HEIGHT")) {
            config.height = height;
        }
        if let Some(max) = parse_var("CONFETTI_MAX_QUANTITY", lookup("CONFETTI_MAX_QUANTITY")) {
            config.max_quantity = max;
        }

        if let Err(e) = config.validate() {
            log::warn!("Invalid configuration ({}), using defaults", e);
            return Self {
                seed: config.seed,
                ..Self::default()
            };
        }

        log::info!(
            "Configuration: {} slots, {}x{} canvas, seed {:?}",
            config.max_quantity,
            config.width,
            config.height,
            config.seed
        );
        config
    }

    /// Check capacity and canvas size
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_quantity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyCanvas {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ConfettiConfig::default();
        assert_eq!(config.max_quantity, DEFAULT_MAX_QUANTITY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = ConfettiConfig::from_lookup(lookup(&[
            ("CONFETTI_SEED", "99"),
            ("CONFETTI_WIDTH", " 320 "),
            ("CONFETTI_MAX_QUANTITY", "64"),
        ]));
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.width, 320);
        assert_eq!(config.height, 600);
        assert_eq!(config.max_quantity, 64);
    }

    #[test]
    fn test_bad_values_ignored() {
        let config = ConfettiConfig::from_lookup(lookup(&[
            ("CONFETTI_SEED", "abc"),
            ("CONFETTI_HEIGHT", "-3"),
        ]));
        assert_eq!(config, ConfettiConfig::default());
    }

    #[test]
    fn test_invalid_falls_back_to_defaults() {
        let config = ConfettiConfig::from_lookup(lookup(&[
            ("CONFETTI_SEED", "5"),
            ("CONFETTI_WIDTH", "0"),
        ]));
        assert_eq!(config.width, 800);
        assert_eq!(config.seed, Some(5));
    }

    #[test]
    fn test_validate() {
        let mut config = ConfettiConfig::default();
        config.max_quantity = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));

        let config = ConfettiConfig {
            height: 0,
            ..ConfettiConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyCanvas { width: 800, height: 0 })
        );
    }
}
