//! Session configuration.
//!
//! Chosen before a player session starts: starting purse, starting raw
//! stock and the furnace clock multiplier. Validation is independent of any
//! UI and returns every problem at once.
//!
//! ```
//! use keystone_core::config::{SessionConfig, validate_config};
//!
//! let config = SessionConfig::default();
//! assert!(validate_config(&config).is_empty());
//! ```

use keystone_logic::materials::{Ingredients, Material};
use serde::{Deserialize, Serialize};

/// Upper bound for `time_scale`; beyond this furnace timing stops meaning anything.
pub const MAX_TIME_SCALE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub starting_currency: u64,
    pub starting_materials: Ingredients,
    /// Clock multiplier (1.0 = real time).
    pub time_scale: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            starting_currency: 50,
            starting_materials: Ingredients::from([
                (Material::Limestone, 4),
                (Material::Water, 4),
                (Material::Sand, 3),
                (Material::Clay, 3),
            ]),
            time_scale: 1.0,
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Human-readable problems with `config`; empty means valid.
pub fn validate_config(config: &SessionConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if !config.time_scale.is_finite() || config.time_scale <= 0.0 {
        errors.push(format!(
            "time_scale must be positive, got {}",
            config.time_scale
        ));
    } else if config.time_scale > MAX_TIME_SCALE {
        errors.push(format!(
            "time_scale {} exceeds maximum {}",
            config.time_scale, MAX_TIME_SCALE
        ));
    }

    for (material, &count) in &config.starting_materials {
        if count == 0 {
            errors.push(format!("starting_materials lists zero {}", material.id()));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&SessionConfig::default()).is_empty());
    }

    #[test]
    fn test_invalid_time_scale() {
        let mut config = SessionConfig::default();
        config.time_scale = 0.0;
        assert_eq!(validate_config(&config).len(), 1);
        config.time_scale = f64::NAN;
        assert_eq!(validate_config(&config).len(), 1);
        config.time_scale = 500.0;
        assert!(validate_config(&config)[0].contains("exceeds"));
    }

    #[test]
    fn test_zero_starting_material() {
        let mut config = SessionConfig::default();
        config.starting_materials.insert(Material::Timber, 0);
        let errors = validate_config(&config);
        assert_eq!(errors, vec!["starting_materials lists zero timber".to_string()]);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = SessionConfig::from_json(r#"{ "starting_currency": 5 }"#).unwrap();
        assert_eq!(config.starting_currency, 5);
        assert_eq!(config.time_scale, 1.0);
        assert_eq!(config.starting_materials.get(&Material::Limestone), Some(&4));

        let custom =
            SessionConfig::from_json(r#"{ "starting_materials": { "iron_ore": 2 } }"#).unwrap();
        assert_eq!(
            custom.starting_materials,
            Ingredients::from([(Material::IronOre, 2)])
        );
    }
}
