//! Configuration of a `SpritesManager`.
//!
//! Games usually ship this as a JSON asset next to the rest of their data, so it can be
//! tweaked without touching code. Every field has a default matching the real hardware.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::shared_constants::*;

/// Sizes and display geometry the manager works with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Maximum number of live sprites, on screen or not.
    pub max_items: usize,
    /// Number of entries of the hardware table.
    pub handles_count: usize,
    /// Number of affine matrices stored inside the hardware table.
    pub affine_mats_count: usize,
    /// Display width in pixels.
    pub display_width: i32,
    /// Display height in pixels.
    pub display_height: i32,
}

impl Default for ManagerConfig {
    fn default() -> ManagerConfig {
        return ManagerConfig {
            max_items: OAM_ENTRIES,
            handles_count: OAM_ENTRIES,
            affine_mats_count: OAM_AFFINE_MATS,
            display_width: SCREEN_WIDTH as i32,
            display_height: SCREEN_HEIGHT as i32,
        };
    }
}

impl ManagerConfig {
    /// Parse and validate a configuration from JSON.
    /// Missing fields take their default value.
    pub fn from_json(json: &str) -> Result<ManagerConfig, ConfigError> {
        let config: ManagerConfig = serde_json::from_str(json).map_err(ConfigError::Json)?;
        config.validate()?;
        return Ok(config);
    }

    /// Check that the configuration can be represented by the hardware.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_items == 0 || self.max_items > MAX_SPRITE_ITEMS {
            return Err(ConfigError::Invalid("max_items out of range"));
        }
        if self.handles_count == 0 || self.handles_count > OAM_ENTRIES {
            return Err(ConfigError::Invalid("handles_count out of range"));
        }
        if self.affine_mats_count == 0 || self.affine_mats_count > OAM_AFFINE_MATS {
            return Err(ConfigError::Invalid("affine_mats_count out of range"));
        }
        // Affine matrix N lives in entries [N * 4, N * 4 + 3], so the tables have to line up
        if self.handles_count != self.affine_mats_count * OAM_ENTRIES_PER_AFFINE_MAT {
            return Err(ConfigError::Invalid(
                "handles_count must be affine_mats_count times the entries per affine matrix",
            ));
        }
        if self.display_width <= 0 || self.display_height <= 0 {
            return Err(ConfigError::Invalid("display size must be positive"));
        }
        return Ok(());
    }

    /// Number of hardware table entries covered by a single affine matrix.
    pub fn affine_mat_multiplier(&self) -> usize {
        return self.handles_count / self.affine_mats_count;
    }
}

/// Returned when a configuration can't be used.
#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ConfigError::*;
        match self {
            Json(err) => write!(f, "ConfigError: Couldn't parse manager config: {}", err),
            Invalid(reason) => write!(f, "ConfigError: Invalid manager config: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_hardware() {
        let config = ManagerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.affine_mat_multiplier(), 4);
    }

    #[test]
    fn missing_fields_are_defaulted() {
        let config = ManagerConfig::from_json(r#"{ "max_items": 64 }"#).unwrap();
        assert_eq!(config.max_items, 64);
        assert_eq!(config.handles_count, OAM_ENTRIES);
        assert_eq!(config.display_width, 240);
    }

    #[test]
    fn small_tables_keep_the_ratio() {
        let config =
            ManagerConfig::from_json(r#"{ "handles_count": 8, "affine_mats_count": 2 }"#).unwrap();
        assert_eq!(config.affine_mat_multiplier(), 4);
    }

    #[test]
    fn mismatched_ratio_is_rejected() {
        let err = ManagerConfig::from_json(r#"{ "handles_count": 12, "affine_mats_count": 2 }"#)
            .unwrap_err();
        match err {
            ConfigError::Invalid(_) => (),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn garbage_is_a_json_error() {
        match ManagerConfig::from_json("{ max_items: ") {
            Err(ConfigError::Json(_)) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn oversized_tables_are_rejected() {
        let mut config = ManagerConfig::default();
        config.max_items = MAX_SPRITE_ITEMS + 1;
        assert!(config.validate().is_err());

        let mut config = ManagerConfig::default();
        config.display_height = 0;
        assert!(config.validate().is_err());
    }
}
