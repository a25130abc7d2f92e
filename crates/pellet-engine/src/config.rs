//! Engine configuration loaded from JSON.
//!
//! Every field has a default, so a partial document such as
//! `{"screen_width": 1024}` is valid.

use pellet_ecs::world::WorldConfig;
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::platform::CellSize;
use crate::schedule::ScheduleConfig;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse engine config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid engine config: {field} {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

/// Logical screen size in pixels, handed to every update system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    pub width: f32,
    pub height: f32,
}

impl Screen {
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub screen_width: f32,
    pub screen_height: f32,
    pub world: WorldConfig,
    pub schedule: ScheduleConfig,
    /// Cell size of the entity sprite atlas.
    pub entity_cell: CellSize,
    /// Cell size of the tile sprite atlas.
    pub tile_cell: CellSize,
}

impl Default for EngineConfig {
    /// 800x600 screen, 32x32 entity cells, 18x18 tile cells.
    fn default() -> Self {
        Self {
            screen_width: 800.0,
            screen_height: 600.0,
            world: WorldConfig::default(),
            schedule: ScheduleConfig::default(),
            entity_cell: CellSize::new(32, 32),
            tile_cell: CellSize::new(18, 18),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn screen(&self) -> Screen {
        Screen {
            width: self.screen_width,
            height: self.screen_height,
        }
    }

    /// Reject sizes and capacities the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            (
                "screen_width",
                self.screen_width > 0.0 && self.screen_width.is_finite(),
                "must be positive and finite",
            ),
            (
                "screen_height",
                self.screen_height > 0.0 && self.screen_height.is_finite(),
                "must be positive and finite",
            ),
            ("world.max_entities", self.world.max_entities > 0, "must be non-zero"),
            (
                "world.max_entities",
                u32::try_from(self.world.max_entities).is_ok(),
                "must fit in a u32 entity id",
            ),
            ("world.max_components", self.world.max_components > 0, "must be non-zero"),
            (
                "schedule.max_update_systems",
                self.schedule.max_update_systems > 0,
                "must be non-zero",
            ),
            (
                "schedule.max_render_systems",
                self.schedule.max_render_systems > 0,
                "must be non-zero",
            ),
            (
                "entity_cell",
                self.entity_cell.w > 0 && self.entity_cell.h > 0,
                "must have a non-zero size",
            ),
            (
                "tile_cell",
                self.tile_cell.w > 0 && self.tile_cell.h > 0,
                "must have a non-zero size",
            ),
        ];
        match checks.into_iter().find(|(_, ok, _)| !ok) {
            Some((field, _, reason)) => Err(ConfigError::Invalid { field, reason }),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.world.max_entities, 255);
        assert_eq!(config.schedule.max_update_systems, 16);
        assert_eq!(config.screen(), Screen { width: 800.0, height: 600.0 });
    }

    #[test]
    fn partial_document_overrides_fields() {
        let json = r#"{"screen_width": 1024, "world": {"max_entities": 64}, "tile_cell": {"w": 16, "h": 16}}"#;
        let config = EngineConfig::from_json_str(json).unwrap();
        assert_eq!(config.screen_width, 1024.0);
        assert_eq!(config.screen_height, 600.0);
        assert_eq!(config.world.max_entities, 64);
        assert_eq!(config.world.max_components, 32);
        assert_eq!(config.tile_cell, CellSize::new(16, 16));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = EngineConfig::from_json_str(r#"{"schedule": {"max_render_systems": 0}}"#).unwrap_err();
        match err {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "schedule.max_render_systems"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_screen_is_rejected() {
        let err = EngineConfig::from_json_str(r#"{"screen_height": -1}"#).unwrap_err();
        assert!(err.to_string().contains("screen_height"));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = EngineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn roundtrips_through_json() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);
    }
}
