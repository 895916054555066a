//! Configuration system
//!
//! Tunables are plain serde structs. The [`Config`] trait gives every one of
//! them file loading and saving, picking TOML or RON by file extension.

pub use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use std::path::Path;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a `.toml` or `.ron` file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => {
                toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            ConfigFormat::Ron => {
                ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
            }
        }
    }

    /// Save configuration to a `.toml` or `.ron` file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

enum ConfigFormat {
    Toml,
    Ron,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// World-wide physics tunables
///
/// Units are world units and seconds. The world is Y-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Acceleration applied to every body, scaled by its gravity scale
    pub gravity: Vec3,
    /// Horizontal damping rate applied while a body stands on the ground
    pub friction: f32,
    /// Simulation ticks per second
    pub tick_rate: u32,
}

impl PhysicsConfig {
    /// Duration of one tick in seconds
    pub fn tick_duration(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Replace the gravity vector
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    /// Replace the ground friction
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -800.0, 0.0),
            friction: 6.0,
            tick_rate: 60,
        }
    }
}

impl Config for PhysicsConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("arena_physics_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_default_physics_config() {
        let config = PhysicsConfig::default();
        assert_eq!(config.tick_rate, 60);
        assert_relative_eq!(config.tick_duration(), 1.0 / 60.0);
        assert!(config.gravity.y < 0.0);
    }

    #[test]
    fn test_toml_round_trip() {
        let path = temp_path("physics.toml");
        let config = PhysicsConfig::default()
            .with_gravity(Vec3::new(0.0, -400.0, 0.0))
            .with_friction(2.5);
        config.save_to_file(&path).unwrap();

        let loaded = PhysicsConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ron_round_trip() {
        let path = temp_path("physics.ron");
        let config = PhysicsConfig {
            tick_rate: 30,
            ..PhysicsConfig::default()
        };
        config.save_to_file(&path).unwrap();

        let loaded = PhysicsConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.tick_rate, 30);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: PhysicsConfig = toml::from_str("friction = 1.5").unwrap();
        assert_relative_eq!(config.friction, 1.5);
        assert_eq!(config.tick_rate, 60);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = PhysicsConfig::default().save_to_file(temp_path("physics.json"));
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
