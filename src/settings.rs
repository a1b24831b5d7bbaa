//! Simulation configuration
//!
//! Persisted in LocalStorage on the web; natively it can be read from a JSON file.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::CollisionPolicy;

/// Which primitive the player and obstacles are built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ShapeVariant {
    /// Unit boxes, AABB collisions with vertical look-ahead
    #[default]
    Box,
    /// Spheres, center-distance collisions
    Sphere,
}

impl ShapeVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeVariant::Box => "Box",
            ShapeVariant::Sphere => "Sphere",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "box" | "cube" | "aabb" => Some(ShapeVariant::Box),
            "sphere" | "ball" => Some(ShapeVariant::Sphere),
            _ => None,
        }
    }

    /// Player/obstacle collision test that matches the shapes
    pub fn collision_policy(&self) -> CollisionPolicy {
        match self {
            ShapeVariant::Box => CollisionPolicy::Aabb,
            ShapeVariant::Sphere => CollisionPolicy::Sphere,
        }
    }
}

/// What the score counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScoreRule {
    /// One point per obstacle the player gets past
    #[default]
    PassedObstacles,
    /// One point per frame survived
    FramesSurvived,
}

/// Error type for configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A spawn interval of zero frames would divide by zero.
    #[error("spawn interval must be at least 1 frame (initial {initial}, min {min})")]
    ZeroSpawnInterval { initial: u64, min: u64 },
    /// The floor sits above the starting interval.
    #[error("minimum spawn interval {min} exceeds initial interval {initial}")]
    MinAboveInitial { min: u64, initial: u64 },
    /// Cull distance must be a positive, finite number of world units.
    #[error("cull distance must be positive and finite, got {0}")]
    InvalidCullDistance(f32),
    /// Malformed JSON.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Config file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tunable game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Box or sphere game
    pub variant: ShapeVariant,
    /// Scoring rule
    pub scoring: ScoreRule,

    // === Spawning ===
    /// Frames between spawns at the start of a run
    pub initial_spawn_interval: u64,
    /// How much the interval shrinks after each spawn
    pub spawn_interval_step: u64,
    /// Interval never drops below this
    pub min_spawn_interval: u64,

    // === Cleanup ===
    /// Drop passed obstacles once they are this far behind the player.
    /// `None` keeps every obstacle until the next restart.
    pub cull_distance: Option<f32>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            variant: ShapeVariant::Box,
            scoring: ScoreRule::PassedObstacles,

            initial_spawn_interval: INITIAL_SPAWN_INTERVAL,
            spawn_interval_step: SPAWN_INTERVAL_STEP,
            min_spawn_interval: MIN_SPAWN_INTERVAL,

            cull_distance: None,
        }
    }
}

impl SimConfig {
    /// Default config for a shape variant
    pub fn for_variant(variant: ShapeVariant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    /// Check the invariants the spawner and culling rely on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_spawn_interval == 0 || self.min_spawn_interval == 0 {
            return Err(ConfigError::ZeroSpawnInterval {
                initial: self.initial_spawn_interval,
                min: self.min_spawn_interval,
            });
        }
        if self.min_spawn_interval > self.initial_spawn_interval {
            return Err(ConfigError::MinAboveInitial {
                min: self.min_spawn_interval,
                initial: self.initial_spawn_interval,
            });
        }
        if let Some(d) = self.cull_distance {
            if !d.is_finite() || d <= 0.0 {
                return Err(ConfigError::InvalidCullDistance(d));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Read a JSON config file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "cube_dodge_config";

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded config from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored config: {}", e),
                }
            }
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Save config to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Config saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
