//! Game state and core simulation types
//!
//! Everything a step reads or writes lives in `GameState`; the presentation
//! layer only reads it between steps.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::collision::CollisionPolicy;
use super::entity::{Entity, EntityDesc, EntityError, Shape};
use super::spawner::{Spawner, obstacle_body};
use crate::colors;
use crate::consts::*;
use crate::settings::{ConfigError, ShapeVariant, SimConfig};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Player was hit; terminal until restart
    GameOver,
}

/// State changes reported by a step, in the order they happened
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ObstacleSpawned { id: u32, x: f32 },
    ObstaclePassed { id: u32 },
    ScoreChanged { score: u64 },
    /// `obstacle` is the first one hit in spawn order
    GameOver { obstacle: u32, score: u64, frame: u64 },
}

/// Receives events as the simulation produces them
pub trait GameObserver {
    fn on_event(&mut self, event: &GameEvent);
}

/// Discards events
impl GameObserver for () {
    fn on_event(&mut self, _event: &GameEvent) {}
}

/// Collects events
impl GameObserver for Vec<GameEvent> {
    fn on_event(&mut self, event: &GameEvent) {
        self.push(*event);
    }
}

/// Errors building a game state
#[derive(Debug, Error)]
pub enum StateError {
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid entity: {0}")]
    Entity(#[from] EntityError),
}

/// An obstacle sliding toward the player
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub id: u32,
    pub body: Entity,
    /// Player got past it (counted once)
    pub passed: bool,
}

impl Obstacle {
    /// Mark as passed the first time the player's z is behind ours.
    ///
    /// Returns true only on that transition.
    pub fn check_passed(&mut self, player_z: f32) -> bool {
        if !self.passed && player_z < self.body.position.z {
            self.passed = true;
            return true;
        }
        false
    }
}

/// Build the player body for a variant, at the origin and drifting down
pub fn player_body(variant: ShapeVariant) -> Result<Entity, EntityError> {
    let shape = match variant {
        ShapeVariant::Box => Shape::cube(BOX_SIZE),
        ShapeVariant::Sphere => Shape::Sphere {
            radius: SPHERE_RADIUS,
        },
    };
    Entity::new(EntityDesc {
        shape,
        color: colors::PLAYER,
        velocity: Vec3::new(0.0, PLAYER_START_VELOCITY_Y, 0.0),
        position: Vec3::ZERO,
        z_acceleration: false,
    })
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Config this run was built from
    pub config: SimConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    /// Lateral spawn positions
    rng: Pcg32,
    /// Current phase
    pub phase: GamePhase,
    pub player: Entity,
    pub ground: Entity,
    /// Spawn order
    pub obstacles: Vec<Obstacle>,
    pub spawner: Spawner,
    /// Steps run so far; drives spawn timing
    pub frame: u64,
    /// Score under the configured rule
    pub score: u64,
    /// Obstacles the player got past
    pub passed_count: u64,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game with default config
    pub fn new(seed: u64) -> Result<Self, StateError> {
        Self::with_config(SimConfig::default(), seed)
    }

    pub fn with_config(config: SimConfig, seed: u64) -> Result<Self, StateError> {
        config.validate()?;
        Ok(Self {
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Running,
            player: player_body(config.variant)?,
            ground: Entity::ground()?,
            obstacles: Vec::new(),
            spawner: Spawner::new(&config),
            frame: 0,
            score: 0,
            passed_count: 0,
            next_id: 1,
            seed,
            config,
        })
    }

    /// Start over with the same config
    pub fn reset(&mut self, seed: u64) -> Result<(), StateError> {
        *self = Self::with_config(self.config.clone(), seed)?;
        Ok(())
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Player/obstacle test for this run's shapes
    pub fn policy(&self) -> CollisionPolicy {
        self.config.variant.collision_policy()
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Append an obstacle at lateral position `x`
    pub fn spawn_obstacle(&mut self, x: f32) -> Result<u32, EntityError> {
        let body = obstacle_body(self.config.variant, x)?;
        let id = self.next_entity_id();
        self.obstacles.push(Obstacle {
            id,
            body,
            passed: false,
        });
        Ok(id)
    }

    /// Run the spawner for the current frame.
    ///
    /// Returns `(id, x)` of the new obstacle when one was created.
    pub fn run_spawner(&mut self) -> Option<(u32, f32)> {
        let x = self.spawner.poll(self.frame, &mut self.rng)?;
        match self.spawn_obstacle(x) {
            Ok(id) => {
                log::debug!(
                    "Spawned obstacle {} at x={:.2} (frame {}, next interval {})",
                    id,
                    x,
                    self.frame,
                    self.spawner.interval()
                );
                Some((id, x))
            }
            Err(e) => {
                log::error!("Failed to spawn obstacle: {}", e);
                None
            }
        }
    }
}
