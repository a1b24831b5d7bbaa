//! Cube Dodge - a tiny 3D dodge-the-blocks arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, spawning, game state)
//! - `runner`: Frame loop scheduling (request/cancel, restart)
//! - `view`: Read-only frame data for the renderer and HUD
//! - `settings`: Data-driven game configuration
//! - `highscores`: Leaderboard of finished runs

pub mod highscores;
pub mod runner;
pub mod settings;
pub mod sim;
pub mod view;

pub use highscores::HighScores;
pub use settings::{ConfigError, ScoreRule, ShapeVariant, SimConfig};

/// Game constants. All rates are per simulation step (one step per displayed frame).
pub mod consts {
    /// Downward acceleration applied to every entity
    pub const GRAVITY: f32 = -0.002;
    /// Fraction of vertical speed kept after a ground bounce
    pub const BOUNCE_DAMPING: f32 = 0.5;
    /// Forward self-acceleration of obstacles
    pub const Z_ACCELERATION: f32 = 0.0003;

    /// Player lateral/longitudinal speed while a direction key is held
    pub const MOVE_SPEED: f32 = 0.05;
    /// Vertical velocity set by a jump
    pub const JUMP_IMPULSE: f32 = 0.08;
    /// Player starts drifting down onto the ground
    pub const PLAYER_START_VELOCITY_Y: f32 = -0.01;

    /// Box edge length (player and obstacles)
    pub const BOX_SIZE: f32 = 1.0;
    /// Sphere radius (player and obstacles, sphere variant)
    pub const SPHERE_RADIUS: f32 = 0.5;

    /// Ground slab dimensions and placement
    pub const GROUND_WIDTH: f32 = 10.0;
    pub const GROUND_HEIGHT: f32 = 0.5;
    pub const GROUND_DEPTH: f32 = 50.0;
    pub const GROUND_Y: f32 = -2.0;

    /// Spawning
    pub const INITIAL_SPAWN_INTERVAL: u64 = 200;
    pub const SPAWN_INTERVAL_STEP: u64 = 20;
    pub const MIN_SPAWN_INTERVAL: u64 = 20;
    /// Obstacles spawn at x in [-SPAWN_SPREAD/2, SPAWN_SPREAD/2)
    pub const SPAWN_SPREAD: f32 = 10.0;
    pub const SPAWN_Z: f32 = -20.0;
    pub const OBSTACLE_START_SPEED: f32 = 0.005;
}

/// Entity colors handed to the presentation layer
pub mod colors {
    pub const PLAYER: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
    pub const GROUND: [f32; 4] = [0.012, 0.412, 0.631, 1.0];
    pub const OBSTACLE: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
}
