//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One step per displayed frame
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod entity;
pub mod input;
pub mod spawner;
pub mod state;
pub mod tick;

pub use autopilot::autopilot;
pub use collision::{CollisionPolicy, aabb_overlap, sphere_overlap};
pub use entity::{Bounds, Entity, EntityDesc, EntityError, Shape};
pub use input::{InputState, Key, TickInput};
pub use spawner::Spawner;
pub use state::{
    GameEvent, GameObserver, GamePhase, GameState, Obstacle, StateError, player_body,
};
pub use tick::tick;
