//! Obstacle spawning with a shrinking interval
//!
//! The interval starts long and shrinks by a fixed step after each spawn
//! until it reaches the floor. That shrinking is the whole difficulty curve.

use glam::Vec3;
use rand::Rng;

use super::entity::{Entity, EntityDesc, EntityError, Shape};
use crate::colors;
use crate::consts::*;
use crate::settings::{ShapeVariant, SimConfig};

/// Spawn timing state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spawner {
    interval: u64,
    step: u64,
    min_interval: u64,
}

impl Spawner {
    /// Expects a validated config (`min_interval >= 1`)
    pub fn new(config: &SimConfig) -> Self {
        Self {
            interval: config.initial_spawn_interval.max(1),
            step: config.spawn_interval_step,
            min_interval: config.min_spawn_interval.max(1),
        }
    }

    /// Frames between spawns right now
    pub fn interval(&self) -> u64 {
        self.interval
    }

    pub fn min_interval(&self) -> u64 {
        self.min_interval
    }

    /// Whether `frame` is a spawn frame under the current interval
    pub fn is_spawn_frame(&self, frame: u64) -> bool {
        frame % self.interval == 0
    }

    /// Check the trigger for `frame`, shrinking the interval when it fires.
    ///
    /// Returns the lateral x of the obstacle to create.
    pub fn poll<R: Rng>(&mut self, frame: u64, rng: &mut R) -> Option<f32> {
        if !self.is_spawn_frame(frame) {
            return None;
        }

        if self.interval > self.min_interval {
            self.interval = self
                .interval
                .saturating_sub(self.step)
                .max(self.min_interval);
        }

        Some(lateral_position(rng.random::<f32>()))
    }
}

/// Map a uniform sample in [0, 1) to x in [-SPAWN_SPREAD/2, SPAWN_SPREAD/2)
pub fn lateral_position(u: f32) -> f32 {
    (u - 0.5) * SPAWN_SPREAD
}

/// Build an obstacle body at lateral position `x`
pub fn obstacle_body(variant: ShapeVariant, x: f32) -> Result<Entity, EntityError> {
    let shape = match variant {
        ShapeVariant::Box => Shape::cube(BOX_SIZE),
        ShapeVariant::Sphere => Shape::Sphere {
            radius: SPHERE_RADIUS,
        },
    };
    Entity::new(EntityDesc {
        shape,
        color: colors::OBSTACLE,
        velocity: Vec3::new(0.0, 0.0, OBSTACLE_START_SPEED),
        position: Vec3::new(x, 0.0, SPAWN_Z),
        z_acceleration: true,
    })
}
