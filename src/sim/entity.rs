//! Moving boxes and spheres
//!
//! Entities are plain data owned by the game state. The renderer keeps its own
//! visuals and reads positions after each step.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::collision::aabb_overlap;
use crate::colors;
use crate::consts::*;

/// Construction-time contract violations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntityError {
    /// A box edge or sphere radius is zero, negative or NaN.
    #[error("{field} must be positive and finite, got {value}")]
    InvalidExtent { field: &'static str, value: f32 },
    /// Position or velocity contains NaN or infinity.
    #[error("{field} must be finite, got {value:?}")]
    NonFinite { field: &'static str, value: Vec3 },
}

/// Collision shape (fixed after construction)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Cuboid { width: f32, height: f32, depth: f32 },
    Sphere { radius: f32 },
}

impl Shape {
    pub fn cube(edge: f32) -> Self {
        Shape::Cuboid {
            width: edge,
            height: edge,
            depth: edge,
        }
    }

    /// Full extents along x, y, z
    pub fn extents(&self) -> Vec3 {
        match *self {
            Shape::Cuboid {
                width,
                height,
                depth,
            } => Vec3::new(width, height, depth),
            Shape::Sphere { radius } => Vec3::splat(radius * 2.0),
        }
    }

    /// Radius used by the sphere-distance test (half the largest edge for boxes)
    pub fn radius(&self) -> f32 {
        match *self {
            Shape::Sphere { radius } => radius,
            Shape::Cuboid { .. } => self.extents().max_element() / 2.0,
        }
    }

    fn validate(&self) -> Result<(), EntityError> {
        let check = |field: &'static str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(EntityError::InvalidExtent { field, value })
            }
        };
        match *self {
            Shape::Cuboid {
                width,
                height,
                depth,
            } => {
                check("width", width)?;
                check("height", height)?;
                check("depth", depth)
            }
            Shape::Sphere { radius } => check("radius", radius),
        }
    }
}

/// Face coordinates of an axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    /// +z face (toward the player)
    pub front: f32,
    /// -z face
    pub back: f32,
}

impl Bounds {
    pub fn from_center(center: Vec3, extents: Vec3) -> Self {
        let half = extents / 2.0;
        Self {
            left: center.x - half.x,
            right: center.x + half.x,
            top: center.y + half.y,
            bottom: center.y - half.y,
            front: center.z + half.z,
            back: center.z - half.z,
        }
    }

    /// Overlap test with `dy` added to this box's bottom face.
    ///
    /// Faces that only touch count as overlapping.
    pub fn overlaps(&self, other: &Bounds, dy: f32) -> bool {
        let x = self.right >= other.left && self.left <= other.right;
        let y = self.bottom + dy <= other.top && self.top >= other.bottom;
        let z = self.front >= other.back && self.back <= other.front;
        x && y && z
    }
}

/// Everything needed to build an entity
#[derive(Debug, Clone, Copy)]
pub struct EntityDesc {
    pub shape: Shape,
    pub color: [f32; 4],
    pub velocity: Vec3,
    pub position: Vec3,
    pub z_acceleration: bool,
}

impl Default for EntityDesc {
    fn default() -> Self {
        Self {
            shape: Shape::cube(BOX_SIZE),
            color: colors::PLAYER,
            velocity: Vec3::ZERO,
            position: Vec3::ZERO,
            z_acceleration: false,
        }
    }
}

/// A moving box or sphere
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub position: Vec3,
    pub velocity: Vec3,
    pub gravity: f32,
    /// Speeds up along +z every step
    pub z_acceleration: bool,
    pub color: [f32; 4],
    shape: Shape,
    bounds: Bounds,
}

impl Entity {
    pub fn new(desc: EntityDesc) -> Result<Self, EntityError> {
        desc.shape.validate()?;
        for (field, value) in [("position", desc.position), ("velocity", desc.velocity)] {
            if !value.is_finite() {
                return Err(EntityError::NonFinite { field, value });
            }
        }

        let mut entity = Self {
            position: desc.position,
            velocity: desc.velocity,
            gravity: GRAVITY,
            z_acceleration: desc.z_acceleration,
            color: desc.color,
            shape: desc.shape,
            bounds: Bounds::default(),
        };
        entity.update_bounds();
        Ok(entity)
    }

    /// The static slab everything lands on
    pub fn ground() -> Result<Self, EntityError> {
        Self::new(EntityDesc {
            shape: Shape::Cuboid {
                width: GROUND_WIDTH,
                height: GROUND_HEIGHT,
                depth: GROUND_DEPTH,
            },
            color: colors::GROUND,
            position: Vec3::new(0.0, GROUND_Y, 0.0),
            ..Default::default()
        })
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Face coordinates as of the last position change
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Recompute faces from position and shape
    pub fn update_bounds(&mut self) {
        self.bounds = Bounds::from_center(self.position, self.shape.extents());
    }

    /// Advance one step: z self-acceleration, horizontal move, then gravity.
    ///
    /// Returns true when the entity bounced off the ground this step.
    pub fn step(&mut self, ground: &Entity) -> bool {
        self.update_bounds();

        if self.z_acceleration {
            self.velocity.z += Z_ACCELERATION;
        }

        self.position.x += self.velocity.x;
        self.position.z += self.velocity.z;
        self.update_bounds();

        self.apply_gravity(ground)
    }

    /// Accumulate gravity, then either bounce off the ground or fall.
    ///
    /// A bounce keeps the position and reverses half the vertical speed, so
    /// repeated contacts settle the entity onto the ground over many frames.
    fn apply_gravity(&mut self, ground: &Entity) -> bool {
        self.velocity.y += self.gravity;

        if self.touches_ground(ground) {
            self.velocity.y *= BOUNCE_DAMPING;
            self.velocity.y = -self.velocity.y;
            true
        } else {
            self.position.y += self.velocity.y;
            self.update_bounds();
            false
        }
    }

    /// Ground contact for the coming step
    pub fn touches_ground(&self, ground: &Entity) -> bool {
        match self.shape {
            Shape::Cuboid { .. } => aabb_overlap(self, ground),
            // Sphere rule: no look-ahead, measured from half the radius
            Shape::Sphere { radius } => self.position.y - radius / 2.0 - ground.bounds.top <= 0.0,
        }
    }
}
