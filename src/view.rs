//! Frame data for the presentation layer
//!
//! The core never draws. After each step the page reads a `FrameSnapshot`
//! (JSON for the HUD and scene graph) and a packed `EntityInstance` array that
//! can be copied straight into a GPU instance buffer.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::Serialize;

use crate::sim::{Entity, GamePhase, GameState, Shape};

/// Instance id used for the player
pub const PLAYER_INSTANCE_ID: u32 = 0;
/// Instance id used for the ground slab
pub const GROUND_INSTANCE_ID: u32 = u32::MAX;

/// Transform and motion of one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyView {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Full box extents (sphere: diameter on every axis)
    pub extents: Vec3,
    /// Set for spheres
    pub radius: Option<f32>,
}

impl BodyView {
    pub fn of(entity: &Entity) -> Self {
        let radius = match entity.shape() {
            Shape::Sphere { radius } => Some(radius),
            Shape::Cuboid { .. } => None,
        };
        Self {
            position: entity.position,
            velocity: entity.velocity,
            extents: entity.shape().extents(),
            radius,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObstacleView {
    pub id: u32,
    #[serde(flatten)]
    pub body: BodyView,
    pub passed: bool,
}

/// Everything the renderer and HUD need after a step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub score: u64,
    pub passed_count: u64,
    pub spawn_interval: u64,
    pub game_over: bool,
    pub player: BodyView,
    pub ground: BodyView,
    /// Spawn order
    pub obstacles: Vec<ObstacleView>,
}

impl FrameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            frame: state.frame,
            score: state.score,
            passed_count: state.passed_count,
            spawn_interval: state.spawner.interval(),
            game_over: state.phase == GamePhase::GameOver,
            player: BodyView::of(&state.player),
            ground: BodyView::of(&state.ground),
            obstacles: state
                .obstacles
                .iter()
                .map(|o| ObstacleView {
                    id: o.id,
                    body: BodyView::of(&o.body),
                    passed: o.passed,
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Per-instance GPU data: one box or sphere
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct EntityInstance {
    pub position: [f32; 3],
    /// 0.0 for boxes
    pub radius: f32,
    pub extents: [f32; 3],
    pub id: u32,
    pub color: [f32; 4],
}

impl EntityInstance {
    pub fn new(id: u32, entity: &Entity) -> Self {
        let radius = match entity.shape() {
            Shape::Sphere { radius } => radius,
            Shape::Cuboid { .. } => 0.0,
        };
        Self {
            position: entity.position.to_array(),
            radius,
            extents: entity.shape().extents().to_array(),
            id,
            color: entity.color,
        }
    }
}

/// Ground, player, then obstacles in spawn order
pub fn instances(state: &GameState) -> Vec<EntityInstance> {
    let mut out = Vec::with_capacity(state.obstacles.len() + 2);
    out.push(EntityInstance::new(GROUND_INSTANCE_ID, &state.ground));
    out.push(EntityInstance::new(PLAYER_INSTANCE_ID, &state.player));
    out.extend(
        state
            .obstacles
            .iter()
            .map(|o| EntityInstance::new(o.id, &o.body)),
    );
    out
}

/// Raw bytes of an instance array
pub fn instance_bytes(instances: &[EntityInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}
