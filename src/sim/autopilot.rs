//! Idle/demo mode - the game plays itself
//!
//! Produces the input a cautious player would give: sidestep the closest
//! obstacle heading into our lane until it is fully behind us, otherwise
//! drift back to the middle.

use std::cmp::Ordering;

use super::input::TickInput;
use super::state::GameState;
use crate::consts::GROUND_WIDTH;

/// How far ahead of the player (along -z) obstacles are considered
const LOOKAHEAD_Z: f32 = 6.0;
/// Lateral gap kept between the player and an obstacle
const CLEARANCE: f32 = 0.3;
/// Stay this far inside the ground edges
const EDGE_MARGIN: f32 = 0.75;
/// Dead zone around the middle when drifting back
const CENTER_DEAD_ZONE: f32 = 0.5;

/// Choose input for the next step
pub fn autopilot(state: &GameState) -> TickInput {
    let mut input = TickInput::default();
    if state.is_game_over() {
        return input;
    }

    let player = &state.player;
    let px = player.position.x;
    let half_width = player.shape().extents().x / 2.0;

    let front = player.bounds().front;
    let back = player.bounds().back;

    // Closest obstacle not yet fully behind us that would clip us if we stayed put
    let threat = state
        .obstacles
        .iter()
        .filter(|o| o.body.bounds().back <= front)
        .filter(|o| back - o.body.bounds().front < LOOKAHEAD_Z)
        .filter(|o| {
            let reach = half_width + o.body.shape().extents().x / 2.0 + CLEARANCE;
            (o.body.position.x - px).abs() < reach
        })
        .max_by(|a, b| {
            a.body
                .position
                .z
                .partial_cmp(&b.body.position.z)
                .unwrap_or(Ordering::Equal)
        });

    let limit = GROUND_WIDTH / 2.0 - EDGE_MARGIN;

    match threat {
        Some(obstacle) => {
            let dx = px - obstacle.body.position.x;
            let mut go_right = if dx == 0.0 { px <= 0.0 } else { dx > 0.0 };
            // Never dodge off the ground; cross over instead
            if go_right && px > limit {
                go_right = false;
            } else if !go_right && px < -limit {
                go_right = true;
            }
            if go_right {
                input.right = true;
            } else {
                input.left = true;
            }
        }
        None => {
            if px > CENTER_DEAD_ZONE {
                input.left = true;
            } else if px < -CENTER_DEAD_ZONE {
                input.right = true;
            }
        }
    }

    input
}
