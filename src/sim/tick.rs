//! Per-frame simulation step
//!
//! Core game loop that advances the simulation by exactly one frame.

use super::entity::Entity;
use super::input::TickInput;
use super::state::{GameEvent, GameObserver, GamePhase, GameState};
use crate::consts::*;
use crate::settings::ScoreRule;

/// Advance the game state by one frame.
///
/// Does nothing once the game is over.
pub fn tick(state: &mut GameState, input: &TickInput, observer: &mut dyn GameObserver) {
    if state.phase == GamePhase::GameOver {
        return;
    }

    apply_input(&mut state.player, input);
    state.player.step(&state.ground);

    let policy = state.policy();
    let scoring = state.config.scoring;
    let player_z = state.player.position.z;
    let mut first_hit = None;

    for obstacle in &mut state.obstacles {
        obstacle.body.step(&state.ground);

        if obstacle.check_passed(player_z) {
            state.passed_count += 1;
            observer.on_event(&GameEvent::ObstaclePassed { id: obstacle.id });
            if scoring == ScoreRule::PassedObstacles {
                state.score += 1;
                observer.on_event(&GameEvent::ScoreChanged { score: state.score });
            }
        }

        // Later obstacles still move this frame, but only the first hit counts
        if first_hit.is_none() && policy.collides(&state.player, &obstacle.body) {
            first_hit = Some(obstacle.id);
        }
    }

    if let Some((id, x)) = state.run_spawner() {
        observer.on_event(&GameEvent::ObstacleSpawned { id, x });
    }

    if scoring == ScoreRule::FramesSurvived {
        state.score += 1;
        observer.on_event(&GameEvent::ScoreChanged { score: state.score });
    }

    state.frame += 1;

    match first_hit {
        Some(obstacle) => {
            state.phase = GamePhase::GameOver;
            log::info!(
                "Game over: hit obstacle {} on frame {} with score {}",
                obstacle,
                state.frame,
                state.score
            );
            observer.on_event(&GameEvent::GameOver {
                obstacle,
                score: state.score,
                frame: state.frame,
            });
        }
        None => cull_obstacles(state),
    }
}

/// Player velocity comes straight from the held keys; nothing carries over.
///
/// Jump overwrites vertical velocity whether or not the player is on the
/// ground, so it can be repeated in mid-air.
fn apply_input(player: &mut Entity, input: &TickInput) {
    player.velocity.x = if input.left {
        -MOVE_SPEED
    } else if input.right {
        MOVE_SPEED
    } else {
        0.0
    };

    player.velocity.z = if input.back {
        MOVE_SPEED
    } else if input.forward {
        -MOVE_SPEED
    } else {
        0.0
    };

    if input.jump {
        player.velocity.y = JUMP_IMPULSE;
    }
}

/// Drop passed obstacles that are far behind the player (opt-in)
fn cull_obstacles(state: &mut GameState) {
    let Some(distance) = state.config.cull_distance else {
        return;
    };
    let player_z = state.player.position.z;
    let before = state.obstacles.len();
    state
        .obstacles
        .retain(|o| !(o.passed && o.body.position.z - player_z > distance));
    let removed = before - state.obstacles.len();
    if removed > 0 {
        log::debug!("Culled {} obstacles", removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{ShapeVariant, SimConfig};
    use glam::Vec3;

    /// A state that will not spawn on its own for the length of a test
    fn quiet_state(config: SimConfig) -> GameState {
        let config = SimConfig {
            initial_spawn_interval: 1_000_000,
            min_spawn_interval: 1_000_000,
            ..config
        };
        let mut state = GameState::with_config(config, 12345).unwrap();
        state.frame = 1;
        state
    }

    fn run(state: &mut GameState, input: TickInput, frames: usize, events: &mut Vec<GameEvent>) {
        for _ in 0..frames {
            tick(state, &input, events);
        }
    }

    fn place(state: &mut GameState, x: f32, z: f32) -> u32 {
        let id = state.spawn_obstacle(x).unwrap();
        let body = &mut state.obstacles.last_mut().unwrap().body;
        body.position.z = z;
        body.update_bounds();
        id
    }

    #[test]
    fn test_first_frame_spawns() {
        let mut state = GameState::new(12345).unwrap();
        let mut events = Vec::new();
        tick(&mut state, &TickInput::default(), &mut events);

        assert_eq!(state.frame, 1);
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.spawner.interval(), 180);
        assert!(matches!(events[0], GameEvent::ObstacleSpawned { .. }));
        let x = state.obstacles[0].body.position.x;
        assert!((-5.0..5.0).contains(&x));
    }

    #[test]
    fn test_pass_frame_and_single_score() {
        // z after k steps = -20 + 0.005k + 0.0003 k(k+1)/2, first > 0 at k = 349
        let mut state = quiet_state(SimConfig::default());
        let id = place(&mut state, 4.0, SPAWN_Z);
        let mut events = Vec::new();

        let mut passed_at = None;
        for k in 1..=500 {
            let was_passed = state.obstacles[0].passed;
            tick(&mut state, &TickInput::default(), &mut events);
            let obstacle = &state.obstacles[0];
            if !was_passed && obstacle.passed {
                assert!(state.player.position.z < obstacle.body.position.z);
                passed_at = Some(k);
            }
            if !obstacle.passed {
                assert!(state.player.position.z >= obstacle.body.position.z);
            }
        }

        assert_eq!(passed_at, Some(349));
        assert_eq!(state.score, 1);
        assert_eq!(state.passed_count, 1);
        assert!(!state.is_game_over());
        let passes: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::ObstaclePassed { .. }))
            .collect();
        assert_eq!(passes, vec![&GameEvent::ObstaclePassed { id }]);
    }

    #[test]
    fn test_collision_ends_game() {
        let mut state = quiet_state(SimConfig::default());
        let id = place(&mut state, 0.0, -0.5);
        let mut events = Vec::new();

        tick(&mut state, &TickInput::default(), &mut events);
        assert!(state.is_game_over());
        assert_eq!(
            events.last(),
            Some(&GameEvent::GameOver {
                obstacle: id,
                score: 0,
                frame: 2
            })
        );

        // Terminal: further steps change nothing
        let player = state.player.position;
        let frame = state.frame;
        run(&mut state, TickInput { left: true, ..Default::default() }, 10, &mut events);
        assert_eq!(state.frame, frame);
        assert_eq!(state.player.position, player);
        assert_eq!(
            events.iter().filter(|e| matches!(e, GameEvent::GameOver { .. })).count(),
            1
        );
    }

    #[test]
    fn test_two_hits_same_frame_single_game_over() {
        let mut state = quiet_state(SimConfig::default());
        let first = place(&mut state, 0.2, 0.0);
        let second = place(&mut state, -0.2, 0.1);
        let mut events = Vec::new();

        tick(&mut state, &TickInput::default(), &mut events);
        let game_overs: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::GameOver { obstacle, .. } => Some(*obstacle),
                _ => None,
            })
            .collect();
        assert_eq!(game_overs, vec![first]);
        assert_ne!(first, second);
        // The second obstacle still moved this frame
        assert!(state.obstacles[1].body.position.z > 0.1);
    }

    #[test]
    fn test_horizontal_input() {
        let mut state = quiet_state(SimConfig::default());
        let mut events = Vec::new();

        // Left wins over right; back wins over forward
        let input = TickInput {
            left: true,
            right: true,
            forward: true,
            back: true,
            jump: false,
        };
        tick(&mut state, &input, &mut events);
        assert_eq!(state.player.velocity.x, -MOVE_SPEED);
        assert_eq!(state.player.velocity.z, MOVE_SPEED);
        assert!((state.player.position.x + MOVE_SPEED).abs() < 1e-6);

        let input = TickInput {
            right: true,
            forward: true,
            ..Default::default()
        };
        tick(&mut state, &input, &mut events);
        assert_eq!(state.player.velocity.x, MOVE_SPEED);
        assert_eq!(state.player.velocity.z, -MOVE_SPEED);

        // Released keys stop the player at once
        tick(&mut state, &TickInput::default(), &mut events);
        assert_eq!(state.player.velocity.x, 0.0);
        assert_eq!(state.player.velocity.z, 0.0);
    }

    #[test]
    fn test_jump_stacks_in_mid_air() {
        let mut state = quiet_state(SimConfig::default());
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        let mut events = Vec::new();

        tick(&mut state, &jump, &mut events);
        let y1 = state.player.position.y;
        assert!((state.player.velocity.y - (JUMP_IMPULSE + GRAVITY)).abs() < 1e-6);

        run(&mut state, TickInput::default(), 5, &mut events);
        // Still airborne, jump again
        tick(&mut state, &jump, &mut events);
        assert!((state.player.velocity.y - (JUMP_IMPULSE + GRAVITY)).abs() < 1e-6);
        assert!(state.player.position.y > y1);
    }

    #[test]
    fn test_frames_survived_scoring() {
        let config = SimConfig {
            scoring: ScoreRule::FramesSurvived,
            ..Default::default()
        };
        let mut state = GameState::with_config(config, 7).unwrap();
        let mut events = Vec::new();
        run(&mut state, TickInput::default(), 100, &mut events);

        assert!(!state.is_game_over());
        assert_eq!(state.score, 100);
        assert_eq!(state.frame, 100);
        assert_eq!(
            events.last(),
            Some(&GameEvent::ScoreChanged { score: 100 })
        );
    }

    #[test]
    fn test_obstacles_kept_without_cull() {
        let mut state = quiet_state(SimConfig::default());
        place(&mut state, 4.0, SPAWN_Z);
        run(&mut state, TickInput::default(), 500, &mut Vec::new());
        assert_eq!(state.obstacles.len(), 1);
        assert!(state.obstacles[0].passed);
    }

    #[test]
    fn test_cull_distance() {
        let mut state = quiet_state(SimConfig {
            cull_distance: Some(2.0),
            ..Default::default()
        });
        place(&mut state, 4.0, SPAWN_Z);

        run(&mut state, TickInput::default(), 350, &mut Vec::new());
        // Just passed, still close
        assert_eq!(state.obstacles.len(), 1);

        run(&mut state, TickInput::default(), 50, &mut Vec::new());
        assert!(state.obstacles.is_empty());
        assert_eq!(state.passed_count, 1);
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_sphere_variant_collision() {
        let mut state = quiet_state(SimConfig::for_variant(ShapeVariant::Sphere));
        // Box corners would touch, sphere centers are 1.2 apart
        place(&mut state, 0.85, 0.85);
        tick(&mut state, &TickInput::default(), &mut ());
        assert!(!state.is_game_over());

        place(&mut state, -0.3, 0.0);
        tick(&mut state, &TickInput::default(), &mut ());
        assert!(state.is_game_over());
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut state = GameState::new(1).unwrap();
        tick(&mut state, &TickInput::default(), &mut ());
        assert_eq!(state.spawner.interval(), 180);
        place(&mut state, 0.0, -0.5);
        run(&mut state, TickInput { right: true, ..Default::default() }, 3, &mut Vec::new());
        assert!(state.is_game_over());

        state.reset(777).unwrap();
        assert!(state.obstacles.is_empty());
        assert_eq!(state.score, 0);
        assert_eq!(state.passed_count, 0);
        assert_eq!(state.frame, 0);
        assert_eq!(state.spawner.interval(), INITIAL_SPAWN_INTERVAL);
        assert_eq!(state.player.position, Vec3::ZERO);
        assert_eq!(state.player.velocity, Vec3::new(0.0, PLAYER_START_VELOCITY_Y, 0.0));
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(99999).unwrap();
        let mut state2 = GameState::new(99999).unwrap();

        let inputs = [
            TickInput {
                left: true,
                ..Default::default()
            },
            TickInput {
                jump: true,
                ..Default::default()
            },
            TickInput {
                forward: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for _ in 0..100 {
            for input in &inputs {
                tick(&mut state1, input, &mut ());
                tick(&mut state2, input, &mut ());
            }
        }

        assert_eq!(state1.frame, state2.frame);
        assert_eq!(state1.obstacles.len(), state2.obstacles.len());
        assert_eq!(state1.player.position, state2.player.position);
        for (a, b) in state1.obstacles.iter().zip(&state2.obstacles) {
            assert_eq!(a.body.position, b.body.position);
        }
    }

    #[test]
    fn test_observer_trait_object() {
        struct Counter(usize);
        impl GameObserver for Counter {
            fn on_event(&mut self, _event: &GameEvent) {
                self.0 += 1;
            }
        }

        let mut state = GameState::new(3).unwrap();
        let mut counter = Counter(0);
        tick(&mut state, &TickInput::default(), &mut counter);
        assert_eq!(counter.0, 1);
    }
}
