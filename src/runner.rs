//! Frame loop driver
//!
//! Exactly one simulation step runs per display frame. The loop arms one frame
//! callback at a time: it re-arms after each step while the game is running,
//! stops on game over, and a restart cancels any pending callback before
//! arming a new one so two loops can never run side by side.

use crate::highscores::{HighScores, now_ms};
use crate::sim::{GameEvent, GameObserver, GameState, InputState, Key, StateError, autopilot, tick};

/// Token for a requested frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Host frame scheduling (`requestAnimationFrame` on the web)
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// What happened when a frame callback fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Stepped once and armed the next frame
    Continued,
    /// Stepped once and the game ended; nothing is armed
    Finished,
    /// Callback was stale (cancelled or superseded); nothing ran
    Ignored,
}

/// Game instance holding simulation state, input and loop registration
pub struct GameLoop {
    pub state: GameState,
    pub input: InputState,
    /// Idle/demo mode - the autopilot supplies input
    pub autopilot: bool,
    pub high_scores: HighScores,
    pending: Option<FrameHandle>,
    events: Vec<GameEvent>,
}

impl GameLoop {
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            input: InputState::new(),
            autopilot: false,
            high_scores: HighScores::load(),
            pending: None,
            events: Vec::new(),
        }
    }

    /// Currently armed frame, if any
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Arm the first frame. Does nothing if one is already pending or the game is over.
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.pending.is_none() && !self.state.is_game_over() {
            self.pending = Some(scheduler.request_frame());
        }
    }

    pub fn key_down(&mut self, key: Key) {
        self.input.key_down(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.input.key_up(key);
    }

    /// Frame callback body: one step, then re-arm while running.
    ///
    /// Events from the step go to `observer`; a finished run is also offered
    /// to the high score table.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        scheduler: &mut dyn FrameScheduler,
        observer: &mut dyn GameObserver,
    ) -> FrameOutcome {
        if self.pending != Some(handle) {
            log::debug!("Ignoring stale frame callback {:?}", handle);
            return FrameOutcome::Ignored;
        }
        self.pending = None;

        // Held keys still update while the autopilot drives, but its input wins
        let manual = self.input.take_tick_input();
        let input = if self.autopilot {
            autopilot(&self.state)
        } else {
            manual
        };

        self.events.clear();
        tick(&mut self.state, &input, &mut self.events);
        for event in &self.events {
            observer.on_event(event);
            if let GameEvent::GameOver { score, frame, .. } = *event {
                if let Some(rank) = self.high_scores.add_score(score, frame, now_ms()) {
                    log::info!("New high score #{}: {}", rank, score);
                    self.high_scores.save();
                }
            }
        }

        if self.state.is_game_over() {
            FrameOutcome::Finished
        } else {
            self.pending = Some(scheduler.request_frame());
            FrameOutcome::Continued
        }
    }

    /// Reinitialize everything and arm a fresh loop.
    ///
    /// The pending callback (if any) is cancelled before the new one is requested.
    pub fn restart(
        &mut self,
        seed: u64,
        scheduler: &mut dyn FrameScheduler,
    ) -> Result<(), StateError> {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
        self.state.reset(seed)?;
        self.input.clear();
        log::info!("Game restarted with seed: {}", seed);
        self.start(scheduler);
        Ok(())
    }

    /// Cancel the pending frame without touching state (page hidden, teardown)
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
    }
}
