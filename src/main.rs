//! Cube Dodge entry point
//!
//! On the web this wires keyboard input and `requestAnimationFrame` to the
//! game loop and hands every frame to the page. Natively it plays a headless
//! autopilot run and reports the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use cube_dodge::SimConfig;
    use cube_dodge::runner::{FrameHandle, FrameOutcome, FrameScheduler, GameLoop};
    use cube_dodge::sim::{GameEvent, GameObserver, GameState, Key};
    use cube_dodge::view::{FrameSnapshot, instance_bytes, instances};

    // Frame hand-off to the page: snapshot JSON plus a copy of the packed instance array
    #[wasm_bindgen(inline_js = "
        export function present_frame(json, bytes) {
            const buffer = bytes.slice().buffer;
            window.dispatchEvent(new CustomEvent('cube-dodge-frame', {
                detail: { snapshot: JSON.parse(json), instances: buffer, stride: 48 },
            }));
        }
    ")]
    extern "C" {
        fn present_frame(json: &str, bytes: &[u8]);
    }

    type SharedGame = Rc<RefCell<GameLoop>>;

    /// `requestAnimationFrame` / `cancelAnimationFrame`
    struct WebScheduler {
        game: SharedGame,
    }

    impl FrameScheduler for WebScheduler {
        fn request_frame(&mut self) -> FrameHandle {
            let Some(window) = web_sys::window() else {
                log::error!("No window, cannot schedule frame");
                return FrameHandle(0);
            };

            // The callback learns its own id only after the request returns
            let id = Rc::new(Cell::new(0));
            let closure = {
                let game = self.game.clone();
                let id = id.clone();
                Closure::once(move |_time: f64| run_frame(&game, FrameHandle(id.get())))
            };

            match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
                Ok(handle) => {
                    id.set(handle);
                    closure.forget();
                    FrameHandle(handle)
                }
                Err(e) => {
                    log::error!("requestAnimationFrame failed: {:?}", e);
                    FrameHandle(0)
                }
            }
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(handle.0);
            }
        }
    }

    /// Applies game events to the DOM HUD
    struct HudObserver {
        document: Option<web_sys::Document>,
    }

    impl HudObserver {
        fn new() -> Self {
            Self {
                document: web_sys::window().and_then(|w| w.document()),
            }
        }

        fn set_text(&self, id: &str, text: &str) {
            match self.document.as_ref().and_then(|d| d.get_element_by_id(id)) {
                Some(el) => el.set_text_content(Some(text)),
                None => log::warn!("HUD element #{} missing", id),
            }
        }

        fn set_visible(&self, id: &str, visible: bool) {
            if let Some(el) = self.document.as_ref().and_then(|d| d.get_element_by_id(id)) {
                let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
            }
        }
    }

    impl GameObserver for HudObserver {
        fn on_event(&mut self, event: &GameEvent) {
            match *event {
                GameEvent::ScoreChanged { score } => self.set_text("score", &score.to_string()),
                GameEvent::GameOver { score, .. } => {
                    self.set_text("final-score", &score.to_string());
                    self.set_visible("game-over", true);
                }
                GameEvent::ObstacleSpawned { .. } | GameEvent::ObstaclePassed { .. } => {}
            }
        }
    }

    fn present(game: &GameLoop) {
        match FrameSnapshot::capture(&game.state).to_json() {
            Ok(json) => present_frame(&json, instance_bytes(&instances(&game.state))),
            Err(e) => log::error!("Failed to serialize frame: {}", e),
        }
    }

    fn run_frame(game: &SharedGame, handle: FrameHandle) {
        let mut scheduler = WebScheduler { game: game.clone() };
        let mut hud = HudObserver::new();
        let mut g = game.borrow_mut();

        if g.on_frame(handle, &mut scheduler, &mut hud) == FrameOutcome::Ignored {
            return;
        }
        present(&g);
        if g.state.is_game_over() {
            if let Some(top) = g.high_scores.top_score() {
                hud.set_text("high-score", &top.to_string());
            }
        }
    }

    fn restart(game: &SharedGame) {
        let seed = js_sys::Date::now() as u64;
        let mut scheduler = WebScheduler { game: game.clone() };
        let mut g = game.borrow_mut();
        if let Err(e) = g.restart(seed, &mut scheduler) {
            log::error!("Restart failed: {}", e);
            return;
        }

        let hud = HudObserver::new();
        hud.set_text("score", "0");
        hud.set_visible("game-over", false);
        present(&g);
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Cube Dodge starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let config = SimConfig::load();
        let state = GameState::with_config(config, seed)
            .or_else(|e| {
                log::warn!("Stored config rejected ({}), using defaults", e);
                GameState::new(seed)
            })
            .expect("default config is valid");
        // Write back what is actually in use so the page can edit it
        state.config.save();
        let game: SharedGame = Rc::new(RefCell::new(GameLoop::new(state)));

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone());
        setup_restart_button(game.clone());
        setup_visibility(game.clone());

        let hud = HudObserver::new();
        hud.set_visible("game-over", false);
        if let Some(top) = game.borrow().high_scores.top_score() {
            hud.set_text("high-score", &top.to_string());
        }

        let mut scheduler = WebScheduler { game: game.clone() };
        game.borrow_mut().start(&mut scheduler);
        present(&game.borrow());

        log::info!("Cube Dodge running!");
    }

    fn setup_input_handlers(game: SharedGame) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let code = event.code();
                match code.as_str() {
                    "KeyR" => restart(&game),
                    "KeyI" => {
                        let mut g = game.borrow_mut();
                        g.autopilot = !g.autopilot;
                        log::info!("Idle mode: {}", g.autopilot);
                    }
                    _ => {
                        if let Some(key) = Key::from_code(&code) {
                            // Keep arrows and space from scrolling the page
                            event.prevent_default();
                            game.borrow_mut().key_down(key);
                        }
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if let Some(key) = Key::from_code(&event.code()) {
                    game.borrow_mut().key_up(key);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_restart_button(game: SharedGame) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        match document.get_element_by_id("restart-btn") {
            Some(btn) => {
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                    restart(&game);
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
            None => log::warn!("No #restart-btn, restart is keyboard only"),
        }
    }

    /// Stop stepping while the tab is hidden, resume when it comes back
    fn setup_visibility(game: SharedGame) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut scheduler = WebScheduler { game: game.clone() };
            let mut g = game.borrow_mut();
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                g.stop(&mut scheduler);
                g.input.clear();
                log::info!("Paused (tab hidden)");
            } else {
                g.start(&mut scheduler);
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Ten minutes of play at 60 fps
#[cfg(not(target_arch = "wasm32"))]
const MAX_HEADLESS_FRAMES: u64 = 36_000;

/// Hands out frames back to back
#[cfg(not(target_arch = "wasm32"))]
#[derive(Default)]
struct ImmediateScheduler {
    next: i32,
    queued: Option<cube_dodge::runner::FrameHandle>,
}

#[cfg(not(target_arch = "wasm32"))]
impl cube_dodge::runner::FrameScheduler for ImmediateScheduler {
    fn request_frame(&mut self) -> cube_dodge::runner::FrameHandle {
        self.next += 1;
        let handle = cube_dodge::runner::FrameHandle(self.next);
        self.queued = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: cube_dodge::runner::FrameHandle) {
        if self.queued == Some(handle) {
            self.queued = None;
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
struct LogObserver;

#[cfg(not(target_arch = "wasm32"))]
impl cube_dodge::sim::GameObserver for LogObserver {
    fn on_event(&mut self, event: &cube_dodge::sim::GameEvent) {
        use cube_dodge::sim::GameEvent;
        match *event {
            GameEvent::ObstaclePassed { id } => log::debug!("Passed obstacle {}", id),
            GameEvent::ScoreChanged { score } => log::trace!("Score: {}", score),
            GameEvent::ObstacleSpawned { .. } | GameEvent::GameOver { .. } => {}
        }
    }
}

/// Usage: `cube-dodge [config.json] [seed]`
#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cube_dodge::SimConfig;
    use cube_dodge::runner::GameLoop;
    use cube_dodge::sim::GameState;

    env_logger::init();
    log::info!("Cube Dodge (native) starting...");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            log::info!("Loading config from {}", path);
            SimConfig::from_file(&path)?
        }
        None => SimConfig::default(),
    };
    let seed = match args.next() {
        Some(s) => s.parse()?,
        None => cube_dodge::highscores::now_ms() as u64,
    };

    let mut game = GameLoop::new(GameState::with_config(config, seed)?);
    game.autopilot = true;
    log::info!(
        "Headless autopilot run: variant {}, seed {}",
        game.state.config.variant.as_str(),
        seed
    );

    let mut scheduler = ImmediateScheduler::default();
    let mut observer = LogObserver;
    game.start(&mut scheduler);
    while let Some(handle) = scheduler.queued.take() {
        game.on_frame(handle, &mut scheduler, &mut observer);
        if game.state.frame >= MAX_HEADLESS_FRAMES {
            game.stop(&mut scheduler);
            log::info!("Frame limit reached");
        }
    }

    println!(
        "seed {}: {} after {} frames, score {}, passed {}",
        seed,
        if game.state.is_game_over() {
            "game over"
        } else {
            "survived"
        },
        game.state.frame,
        game.state.score,
        game.state.passed_count
    );
    Ok(())
}
