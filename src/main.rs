//! Nomad Run entry point
//!
//! On wasm32 this wires the session to the page: canvas, sprite image,
//! keyboard/pointer input, visibility and the animation-frame loop.
//! Natively it plays a headless autopilot run and prints a JSON summary.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlImageElement, KeyboardEvent, MouseEvent, TouchEvent};

    use nomad_run::audio::AudioManager;
    use nomad_run::platform::web::{AnimationFrameClock, CanvasRenderer};
    use nomad_run::platform::{Host, InputEvent};
    use nomad_run::renderer;
    use nomad_run::sim::{Autopilot, Session};
    use nomad_run::tuning::Tuning;

    /// Game instance holding the session and its collaborators
    struct Game {
        session: Session,
        renderer: CanvasRenderer,
        audio: AudioManager,
        clock: AnimationFrameClock,
        /// Demo mode - the autopilot plays
        autopilot: Option<Autopilot>,
    }

    impl Game {
        fn with_host<R>(&mut self, f: impl FnOnce(&mut Session, &mut Host<'_>) -> R) -> R {
            let mut host = Host {
                renderer: &mut self.renderer,
                audio: &mut self.audio,
                clock: &mut self.clock,
            };
            f(&mut self.session, &mut host)
        }

        fn send(&mut self, event: InputEvent) {
            self.audio.resume();
            self.with_host(|session, host| session.handle_input(event, host));
        }

        /// One display frame: feed the autopilot, then run the session if it asked
        fn frame(&mut self) {
            if let Some(mut pilot) = self.autopilot.take() {
                for event in pilot.inputs(&self.session) {
                    self.send(event);
                }
                if self.session.crashed {
                    self.send(InputEvent::RestartRequested);
                }
                self.autopilot = Some(pilot);
            }

            if self.clock.take_pending().is_some() {
                self.with_host(|session, host| session.update(host));
            }
        }

        fn set_visible(&mut self, visible: bool) {
            self.with_host(|session, host| session.set_visible(visible, host));
        }

        fn redraw(&mut self) {
            self.with_host(|session, host| renderer::draw_frame(session, host.renderer));
        }
    }

    fn element<T: JsCast>(document: &web_sys::Document, id: &str) -> Result<T, JsValue> {
        document
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("missing #{}", id)))?
            .dyn_into::<T>()
            .map_err(|_| JsValue::from_str(&format!("#{} has the wrong element type", id)))
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }
        log::info!("Nomad Run starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;

        // Optional balance overrides embedded in the page
        let tuning_json = document.get_element_by_id("tuning").and_then(|el| el.text_content());
        let tuning = Tuning::load_or_default(tuning_json.as_deref());

        let canvas: HtmlCanvasElement = element(&document, "canvas")?;
        let dpr = window.device_pixel_ratio();
        let sprite_id = if dpr > 1.0 {
            "offline-resources-2x"
        } else {
            "offline-resources-1x"
        };
        let sprite: HtmlImageElement = element(&document, sprite_id)?;
        let renderer = CanvasRenderer::new(&canvas, sprite.clone(), tuning.canvas_width, tuning.canvas_height, dpr)?;

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game {
            session: Session::new(tuning, seed),
            renderer,
            audio: AudioManager::new(),
            clock: AnimationFrameClock::new(),
            autopilot: None,
        }));
        log::info!("Game initialized with seed: {}", seed);

        // Redraw once the atlas arrives so the first frame isn't blank
        if !sprite.complete() {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().redraw();
            });
            sprite.add_event_listener_with_callback("load", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        setup_input_handlers(&canvas, game.clone())?;
        setup_auto_pause(game.clone())?;

        game.borrow_mut().with_host(|session, host| session.start(host));
        request_animation_frame(game);
        log::info!("Nomad Run running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

        // Keyboard
        for (kind, down) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                if down && code == "KeyI" {
                    let mut g = game.borrow_mut();
                    g.autopilot = match g.autopilot {
                        Some(_) => None,
                        None => Some(Autopilot::default()),
                    };
                    log::info!("Autopilot: {}", g.autopilot.is_some());
                    return;
                }
                if let Some(input) = InputEvent::from_key(&code, down) {
                    event.prevent_default();
                    game.borrow_mut().send(input);
                }
            });
            window.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Mouse. A left or middle click release restarts a crashed run at once.
        for (kind, input) in [("mousedown", InputEvent::JumpPressed), ("mouseup", InputEvent::JumpReleased)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.send(input);
                if input == InputEvent::JumpReleased && event.button() < 2 {
                    g.send(InputEvent::RestartRequested);
                }
            });
            canvas.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch start jumps, or restarts a crashed run
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                g.send(InputEvent::JumpPressed);
                g.send(InputEvent::RestartRequested);
            });
            canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch end
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().send(InputEvent::JumpReleased);
            });
            canvas.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        if window.request_animation_frame(closure.as_ref().unchecked_ref()).is_err() {
            log::error!("requestAnimationFrame failed, game loop stopped");
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        game.borrow_mut().frame();
        request_animation_frame(game);
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let visible = document_clone.visibility_state() != web_sys::VisibilityState::Hidden;
                if !visible {
                    log::info!("Auto-paused (tab hidden)");
                }
                game.borrow_mut().set_visible(visible);
            });
            document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Window blur / focus
        for (kind, visible) in [("blur", false), ("focus", true)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().set_visible(visible);
            });
            window.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless_run {
    use serde::Serialize;

    use nomad_run::platform::headless::HeadlessHost;
    use nomad_run::platform::Cue;
    use nomad_run::sim::{Autopilot, DistanceMeter, Session};
    use nomad_run::tuning::Tuning;

    /// Default frame budget: two minutes at 60 fps
    const DEFAULT_FRAMES: u32 = 60 * 120;

    /// Result of a headless run
    #[derive(Debug, Serialize)]
    pub struct RunSummary {
        pub seed: u64,
        pub frames: u32,
        pub crashed: bool,
        pub distance: f64,
        pub score: u64,
        pub high_score: u64,
        pub final_speed: f64,
        pub milestones: usize,
    }

    pub struct Args {
        pub seed: u64,
        pub tuning_path: Option<String>,
        pub frames: u32,
    }

    /// `[seed] [tuning.json] [frames]`
    pub fn parse_args(args: &[String]) -> Result<Args, String> {
        let seed = match args.first() {
            Some(s) => s.parse().map_err(|e| format!("invalid seed {:?}: {}", s, e))?,
            None => 12345,
        };
        let tuning_path = args.get(1).filter(|p| p.as_str() != "-").cloned();
        let frames = match args.get(2) {
            Some(s) => s.parse().map_err(|e| format!("invalid frame count {:?}: {}", s, e))?,
            None => DEFAULT_FRAMES,
        };
        Ok(Args {
            seed,
            tuning_path,
            frames,
        })
    }

    /// Play with the autopilot until the run ends or the frame budget is spent
    pub fn run(seed: u64, tuning: Tuning, max_frames: u32) -> RunSummary {
        let mut host = HeadlessHost::new(1000.0 / tuning.fps);
        let mut session = Session::new(tuning, seed);
        let mut pilot = Autopilot::default();
        session.start(&mut host.host());

        let mut frames = 0;
        while frames < max_frames && !session.crashed {
            for event in pilot.inputs(&session) {
                host.send(&mut session, event);
            }
            host.step_frame(&mut session);
            frames += 1;
        }

        let milestones = host
            .audio
            .played
            .iter()
            .filter(|&&cue| cue == Cue::ScoreMilestone)
            .count();

        RunSummary {
            seed,
            frames,
            crashed: session.crashed,
            distance: session.distance_ran,
            score: session.score(),
            high_score: DistanceMeter::displayed(session.high_score),
            final_speed: session.current_speed,
            milestones,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Nomad Run (native) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = match headless_run::parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("usage: nomad-run [seed] [tuning.json|-] [frames]");
            std::process::exit(2);
        }
    };

    let tuning_json = match &args.tuning_path {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(json) => Some(json),
            Err(e) => {
                log::warn!("Could not read {}: {}", path, e);
                None
            }
        },
        None => None,
    };
    let tuning = nomad_run::Tuning::load_or_default(tuning_json.as_deref());

    let summary = headless_run::run(args.seed, tuning, args.frames);
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize summary: {}", e);
            std::process::exit(1);
        }
    }
}
