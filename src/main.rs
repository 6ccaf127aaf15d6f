//! Descent Race entry point
//!
//! Native: headless run driven by a synthetic frame clock, results on stdout.
//! Web: requestAnimationFrame loop with keyboard controls.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_race {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use descent_race::platform::web::RafScheduler;
    use descent_race::renderer::LogRenderer;
    use descent_race::{AnimationController, RunStatus, Settings, SpeedPreset};

    type Race = AnimationController<RafScheduler, LogRenderer>;

    /// Shape parameter step for the bracket keys
    const SHAPE_STEP: f64 = 0.1;

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }
        log::info!("Descent Race starting...");

        let settings = Rc::new(RefCell::new(Settings::load()));
        let race: Rc<RefCell<Race>> = {
            let s = settings.borrow();
            Rc::new(RefCell::new(AnimationController::with_settings(
                &s,
                RafScheduler::new(),
                LogRenderer::with_settings(&s),
            )))
        };

        // Frames reach the controller through a weak link so the scheduler's
        // callback never keeps a dropped race alive
        {
            let weak = Rc::downgrade(&race);
            race.borrow().scheduler().set_on_frame(move |handle, time| {
                if let Some(race) = weak.upgrade() {
                    race.borrow_mut().on_frame(handle, time);
                }
            });
        }

        race.borrow_mut().start();
        // The keyboard closure is leaked and owns the race from here on
        setup_keyboard(race, settings);
    }

    fn setup_keyboard(race: Rc<RefCell<Race>>, settings: Rc<RefCell<Settings>>) {
        let Some(window) = web_sys::window() else {
            log::warn!("No window; keyboard controls disabled");
            return;
        };

        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut r = race.borrow_mut();
            let mut s = settings.borrow_mut();
            match event.key().as_str() {
                " " => match r.status() {
                    RunStatus::Running => r.pause(),
                    RunStatus::Paused => r.resume(),
                    RunStatus::Idle | RunStatus::Complete => r.start(),
                },
                "r" | "R" => r.reset(),
                key @ ("1" | "2" | "3" | "4") => {
                    let index = key.parse::<usize>().unwrap_or(1) - 1;
                    let preset = SpeedPreset::ALL[index.min(SpeedPreset::ALL.len() - 1)];
                    s.apply_preset(preset);
                    if r.set_speed_multiplier(s.speed_multiplier) {
                        s.save();
                    }
                }
                "[" | "]" => {
                    let step = if event.key() == "[" { -SHAPE_STEP } else { SHAPE_STEP };
                    let shape = (r.shape_parameter() + step).clamp(0.0, 1.0);
                    if r.set_shape_parameter(shape) {
                        s.shape_parameter = shape;
                        s.save();
                    }
                }
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_race::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use descent_race::platform::{FrameClock, ManualScheduler};
    use descent_race::renderer::LogRenderer;
    use descent_race::{AnimationController, RunStatus, Settings};

    /// Upper bound on frames for one headless run
    const MAX_FRAMES: usize = 100_000;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Descent Race (native) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let seed = std::env::var("DESCENT_RACE_SEED")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);

    let mut race = AnimationController::with_settings(
        &settings,
        ManualScheduler::new(),
        LogRenderer::with_settings(&settings),
    );
    let mut frames = FrameClock::new(seed);

    race.start();
    let mut count = 0;
    while let Some(handle) = race.scheduler_mut().take_pending() {
        race.on_frame(handle, frames.next_timestamp());
        count += 1;
        if count >= MAX_FRAMES {
            log::warn!("Stopping after {} frames without completion", count);
            break;
        }
    }

    log::info!(
        "{} frames, {} lead changes",
        race.renderer().frames(),
        race.renderer().lead_changes()
    );
    match (race.status(), race.standings()) {
        (RunStatus::Complete, Some(standings)) => {
            println!("Final standings (speed {}x):", race.speed_multiplier());
            print!("{}", standings);
        }
        (status, _) => println!("Race ended without completing ({})", status.as_str()),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
