//! Block Idle entry point
//!
//! Handles platform-specific initialization and runs the game loop. The web
//! build drives `Game` from `requestAnimationFrame`; the native build runs a
//! headless session and logs what happened.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent};

    use block_idle::consts::SIM_DT;
    use block_idle::persistence::{LocalStorageStore, ProgressStore};
    use block_idle::platform;
    use block_idle::renderer::Canvas2dRenderer;
    use block_idle::sim::{Action, PrestigeUpgradeId, SpecialKind, UpgradeKind};
    use block_idle::{Canvas, Game, Settings, Tuning};

    /// Browser-side wrapper around the game
    struct App {
        game: Game,
        renderer: Canvas2dRenderer,
        store: LocalStorageStore,
        canvas: HtmlCanvasElement,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl App {
        /// Keep the backing store in sync with the CSS size
        fn sync_canvas_size(&mut self) {
            let width = self.canvas.client_width().max(0) as u32;
            let height = self.canvas.client_height().max(0) as u32;
            if self.canvas.width() != width || self.canvas.height() != height {
                self.canvas.set_width(width);
                self.canvas.set_height(height);
                self.renderer.resize(width, height);
            }
            self.game
                .resize(Canvas::new(width as f32, height as f32));
        }

        /// Map a client position into canvas coordinates
        fn to_canvas(&self, client_x: f64, client_y: f64) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            let sx = if rect.width() > 0.0 {
                self.canvas.width() as f64 / rect.width()
            } else {
                1.0
            };
            let sy = if rect.height() > 0.0 {
                self.canvas.height() as f64 / rect.height()
            } else {
                1.0
            };
            Vec2::new(
                ((client_x - rect.left()) * sx) as f32,
                ((client_y - rect.top()) * sy) as f32,
            )
        }

        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            self.last_time = time;

            self.sync_canvas_size();
            self.game.frame(dt);
            self.game.autosave(&mut self.store, platform::now_ms());

            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        fn render(&self, time: f64) {
            self.renderer.draw(&self.game.draw(time));
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let state = self.game.state();
            let set = |selector: &str, text: &str| {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    el.set_text_content(Some(text));
                }
            };

            set("#hud-coins .hud-value", &format!("{}", state.coins.floor()));
            set("#hud-level .hud-value", &state.level.to_string());
            set("#hud-golds .hud-value", &state.golds.to_string());
            set("#hud-balls .hud-value", &state.balls.len().to_string());
            if self.game.settings().show_fps {
                set("#hud-fps .hud-value", &self.fps.to_string());
            }

            for upgrade in &state.prestige_upgrades {
                let id = match upgrade.id {
                    PrestigeUpgradeId::MoneyPerLevel => "prestige-money",
                    PrestigeUpgradeId::LaserPower => "prestige-laser",
                    PrestigeUpgradeId::GoldMultiplier => "prestige-gold",
                    PrestigeUpgradeId::BallDamage => "prestige-damage",
                };
                let detail = match upgrade.next_gain() {
                    Some(gain) => format!(
                        "Lv {}/{} · +{} · {} golds",
                        upgrade.level, upgrade.max_level, gain, upgrade.cost
                    ),
                    None => format!("Lv {}/{} · max", upgrade.level, upgrade.max_level),
                };
                set(&format!("#{} .shop-detail", id), &detail);
            }

            if let Some(el) = document.get_element_by_id("level-reward") {
                match state.level_reward {
                    Some(reward) => {
                        let _ = el.set_attribute("class", "");
                        el.set_text_content(Some(&format!("Level complete! +{} coins", reward)));
                    }
                    None => {
                        let _ = el.set_attribute("class", "hidden");
                    }
                }
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Block Idle starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let renderer = Canvas2dRenderer::new(&canvas).expect("no 2d context");
        let settings = Settings::load();
        let seed = platform::time_seed();
        let mut game = Game::new(seed, Tuning::default(), settings);

        let store = LocalStorageStore;
        if let Some(snapshot) = store.load() {
            game.restore(&snapshot);
        }
        log::info!("Game initialized with seed: {}", seed);

        let app = Rc::new(RefCell::new(App {
            game,
            renderer,
            store,
            canvas: canvas.clone(),
            last_time: 0.0,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }));
        app.borrow_mut().sync_canvas_size();

        setup_input_handlers(&canvas, app.clone());
        setup_shop_buttons(app.clone());
        setup_new_game_button(app.clone());

        request_animation_frame(app);

        log::info!("Block Idle running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                let point = a.to_canvas(event.client_x() as f64, event.client_y() as f64);
                a.game.click(point);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let touches = event.changed_touches();
                let mut a = app.borrow_mut();
                for i in 0..touches.length() {
                    if let Some(touch) = touches.get(i) {
                        let point = a.to_canvas(touch.client_x() as f64, touch.client_y() as f64);
                        a.game.click(point);
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Shop and control buttons, looked up by element id
    fn setup_shop_buttons(app: Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let buttons: [(&str, fn() -> Action); 17] = [
            ("buy-ball", || Action::BuyBall),
            ("upgrade-speed", || Action::Upgrade(UpgradeKind::BallSpeed)),
            ("upgrade-power", || Action::Upgrade(UpgradeKind::BallPower)),
            ("upgrade-click", || Action::Upgrade(UpgradeKind::ClickPower)),
            ("upgrade-coins", || Action::Upgrade(UpgradeKind::CoinMultiplier)),
            ("upgrade-auto", || Action::Upgrade(UpgradeKind::AutoClicker)),
            ("upgrade-offline", || Action::Upgrade(UpgradeKind::OfflineEarnings)),
            ("buy-plasma", || Action::BuySpecialBall(SpecialKind::Plasma)),
            ("buy-sniper", || Action::BuySpecialBall(SpecialKind::Sniper)),
            ("buy-poison", || Action::BuySpecialBall(SpecialKind::Poison)),
            ("prestige-btn", || Action::Prestige),
            ("prestige-money", || Action::BuyPrestigeUpgrade(PrestigeUpgradeId::MoneyPerLevel)),
            ("prestige-laser", || Action::BuyPrestigeUpgrade(PrestigeUpgradeId::LaserPower)),
            ("prestige-gold", || Action::BuyPrestigeUpgrade(PrestigeUpgradeId::GoldMultiplier)),
            ("prestige-damage", || Action::BuyPrestigeUpgrade(PrestigeUpgradeId::BallDamage)),
            ("pause-btn", || Action::ToggleRunning),
            ("dismiss-reward", || Action::DismissLevelReward),
        ];

        for (id, make_action) in buttons {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().game.dispatch(make_action());
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_new_game_button(app: Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(btn) = document.get_element_by_id("new-game-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut a = app.borrow_mut();
                a.store.clear();
                a.game.dispatch(Action::Reset);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            a.update(time);
            a.render(time);
            a.update_hud();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Headless session: `block-idle [seconds] [low|medium|high] [tuning.json]`
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use block_idle::consts::SIM_DT;
    use block_idle::persistence::{MemoryStore, ProgressStore};
    use block_idle::sim::{Action, SpecialKind, UpgradeKind};
    use block_idle::{Canvas, Game, QualityPreset, Settings, Tuning, economy, platform};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seconds: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60);
    let quality = args
        .next()
        .and_then(|s| QualityPreset::parse(&s))
        .unwrap_or_default();
    let tuning = args
        .next()
        .map(|path| Tuning::load(std::path::Path::new(&path)))
        .unwrap_or_default();

    let seed = platform::time_seed();
    log::info!(
        "Block Idle (native) starting, seed {}, {} s, {} quality",
        seed,
        seconds,
        quality.as_str()
    );

    let mut game = Game::new(seed, tuning, Settings::from_preset(quality));
    game.resize(Canvas::new(800.0, 600.0));
    let mut store = MemoryStore::new();

    let frames = seconds * 60;
    let mut totals = (0u32, 0u32, 0u32, 0u32);
    for frame in 0..frames {
        let summary = game.frame(SIM_DT);
        totals.0 += summary.blocks_destroyed;
        totals.1 += summary.levels_completed;
        totals.2 += summary.loop_corrections;
        totals.3 += summary.hits;

        // Spend like an idle player: balls first, then power, then specials
        let state = game.state();
        if state.coins >= economy::ball_cost(state.upgrades.ball_count) {
            game.dispatch(Action::BuyBall);
        } else if state.coins >= economy::upgrade_cost(UpgradeKind::BallPower, state.upgrades.ball_power) {
            game.dispatch(Action::Upgrade(UpgradeKind::BallPower));
        } else if state.coins >= economy::special_ball_cost(state.special_balls.get(SpecialKind::Plasma)) {
            game.dispatch(Action::BuySpecialBall(SpecialKind::Plasma));
        }
        if game.state().level_reward.is_some() {
            game.dispatch(Action::DismissLevelReward);
        }

        game.autosave(&mut store, frame as f64 * 1000.0 / 60.0);
    }

    let state = game.state();
    log::info!(
        "Finished: level {}, {:.0} coins, {} golds, {} balls",
        state.level,
        state.coins,
        state.golds,
        state.balls.len()
    );
    println!(
        "level {} | coins {:.0} | balls {} | blocks destroyed {} | levels cleared {} | hits {} | loop fixes {} | saves {}",
        state.level,
        state.coins,
        state.balls.len(),
        totals.0,
        totals.1,
        totals.3,
        totals.2,
        store.saves()
    );
    if let Some(snapshot) = store.load() {
        log::debug!("Last save at level {}", snapshot.level);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
