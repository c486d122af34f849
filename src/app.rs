use color_eyre::{Result, eyre::WrapErr};
use log::info;
use rand::rngs::StdRng;
use ratatui::{Terminal, backend::Backend};
use std::time::{Duration, Instant};

use crate::config::GameConfig;
use crate::entities::GameState;
use crate::input::{InputAction, InputManager};
use crate::renderer::{GameRenderer, RenderView};
use crate::surface::DrawList;
use crate::world::{Viewport, World, WorldEvent};

/// The main application which holds the state and logic of the application.
pub struct App {
    running: bool,
    game_state: GameState,
    world: World,
    /// Geometry the world drew this frame
    drawing: DrawList,
    /// Frames info
    last_frame_time: Instant,
    fps: u32,
    frame_interval: Duration,
    /// Red background until this instant
    flash_until: Option<Instant>,
    flash_duration: Duration,
    /// internal components
    input_manager: InputManager,
    renderer: GameRenderer,
}

impl App {
    /// Builds the world for `viewport` and lays out the opening enemies.
    pub fn new(config: &GameConfig, viewport: Viewport, rng: StdRng, reports_release: bool) -> Self {
        let now = Instant::now();
        let mut world = World::new(viewport, config.tuning.clone(), rng, now);
        world.populate();

        Self {
            running: true,
            game_state: GameState::Playing,
            world,
            drawing: DrawList::default(),
            last_frame_time: now,
            fps: 0,
            frame_interval: Duration::from_millis(config.display.frame_ms),
            flash_until: None,
            flash_duration: Duration::from_millis(config.display.flash_ms),
            input_manager: InputManager::new(
                reports_release,
                Duration::from_millis(config.display.key_hold_ms),
            ),
            renderer: GameRenderer::new(),
        }
    }

    /// Run the application's main loop.
    pub fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while self.running {
            // Calculate FPS
            let now = Instant::now();
            let frame_time = now.duration_since(self.last_frame_time);
            self.last_frame_time = now;
            if frame_time.as_micros() > 0 {
                self.fps = (1_000_000 / frame_time.as_micros()) as u32;
            }

            // Poll input events and get actions
            self.input_manager
                .poll_events(&self.game_state, now)
                .wrap_err("failed to read terminal events")?;
            let actions = self.input_manager.take_actions();

            // Process all actions
            self.process_actions(&actions);

            // Update game state
            if self.game_state == GameState::Playing {
                self.world.tick(&self.input_manager, now);
            }
            self.process_events(now);

            // Render the frame
            self.world.render(&mut self.drawing);
            let flashing = self.is_flashing(now);
            terminal
                .draw(|frame| {
                    let view = RenderView {
                        game_state: self.game_state,
                        drawing: &self.drawing,
                        viewport: self.world.viewport(),
                        score: self.world.score(),
                        enemy_count: self.world.enemy_count(),
                        enemy_mass: self.world.enemy_mass(),
                        mass_budget: self.world.enemy_mass_budget(),
                        fps: self.fps,
                        flashing,
                        area: frame.area(),
                    };
                    self.renderer.render(frame, &view);
                })
                .wrap_err("failed to draw frame")?;

            // Small sleep to maintain ~60 FPS and prevent CPU spinning
            std::thread::sleep(self.frame_interval);
        }
        info!("quit with score {}", self.world.score());
        Ok(())
    }

    /// Process input actions and update game state accordingly
    fn process_actions(&mut self, actions: &[InputAction]) {
        for action in actions {
            match action {
                InputAction::Quit => {
                    self.running = false;
                }
                InputAction::Pause => {
                    self.game_state = GameState::Paused;
                    // Keys released while paused would otherwise stay held.
                    self.input_manager.release_all();
                }
                InputAction::Resume => {
                    self.game_state = GameState::Playing;
                }
            }
        }
    }

    /// Reacts to what happened in the world during the last tick.
    fn process_events(&mut self, now: Instant) {
        for event in self.world.drain_events() {
            if let WorldEvent::PlayerDestroyed { position } = event {
                info!("ship destroyed at ({:.0}, {:.0})", position.x, position.y);
                self.flash_until = Some(now + self.flash_duration);
            }
        }
    }

    fn is_flashing(&self, now: Instant) -> bool {
        self.flash_until.is_some_and(|until| now < until)
    }
}
