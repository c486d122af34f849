use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::{Duration, Instant};

use crate::entities::GameState;

/// Logical controls the ship polls every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    TurnLeft,
    TurnRight,
    Thrust,
    Fire,
}

impl Action {
    fn index(self) -> usize {
        match self {
            Action::TurnLeft => 0,
            Action::TurnRight => 1,
            Action::Thrust => 2,
            Action::Fire => 3,
        }
    }

    /// Maps a key to the control it drives (arrows, WASD and space).
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Action::TurnLeft),
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Action::TurnRight),
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Action::Thrust),
            KeyCode::Char(' ') => Some(Action::Fire),
            _ => None,
        }
    }
}

/// Polled source of held controls
pub trait ActionSource {
    fn is_action_held(&self, action: Action) -> bool;
}

/// Plain set of held controls, for scripted input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldActions {
    held: [bool; 4],
}

impl HeldActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, action: Action) {
        self.held[action.index()] = true;
    }

    pub fn release(&mut self, action: Action) {
        self.held[action.index()] = false;
    }
}

impl<const N: usize> From<[Action; N]> for HeldActions {
    fn from(actions: [Action; N]) -> Self {
        let mut held = Self::new();
        for action in actions {
            held.press(action);
        }
        held
    }
}

impl ActionSource for HeldActions {
    fn is_action_held(&self, action: Action) -> bool {
        self.held[action.index()]
    }
}

/// One-shot shell actions, separate from the held ship controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Pause,
    Resume,
    Quit,
}

/// Manages input polling and translates raw key events into game actions
pub struct InputManager {
    /// Last press or repeat of each control; `None` once released
    last_seen: [Option<Instant>; 4],
    /// Controls pressed or repeated since the last poll
    fresh: [bool; 4],
    oneshot_actions: Vec<InputAction>,
    /// Whether the terminal reports key releases
    reports_release: bool,
    hold_window: Duration,
    polled_at: Instant,
}

impl InputManager {
    /// Creates an InputManager.
    ///
    /// Without release events a key counts as held for `hold_window` after
    /// its last press or auto-repeat, except Fire, which only counts in the
    /// frame its press or repeat arrived so a tap fires once.
    pub fn new(reports_release: bool, hold_window: Duration) -> Self {
        Self {
            last_seen: [None; 4],
            fresh: [false; 4],
            oneshot_actions: Vec::new(),
            reports_release,
            hold_window,
            polled_at: Instant::now(),
        }
    }

    /// Polls for all input events and stores one-shot actions
    /// Should be called once per frame before getting actions
    pub fn poll_events(&mut self, game_state: &GameState, now: Instant) -> color_eyre::Result<()> {
        self.begin_frame(now);

        // Poll for all available events without blocking
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key_event) = event::read()? {
                self.handle_key_event(key_event, game_state, now);
            }
        }

        Ok(())
    }

    /// Clears per-frame state before the frame's events are read.
    fn begin_frame(&mut self, now: Instant) {
        self.oneshot_actions.clear();
        self.fresh = [false; 4];
        self.polled_at = now;
    }

    fn mark_seen(&mut self, action: Action, now: Instant) {
        self.last_seen[action.index()] = Some(now);
        self.fresh[action.index()] = true;
    }

    /// Processes a key event and updates key state and one-shot actions
    pub fn handle_key_event(&mut self, key_event: KeyEvent, game_state: &GameState, now: Instant) {
        match key_event.kind {
            KeyEventKind::Press => {
                self.handle_key_press(key_event, game_state, now);
            }
            KeyEventKind::Repeat => {
                if *game_state == GameState::Playing
                    && let Some(action) = Action::from_key(key_event.code)
                {
                    self.mark_seen(action, now);
                }
            }
            KeyEventKind::Release => {
                if let Some(action) = Action::from_key(key_event.code) {
                    self.last_seen[action.index()] = None;
                }
            }
        }
    }

    /// Handles key press events
    fn handle_key_press(&mut self, key_event: KeyEvent, game_state: &GameState, now: Instant) {
        // Check for quit keys first (works in any state)
        if matches!(
            key_event.code,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
        ) || (key_event.code == KeyCode::Char('c')
            && key_event.modifiers.contains(KeyModifiers::CONTROL))
        {
            self.oneshot_actions.push(InputAction::Quit);
            return;
        }

        if matches!(key_event.code, KeyCode::Char('p') | KeyCode::Char('P')) {
            self.oneshot_actions.push(match game_state {
                GameState::Playing => InputAction::Pause,
                GameState::Paused => InputAction::Resume,
            });
            return;
        }

        // Held controls only matter while playing
        if *game_state == GameState::Playing
            && let Some(action) = Action::from_key(key_event.code)
        {
            self.mark_seen(action, now);
        }
    }

    /// Forgets every held control, e.g. when pausing.
    pub fn release_all(&mut self) {
        self.last_seen = [None; 4];
        self.fresh = [false; 4];
    }

    /// One-shot actions gathered by the last poll
    pub fn take_actions(&mut self) -> Vec<InputAction> {
        std::mem::take(&mut self.oneshot_actions)
    }
}

impl ActionSource for InputManager {
    fn is_action_held(&self, action: Action) -> bool {
        match self.last_seen[action.index()] {
            Some(_) if self.reports_release => true,
            Some(_) if action == Action::Fire => self.fresh[action.index()],
            Some(seen) => self.polled_at.duration_since(seen) <= self.hold_window,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DisplayConfig, Tuning};
    use crate::entities::{Entity, Player};
    use crate::geometry::Point;
    use crate::world::{Viewport, World, WorldEvent};
    use crossterm::event::KeyEventState;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_held_actions_from_array() {
        let held = HeldActions::from([Action::Thrust, Action::Fire]);
        assert!(held.is_action_held(Action::Thrust));
        assert!(held.is_action_held(Action::Fire));
        assert!(!held.is_action_held(Action::TurnLeft));
    }

    #[test]
    fn test_release_events_end_hold() {
        let now = Instant::now();
        let mut input = InputManager::new(true, Duration::from_millis(10));
        input.handle_key_event(key(KeyCode::Up, KeyEventKind::Press), &GameState::Playing, now);
        input.polled_at = now + Duration::from_secs(5);
        assert!(input.is_action_held(Action::Thrust));

        input.handle_key_event(key(KeyCode::Up, KeyEventKind::Release), &GameState::Playing, now);
        assert!(!input.is_action_held(Action::Thrust));
    }

    #[test]
    fn test_hold_window_without_release_events() {
        let now = Instant::now();
        let mut input = InputManager::new(false, Duration::from_millis(100));
        input.handle_key_event(key(KeyCode::Up, KeyEventKind::Press), &GameState::Playing, now);

        input.begin_frame(now + Duration::from_millis(80));
        assert!(input.is_action_held(Action::Thrust));

        input.begin_frame(now + Duration::from_millis(101));
        assert!(!input.is_action_held(Action::Thrust));

        // An auto-repeat refreshes the hold.
        input.handle_key_event(
            key(KeyCode::Up, KeyEventKind::Repeat),
            &GameState::Playing,
            now + Duration::from_millis(90),
        );
        assert!(input.is_action_held(Action::Thrust));
    }

    #[test]
    fn test_fire_only_counts_in_its_own_frame_without_release_events() {
        let now = Instant::now();
        let mut input = InputManager::new(false, Duration::from_millis(100));
        input.begin_frame(now);
        input.handle_key_event(
            key(KeyCode::Char(' '), KeyEventKind::Press),
            &GameState::Playing,
            now,
        );
        assert!(input.is_action_held(Action::Fire));

        input.begin_frame(now + Duration::from_millis(16));
        assert!(!input.is_action_held(Action::Fire));

        input.handle_key_event(
            key(KeyCode::Char(' '), KeyEventKind::Repeat),
            &GameState::Playing,
            now + Duration::from_millis(16),
        );
        assert!(input.is_action_held(Action::Fire));
    }

    #[test]
    fn test_held_actions_press_and_release() {
        let mut held = HeldActions::new();
        held.press(Action::TurnRight);
        assert!(held.is_action_held(Action::TurnRight));
        held.release(Action::TurnRight);
        assert!(!held.is_action_held(Action::TurnRight));
        assert_eq!(held, HeldActions::default());
    }

    /// Feeds one tap of `code` and then runs a second of frames through a
    /// world holding a single ship.
    fn tap_through_world(code: KeyCode) -> (World, usize) {
        let start = Instant::now();
        let mut world = World::new(
            Viewport::new(800.0, 600.0),
            Tuning::default(),
            StdRng::seed_from_u64(8),
            start,
        );
        world.spawn(Entity::Player(Player::new(
            Point::new(400.0, 300.0),
            &Tuning::default(),
        )));
        let hold = Duration::from_millis(DisplayConfig::default().key_hold_ms);
        let mut input = InputManager::new(false, hold);

        let mut fired = 0;
        for frame in 0..60u64 {
            let now = start + Duration::from_millis(16 * frame);
            input.begin_frame(now);
            if frame == 0 {
                input.handle_key_event(key(code, KeyEventKind::Press), &GameState::Playing, now);
            }
            world.tick(&input, now);
            fired += world
                .drain_events()
                .iter()
                .filter(|e| matches!(e, WorldEvent::MissileFired))
                .count();
        }
        (world, fired)
    }

    #[test]
    fn test_one_fire_tap_fires_one_missile() {
        let (_, fired) = tap_through_world(KeyCode::Char(' '));
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_one_turn_tap_turns_briefly() {
        let (world, fired) = tap_through_world(KeyCode::Left);
        assert_eq!(fired, 0);
        let angle = world.player().map(|p| p.angle).unwrap_or_default();
        // A 100 ms hold covers seven 16 ms frames.
        assert!(angle < -0.3 && angle > -0.4, "angle {angle}");
    }

    #[test]
    fn test_pause_key_toggles_by_state() {
        let now = Instant::now();
        let mut input = InputManager::new(true, Duration::from_millis(500));
        input.handle_key_event(
            key(KeyCode::Char('p'), KeyEventKind::Press),
            &GameState::Playing,
            now,
        );
        input.handle_key_event(
            key(KeyCode::Char('P'), KeyEventKind::Press),
            &GameState::Paused,
            now,
        );
        assert_eq!(
            input.take_actions(),
            vec![InputAction::Pause, InputAction::Resume]
        );
        assert!(input.take_actions().is_empty());
    }

    #[test]
    fn test_controls_ignored_while_paused() {
        let now = Instant::now();
        let mut input = InputManager::new(true, Duration::from_millis(500));
        input.handle_key_event(key(KeyCode::Left, KeyEventKind::Press), &GameState::Paused, now);
        assert!(!input.is_action_held(Action::TurnLeft));
    }

    #[test]
    fn test_quit_keys() {
        let now = Instant::now();
        let mut input = InputManager::new(true, Duration::from_millis(500));
        input.handle_key_event(key(KeyCode::Esc, KeyEventKind::Press), &GameState::Playing, now);
        let mut ctrl_c = key(KeyCode::Char('c'), KeyEventKind::Press);
        ctrl_c.modifiers = KeyModifiers::CONTROL;
        input.handle_key_event(ctrl_c, &GameState::Paused, now);
        assert_eq!(input.take_actions(), vec![InputAction::Quit, InputAction::Quit]);
    }
}
