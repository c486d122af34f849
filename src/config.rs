//! Runtime configuration loaded from `shardfield.toml`.
//!
//! Every field has a default, so a config file only needs the values it wants
//! to override. The path can be changed with the `SHARDFIELD_CONFIG`
//! environment variable.

use color_eyre::{Result, eyre::WrapErr};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "SHARDFIELD_CONFIG";
/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "shardfield.toml";

/// Gameplay constants.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // ── Population control ───────────────────────────────────────────────
    pub initial_enemies: usize,
    pub initial_mass_budget: f64,
    pub mass_budget_increment: f64,
    pub population_check_ms: u64,
    pub spawn_edge_offset: f64,

    // ── Enemy ────────────────────────────────────────────────────────────
    pub enemy_min_size: f64,
    pub enemy_size_spread: f64,
    pub enemy_split_threshold: f64,
    pub enemy_max_spin: f64,

    // ── Player ───────────────────────────────────────────────────────────
    pub player_size: f64,
    pub player_turn_rate: f64,
    pub player_thrust: f64,
    pub shot_cooldown_ms: u64,

    // ── Missile ──────────────────────────────────────────────────────────
    pub missile_speed: f64,
    pub missile_length: f64,
    pub missile_size: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            initial_enemies: 8,
            initial_mass_budget: 800.0,
            mass_budget_increment: 50.0,
            population_check_ms: 5000,
            spawn_edge_offset: 100.0,
            enemy_min_size: 80.0,
            enemy_size_spread: 80.0,
            enemy_split_threshold: 50.0,
            enemy_max_spin: 0.01,
            player_size: 2.0,
            player_turn_rate: 0.05,
            player_thrust: 0.05,
            shot_cooldown_ms: 400,
            missile_speed: 10.0,
            missile_length: 6.0,
            missile_size: 4.0,
        }
    }
}

impl Tuning {
    pub fn population_check_interval(&self) -> Duration {
        Duration::from_millis(self.population_check_ms)
    }

    pub fn shot_cooldown(&self) -> Duration {
        Duration::from_millis(self.shot_cooldown_ms)
    }

    /// Replaces values that would break the simulation with their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        let positive = |name: &str, value: &mut f64, fallback: f64| {
            if !value.is_finite() || *value <= 0.0 {
                log::warn!("tuning.{name} = {value} is not positive, using {fallback}");
                *value = fallback;
            }
        };
        positive(
            "enemy_min_size",
            &mut self.enemy_min_size,
            defaults.enemy_min_size,
        );
        positive(
            "enemy_split_threshold",
            &mut self.enemy_split_threshold,
            defaults.enemy_split_threshold,
        );
        positive("player_size", &mut self.player_size, defaults.player_size);
        positive("missile_size", &mut self.missile_size, defaults.missile_size);
        positive(
            "missile_speed",
            &mut self.missile_speed,
            defaults.missile_speed,
        );

        if !self.enemy_size_spread.is_finite() || self.enemy_size_spread < 0.0 {
            log::warn!(
                "tuning.enemy_size_spread = {} is negative, using {}",
                self.enemy_size_spread,
                defaults.enemy_size_spread
            );
            self.enemy_size_spread = defaults.enemy_size_spread;
        }
        if self.population_check_ms == 0 {
            log::warn!(
                "tuning.population_check_ms = 0, using {}",
                defaults.population_check_ms
            );
            self.population_check_ms = defaults.population_check_ms;
        }
        self
    }
}

/// Terminal presentation settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Sleep between frames, roughly 60 steps per second by default
    pub frame_ms: u64,
    /// How long the background stays red after the ship is destroyed
    pub flash_ms: u64,
    /// Fixed world width; derived from the terminal when unset
    pub viewport_width: Option<f64>,
    /// Fixed world height; derived from the terminal when unset
    pub viewport_height: Option<f64>,
    /// Terminals without key-release events keep a turn or thrust key held
    /// this long after its last press or repeat. Kept under the shot cooldown
    /// and the usual auto-repeat delay so a tap stays short.
    pub key_hold_ms: u64,
    pub log_file: PathBuf,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            frame_ms: 16,
            flash_ms: 100,
            viewport_width: None,
            viewport_height: None,
            key_hold_ms: 100,
            log_file: PathBuf::from("shardfield.log"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed RNG seed; OS entropy when unset
    pub seed: Option<u64>,
    pub tuning: Tuning,
    pub display: DisplayConfig,
}

impl GameConfig {
    /// Parses a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).wrap_err("invalid config")
    }

    /// Applies [`Tuning::sanitized`]. Call once logging is up so the
    /// fallbacks are recorded.
    pub fn sanitized(mut self) -> Self {
        self.tuning = self.tuning.sanitized();
        self
    }

    /// Reads a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&text).wrap_err_with(|| format!("failed to parse {}", path.display()))
    }

    /// Loads from `$SHARDFIELD_CONFIG` or `./shardfield.toml`.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }
}
