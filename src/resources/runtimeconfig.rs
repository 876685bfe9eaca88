//! Runtime configuration resource.
//!
//! Manages interpreter and loop settings loaded from an INI configuration
//! file. Provides defaults for a safe start and methods to load/save.
//!
//! # Configuration File Format
//!
//! ```ini
//! [loop]
//! tick_ms = 16.666
//! max_frame_ms = 250
//! max_ticks_per_frame = 5
//!
//! [runtime]
//! default_sprite_width = 32
//! default_sprite_height = 32
//! default_toast_ms = 2000
//! max_custom_event_rounds = 16
//! seed = 12345
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use glam::Vec2;
use log::info;
use std::path::PathBuf;

/// Default safe values for startup
const DEFAULT_TICK_MS: f64 = 1000.0 / 60.0;
const DEFAULT_MAX_FRAME_MS: f64 = 250.0;
const DEFAULT_MAX_TICKS_PER_FRAME: u32 = 5;
const DEFAULT_SPRITE_WIDTH: f32 = 32.0;
const DEFAULT_SPRITE_HEIGHT: f32 = 32.0;
const DEFAULT_TOAST_MS: f64 = 2000.0;
const DEFAULT_MAX_CUSTOM_EVENT_ROUNDS: u32 = 16;
const DEFAULT_CONFIG_PATH: &str = "./playforge.ini";

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Fixed simulation step in milliseconds.
    pub tick_ms: f64,
    /// Frame deltas above this are clamped before accumulation.
    pub max_frame_ms: f64,
    /// Upper bound on ticks run for a single frame.
    pub max_ticks_per_frame: u32,
    /// Collision size of objects without explicit size or sprite.
    pub default_sprite_width: f32,
    pub default_sprite_height: f32,
    /// Duration of a `message` toast that does not specify one.
    pub default_toast_ms: f64,
    /// Custom-event cascade rounds drained per tick.
    pub max_custom_event_rounds: u32,
    /// Seed for `randomizeVariable`; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            max_frame_ms: DEFAULT_MAX_FRAME_MS,
            max_ticks_per_frame: DEFAULT_MAX_TICKS_PER_FRAME,
            default_sprite_width: DEFAULT_SPRITE_WIDTH,
            default_sprite_height: DEFAULT_SPRITE_HEIGHT,
            default_toast_ms: DEFAULT_TOAST_MS,
            max_custom_event_rounds: DEFAULT_MAX_CUSTOM_EVENT_ROUNDS,
            seed: None,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn default_size(&self) -> Vec2 {
        Vec2::new(self.default_sprite_width, self.default_sprite_height)
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply(&config);

        info!(
            "Loaded config: tick={}ms, max_frame={}ms, max_ticks={}, sprite={}x{}, toast={}ms, seed={:?}",
            self.tick_ms,
            self.max_frame_ms,
            self.max_ticks_per_frame,
            self.default_sprite_width,
            self.default_sprite_height,
            self.default_toast_ms,
            self.seed
        );

        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    fn apply(&mut self, config: &Ini) {
        // [loop] section
        if let Some(tick) = config.getfloat("loop", "tick_ms").ok().flatten() {
            if tick > 0.0 {
                self.tick_ms = tick;
            }
        }
        if let Some(max) = config.getfloat("loop", "max_frame_ms").ok().flatten() {
            if max > 0.0 {
                self.max_frame_ms = max;
            }
        }
        if let Some(n) = config.getuint("loop", "max_ticks_per_frame").ok().flatten() {
            self.max_ticks_per_frame = (n as u32).max(1);
        }

        // [runtime] section
        if let Some(w) = config
            .getfloat("runtime", "default_sprite_width")
            .ok()
            .flatten()
        {
            self.default_sprite_width = w as f32;
        }
        if let Some(h) = config
            .getfloat("runtime", "default_sprite_height")
            .ok()
            .flatten()
        {
            self.default_sprite_height = h as f32;
        }
        if let Some(ms) = config.getfloat("runtime", "default_toast_ms").ok().flatten() {
            self.default_toast_ms = ms;
        }
        if let Some(n) = config
            .getuint("runtime", "max_custom_event_rounds")
            .ok()
            .flatten()
        {
            self.max_custom_event_rounds = n as u32;
        }
        if let Some(seed) = config.getuint("runtime", "seed").ok().flatten() {
            self.seed = Some(seed);
        }
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [loop] section
        config.set("loop", "tick_ms", Some(self.tick_ms.to_string()));
        config.set("loop", "max_frame_ms", Some(self.max_frame_ms.to_string()));
        config.set(
            "loop",
            "max_ticks_per_frame",
            Some(self.max_ticks_per_frame.to_string()),
        );

        // [runtime] section
        config.set(
            "runtime",
            "default_sprite_width",
            Some(self.default_sprite_width.to_string()),
        );
        config.set(
            "runtime",
            "default_sprite_height",
            Some(self.default_sprite_height.to_string()),
        );
        config.set(
            "runtime",
            "default_toast_ms",
            Some(self.default_toast_ms.to_string()),
        );
        config.set(
            "runtime",
            "max_custom_event_rounds",
            Some(self.max_custom_event_rounds.to_string()),
        );
        if let Some(seed) = self.seed {
            config.set("runtime", "seed", Some(seed.to_string()));
        }

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}
