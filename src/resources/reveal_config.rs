//! Tunables for dialogue reveal, pop-in, text motion and typing sounds.
//!
//! Loaded once at startup from the user's config directory. Every field has a
//! default, so a config file only needs the values it overrides.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Default file name for the reveal configuration.
const CONFIG_FILE_NAME: &str = "reveal.json";

/// Reveal and animation settings shared by every dialogue box.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Reveal rate before any `<sp:>` tag is reached.
    pub chars_per_second: f32,
    /// Seconds a freshly revealed glyph takes to grow to full size.
    pub pop_in_seconds: f32,
    /// Shake displacement in ems.
    pub shake_magnitude: f32,
    /// How fast the shake noise is sampled.
    pub shake_frequency: f32,
    /// Wave displacement in ems.
    pub wave_amplitude: f32,
    /// Wave phase offset between neighbouring characters (radians).
    pub wave_char_phase: f32,
    /// Wave phase speed (radians per second).
    pub wave_speed: f32,
    /// Shortest wait between typing sounds.
    pub min_sound_interval: f32,
    /// Longest wait between typing sounds.
    pub max_sound_interval: f32,
    /// Skip the typing sound for whitespace characters.
    pub silent_whitespace: bool,
    /// Play the typing sound for the character that completes the line.
    pub sound_on_final_char: bool,
    /// Number of voices typing sounds rotate through.
    pub sound_pool_size: usize,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            chars_per_second: 150.0,
            pop_in_seconds: 0.07,
            shake_magnitude: 0.09,
            shake_frequency: 12.0,
            wave_amplitude: 0.07,
            wave_char_phase: 1.5,
            wave_speed: 6.0,
            min_sound_interval: 0.02,
            max_sound_interval: 0.08,
            silent_whitespace: true,
            sound_on_final_char: true,
            sound_pool_size: 4,
        }
    }
}

impl RevealConfig {
    /// Seconds between two revealed characters at the default rate.
    pub fn seconds_per_char(&self) -> f32 {
        if self.chars_per_second > 0.0 {
            1.0 / self.chars_per_second
        } else {
            1.0 / crate::utils::markup::DEFAULT_CHARS_PER_SECOND
        }
    }

    /// Returns the typing sound wait bounds, ordered low to high and never negative.
    pub fn sound_interval_range(&self) -> (f32, f32) {
        let low = self.min_sound_interval.min(self.max_sound_interval).max(0.0);
        let high = self.min_sound_interval.max(self.max_sound_interval).max(low);
        (low, high)
    }

    /// Parses a config from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Loads the config from the default location, or returns the defaults.
    ///
    /// Config location is platform-specific:
    /// - macOS: ~/Library/Application Support/quill_dialogue/
    /// - Linux: ~/.config/quill_dialogue/
    /// - Windows: %APPDATA%/quill_dialogue/
    pub fn load_from_file() -> Self {
        let Some(path) = Self::get_config_path() else {
            warn!("Could not determine config directory, using default reveal config");
            return Self::default();
        };

        if !path.exists() {
            info!("No reveal config at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!("Loaded reveal config from {:?}", path);
                    config
                }
                Err(e) => {
                    error!("Failed to parse reveal config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to read reveal config: {}", e);
                Self::default()
            }
        }
    }

    /// Returns the platform-specific path of the config file.
    pub fn get_config_path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("quill_dialogue");
            path.push(CONFIG_FILE_NAME);
            path
        })
    }
}
