//! Race settings and preferences
//!
//! Persisted in LocalStorage on the web and as a JSON file natively.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_PATH_SEGMENTS;

/// Playback speed presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpeedPreset {
    Quarter,
    Half,
    #[default]
    Normal,
    Double,
}

impl SpeedPreset {
    pub const ALL: [SpeedPreset; 4] = [
        SpeedPreset::Quarter,
        SpeedPreset::Half,
        SpeedPreset::Normal,
        SpeedPreset::Double,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedPreset::Quarter => "0.25x",
            SpeedPreset::Half => "0.5x",
            SpeedPreset::Normal => "1x",
            SpeedPreset::Double => "2x",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().trim_end_matches('x') {
            "quarter" | "0.25" => Some(SpeedPreset::Quarter),
            "half" | "0.5" => Some(SpeedPreset::Half),
            "normal" | "1" => Some(SpeedPreset::Normal),
            "double" | "2" => Some(SpeedPreset::Double),
            _ => None,
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            SpeedPreset::Quarter => 0.25,
            SpeedPreset::Half => 0.5,
            SpeedPreset::Normal => 1.0,
            SpeedPreset::Double => 2.0,
        }
    }
}

/// Race settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Simulated seconds per real second (> 0)
    pub speed_multiplier: f64,
    /// Bend of the tunable curve, 0.0 - 1.0
    pub shape_parameter: f64,

    // === Display (read by renderers) ===
    /// Draw the unit grid behind the tracks
    pub show_grid: bool,
    /// Show up/down arrows when places change
    pub show_rank_deltas: bool,
    /// Points per track polyline
    pub path_segments: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            shape_parameter: 0.0,
            show_grid: true,
            show_rank_deltas: true,
            path_segments: 64,
        }
    }
}

impl Settings {
    pub fn from_preset(preset: SpeedPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    pub fn apply_preset(&mut self, preset: SpeedPreset) {
        self.speed_multiplier = preset.multiplier();
    }

    /// Preset matching the current multiplier, if any
    pub fn preset(&self) -> Option<SpeedPreset> {
        SpeedPreset::ALL
            .into_iter()
            .find(|p| p.multiplier() == self.speed_multiplier)
    }

    /// Replace out-of-range values with defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.speed_multiplier.is_finite() || self.speed_multiplier <= 0.0 {
            log::warn!(
                "Invalid speed multiplier {} in settings, using {}",
                self.speed_multiplier,
                defaults.speed_multiplier
            );
            self.speed_multiplier = defaults.speed_multiplier;
        }
        if !(0.0..=1.0).contains(&self.shape_parameter) {
            log::warn!(
                "Invalid shape parameter {} in settings, using {}",
                self.shape_parameter,
                defaults.shape_parameter
            );
            self.shape_parameter = defaults.shape_parameter;
        }
        if !(1..=MAX_PATH_SEGMENTS).contains(&self.path_segments) {
            log::warn!(
                "Invalid path segments {} in settings, using {}",
                self.path_segments,
                defaults.path_segments
            );
            self.path_segments = defaults.path_segments;
        }
        self
    }

    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str::<Settings>(json) {
            Ok(settings) => Some(settings.sanitized()),
            Err(err) => {
                log::warn!("Could not parse settings: {}", err);
                None
            }
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "descent_race_settings";

    /// Environment variable naming a settings file (native only)
    pub const PATH_ENV: &'static str = "DESCENT_RACE_SETTINGS";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Load from the file named by `DESCENT_RACE_SETTINGS`, else defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        match std::env::var(Self::PATH_ENV) {
            Ok(path) => Self::load_from(path),
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Some(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                None => Self::default(),
            },
            Err(err) => {
                log::warn!("Could not read {}: {}, using defaults", path.display(), err);
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}
