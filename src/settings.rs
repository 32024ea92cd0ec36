//! Game settings
//!
//! Geometry and pacing, persisted as JSON. Missing fields take defaults so
//! older files keep loading.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::StoreError;
use crate::sim::Arena;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Playfield ===
    /// Board width (px)
    pub board_width: f32,
    /// Board height (px)
    pub board_height: f32,
    /// Bubble radius (px)
    pub bubble_radius: f32,

    // === Pacing ===
    /// Shot speed (px/s)
    pub shot_speed: f32,
    /// Pause between clearing a board and the next level (s)
    pub level_advance_delay: f32,

    // === HUD ===
    /// Compute the aim preview for renderers
    pub show_trajectory: bool,

    // === Storage ===
    /// High score file (native builds)
    pub high_score_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            board_width: BOARD_WIDTH,
            board_height: BOARD_HEIGHT,
            bubble_radius: BUBBLE_RADIUS,

            shot_speed: SHOT_SPEED,
            level_advance_delay: LEVEL_ADVANCE_DELAY,

            show_trajectory: true,

            high_score_path: PathBuf::from("bubble_shooter_highscore.json"),
        }
    }
}

impl Settings {
    /// Playfield geometry for these settings
    pub fn arena(&self) -> Arena {
        Arena::new(self.board_width, self.board_height, self.bubble_radius)
    }

    /// Reject geometry and pacing the sim cannot run with
    pub fn validate(&self) -> Result<(), StoreError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.bubble_radius) {
            return Err(StoreError::Invalid("bubble_radius must be positive"));
        }
        if !positive(self.board_width) || self.board_width < self.bubble_radius * 2.0 {
            return Err(StoreError::Invalid("board_width must fit one bubble"));
        }
        if !positive(self.board_height) || self.board_height <= SHOOTER_OFFSET {
            return Err(StoreError::Invalid("board_height must clear the shooter line"));
        }
        if !positive(self.shot_speed) {
            return Err(StoreError::Invalid("shot_speed must be positive"));
        }
        if !(self.level_advance_delay.is_finite() && self.level_advance_delay >= 0.0) {
            return Err(StoreError::Invalid("level_advance_delay must not be negative"));
        }
        Ok(())
    }

    /// Read and validate settings from a JSON file
    pub fn try_load(path: &Path) -> Result<Self, StoreError> {
        let json = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings, falling back to defaults on any failure
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::info!("Using default settings ({e})");
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_arena_constants() {
        let arena = Settings::default().arena();
        assert_eq!(arena.width, BOARD_WIDTH);
        assert_eq!(arena.radius, BUBBLE_RADIUS);
        assert_eq!(arena.shooter_y, BOARD_HEIGHT - SHOOTER_OFFSET);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "bubble_radius": 20.0 }"#).unwrap();
        assert_eq!(settings.bubble_radius, 20.0);
        assert_eq!(settings.shot_speed, SHOT_SPEED);
        assert!(settings.show_trajectory);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let path = std::env::temp_dir().join("bubble_shooter_no_such_settings.json");
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_zero_radius_file_falls_back() {
        let path = std::env::temp_dir().join(format!(
            "bubble_shooter_zero_radius_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{ "bubble_radius": 0.0 }"#).unwrap();
        assert!(matches!(
            Settings::try_load(&path),
            Err(StoreError::Invalid(_))
        ));
        assert_eq!(Settings::load(&path), Settings::default());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_validate_rejects_bad_geometry() {
        assert!(Settings::default().validate().is_ok());
        for bad in [
            Settings {
                bubble_radius: -4.0,
                ..Settings::default()
            },
            Settings {
                board_width: 10.0,
                ..Settings::default()
            },
            Settings {
                board_height: 40.0,
                ..Settings::default()
            },
            Settings {
                shot_speed: 0.0,
                ..Settings::default()
            },
            Settings {
                level_advance_delay: f32::NAN,
                ..Settings::default()
            },
        ] {
            assert!(bad.validate().is_err(), "{bad:?}");
        }
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!(
            "bubble_shooter_settings_{}.json",
            std::process::id()
        ));
        let settings = Settings {
            shot_speed: 600.0,
            show_trajectory: false,
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
        let _ = std::fs::remove_file(path);
    }
}
