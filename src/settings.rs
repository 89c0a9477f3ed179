//! Simulation tuning and presentation preferences
//!
//! Stored as JSON next to the game data. Defaults give the classic timing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts;

/// Tuning values and presentation toggles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Simulation ===
    /// Rows a falling piece moves per step
    pub fall_speed: i32,
    /// Wait before delayed geometry falls
    pub fall_delay_frames: u32,
    /// Wait between opening a blue key door and the door dropping
    pub door_delay_frames: u32,
    /// Frames of earthquake before quake geometry falls
    pub quake_delay_frames: u32,
    /// Lifetime of exploded tile debris
    pub debris_timeout_frames: u32,
    pub burn_shake_amount: i32,
    pub landing_shake_amount: i32,

    // === Presentation ===
    /// Screen shake on impacts
    pub screen_shake: bool,
    /// Screen flash on explosions
    pub screen_flash: bool,
    /// Interpolate falling geometry between simulation steps
    pub motion_smoothing: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fall_speed: consts::GEOMETRY_FALL_SPEED,
            fall_delay_frames: consts::FALL_DELAY_FRAMES,
            door_delay_frames: consts::DOOR_DELAY_FRAMES,
            quake_delay_frames: consts::QUAKE_DELAY_FRAMES,
            debris_timeout_frames: consts::DEBRIS_TIMEOUT_FRAMES,
            burn_shake_amount: consts::BURN_SHAKE_AMOUNT,
            landing_shake_amount: consts::LANDING_SHAKE_AMOUNT,

            screen_shake: true,
            screen_flash: true,
            motion_smoothing: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective screen flash (respects reduced_motion)
    pub fn effective_screen_flash(&self) -> bool {
        self.screen_flash && !self.reduced_motion
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Clamp values the simulation cannot run with
    pub fn sanitized(mut self) -> Self {
        if self.fall_speed < 1 {
            log::warn!("fall_speed {} is too small, using 1", self.fall_speed);
            self.fall_speed = 1;
        }
        self
    }

    /// Load settings from a JSON file, falling back to defaults if it is missing
    pub fn load(path: &Path) -> std::io::Result<Self> {
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing() {
        let settings = Settings::default();
        assert_eq!(settings.fall_speed, 2);
        assert_eq!(settings.fall_delay_frames, 20);
        assert_eq!(settings.door_delay_frames, 2);
        assert_eq!(settings.quake_delay_frames, 2);
        assert_eq!(settings.debris_timeout_frames, 80);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "fall_speed": 1, "reduced_motion": true }"#)
            .expect("valid settings");
        assert_eq!(settings.fall_speed, 1);
        assert_eq!(settings.fall_delay_frames, 20);
        assert!(!settings.effective_screen_shake());
        assert!(!settings.effective_screen_flash());
    }

    #[test]
    fn test_fall_speed_is_clamped_on_load() {
        let settings = Settings::from_json(r#"{ "fall_speed": 0, "door_delay_frames": 0 }"#)
            .expect("valid settings");
        assert_eq!(settings.fall_speed, 1);
        assert_eq!(settings.door_delay_frames, 0);
        assert_eq!(Settings::default().sanitized(), Settings::default());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = Path::new("definitely/not/here/settings.json");
        assert_eq!(Settings::load(path).expect("defaults"), Settings::default());
    }
}
