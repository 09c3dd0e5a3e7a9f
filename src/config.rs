//! Locomotion configuration parsing from TOML files.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::locomotion::LayerMask;

/// Feature switches for the controller.
///
/// These are the starting values; the controller copies them into its
/// runtime state where they can be flipped while it is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Abilities {
    pub can_move: bool,
    pub can_look: bool,
    pub can_sprint: bool,
    pub can_crouch: bool,
    pub can_jump: bool,
}

impl Default for Abilities {
    fn default() -> Self {
        Self {
            can_move: true,
            can_look: true,
            can_sprint: true,
            can_crouch: true,
            can_jump: true,
        }
    }
}

/// Debug switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Forward every ground probe to the presentation layer as a debug ray.
    pub draw_ground_probe: bool,
}

/// Tunables for one controller session.
///
/// Read once at activation and never mutated afterwards. Every field has a
/// default so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Target speed while walking (and while idle).
    pub walk_speed: f32,
    pub sprint_speed: f32,
    pub crouch_speed: f32,
    /// Linear damping applied to the body while grounded. Airborne damping is zero.
    pub ground_drag: f32,
    /// Magnitude of the upward jump impulse.
    pub jump_force: f32,
    /// Seconds before the jump gate re-arms after a jump.
    pub jump_cooldown: f32,
    /// Force multiplier while airborne.
    pub air_multiplier: f32,
    pub look_sensitivity: f32,
    /// Symmetric pitch limit in degrees.
    pub pitch_clamp_degrees: f32,
    /// Ground probe length as a fraction of capsule height.
    pub ground_probe_length_factor: f32,
    /// Layers the ground probe reports contact with.
    pub ground_mask: LayerMask,
    pub abilities: Abilities,
    pub debug: DebugConfig,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            walk_speed: 8.0,
            sprint_speed: 16.0,
            crouch_speed: 4.0,
            ground_drag: 5.0,
            jump_force: 6.0,
            jump_cooldown: 0.25,
            air_multiplier: 0.4,
            look_sensitivity: 10.0,
            pitch_clamp_degrees: 75.0,
            ground_probe_length_factor: 0.51,
            ground_mask: LayerMask::ALL,
            abilities: Abilities::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl LocomotionConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config: Self = toml::from_str(&content)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text without touching the filesystem.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|source| ConfigError::Parse {
                path: PathBuf::from("<inline>"),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("walk_speed", self.walk_speed),
            ("sprint_speed", self.sprint_speed),
            ("crouch_speed", self.crouch_speed),
            ("ground_drag", self.ground_drag),
            ("jump_force", self.jump_force),
            ("jump_cooldown", self.jump_cooldown),
            ("air_multiplier", self.air_multiplier),
            ("look_sensitivity", self.look_sensitivity),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(field, "must be finite and non-negative"));
            }
        }

        if !(self.pitch_clamp_degrees > 0.0 && self.pitch_clamp_degrees <= 90.0) {
            return Err(ConfigError::invalid(
                "pitch_clamp_degrees",
                "must lie in (0, 90]",
            ));
        }
        if !self.ground_probe_length_factor.is_finite() || self.ground_probe_length_factor <= 0.0 {
            return Err(ConfigError::invalid(
                "ground_probe_length_factor",
                "must be finite and positive",
            ));
        }
        self.jump_cooldown_duration()?;
        Ok(())
    }

    /// Jump cooldown as a [`Duration`]. Fails for values a `Duration`
    /// cannot hold.
    pub fn jump_cooldown_duration(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f32(self.jump_cooldown)
            .map_err(|_| ConfigError::invalid("jump_cooldown", "must fit in a duration"))
    }
}

/// Errors that can occur when loading locomotion configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: &'static str) -> Self {
        ConfigError::Invalid { field, reason }
    }
}
