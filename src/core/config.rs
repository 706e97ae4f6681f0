//! Visualization configuration with documented constants
//!
//! All tuning numbers for action animation, audio cues and the demo scene
//! live here. A config can be loaded from TOML; missing keys fall back to
//! the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{Result, VisError};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisConfig {
    pub action: ActionConfig,
    pub audio: AudioConfig,
    pub scene: SceneConfig,
}

/// Animation constants for actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Progress gained per second by an action whose source has no backlog.
    ///
    /// At 0.5 a lone action takes two seconds to finish.
    pub base_rate: f32,

    /// Upper bound on the backlog-scaled rate.
    ///
    /// With the default base rate this caps catch-up at 20x.
    pub max_rate: f32,

    /// Width of the beam at the source end relative to the target end.
    pub source_width_factor: f32,

    /// Alpha at the source end relative to the target end.
    pub tail_alpha_factor: f32,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            base_rate: 0.5,
            max_rate: 10.0,
            source_width_factor: 0.3,
            tail_alpha_factor: 0.1,
        }
    }
}

/// Audio cue constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Start the audio engine at all.
    pub enabled: bool,
    pub sample_rate: u32,
    pub channels: u16,
    /// Peak oscillator amplitude (full scale = 1.0).
    pub amplitude: f32,
    /// Cues waiting beyond this count are dropped rather than blocking a tick.
    pub queue_capacity: usize,
    /// Cue length in seconds.
    pub cue_duration: f32,
    pub create_pitch: f32,
    pub remove_pitch: f32,
    pub modify_pitch: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_rate: 44_100,
            channels: 2,
            amplitude: 0.5,
            queue_capacity: 256,
            cue_duration: 0.1,
            create_pitch: 440.0,
            remove_pitch: 110.0,
            modify_pitch: 220.0,
        }
    }
}

/// Demo scene layout constants (the real layout engine lives elsewhere).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Size reported by every file node; sets beam width at the target end.
    pub file_size: f32,
    /// Radius of the ring actors are placed on.
    pub actor_radius: f32,
    /// Edge length of the node marker quads.
    pub node_size: f32,
    /// Blend beams additively so crossings glow; off means plain alpha.
    pub additive_beams: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            file_size: 8.0,
            actor_radius: 200.0,
            node_size: 4.0,
            additive_beams: true,
        }
    }
}

impl VisConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a config from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse and validate a config from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: VisConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let action = &self.action;
        if !(action.base_rate >= 0.0) {
            return Err(VisError::Config(format!(
                "action.base_rate ({}) must be >= 0",
                action.base_rate
            )));
        }
        if action.max_rate < action.base_rate {
            return Err(VisError::Config(format!(
                "action.max_rate ({}) should be >= action.base_rate ({})",
                action.max_rate, action.base_rate
            )));
        }
        if !(0.0..=1.0).contains(&action.tail_alpha_factor) {
            return Err(VisError::Config(
                "action.tail_alpha_factor must be within 0.0-1.0".into(),
            ));
        }

        let audio = &self.audio;
        if audio.sample_rate == 0 || audio.channels == 0 {
            return Err(VisError::Config(
                "audio.sample_rate and audio.channels must be positive".into(),
            ));
        }
        if audio.queue_capacity == 0 {
            return Err(VisError::Config("audio.queue_capacity must be positive".into()));
        }
        if !(audio.cue_duration > 0.0) {
            return Err(VisError::Config("audio.cue_duration must be positive".into()));
        }

        if self.scene.file_size <= 0.0 {
            return Err(VisError::Config("scene.file_size must be positive".into()));
        }

        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<VisConfig> = OnceLock::new();

/// Get the global config (initializes with defaults if not set)
pub fn config() -> &'static VisConfig {
    CONFIG.get_or_init(VisConfig::default)
}

/// Set the global config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: VisConfig) -> std::result::Result<(), VisConfig> {
    CONFIG.set(config)
}
