//! Presentation configuration
//!
//! Every timing, framing and navigation constant of the reveal lives here so
//! the choreography can be tuned without a rebuild. The file is RON; each
//! section and field is optional and falls back to the built-in value.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::anim::Millis;

/// Where the configuration is looked up when no `--config` is given
pub const DEFAULT_CONFIG_PATH: &str = "assets/reveal.ron";

/// Longest duration accepted for any timed step (ten minutes)
const MAX_DURATION_MS: Millis = 600_000.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// The 3D asset and how it is prepared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    /// Yaw applied after loading (radians); the model starts facing away
    pub initial_yaw: f32,
    /// Hide flat HUD/display plates baked into the model
    pub hide_hud_panels: bool,
    /// Enable manual drag rotation
    pub allow_user_rotate: bool,
    /// Radians per pixel of drag
    pub drag_speed: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("assets/models/glasses.obj"),
            initial_yaw: std::f32::consts::PI,
            hide_hud_panels: false,
            allow_user_rotate: false,
            drag_speed: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramingConfig {
    /// World size the model's largest dimension is scaled to
    pub target_width: f32,
    /// Upward nudge after centering
    pub vertical_offset: f32,
    /// Camera extents are the model bounds times this
    pub padding: f32,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            target_width: 20.0,
            vertical_offset: 0.05,
            padding: 1.5,
        }
    }
}

/// Flip-away and reveal timings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlipConfig {
    pub rotation_ms: Millis,
    /// Fade-out start, measured from the rotation start
    pub fade_delay_ms: Millis,
    pub fade_ms: Millis,
    /// Fade-in once the model comes back
    pub reveal_ms: Millis,
}

impl Default for FlipConfig {
    fn default() -> Self {
        Self {
            rotation_ms: 1200.0,
            fade_delay_ms: 1000.0,
            fade_ms: 900.0,
            reveal_ms: 800.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanConfig {
    /// Swing either side of the start angle
    pub angle_deg: f32,
    /// Start to left, and left to right
    pub outer_leg_ms: Millis,
    /// Right back to start
    pub return_leg_ms: Millis,
    /// Extra time a leg may take before it is forced to its end angle
    pub leg_timeout_ms: Millis,
    /// Overlay clip key played behind the pan
    pub clip: String,
}

impl Default for PanConfig {
    fn default() -> Self {
        Self {
            angle_deg: 10.0,
            outer_leg_ms: 4000.0,
            return_leg_ms: 2000.0,
            leg_timeout_ms: 2000.0,
            clip: "scan".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Wait after an image starts its reveal
    pub settle_ms: Millis,
    /// Time per typed character
    pub char_interval_ms: Millis,
    pub line1: String,
    pub line2: String,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            settle_ms: 400.0,
            char_interval_ms: 18.0,
            line1: "Date, time and battery status are essential, so they sit in the top right where they are easy to reach.".to_string(),
            line2: "From the start screen you can check important activity such as notifications and suggested tasks.".to_string(),
        }
    }
}

/// One navigation-bar entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabConfig {
    pub id: String,
    pub label: String,
    /// Content panel shown while the tab is active
    pub panel: String,
    /// Selecting the tab swaps the background clip
    #[serde(default)]
    pub media: bool,
    /// Selected on startup
    #[serde(default)]
    pub default_entry: bool,
}

impl TabConfig {
    fn new(id: &str, label: &str, media: bool, default_entry: bool) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            panel: format!("{}-content", id),
            media,
            default_entry,
        }
    }
}

/// Overlay clip lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    /// Directory the clip directories live under
    pub root: PathBuf,
    /// Clip played for tabs with no explicit entry
    pub default_clip: String,
    /// Tab id (or phase key) to clip directory
    pub by_key: BTreeMap<String, String>,
    pub fps: f32,
}

impl Default for ClipConfig {
    fn default() -> Self {
        let by_key = [("scan", "scan"), ("measure", "measure"), ("recipe", "recipe")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            root: PathBuf::from("assets/clips"),
            default_clip: "scan".to_string(),
            by_key,
            fps: 24.0,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub model: ModelConfig,
    pub framing: FramingConfig,
    pub flip: FlipConfig,
    pub pan: PanConfig,
    pub annotations: AnnotationConfig,
    pub tabs: Vec<TabConfig>,
    pub clips: ClipConfig,
    /// Screen the hand-off control navigates to
    pub follow_on: String,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            framing: FramingConfig::default(),
            flip: FlipConfig::default(),
            pan: PanConfig::default(),
            annotations: AnnotationConfig::default(),
            tabs: vec![
                TabConfig::new("scan", "Scan", true, true),
                TabConfig::new("measure", "Measure", true, false),
                TabConfig::new("recipe", "Recipe", true, false),
                TabConfig::new("timer", "Timer", false, false),
            ],
            clips: ClipConfig::default(),
            follow_on: "cooking".to_string(),
        }
    }
}

impl RevealConfig {
    /// Parse and validate RON text
    pub fn from_ron(s: &str) -> Result<Self, ConfigError> {
        let config: RevealConfig = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file. A missing file is not an error: it yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_ron(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// `load`, with any error logged and replaced by defaults
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            log::error!("Bad config {}: {}; using defaults", path.display(), e);
            Self::default()
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("flip.rotation_ms", self.flip.rotation_ms),
            ("flip.fade_delay_ms", self.flip.fade_delay_ms),
            ("flip.fade_ms", self.flip.fade_ms),
            ("flip.reveal_ms", self.flip.reveal_ms),
            ("pan.outer_leg_ms", self.pan.outer_leg_ms),
            ("pan.return_leg_ms", self.pan.return_leg_ms),
            ("pan.leg_timeout_ms", self.pan.leg_timeout_ms),
            ("annotations.settle_ms", self.annotations.settle_ms),
            ("annotations.char_interval_ms", self.annotations.char_interval_ms),
        ];
        for (name, value) in durations {
            if !value.is_finite() || !(0.0..=MAX_DURATION_MS).contains(&value) {
                return Err(ConfigError::Validation(format!("{} out of range: {}", name, value)));
            }
        }

        let f = &self.framing;
        if !(f.target_width > 0.0 && f.padding > 0.0 && f.vertical_offset.is_finite()) {
            return Err(ConfigError::Validation("framing values must be positive".to_string()));
        }
        if !(self.clips.fps > 0.0 && self.clips.fps.is_finite()) {
            return Err(ConfigError::Validation(format!("clip fps out of range: {}", self.clips.fps)));
        }
        if self.tabs.iter().filter(|t| t.default_entry).count() > 1 {
            return Err(ConfigError::Validation("more than one default tab".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reveal_timings() {
        let config = RevealConfig::default();
        assert_eq!(config.flip.rotation_ms, 1200.0);
        assert_eq!(config.flip.fade_delay_ms, 1000.0);
        assert_eq!(config.pan.angle_deg, 10.0);
        assert_eq!(config.annotations.char_interval_ms, 18.0);
        assert_eq!(config.tabs.iter().filter(|t| t.default_entry).count(), 1);
        assert_eq!(config.tabs[0].panel, "scan-content");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config = RevealConfig::from_ron("(flip: (rotation_ms: 600.0), follow_on: \"kitchen\")").unwrap();
        assert_eq!(config.flip.rotation_ms, 600.0);
        assert_eq!(config.flip.fade_ms, 900.0);
        assert_eq!(config.follow_on, "kitchen");
        assert_eq!(config.tabs.len(), 4);
    }

    #[test]
    fn test_validation_rejects_negative_duration() {
        let err = RevealConfig::from_ron("(pan: (outer_leg_ms: -5.0))").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();

        let missing = RevealConfig::load(&dir.path().join("none.ron")).unwrap();
        assert_eq!(missing, RevealConfig::default());

        let bad = dir.path().join("bad.ron");
        std::fs::write(&bad, "(flip: (rotation_ms: \"fast\"))").unwrap();
        assert!(matches!(RevealConfig::load(&bad), Err(ConfigError::Parse(_))));
        assert_eq!(RevealConfig::load_or_default(&bad), RevealConfig::default());
    }

    #[test]
    fn test_round_trip_pretty() {
        let config = RevealConfig::default();
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new()).unwrap();
        assert_eq!(RevealConfig::from_ron(&text).unwrap(), config);
    }
}
