//! Configuration types for the autoplayer
//!
//! These types define the structure of the TOML configuration file. Every
//! field has a default, so an empty file (or no file at all) yields the
//! tuning the bot was built around.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{AutoplayError, Result};

/// Number of note lanes the bot drives
pub const LANE_COUNT: usize = 4;

/// Top-level autoplayer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Key sent for each lane, left to right; any printable, non-space character
    #[serde(default = "default_keys")]
    pub keys: [char; LANE_COUNT],
    /// Index of the monitor to capture (0 = first monitor reported by the OS)
    #[serde(default)]
    pub monitor_index: usize,
    /// Path of the lane marker template image
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,
    /// Calibration settings
    #[serde(default)]
    pub calibration: CalibrationSettings,
    /// Per-frame detection settings
    #[serde(default)]
    pub detection: DetectionSettings,
    /// Debounce and delay settings
    #[serde(default)]
    pub timing: TimingSettings,
}

/// Settings used while locating the lane markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSettings {
    /// Padding (px) around each match that is suppressed before the next search
    #[serde(default = "default_border")]
    pub border_around_figures: u32,
    /// Distance (px) of the detection line above the average marker y
    #[serde(default = "default_top_line_distance")]
    pub top_line_distance: i32,
    /// Height (px) of the band captured around the detection line
    #[serde(default = "default_detection_box_height")]
    pub detection_box_height: u32,
    /// Reject confirmations when any marker scores below this value
    #[serde(default)]
    pub min_match_score: Option<f32>,
}

/// Settings for sampling and classifying each lane's color patch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSettings {
    /// Side (px) of the square patch sampled per lane
    #[serde(default = "default_color_box_size")]
    pub color_box_size: u32,
    /// Vertical offset (px) from the detection line to the capture band top.
    /// Accounts for window chrome such as a title bar.
    #[serde(default = "default_capture_offset_y")]
    pub capture_offset_y: i32,
    /// Dampening applied to each lane's offset from the band center
    #[serde(default = "default_skew_factor")]
    pub skew_factor: f64,
    /// Mean saturation must be strictly below this
    #[serde(default = "default_saturation_max")]
    pub saturation_max: f64,
    /// Mean value must be strictly above this
    #[serde(default = "default_value_min")]
    pub value_min: f64,
    /// Mean value must be strictly below this
    #[serde(default = "default_value_max")]
    pub value_max: f64,
}

/// Timing controls of the actuation loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingSettings {
    /// Minimum time (ms) between two presses of the same lane
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Length of the delay buffer in frames
    #[serde(default = "default_delay_frames")]
    pub delay_frames: usize,
    /// How long (ms) each frame waits on the control panel for input
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
}

fn default_keys() -> [char; LANE_COUNT] {
    ['a', 's', 'd', 'f']
}

fn default_template_path() -> PathBuf {
    PathBuf::from("template.png")
}

fn default_border() -> u32 {
    10
}

fn default_top_line_distance() -> i32 {
    5
}

fn default_detection_box_height() -> u32 {
    50
}

fn default_color_box_size() -> u32 {
    30
}

fn default_capture_offset_y() -> i32 {
    90
}

fn default_skew_factor() -> f64 {
    0.9
}

fn default_saturation_max() -> f64 {
    50.0
}

fn default_value_min() -> f64 {
    50.0
}

fn default_value_max() -> f64 {
    180.0
}

fn default_debounce_ms() -> u64 {
    250
}

fn default_delay_frames() -> usize {
    2
}

fn default_poll_timeout_ms() -> u64 {
    5
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            border_around_figures: default_border(),
            top_line_distance: default_top_line_distance(),
            detection_box_height: default_detection_box_height(),
            min_match_score: None,
        }
    }
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            color_box_size: default_color_box_size(),
            capture_offset_y: default_capture_offset_y(),
            skew_factor: default_skew_factor(),
            saturation_max: default_saturation_max(),
            value_min: default_value_min(),
            value_max: default_value_max(),
        }
    }
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            delay_frames: default_delay_frames(),
            poll_timeout_ms: default_poll_timeout_ms(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            keys: default_keys(),
            monitor_index: 0,
            template_path: default_template_path(),
            calibration: CalibrationSettings::default(),
            detection: DetectionSettings::default(),
            timing: TimingSettings::default(),
        }
    }
}

impl TimingSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

impl BotConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AutoplayError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| AutoplayError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the lane keys
    pub fn with_keys(mut self, keys: [char; LANE_COUNT]) -> Self {
        self.keys = keys;
        self
    }

    /// Set the monitor to capture
    pub fn with_monitor(mut self, index: usize) -> Self {
        self.monitor_index = index;
        self
    }

    /// Set the template image path
    pub fn with_template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = path.into();
        self
    }

    /// Set the delay buffer length
    pub fn with_delay_frames(mut self, frames: usize) -> Self {
        self.timing.delay_frames = frames;
        self
    }

    /// Set the debounce window
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.timing.debounce_ms = ms;
        self
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        for (i, key) in self.keys.iter().enumerate() {
            if key.is_control() || key.is_whitespace() {
                return Err(AutoplayError::Config(format!(
                    "lane {} key {:?} is not a printable character",
                    i, key
                )));
            }
            if self.keys[..i].contains(key) {
                return Err(AutoplayError::Config(format!(
                    "key {:?} is assigned to more than one lane",
                    key
                )));
            }
        }

        if self.calibration.detection_box_height == 0 {
            return Err(AutoplayError::Config(
                "calibration.detection_box_height must be positive".to_string(),
            ));
        }

        let detection = &self.detection;
        if detection.color_box_size < 2 {
            return Err(AutoplayError::Config(
                "detection.color_box_size must be at least 2".to_string(),
            ));
        }
        if detection.color_box_size > self.calibration.detection_box_height {
            return Err(AutoplayError::Config(format!(
                "detection.color_box_size ({}) exceeds calibration.detection_box_height ({})",
                detection.color_box_size, self.calibration.detection_box_height
            )));
        }
        if !(detection.skew_factor > 0.0 && detection.skew_factor <= 1.0) {
            return Err(AutoplayError::Config(format!(
                "detection.skew_factor must be in (0, 1], got {}",
                detection.skew_factor
            )));
        }
        if detection.value_min >= detection.value_max {
            return Err(AutoplayError::Config(format!(
                "detection.value_min ({}) must be below detection.value_max ({})",
                detection.value_min, detection.value_max
            )));
        }

        if self.timing.delay_frames == 0 {
            return Err(AutoplayError::Config(
                "timing.delay_frames must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
