//! Rhythm Autoplayer
//!
//! A vision-driven autoplayer for four-lane rhythm games. It locates the
//! lane markers on screen by template matching, samples a small color patch
//! per lane every frame and sends debounced, delay-buffered key presses
//! when a note reaches the hit zone.
//!
//! The crate is split into:
//! - `calibration` - one-shot, interactive lane geometry
//! - `autoplay` - the per-frame detection/actuation loop
//! - `vision` - capture sources, template matching, HSV sampling, overlays
//! - `panel` / `input` - debug display and key injection backends
//!
//! Desktop backends (screen capture, keyboard, debug window) live behind the
//! default `desktop` feature; everything else runs headless.

pub mod autoplay;
pub mod calibration;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod panel;
pub mod session;
pub mod vision;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types
pub use autoplay::{AutoPlayer, DelayBuffer, FrameReport, LaneSet, RunSummary};
pub use calibration::{CalibrationOutcome, Calibrator};
pub use config::{BotConfig, LANE_COUNT};
pub use error::{AutoplayError, Result};
pub use geometry::{CalibrationGeometry, CaptureRegion, LaneMarker};
pub use session::{run_session, SessionOutcome};
