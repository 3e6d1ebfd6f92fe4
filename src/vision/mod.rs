//! Vision primitives for the autoplayer
//!
//! This module provides frame capture, lane marker detection by template
//! matching, HSV color sampling and the debug overlays drawn on captured
//! frames.
//!
//! # Example
//!
//! ```ignore
//! use rhythm_autoplayer::vision::{MarkerDetector, ReplayCapture, FrameSource};
//!
//! let detector = MarkerDetector::from_path("template.png".as_ref(), 10)?;
//! let mut source = ReplayCapture::from_directory("recordings/".as_ref(), false)?;
//! let region = source.monitor_region(0)?;
//! let markers = detector.detect(&source.capture(&region)?)?;
//! ```

pub mod capture;
pub mod color;
pub mod detector;
pub mod overlay;

// Re-export main types for convenient access
#[cfg(feature = "desktop")]
pub use capture::ScreenCapture;
pub use capture::{FrameSource, ReplayCapture};
pub use color::{HsvImage, NoteThresholds, PatchStats};
pub use detector::MarkerDetector;
