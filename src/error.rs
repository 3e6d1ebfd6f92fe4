//! Error types for the autoplayer

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, AutoplayError>;

/// Errors raised by calibration and the detection loop
///
/// A cancelled calibration is not an error; see
/// [`CalibrationOutcome::Aborted`](crate::calibration::CalibrationOutcome).
#[derive(Debug, Error)]
pub enum AutoplayError {
    /// Invalid configuration or unreadable config file
    #[error("configuration error: {0}")]
    Config(String),

    /// Template image missing, unreadable or unusable against the frame
    #[error("template error: {0}")]
    Template(String),

    /// Capture backend could not produce a frame
    #[error("capture failed: {0}")]
    Capture(String),

    /// Key injection backend failed
    #[error("key injection failed: {0}")]
    Input(String),

    /// Debug window could not be created or updated
    #[error("display error: {0}")]
    Display(String),

    /// The four detected markers do not look like four distinct lanes
    #[error("ambiguous calibration: {0}")]
    AmbiguousCalibration(String),

    /// A lane's color patch falls outside the captured frame
    #[error("sample patch for lane {lane} at x={x} (size {size}) lies outside a {width}x{height} frame")]
    EmptySampleRegion {
        lane: usize,
        x: i64,
        size: u32,
        width: u32,
        height: u32,
    },
}
