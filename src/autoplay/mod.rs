//! Detection and actuation loop
//!
//! This module contains the per-frame machinery that turns a calibrated
//! band into key presses:
//! - `LaneState` - per-lane debounce bookkeeping
//! - `DelayBuffer` - fixed-latency FIFO between detection and actuation
//! - `AutoPlayer` - owns both and drives capture, classification and input

mod delay;
mod events;
mod lane;
mod runner;

pub use delay::DelayBuffer;
pub use events::{format_status, FrameReport, LaneSample, LaneSet};
pub use lane::{LaneState, LaneUpdate};
pub use runner::{skew_corrected_x, AutoPlayer, RunSummary, DETECTION_TITLE};
