//! Full calibrate-then-play session

use std::time::Instant;

use crate::autoplay::{AutoPlayer, RunSummary};
use crate::calibration::{CalibrationOutcome, Calibrator};
use crate::config::BotConfig;
use crate::input::KeyPresser;
use crate::panel::ControlPanel;
use crate::vision::capture::FrameSource;
use crate::Result;

/// How a session ended
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// Calibration was cancelled; no key was ever pressed
    Aborted,
    /// The loop ran and was stopped by the operator
    Completed(RunSummary),
}

/// Calibrate, then run the detection loop on the confirmed geometry.
///
/// The key presser is only created once calibration has been confirmed, so
/// an aborted calibration never touches the input backend.
pub fn run_session<S, P, K, F>(
    config: &BotConfig,
    calibrator: &Calibrator,
    source: &mut S,
    panel: &mut P,
    connect_keys: F,
) -> Result<SessionOutcome>
where
    S: FrameSource + ?Sized,
    P: ControlPanel + ?Sized,
    K: KeyPresser,
    F: FnOnce() -> Result<K>,
{
    let geometry = match calibrator.calibrate(source, panel)? {
        CalibrationOutcome::Calibrated(geometry) => geometry,
        CalibrationOutcome::Aborted => return Ok(SessionOutcome::Aborted),
    };

    let mut player = AutoPlayer::new(&geometry, config, Instant::now())?;
    let mut keys = connect_keys()?;
    let summary = player.run(source, &mut keys, panel)?;
    Ok(SessionOutcome::Completed(summary))
}
