//! Interactive lane calibration
//!
//! Repeatedly grabs the whole monitor, locates the four lane markers and
//! shows the result until the operator confirms or cancels.

use image::RgbImage;
use std::time::Duration;

use crate::config::{BotConfig, CalibrationSettings};
use crate::geometry::CalibrationGeometry;
use crate::panel::{ControlPanel, PanelCommand};
use crate::vision::capture::FrameSource;
use crate::vision::detector::MarkerDetector;
use crate::vision::overlay::draw_calibration;
use crate::Result;

/// Title of the debug window during calibration
pub const CALIBRATION_TITLE: &str = "Calibration";

/// How calibration ended
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationOutcome {
    /// Operator accepted this geometry
    Calibrated(CalibrationGeometry),
    /// Operator cancelled; the loop must not start
    Aborted,
}

/// Locates the lanes and derives [`CalibrationGeometry`]
pub struct Calibrator {
    detector: MarkerDetector,
    settings: CalibrationSettings,
    monitor_index: usize,
    poll_timeout: Duration,
}

impl Calibrator {
    pub fn new(detector: MarkerDetector, config: &BotConfig) -> Self {
        Self {
            detector,
            settings: config.calibration.clone(),
            monitor_index: config.monitor_index,
            poll_timeout: Duration::from_millis(1),
        }
    }

    /// Load the template named in the config
    pub fn from_config(config: &BotConfig) -> Result<Self> {
        let detector = MarkerDetector::from_path(
            &config.template_path,
            config.calibration.border_around_figures,
        )?;
        Ok(Self::new(detector, config))
    }

    /// Override how long each iteration waits for operator input
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Geometry for a single full-monitor frame
    pub fn locate(&self, frame: &RgbImage) -> Result<CalibrationGeometry> {
        let markers = self.detector.detect(frame)?;
        Ok(CalibrationGeometry::from_markers(
            markers,
            self.detector.template_width(),
            self.detector.template_height(),
            &self.settings,
        ))
    }

    /// Check a geometry is safe to commit
    pub fn validate(&self, geometry: &CalibrationGeometry) -> Result<()> {
        geometry.check_separation()?;
        if let Some(min_score) = self.settings.min_match_score {
            geometry.check_scores(min_score)?;
        }
        Ok(())
    }

    /// Run the interactive calibration loop.
    ///
    /// Each iteration re-captures, re-detects and redraws. A confirmation
    /// commits the geometry of the frame just shown, unless it fails
    /// [`validate`](Self::validate), in which case a warning is logged and
    /// the loop continues. Capture failures end calibration with an error.
    pub fn calibrate<S, P>(&self, source: &mut S, panel: &mut P) -> Result<CalibrationOutcome>
    where
        S: FrameSource + ?Sized,
        P: ControlPanel + ?Sized,
    {
        let region = source.monitor_region(self.monitor_index)?;
        log::info!(
            "Calibrating on monitor {} ({}x{}); Enter to confirm, q to quit",
            self.monitor_index,
            region.width,
            region.height
        );

        let mut last_rejection: Option<String> = None;

        loop {
            let mut frame = source.capture(&region)?;
            let geometry = self.locate(&frame)?;

            draw_calibration(&mut frame, &geometry);
            panel.show(CALIBRATION_TITLE, &frame)?;

            match panel.poll(self.poll_timeout) {
                Some(PanelCommand::Cancel) => {
                    log::info!("Calibration cancelled");
                    return Ok(CalibrationOutcome::Aborted);
                }
                Some(PanelCommand::Confirm) => match self.validate(&geometry) {
                    Ok(()) => {
                        log::info!(
                            "Calibration done: lanes at x={:?}, band {}..{} x {}..{}",
                            geometry.matches().iter().map(|m| m.x).collect::<Vec<_>>(),
                            geometry.start_x(),
                            geometry.end_x(),
                            geometry.start_y(),
                            geometry.end_y()
                        );
                        return Ok(CalibrationOutcome::Calibrated(geometry));
                    }
                    Err(e) => {
                        let reason = e.to_string();
                        if last_rejection.as_deref() != Some(reason.as_str()) {
                            log::warn!("Not accepting calibration: {}", reason);
                        }
                        last_rejection = Some(reason);
                    }
                },
                None => {}
            }
        }
    }
}
