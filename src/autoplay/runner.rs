//! Detection/actuation loop
//!
//! Captures the calibrated band, classifies each lane, debounces, delays and
//! finally presses keys. Everything runs on the calling thread.

use image::RgbImage;
use std::time::{Duration, Instant};

use super::delay::DelayBuffer;
use super::events::{format_status, FrameReport, LaneSample, LaneSet};
use super::lane::LaneState;
use crate::config::{BotConfig, LANE_COUNT};
use crate::geometry::{CalibrationGeometry, CaptureRegion};
use crate::input::KeyPresser;
use crate::panel::{ControlPanel, PanelCommand};
use crate::vision::capture::FrameSource;
use crate::vision::color::{sample_patch, to_hsv, NoteThresholds};
use crate::vision::overlay::draw_lane;
use crate::{AutoplayError, Result};

/// Title of the debug window while the loop runs
pub const DETECTION_TITLE: &str = "Detection";

/// Sample x after dampening the lane's offset from the band center.
///
/// `corrected = center + (raw - center) * skew_factor`, truncated toward
/// zero. A lane exactly at the center is left unchanged.
pub fn skew_corrected_x(raw_x: i64, band_width: u32, skew_factor: f64) -> i64 {
    let center = (band_width / 2) as i64;
    let dx = (raw_x - center) as f64;
    (center as f64 + dx * skew_factor) as i64
}

/// Summary returned when the loop stops
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Frames captured and processed
    pub frames: u64,
    /// Individual key presses sent
    pub key_presses: u64,
    /// Wall time spent in the loop
    pub elapsed: Duration,
}

/// Owns all loop state: lane debounce, delay buffer and sample geometry
pub struct AutoPlayer {
    keys: [char; LANE_COUNT],
    region: CaptureRegion,
    /// Skew-corrected sample x per lane, relative to the capture band
    sample_xs: [i64; LANE_COUNT],
    sample_y: i64,
    color_box_size: u32,
    thresholds: NoteThresholds,
    lanes: [LaneState; LANE_COUNT],
    delay: DelayBuffer,
    poll_timeout: Duration,
    frame_index: u64,
}

impl AutoPlayer {
    /// Set up the loop from calibrated geometry.
    ///
    /// `start` seeds every lane's last press time, so nothing fires during
    /// the first debounce window. Fails when a lane's sample patch would not
    /// fit inside the capture band.
    pub fn new(geometry: &CalibrationGeometry, config: &BotConfig, start: Instant) -> Result<Self> {
        config.validate()?;

        let detection = &config.detection;
        let region = geometry.capture_region(
            detection.capture_offset_y,
            config.calibration.detection_box_height,
            config.monitor_index,
        );

        let mut sample_xs = [0i64; LANE_COUNT];
        for (lane, marker) in geometry.matches().iter().enumerate() {
            let raw_x = marker.x as i64 - geometry.start_x() as i64
                + (geometry.template_width() / 2) as i64;
            sample_xs[lane] = skew_corrected_x(raw_x, region.width, detection.skew_factor);
        }
        let sample_y = (region.height / 2) as i64;

        let half = (detection.color_box_size / 2) as i64;
        for (lane, &x) in sample_xs.iter().enumerate() {
            if x - half < 0 || x + half > region.width as i64 || sample_y + half > region.height as i64 {
                return Err(AutoplayError::EmptySampleRegion {
                    lane,
                    x,
                    size: detection.color_box_size,
                    width: region.width,
                    height: region.height,
                });
            }
        }

        log::info!(
            "Capture band: left={} top={} {}x{} on monitor {}",
            region.left,
            region.top,
            region.width,
            region.height,
            region.monitor_index
        );
        log::info!(
            "Lane sample x: {:?}, keys: {:?}",
            sample_xs,
            config.keys
        );

        let debounce = config.timing.debounce();
        Ok(Self {
            keys: config.keys,
            region,
            sample_xs,
            sample_y,
            color_box_size: detection.color_box_size,
            thresholds: NoteThresholds::from_settings(detection),
            lanes: std::array::from_fn(|_| LaneState::new(start, debounce)),
            delay: DelayBuffer::new(config.timing.delay_frames),
            poll_timeout: config.timing.poll_timeout(),
            frame_index: 0,
        })
    }

    /// Region captured every frame
    pub fn capture_region(&self) -> &CaptureRegion {
        &self.region
    }

    /// Skew-corrected sample x per lane
    pub fn sample_xs(&self) -> &[i64; LANE_COUNT] {
        &self.sample_xs
    }

    pub fn keys(&self) -> &[char; LANE_COUNT] {
        &self.keys
    }

    /// Classify, debounce and delay one captured frame taken at `now`.
    ///
    /// Does not press anything; the returned report says which lanes are
    /// due for actuation.
    pub fn process_frame(&mut self, frame: &RgbImage, now: Instant) -> Result<FrameReport> {
        let hsv = to_hsv(frame);

        let mut detected = LaneSet::new();
        let mut samples = [LaneSample {
            x: 0,
            saturation: 0.0,
            value: 0.0,
            active: false,
            debounced: false,
        }; LANE_COUNT];

        for lane in 0..LANE_COUNT {
            let x = self.sample_xs[lane];
            let stats = sample_patch(&hsv, x, self.sample_y, self.color_box_size).ok_or_else(|| {
                AutoplayError::EmptySampleRegion {
                    lane,
                    x,
                    size: self.color_box_size,
                    width: frame.width(),
                    height: frame.height(),
                }
            })?;

            let active = self.thresholds.is_note(&stats);
            let update = self.lanes[lane].update(active, now);
            if update.fired {
                detected.insert(lane);
            }

            samples[lane] = LaneSample {
                x,
                saturation: stats.saturation,
                value: stats.value,
                active,
                debounced: update.debounced,
            };
        }

        let actuated = self.delay.advance(detected);

        let report = FrameReport {
            frame_index: self.frame_index,
            lanes: samples,
            detected,
            actuated,
        };
        self.frame_index += 1;
        Ok(report)
    }

    /// Press every key in `lanes`, left to right, and print the status line
    pub fn actuate<K: KeyPresser + ?Sized>(&self, lanes: LaneSet, keys: &mut K) -> Result<u64> {
        let mut presses = 0;
        for lane in lanes.iter() {
            keys.press(self.keys[lane])?;
            presses += 1;
        }
        println!("{}", format_status(&self.keys, lanes));
        Ok(presses)
    }

    /// Draw lane boxes for a processed frame
    pub fn draw_overlay(&self, frame: &mut RgbImage, report: &FrameReport) {
        for sample in &report.lanes {
            draw_lane(frame, sample.x, self.sample_y, self.color_box_size, sample.debounced);
        }
    }

    /// Run until the control panel reports [`PanelCommand::Cancel`].
    ///
    /// Any capture, sampling or key injection failure ends the run with
    /// that error; nothing is retried.
    pub fn run<S, K, P>(&mut self, source: &mut S, keys: &mut K, panel: &mut P) -> Result<RunSummary>
    where
        S: FrameSource + ?Sized,
        K: KeyPresser + ?Sized,
        P: ControlPanel + ?Sized,
    {
        let started = Instant::now();
        let mut frames = 0u64;
        let mut key_presses = 0u64;
        let mut last_stats = Instant::now();
        let mut frames_since_stats = 0u64;

        log::info!("Detection loop started");

        loop {
            let mut frame = source.capture(&self.region)?;
            let report = self.process_frame(&frame, Instant::now())?;
            frames += 1;
            frames_since_stats += 1;

            if let Some(lanes) = report.actuated {
                key_presses += self.actuate(lanes, keys)?;
            }

            self.draw_overlay(&mut frame, &report);
            panel.show(DETECTION_TITLE, &frame)?;

            if last_stats.elapsed() >= Duration::from_secs(5) {
                let secs = last_stats.elapsed().as_secs_f64();
                log::debug!(
                    "{} frames, {:.1} fps, {} presses so far",
                    frames,
                    frames_since_stats as f64 / secs,
                    key_presses
                );
                last_stats = Instant::now();
                frames_since_stats = 0;
            }

            if panel.poll(self.poll_timeout) == Some(PanelCommand::Cancel) {
                break;
            }
        }

        let summary = RunSummary {
            frames,
            key_presses,
            elapsed: started.elapsed(),
        };
        log::info!(
            "Detection loop stopped after {} frames ({} key presses, {:.1}s)",
            summary.frames,
            summary.key_presses,
            summary.elapsed.as_secs_f64()
        );
        Ok(summary)
    }
}
