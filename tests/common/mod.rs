//! Synthetic game screens and scripted collaborators for integration tests

#![allow(dead_code)]

use image::{GrayImage, Luma, Rgb, RgbImage};
use std::collections::VecDeque;
use std::time::Duration;

use rhythm_autoplayer::panel::{ControlPanel, PanelCommand};
use rhythm_autoplayer::vision::MarkerDetector;
use rhythm_autoplayer::{AutoPlayer, BotConfig, Calibrator, CaptureRegion, Result};

pub const SCREEN_WIDTH: u32 = 200;
pub const SCREEN_HEIGHT: u32 = 200;
pub const MARKER_Y: u32 = 40;
pub const MARKER_XS: [u32; 4] = [20, 60, 100, 140];

/// Background: gray too dark to count as a note
pub const BACKGROUND: Rgb<u8> = Rgb([30, 30, 30]);
/// Unsaturated mid gray inside the note window
pub const NOTE: Rgb<u8> = Rgb([120, 120, 120]);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// An 8x8 cross-shaped lane marker
pub fn marker_template() -> GrayImage {
    GrayImage::from_fn(8, 8, |x, y| {
        if x == 3 || x == 4 || y == 3 || y == 4 {
            Luma([230])
        } else {
            Luma([30])
        }
    })
}

/// Config sized for the synthetic screen
pub fn test_config() -> BotConfig {
    let mut config = BotConfig::default();
    config.detection.color_box_size = 8;
    config.timing.poll_timeout_ms = 0;
    config
}

/// Full screen with the four lane markers, in the given order
pub fn screen_with_markers(xs: &[u32]) -> RgbImage {
    let template = marker_template();
    let mut frame = RgbImage::from_pixel(SCREEN_WIDTH, SCREEN_HEIGHT, BACKGROUND);
    for &x in xs {
        for (tx, ty, p) in template.enumerate_pixels() {
            let v = p[0];
            frame.put_pixel(x + tx, MARKER_Y + ty, Rgb([v, v, v]));
        }
    }
    frame
}

pub fn test_calibrator(config: &BotConfig) -> Calibrator {
    let detector = MarkerDetector::new(marker_template(), 4).expect("valid template");
    Calibrator::new(detector, config).with_poll_timeout(Duration::ZERO)
}

/// Calibrated layout of the synthetic screen
pub struct Scene {
    pub config: BotConfig,
    pub region: CaptureRegion,
    pub sample_xs: [i64; 4],
}

impl Scene {
    /// Calibrate `config` against the marker screen
    pub fn new(config: BotConfig) -> Self {
        let geometry = test_calibrator(&config)
            .locate(&screen_with_markers(&MARKER_XS))
            .expect("markers found");
        let player = AutoPlayer::new(&geometry, &config, std::time::Instant::now())
            .expect("band fits the screen");
        Self {
            region: *player.capture_region(),
            sample_xs: *player.sample_xs(),
            config,
        }
    }

    /// Full screen with markers and a note under each of `lanes`
    pub fn frame(&self, lanes: &[usize]) -> RgbImage {
        let mut frame = screen_with_markers(&MARKER_XS);
        let half = (self.config.detection.color_box_size / 2) as i64;
        let cy = self.region.top as i64 + (self.region.height / 2) as i64;
        for &lane in lanes {
            let cx = self.region.left as i64 + self.sample_xs[lane];
            for y in (cy - half)..(cy + half) {
                for x in (cx - half)..(cx + half) {
                    frame.put_pixel(x as u32, y as u32, NOTE);
                }
            }
        }
        frame
    }
}

/// Control panel answering polls from a script.
///
/// Once the script runs out every poll returns `Cancel`. Each poll sleeps
/// briefly so consecutive frames get distinct timestamps.
pub struct ScriptedPanel {
    commands: VecDeque<Option<PanelCommand>>,
    pub shown: Vec<String>,
}

impl ScriptedPanel {
    pub fn new(commands: Vec<Option<PanelCommand>>) -> Self {
        Self {
            commands: commands.into(),
            shown: Vec::new(),
        }
    }
}

impl ControlPanel for ScriptedPanel {
    fn show(&mut self, title: &str, _frame: &RgbImage) -> Result<()> {
        self.shown.push(title.to_string());
        Ok(())
    }

    fn poll(&mut self, _timeout: Duration) -> Option<PanelCommand> {
        std::thread::sleep(Duration::from_millis(2));
        self.commands
            .pop_front()
            .unwrap_or(Some(PanelCommand::Cancel))
    }
}
