//! Lane marker detection by template matching

use image::{imageops, GrayImage, Luma, RgbImage};
use imageproc::template_matching::{find_extremes, match_template, MatchTemplateMethod};
use std::path::Path;

use crate::config::LANE_COUNT;
use crate::geometry::LaneMarker;
use crate::{AutoplayError, Result};

/// Locates the four lane markers in a full-monitor frame
#[derive(Debug, Clone)]
pub struct MarkerDetector {
    /// Grayscale marker template
    template: GrayImage,
    /// Padding around each match that is suppressed before the next search
    border: u32,
}

impl MarkerDetector {
    /// Create a detector for the given template
    pub fn new(template: GrayImage, border: u32) -> Result<Self> {
        if template.width() == 0 || template.height() == 0 {
            return Err(AutoplayError::Template("template image is empty".to_string()));
        }
        Ok(Self { template, border })
    }

    /// Load the template from an image file
    pub fn from_path(path: &Path, border: u32) -> Result<Self> {
        let template = image::open(path)
            .map_err(|e| AutoplayError::Template(format!("{}: {}", path.display(), e)))?
            .to_luma8();
        log::info!(
            "Loaded template {} ({}x{})",
            path.display(),
            template.width(),
            template.height()
        );
        Self::new(template, border)
    }

    pub fn template_width(&self) -> u32 {
        self.template.width()
    }

    pub fn template_height(&self) -> u32 {
        self.template.height()
    }

    /// Find the four best non-overlapping matches, in detection order.
    ///
    /// Match quality is not validated here: if fewer than four markers are
    /// visible the remaining picks are simply the next-highest scores.
    pub fn detect(&self, frame: &RgbImage) -> Result<[LaneMarker; LANE_COUNT]> {
        let gray = imageops::grayscale(frame);
        self.detect_gray(&gray)
    }

    /// Same as [`detect`](Self::detect) on an already grayscale frame
    pub fn detect_gray(&self, frame: &GrayImage) -> Result<[LaneMarker; LANE_COUNT]> {
        if frame.width() < self.template.width() || frame.height() < self.template.height() {
            return Err(AutoplayError::Template(format!(
                "template {}x{} is larger than frame {}x{}",
                self.template.width(),
                self.template.height(),
                frame.width(),
                frame.height()
            )));
        }

        let mut scores = match_template(
            frame,
            &self.template,
            MatchTemplateMethod::CrossCorrelationNormalized,
        );

        let mut markers = [LaneMarker::new(0, 0, 0.0); LANE_COUNT];
        for marker in markers.iter_mut() {
            let extremes = find_extremes(&scores);
            let (x, y) = extremes.max_value_location;
            *marker = LaneMarker::new(x, y, extremes.max_value);
            suppress(
                &mut scores,
                x,
                y,
                self.template.width(),
                self.template.height(),
                self.border,
            );
        }

        log::debug!(
            "Marker candidates: {}",
            markers
                .iter()
                .map(|m| format!("({}, {}) {:.3}", m.x, m.y, m.score))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(markers)
    }
}

/// Zero the score window around a match so it is not found again.
///
/// The window spans `[x - border, x + border + width)` by
/// `[y - border, y + border + height)`, clipped to the score map.
pub fn suppress(
    scores: &mut image::ImageBuffer<Luma<f32>, Vec<f32>>,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    border: u32,
) {
    let x0 = x.saturating_sub(border);
    let y0 = y.saturating_sub(border);
    let x1 = (x + border + width).min(scores.width());
    let y1 = (y + border + height).min(scores.height());

    for yy in y0..y1 {
        for xx in x0..x1 {
            scores.put_pixel(xx, yy, Luma([0.0]));
        }
    }
}
