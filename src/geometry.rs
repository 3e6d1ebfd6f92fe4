//! Calibrated screen geometry
//!
//! [`CalibrationGeometry`] is produced once by the calibrator and is
//! read-only afterwards. [`CaptureRegion`] describes a rectangle on one
//! monitor for the capture backend.

use crate::config::{CalibrationSettings, LANE_COUNT};
use crate::{AutoplayError, Result};

/// A rectangle on a specific monitor, in monitor-local pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRegion {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
    pub monitor_index: usize,
}

impl CaptureRegion {
    pub fn new(left: i32, top: i32, width: u32, height: u32, monitor_index: usize) -> Self {
        Self {
            left,
            top,
            width,
            height,
            monitor_index,
        }
    }

    /// Region covering a whole monitor of the given size
    pub fn full(width: u32, height: u32, monitor_index: usize) -> Self {
        Self::new(0, 0, width, height, monitor_index)
    }

    pub fn right(&self) -> i64 {
        self.left as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.top as i64 + self.height as i64
    }

    /// Whether this region lies entirely within `width` x `height`
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.left >= 0
            && self.top >= 0
            && self.right() <= width as i64
            && self.bottom() <= height as i64
    }
}

/// Top-left corner of one detected lane marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneMarker {
    pub x: u32,
    pub y: u32,
    /// Correlation score at this location (1.0 = perfect match)
    pub score: f32,
}

impl LaneMarker {
    pub fn new(x: u32, y: u32, score: f32) -> Self {
        Self { x, y, score }
    }
}

/// Geometry derived from the four lane markers
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationGeometry {
    matches: [LaneMarker; LANE_COUNT],
    template_width: u32,
    template_height: u32,
    start_x: u32,
    end_x: u32,
    start_y: i32,
    end_y: i32,
}

impl CalibrationGeometry {
    /// Derive the geometry from four markers in any order.
    ///
    /// Markers are sorted by ascending x; that order fixes the lane-to-key
    /// mapping for the rest of the run.
    pub fn from_markers(
        mut markers: [LaneMarker; LANE_COUNT],
        template_width: u32,
        template_height: u32,
        settings: &CalibrationSettings,
    ) -> Self {
        markers.sort_by_key(|m| m.x);

        let mean_y = markers.iter().map(|m| m.y as f64).sum::<f64>() / LANE_COUNT as f64;
        // Truncates toward zero like an integer cast of the float line position
        let detection_line_y = (mean_y - settings.top_line_distance as f64) as i32;
        let half_height = (settings.detection_box_height / 2) as i32;

        let start_x = markers[0].x;
        let end_x = markers[LANE_COUNT - 1].x + template_width;

        Self {
            matches: markers,
            template_width,
            template_height,
            start_x,
            end_x,
            start_y: detection_line_y - half_height,
            end_y: detection_line_y + half_height,
        }
    }

    /// Lane markers sorted left to right
    pub fn matches(&self) -> &[LaneMarker; LANE_COUNT] {
        &self.matches
    }

    pub fn template_width(&self) -> u32 {
        self.template_width
    }

    pub fn template_height(&self) -> u32 {
        self.template_height
    }

    pub fn start_x(&self) -> u32 {
        self.start_x
    }

    pub fn end_x(&self) -> u32 {
        self.end_x
    }

    pub fn start_y(&self) -> i32 {
        self.start_y
    }

    pub fn end_y(&self) -> i32 {
        self.end_y
    }

    /// Horizontal line the detection band is centered on
    pub fn detection_line_y(&self) -> i32 {
        self.start_y + (self.end_y - self.start_y) / 2
    }

    /// Width of the band spanning all four lanes
    pub fn span_width(&self) -> u32 {
        self.end_x - self.start_x
    }

    /// Capture band used by the detection loop.
    ///
    /// Starts `offset_y` pixels below the detection line and is `height`
    /// pixels tall.
    pub fn capture_region(&self, offset_y: i32, height: u32, monitor_index: usize) -> CaptureRegion {
        CaptureRegion::new(
            self.start_x as i32,
            self.detection_line_y() + offset_y,
            self.span_width(),
            height,
            monitor_index,
        )
    }

    /// Check that the markers look like four distinct lanes.
    ///
    /// Neighbouring markers closer than one template width overlap, which
    /// means the suppression window let the same lane be found twice.
    pub fn check_separation(&self) -> Result<()> {
        for (i, pair) in self.matches.windows(2).enumerate() {
            let gap = pair[1].x - pair[0].x;
            if gap < self.template_width {
                return Err(AutoplayError::AmbiguousCalibration(format!(
                    "lanes {} and {} are {}px apart, template is {}px wide",
                    i,
                    i + 1,
                    gap,
                    self.template_width
                )));
            }
        }
        Ok(())
    }

    /// Check every marker scored at least `min_score`
    pub fn check_scores(&self, min_score: f32) -> Result<()> {
        for (i, marker) in self.matches.iter().enumerate() {
            if marker.score < min_score {
                return Err(AutoplayError::AmbiguousCalibration(format!(
                    "lane {} matched with score {:.3}, below {:.3}",
                    i, marker.score, min_score
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(xs: [u32; 4], ys: [u32; 4]) -> [LaneMarker; 4] {
        [
            LaneMarker::new(xs[0], ys[0], 0.9),
            LaneMarker::new(xs[1], ys[1], 0.9),
            LaneMarker::new(xs[2], ys[2], 0.9),
            LaneMarker::new(xs[3], ys[3], 0.9),
        ]
    }

    #[test]
    fn test_markers_sorted_by_x() {
        let geometry = CalibrationGeometry::from_markers(
            markers([300, 100, 400, 200], [500; 4]),
            20,
            20,
            &CalibrationSettings::default(),
        );
        let xs: Vec<u32> = geometry.matches().iter().map(|m| m.x).collect();
        assert_eq!(xs, vec![100, 200, 300, 400]);
    }

    #[test]
    fn test_bounds() {
        let geometry = CalibrationGeometry::from_markers(
            markers([100, 200, 300, 400], [500, 502, 498, 500]),
            20,
            20,
            &CalibrationSettings::default(),
        );
        assert_eq!(geometry.start_x(), 100);
        assert_eq!(geometry.end_x(), 420);
        assert_eq!(geometry.span_width(), 320);
        // mean y 500, minus 5
        assert_eq!(geometry.detection_line_y(), 495);
        assert_eq!(geometry.start_y(), 470);
        assert_eq!(geometry.end_y(), 520);
    }

    #[test]
    fn test_detection_line_truncates() {
        let geometry = CalibrationGeometry::from_markers(
            markers([0, 40, 80, 120], [10, 10, 10, 11]),
            20,
            20,
            &CalibrationSettings::default(),
        );
        // 10.25 - 5 = 5.25
        assert_eq!(geometry.detection_line_y(), 5);
    }

    #[test]
    fn test_capture_region() {
        let geometry = CalibrationGeometry::from_markers(
            markers([100, 200, 300, 400], [500; 4]),
            20,
            20,
            &CalibrationSettings::default(),
        );
        let region = geometry.capture_region(90, 50, 1);
        assert_eq!(region, CaptureRegion::new(100, 585, 320, 50, 1));
    }

    #[test]
    fn test_separation_check() {
        let settings = CalibrationSettings::default();
        let good = CalibrationGeometry::from_markers(markers([0, 40, 80, 120], [0; 4]), 20, 20, &settings);
        assert!(good.check_separation().is_ok());

        let overlapping =
            CalibrationGeometry::from_markers(markers([0, 5, 80, 120], [0; 4]), 20, 20, &settings);
        assert!(matches!(
            overlapping.check_separation(),
            Err(AutoplayError::AmbiguousCalibration(_))
        ));
    }

    #[test]
    fn test_score_check() {
        let mut m = markers([0, 40, 80, 120], [0; 4]);
        m[2].score = 0.3;
        let geometry = CalibrationGeometry::from_markers(m, 20, 20, &CalibrationSettings::default());
        assert!(geometry.check_scores(0.8).is_err());
        assert!(geometry.check_scores(0.2).is_ok());
    }

    #[test]
    fn test_region_fits() {
        let region = CaptureRegion::new(10, 10, 100, 50, 0);
        assert!(region.fits_within(110, 60));
        assert!(!region.fits_within(109, 60));
        assert!(!CaptureRegion::new(-1, 0, 10, 10, 0).fits_within(100, 100));
    }
}
