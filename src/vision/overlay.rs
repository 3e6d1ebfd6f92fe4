//! Debug overlays drawn onto captured frames

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::geometry::CalibrationGeometry;

const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
const RED: Rgb<u8> = Rgb([255, 0, 0]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Two-pixel rectangle outline with top-left `(x, y)`
fn draw_box(frame: &mut RgbImage, x: i32, y: i32, width: u32, height: u32, color: Rgb<u8>) {
    if width < 3 || height < 3 {
        return;
    }
    draw_hollow_rect_mut(frame, Rect::at(x, y).of_size(width, height), color);
    draw_hollow_rect_mut(frame, Rect::at(x + 1, y + 1).of_size(width - 2, height - 2), color);
}

/// Marker boxes, detection line and capture band on a full-monitor frame
pub fn draw_calibration(frame: &mut RgbImage, geometry: &CalibrationGeometry) {
    for marker in geometry.matches() {
        draw_box(
            frame,
            marker.x as i32,
            marker.y as i32,
            geometry.template_width(),
            geometry.template_height(),
            GREEN,
        );
    }

    let line_y = geometry.detection_line_y() as f32;
    let right = frame.width() as f32;
    draw_line_segment_mut(frame, (0.0, line_y), (right, line_y), RED);
    draw_line_segment_mut(frame, (0.0, line_y + 1.0), (right, line_y + 1.0), RED);

    let band_height = (geometry.end_y() - geometry.start_y()).max(0) as u32;
    draw_box(
        frame,
        geometry.start_x() as i32,
        geometry.start_y(),
        geometry.span_width(),
        band_height,
        RED,
    );
}

/// One lane's sample box; red with a center dot while debounced
pub fn draw_lane(frame: &mut RgbImage, x: i64, y: i64, size: u32, debounced: bool) {
    let color = if debounced { RED } else { WHITE };
    let half = (size / 2) as i64;
    if debounced {
        draw_filled_circle_mut(frame, (x as i32, y as i32), 5, color);
    }
    draw_box(frame, (x - half) as i32, (y - half) as i32, size, size, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CalibrationSettings;
    use crate::geometry::LaneMarker;

    #[test]
    fn test_draw_lane_colors() {
        let mut frame = RgbImage::new(40, 40);
        draw_lane(&mut frame, 20, 20, 10, false);
        assert_eq!(frame.get_pixel(15, 15), &WHITE);
        assert_eq!(frame.get_pixel(20, 20), &Rgb([0, 0, 0]));

        draw_lane(&mut frame, 20, 20, 10, true);
        assert_eq!(frame.get_pixel(15, 15), &RED);
        assert_eq!(frame.get_pixel(20, 20), &RED);
    }

    #[test]
    fn test_draw_calibration_marks_line() {
        let geometry = CalibrationGeometry::from_markers(
            [
                LaneMarker::new(10, 40, 1.0),
                LaneMarker::new(30, 40, 1.0),
                LaneMarker::new(50, 40, 1.0),
                LaneMarker::new(70, 40, 1.0),
            ],
            8,
            8,
            &CalibrationSettings::default(),
        );
        let mut frame = RgbImage::new(100, 100);
        draw_calibration(&mut frame, &geometry);
        assert_eq!(frame.get_pixel(0, 35), &RED);
        assert_eq!(frame.get_pixel(30, 40), &GREEN);
    }

    #[test]
    fn test_overlays_clip_at_edges() {
        let mut frame = RgbImage::new(10, 10);
        draw_lane(&mut frame, 0, 0, 30, true);
        draw_lane(&mut frame, 100, 100, 30, false);
    }
}
