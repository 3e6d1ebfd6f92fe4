//! Synthetic frames shared by unit tests

use image::{GrayImage, Luma, Rgb, RgbImage};

/// An 8x8 cross-shaped marker that correlates poorly with flat regions
pub(crate) fn marker_template() -> GrayImage {
    GrayImage::from_fn(8, 8, |x, y| {
        if x == 3 || x == 4 || y == 3 || y == 4 {
            Luma([230])
        } else {
            Luma([30])
        }
    })
}

/// Copy a grayscale template into an RGB frame at `(at_x, at_y)`
pub(crate) fn stamp(frame: &mut RgbImage, template: &GrayImage, at_x: u32, at_y: u32) {
    for (x, y, p) in template.enumerate_pixels() {
        let v = p[0];
        frame.put_pixel(at_x + x, at_y + y, Rgb([v, v, v]));
    }
}

/// Fill a rectangle with one color, clipped to the frame
pub(crate) fn fill(frame: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    for yy in y..(y + h).min(frame.height()) {
        for xx in x..(x + w).min(frame.width()) {
            frame.put_pixel(xx, yy, color);
        }
    }
}
