//! HSV conversion and note color classification
//!
//! HSV values follow the common 8-bit convention: hue in `0..180`
//! (degrees halved), saturation and value in `0..=255`.

use image::{ImageBuffer, Rgb, RgbImage};

use crate::config::DetectionSettings;

/// Image whose three channels hold hue, saturation and value
pub type HsvImage = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// Convert one RGB pixel to 8-bit HSV
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let r = rgb[0] as f32;
    let g = rgb[1] as f32;
    let b = rgb[2] as f32;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = max - min;

    let s = if max > 0.0 { 255.0 * diff / max } else { 0.0 };

    let mut h = if diff == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / diff
    } else if max == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    [
        ((h / 2.0).round() as u8) % 180,
        s.round() as u8,
        max as u8,
    ]
}

/// Convert a whole frame to HSV
pub fn to_hsv(frame: &RgbImage) -> HsvImage {
    let mut hsv = HsvImage::new(frame.width(), frame.height());
    for (x, y, pixel) in frame.enumerate_pixels() {
        hsv.put_pixel(x, y, Rgb(rgb_to_hsv(pixel.0)));
    }
    hsv
}

/// Mean saturation and value over a sampled patch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchStats {
    pub saturation: f64,
    pub value: f64,
}

/// Average the square patch of side `size` centered on `(cx, cy)`.
///
/// Covers rows `[cy - size/2, cy + size/2)` and the same span of columns.
/// Returns `None` when the patch is empty or leaves the image.
pub fn sample_patch(hsv: &HsvImage, cx: i64, cy: i64, size: u32) -> Option<PatchStats> {
    let half = (size / 2) as i64;
    let (x0, x1) = (cx - half, cx + half);
    let (y0, y1) = (cy - half, cy + half);

    if x0 < 0 || y0 < 0 || x1 <= x0 || y1 <= y0 {
        return None;
    }
    if x1 > hsv.width() as i64 || y1 > hsv.height() as i64 {
        return None;
    }

    let mut sat_sum = 0u64;
    let mut val_sum = 0u64;
    for y in y0 as u32..y1 as u32 {
        for x in x0 as u32..x1 as u32 {
            let p = hsv.get_pixel(x, y);
            sat_sum += p[1] as u64;
            val_sum += p[2] as u64;
        }
    }

    let count = ((x1 - x0) * (y1 - y0)) as f64;
    Some(PatchStats {
        saturation: sat_sum as f64 / count,
        value: val_sum as f64 / count,
    })
}

/// Saturation/value window that marks a note in the hit zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteThresholds {
    pub saturation_max: f64,
    pub value_min: f64,
    pub value_max: f64,
}

impl NoteThresholds {
    pub fn from_settings(settings: &DetectionSettings) -> Self {
        Self {
            saturation_max: settings.saturation_max,
            value_min: settings.value_min,
            value_max: settings.value_max,
        }
    }

    /// Note present iff `S < saturation_max` and `value_min < V < value_max`
    pub fn is_note(&self, stats: &PatchStats) -> bool {
        stats.saturation < self.saturation_max
            && self.value_min < stats.value
            && stats.value < self.value_max
    }
}

impl Default for NoteThresholds {
    fn default() -> Self {
        Self::from_settings(&DetectionSettings::default())
    }
}
