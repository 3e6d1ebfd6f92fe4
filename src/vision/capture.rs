//! Screen capture functionality
//!
//! The detection code only needs "give me this rectangle as RGB pixels",
//! expressed by [`FrameSource`]. [`ScreenCapture`] grabs a real monitor,
//! [`ReplayCapture`] serves recorded frames for headless runs and tests.

use image::{imageops, DynamicImage, RgbImage, RgbaImage};
use std::path::Path;

use crate::geometry::CaptureRegion;
use crate::{AutoplayError, Result};

/// Source of RGB frames for a given region
pub trait FrameSource {
    /// Region covering the whole of the given monitor
    fn monitor_region(&self, monitor_index: usize) -> Result<CaptureRegion>;

    /// Capture `region`, returning an image exactly `region.width` x `region.height`
    fn capture(&mut self, region: &CaptureRegion) -> Result<RgbImage>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn monitor_region(&self, monitor_index: usize) -> Result<CaptureRegion> {
        (**self).monitor_region(monitor_index)
    }

    fn capture(&mut self, region: &CaptureRegion) -> Result<RgbImage> {
        (**self).capture(region)
    }
}

/// Fail unless `region` is non-empty and inside a `width` x `height` image
fn check_region(width: u32, height: u32, region: &CaptureRegion) -> Result<()> {
    if region.width == 0 || region.height == 0 {
        return Err(AutoplayError::Capture(format!(
            "empty capture region {}x{}",
            region.width, region.height
        )));
    }
    if !region.fits_within(width, height) {
        return Err(AutoplayError::Capture(format!(
            "region ({}, {}, {}x{}) exceeds monitor {} of {}x{}",
            region.left,
            region.top,
            region.width,
            region.height,
            region.monitor_index,
            width,
            height
        )));
    }
    Ok(())
}

/// Crop `region` out of a full-monitor image
pub fn crop_region(full: &RgbImage, region: &CaptureRegion) -> Result<RgbImage> {
    check_region(full.width(), full.height(), region)?;
    Ok(imageops::crop_imm(
        full,
        region.left as u32,
        region.top as u32,
        region.width,
        region.height,
    )
    .to_image())
}

/// Crop `region` out of an RGBA screenshot, converting only the cropped pixels
pub fn crop_rgba_region(full: &RgbaImage, region: &CaptureRegion) -> Result<RgbImage> {
    check_region(full.width(), full.height(), region)?;
    let band = imageops::crop_imm(
        full,
        region.left as u32,
        region.top as u32,
        region.width,
        region.height,
    )
    .to_image();
    Ok(DynamicImage::ImageRgba8(band).to_rgb8())
}

/// Replays a fixed list of full-monitor frames
///
/// Each call to [`capture`](FrameSource::capture) advances to the next frame
/// and crops it to the requested region. When the frames run out the source
/// either wraps around or fails with a capture error.
pub struct ReplayCapture {
    frames: Vec<RgbImage>,
    /// Index of the next frame to serve
    cursor: usize,
    served: usize,
    loop_playback: bool,
}

impl ReplayCapture {
    /// Create a replay over in-memory frames
    pub fn new(frames: Vec<RgbImage>, loop_playback: bool) -> Result<Self> {
        let Some(first) = frames.first() else {
            return Err(AutoplayError::Capture("replay has no frames".to_string()));
        };
        let dims = first.dimensions();
        if frames.iter().any(|f| f.dimensions() != dims) {
            return Err(AutoplayError::Capture(
                "replay frames differ in size".to_string(),
            ));
        }

        Ok(Self {
            frames,
            cursor: 0,
            served: 0,
            loop_playback,
        })
    }

    /// Load every image in a directory, sorted by file name
    pub fn from_directory(dir: &Path, loop_playback: bool) -> Result<Self> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| AutoplayError::Capture(format!("{}: {}", dir.display(), e)))?;

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| matches!(ext.to_lowercase().as_str(), "png" | "jpg" | "jpeg" | "bmp"))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        let mut frames = Vec::with_capacity(paths.len());
        for path in &paths {
            let frame = image::open(path)
                .map_err(|e| AutoplayError::Capture(format!("{}: {}", path.display(), e)))?
                .to_rgb8();
            frames.push(frame);
        }

        log::info!("Loaded {} replay frames from {}", frames.len(), dir.display());
        Self::new(frames, loop_playback)
    }

    /// Number of frames served so far, counting every pass of a looping replay
    pub fn position(&self) -> usize {
        self.served
    }

    fn next_frame(&mut self) -> Result<&RgbImage> {
        if self.cursor >= self.frames.len() {
            if !self.loop_playback {
                return Err(AutoplayError::Capture(format!(
                    "replay ended after {} frames",
                    self.frames.len()
                )));
            }
            self.cursor = 0;
        }
        let frame = &self.frames[self.cursor];
        self.cursor += 1;
        self.served += 1;
        Ok(frame)
    }
}

impl FrameSource for ReplayCapture {
    fn monitor_region(&self, monitor_index: usize) -> Result<CaptureRegion> {
        let (width, height) = self.frames[0].dimensions();
        Ok(CaptureRegion::full(width, height, monitor_index))
    }

    fn capture(&mut self, region: &CaptureRegion) -> Result<RgbImage> {
        let frame = self.next_frame()?;
        crop_region(frame, region)
    }
}

#[cfg(feature = "desktop")]
pub use desktop::ScreenCapture;

#[cfg(feature = "desktop")]
mod desktop {
    use image::RgbImage;
    use xcap::Monitor;

    use super::{crop_rgba_region, FrameSource};
    use crate::geometry::CaptureRegion;
    use crate::{AutoplayError, Result};

    /// Captures monitors through the OS screenshot API
    pub struct ScreenCapture {
        monitors: Vec<Monitor>,
    }

    impl ScreenCapture {
        /// Enumerate the monitors available for capture
        pub fn new() -> Result<Self> {
            let monitors = Monitor::all()
                .map_err(|e| AutoplayError::Capture(format!("failed to enumerate monitors: {}", e)))?;
            if monitors.is_empty() {
                return Err(AutoplayError::Capture("no monitors found".to_string()));
            }
            for (i, monitor) in monitors.iter().enumerate() {
                log::debug!(
                    "Monitor {}: {} {}x{}{}",
                    i,
                    monitor.name(),
                    monitor.width(),
                    monitor.height(),
                    if monitor.is_primary() { " (primary)" } else { "" }
                );
            }
            Ok(Self { monitors })
        }

        fn monitor(&self, index: usize) -> Result<&Monitor> {
            self.monitors.get(index).ok_or_else(|| {
                AutoplayError::Capture(format!(
                    "monitor {} not found ({} available)",
                    index,
                    self.monitors.len()
                ))
            })
        }
    }

    impl FrameSource for ScreenCapture {
        fn monitor_region(&self, monitor_index: usize) -> Result<CaptureRegion> {
            let monitor = self.monitor(monitor_index)?;
            Ok(CaptureRegion::full(
                monitor.width(),
                monitor.height(),
                monitor_index,
            ))
        }

        fn capture(&mut self, region: &CaptureRegion) -> Result<RgbImage> {
            let monitor = self.monitor(region.monitor_index)?;
            let rgba = monitor
                .capture_image()
                .map_err(|e| AutoplayError::Capture(e.to_string()))?;
            if rgba.width() == 0 || rgba.height() == 0 {
                return Err(AutoplayError::Capture(
                    "captured empty screenshot, check screen recording permissions".to_string(),
                ));
            }
            crop_rgba_region(&rgba, region)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba};

    fn numbered_frame(value: u8) -> RgbImage {
        RgbImage::from_pixel(8, 6, Rgb([value, value, value]))
    }

    #[test]
    fn test_crop_region() {
        let mut full = RgbImage::new(10, 10);
        full.put_pixel(3, 4, Rgb([255, 0, 0]));
        let cropped = crop_region(&full, &CaptureRegion::new(3, 4, 2, 2, 0)).unwrap();
        assert_eq!(cropped.dimensions(), (2, 2));
        assert_eq!(cropped.get_pixel(0, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_crop_out_of_bounds() {
        let full = RgbImage::new(10, 10);
        assert!(crop_region(&full, &CaptureRegion::new(5, 5, 6, 2, 0)).is_err());
        assert!(crop_region(&full, &CaptureRegion::new(-1, 0, 2, 2, 0)).is_err());
        assert!(crop_region(&full, &CaptureRegion::new(0, 0, 0, 2, 0)).is_err());
    }

    #[test]
    fn test_replay_ends() {
        let mut replay = ReplayCapture::new(vec![numbered_frame(1), numbered_frame(2)], false).unwrap();
        let region = replay.monitor_region(0).unwrap();
        assert_eq!(replay.capture(&region).unwrap().get_pixel(0, 0)[0], 1);
        assert_eq!(replay.capture(&region).unwrap().get_pixel(0, 0)[0], 2);
        assert!(matches!(replay.capture(&region), Err(AutoplayError::Capture(_))));
    }

    #[test]
    fn test_replay_loops() {
        let mut replay = ReplayCapture::new(vec![numbered_frame(1), numbered_frame(2)], true).unwrap();
        let region = replay.monitor_region(0).unwrap();
        for expected in [1, 2, 1, 2] {
            assert_eq!(replay.capture(&region).unwrap().get_pixel(0, 0)[0], expected);
        }
        assert_eq!(replay.position(), 4);
    }

    #[test]
    fn test_single_frame_loop_counts_every_capture() {
        let mut replay = ReplayCapture::new(vec![numbered_frame(7)], true).unwrap();
        let region = replay.monitor_region(0).unwrap();
        assert_eq!(replay.position(), 0);
        for _ in 0..3 {
            replay.capture(&region).unwrap();
        }
        assert_eq!(replay.position(), 3);
    }

    #[test]
    fn test_crop_rgba_region() {
        let mut full = RgbaImage::new(1920, 1080);
        full.put_pixel(100, 600, Rgba([10, 20, 30, 255]));
        full.put_pixel(99, 600, Rgba([255, 255, 255, 255]));

        let band = crop_rgba_region(&full, &CaptureRegion::new(100, 600, 320, 50, 0)).unwrap();
        assert_eq!(band.dimensions(), (320, 50));
        assert_eq!(band.get_pixel(0, 0), &Rgb([10, 20, 30]));
        assert_eq!(band.get_pixel(1, 0), &Rgb([0, 0, 0]));

        assert!(crop_rgba_region(&full, &CaptureRegion::new(1800, 600, 320, 50, 0)).is_err());
        assert!(crop_rgba_region(&full, &CaptureRegion::new(0, 0, 0, 50, 0)).is_err());
    }

    #[test]
    fn test_replay_rejects_empty_and_mixed() {
        assert!(ReplayCapture::new(Vec::new(), false).is_err());
        assert!(ReplayCapture::new(vec![numbered_frame(1), RgbImage::new(2, 2)], false).is_err());
    }
}
