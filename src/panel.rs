//! Operator control surface
//!
//! Calibration and the detection loop show their debug overlay and wait a
//! short moment for operator input once per frame. [`ControlPanel`] hides
//! whether that happens in a real window ([`DebugWindow`]) or not at all
//! ([`HeadlessPanel`]).

use image::RgbImage;
use std::time::Duration;

use crate::Result;

/// Operator input read from the control panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelCommand {
    /// Accept the current calibration
    Confirm,
    /// Abort calibration or stop the loop
    Cancel,
}

/// Displays debug frames and reports operator commands
pub trait ControlPanel {
    /// Present a frame under the given window title
    fn show(&mut self, title: &str, frame: &RgbImage) -> Result<()>;

    /// Wait up to `timeout` for a command
    fn poll(&mut self, timeout: Duration) -> Option<PanelCommand>;
}

impl<P: ControlPanel + ?Sized> ControlPanel for Box<P> {
    fn show(&mut self, title: &str, frame: &RgbImage) -> Result<()> {
        (**self).show(title, frame)
    }

    fn poll(&mut self, timeout: Duration) -> Option<PanelCommand> {
        (**self).poll(timeout)
    }
}

/// Panel for runs without a display.
///
/// Frames are discarded and every poll answers [`PanelCommand::Confirm`]
/// after the timeout, so calibration commits the first acceptable frame and
/// the loop runs until the process is interrupted.
#[derive(Debug, Default)]
pub struct HeadlessPanel;

impl ControlPanel for HeadlessPanel {
    fn show(&mut self, _title: &str, _frame: &RgbImage) -> Result<()> {
        Ok(())
    }

    fn poll(&mut self, timeout: Duration) -> Option<PanelCommand> {
        std::thread::sleep(timeout);
        Some(PanelCommand::Confirm)
    }
}

#[cfg(feature = "desktop")]
pub use window::DebugWindow;

#[cfg(feature = "desktop")]
mod window {
    use image::RgbImage;
    use minifb::{Key, ScaleMode, Window, WindowOptions};
    use std::time::Duration;

    use super::{ControlPanel, PanelCommand};
    use crate::{AutoplayError, Result};

    /// Debug window; Enter confirms, `q`, Escape or closing the window cancels
    pub struct DebugWindow {
        window: Option<Window>,
        title: String,
        size: (usize, usize),
    }

    impl DebugWindow {
        pub fn new() -> Self {
            Self {
                window: None,
                title: String::new(),
                size: (0, 0),
            }
        }

        /// Reuse the open window unless the title or frame size changed
        fn window_for(&mut self, title: &str, width: usize, height: usize) -> Result<&mut Window> {
            let stale = self.title != title || self.size != (width, height);
            if stale || self.window.is_none() {
                // Dropping the old window closes it
                self.window = None;
                let window = Window::new(
                    title,
                    width,
                    height,
                    WindowOptions {
                        resize: true,
                        scale_mode: ScaleMode::AspectRatioStretch,
                        ..WindowOptions::default()
                    },
                )
                .map_err(|e| AutoplayError::Display(e.to_string()))?;
                log::debug!("Opened debug window '{}' ({}x{})", title, width, height);
                self.title = title.to_string();
                self.size = (width, height);
                self.window = Some(window);
            }
            self.window
                .as_mut()
                .ok_or_else(|| AutoplayError::Display("debug window not open".to_string()))
        }
    }

    impl Default for DebugWindow {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ControlPanel for DebugWindow {
        fn show(&mut self, title: &str, frame: &RgbImage) -> Result<()> {
            let (width, height) = (frame.width() as usize, frame.height() as usize);

            let buffer: Vec<u32> = frame
                .pixels()
                .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32)
                .collect();

            let window = self.window_for(title, width, height)?;
            window
                .update_with_buffer(&buffer, width, height)
                .map_err(|e| AutoplayError::Display(e.to_string()))
        }

        fn poll(&mut self, timeout: Duration) -> Option<PanelCommand> {
            std::thread::sleep(timeout);

            let window = self.window.as_mut()?;
            window.update();

            if !window.is_open() || window.is_key_down(Key::Q) || window.is_key_down(Key::Escape) {
                Some(PanelCommand::Cancel)
            } else if window.is_key_down(Key::Enter) || window.is_key_down(Key::NumPadEnter) {
                Some(PanelCommand::Confirm)
            } else {
                None
            }
        }
    }
}
