//! Synthetic key presses

use crate::Result;

/// Sends one key press (down and up) per call
pub trait KeyPresser {
    fn press(&mut self, key: char) -> Result<()>;
}

impl<K: KeyPresser + ?Sized> KeyPresser for Box<K> {
    fn press(&mut self, key: char) -> Result<()> {
        (**self).press(key)
    }
}

/// Records presses instead of sending them
#[derive(Debug, Default, Clone)]
pub struct RecordingPresser {
    pub presses: Vec<char>,
}

impl KeyPresser for RecordingPresser {
    fn press(&mut self, key: char) -> Result<()> {
        self.presses.push(key);
        Ok(())
    }
}

#[cfg(feature = "desktop")]
pub use keyboard::EnigoKeyboard;

#[cfg(feature = "desktop")]
mod keyboard {
    use enigo::{Direction, Enigo, Key, Keyboard, Settings};

    use super::KeyPresser;
    use crate::{AutoplayError, Result};

    /// Injects key presses through the OS input API
    pub struct EnigoKeyboard {
        enigo: Enigo,
    }

    impl EnigoKeyboard {
        pub fn new() -> Result<Self> {
            let enigo = Enigo::new(&Settings::default())
                .map_err(|e| AutoplayError::Input(format!("failed to connect keyboard: {}", e)))?;
            Ok(Self { enigo })
        }
    }

    impl KeyPresser for EnigoKeyboard {
        fn press(&mut self, key: char) -> Result<()> {
            self.enigo
                .key(Key::Unicode(key), Direction::Click)
                .map_err(|e| AutoplayError::Input(format!("key '{}': {}", key, e)))
        }
    }
}
