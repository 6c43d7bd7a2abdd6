//! Desktop capability.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u16,
    pub height: u16,
    pub rate: i16,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            rate: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DesktopError {
    #[error("unsupported screen size {width}x{height}@{rate}")]
    UnsupportedSize { width: u16, height: u16, rate: i16 },

    #[error("clipboard is not available")]
    ClipboardUnavailable,

    #[error("desktop error: {0}")]
    Other(String),
}

/// Access to the remote desktop.
pub trait DesktopManager: Send + Sync {
    fn screen_size(&self) -> ScreenSize;

    /// Apply a new screen size and return the one actually configured.
    fn set_screen_size(&self, size: ScreenSize) -> Result<ScreenSize, DesktopError>;

    fn clipboard_text(&self) -> Result<String, DesktopError>;

    fn set_clipboard_text(&self, text: &str) -> Result<(), DesktopError>;
}
