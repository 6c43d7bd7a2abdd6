//! Headless desktop and absent capture pipeline.

use std::sync::RwLock;

use async_trait::async_trait;
use axum::body::Bytes;

use crate::types::{CaptureError, CaptureManager, DesktopError, DesktopManager, ScreenSize};

/// Desktop without a display. Screen size and clipboard are plain state.
#[derive(Debug, Default)]
pub struct HeadlessDesktop {
    screen: RwLock<ScreenSize>,
    clipboard: RwLock<String>,
}

impl HeadlessDesktop {
    pub fn new(screen: ScreenSize) -> Self {
        Self {
            screen: RwLock::new(screen),
            clipboard: RwLock::new(String::new()),
        }
    }
}

impl DesktopManager for HeadlessDesktop {
    fn screen_size(&self) -> ScreenSize {
        *self.screen.read().expect("screen lock poisoned")
    }

    fn set_screen_size(&self, size: ScreenSize) -> Result<ScreenSize, DesktopError> {
        if size.width == 0 || size.height == 0 || size.rate <= 0 {
            return Err(DesktopError::UnsupportedSize {
                width: size.width,
                height: size.height,
                rate: size.rate,
            });
        }
        *self.screen.write().expect("screen lock poisoned") = size;
        Ok(size)
    }

    fn clipboard_text(&self) -> Result<String, DesktopError> {
        Ok(self.clipboard.read().expect("clipboard lock poisoned").clone())
    }

    fn set_clipboard_text(&self, text: &str) -> Result<(), DesktopError> {
        *self.clipboard.write().expect("clipboard lock poisoned") = text.to_string();
        Ok(())
    }
}

/// Capture manager for deployments without an encoder.
#[derive(Debug, Default)]
pub struct NoCapture;

#[async_trait]
impl CaptureManager for NoCapture {
    async fn screenshot(&self, _quality: u8) -> Result<Bytes, CaptureError> {
        Err(CaptureError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_size_validation() {
        let desktop = HeadlessDesktop::new(ScreenSize::default());
        let wide = ScreenSize {
            width: 1920,
            height: 1080,
            rate: 60,
        };
        assert_eq!(desktop.set_screen_size(wide).unwrap(), wide);
        assert_eq!(desktop.screen_size(), wide);

        let bad = ScreenSize {
            width: 0,
            height: 1080,
            rate: 60,
        };
        assert!(matches!(
            desktop.set_screen_size(bad),
            Err(DesktopError::UnsupportedSize { .. })
        ));
        assert_eq!(desktop.screen_size(), wide);
    }
}
