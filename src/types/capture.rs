//! Capture capability.

use async_trait::async_trait;
use axum::body::Bytes;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("capture pipeline is not available")]
    Unavailable,

    #[error("invalid quality {0}, expected 0-100")]
    InvalidQuality(u8),

    #[error("capture error: {0}")]
    Other(String),
}

/// Screen capture pipeline.
#[async_trait]
pub trait CaptureManager: Send + Sync {
    /// Encode the current screen as JPEG.
    async fn screenshot(&self, quality: u8) -> Result<Bytes, CaptureError>;
}
