/// Error types for device bridge operations
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("No device attached")]
    NoDeviceAvailable,

    #[error("Multiple devices attached, specify a serial: {}", .candidates.join(", "))]
    AmbiguousDevice { candidates: Vec<String> },

    #[error("Device not attached: {0}")]
    UnknownDevice(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("Command timeout: {0}")]
    CommandTimeout(String),

    #[error("UI capture failed: {0}")]
    CaptureFailed(String),

    #[error("Recording already active on device {0}")]
    SessionAlreadyActive(String),

    #[error("No active recording on device {0}")]
    NoActiveSession(String),

    #[error("Invalid recording duration {0}s (must be 1..=180)")]
    InvalidDuration(u32),

    #[error("Artifact still being recorded: {0}")]
    ArtifactNotReady(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
