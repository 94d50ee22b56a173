//! # Error Types
//!
//! Custom error types for PDF Presenter using `thiserror`.

use thiserror::Error;

/// Main error type for PDF Presenter
#[derive(Debug, Error)]
pub enum PresenterError {
    /// Presentation mode was requested while it is already entering or active
    #[error("Presentation mode is already active")]
    AlreadyActive,

    /// The viewer has no pages to present
    #[error("No document pages to present")]
    NoPages,

    /// The host cannot go fullscreen at all (e.g. iOS Safari)
    #[error("Fullscreen is not supported on this platform")]
    FullscreenUnsupported,

    /// The host refused or failed the fullscreen request
    #[error("Fullscreen request rejected: {0}")]
    FullscreenRejected(String),

    /// Gamepad backend errors
    #[error("Gamepad error: {0}")]
    Gamepad(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for PDF Presenter
pub type Result<T> = std::result::Result<T, PresenterError>;
