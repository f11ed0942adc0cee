//! Error types for the room monitor service

/// Errors that can occur in the room monitor service
#[derive(Debug, thiserror::Error)]
pub enum RoomMonitorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Sensor source error: {0}")]
    Source(String),

    #[error("Alert channel error: {0}")]
    Alert(String),
}

/// Result type alias for room monitor operations
pub type Result<T> = std::result::Result<T, RoomMonitorError>;
