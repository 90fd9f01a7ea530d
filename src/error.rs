//! Errors reported to compass subscribers

/// Errors that end a compass subscription attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompassError {
    #[error("This device does not have both an accelerometer and a magnetometer")]
    SensorUnavailable,

    #[error("A compass subscription is already active")]
    AlreadyListening,
}

impl CompassError {
    /// Stable code forwarded to the host application alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            CompassError::SensorUnavailable => "404",
            CompassError::AlreadyListening => "409",
        }
    }
}
