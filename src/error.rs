use thiserror::Error;

/// Result type alias for band operations
pub type Result<T> = std::result::Result<T, BandError>;

/// Everything a logical operation can fail with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BandError {
    #[error("Bluetooth transport unavailable: {0}")]
    TransportUnavailable(String),

    #[error("Device is not connected")]
    NotConnected,

    #[error("A connection is already open or being opened")]
    AlreadyConnected,

    #[error("Another operation is already in flight")]
    OperationInFlight,

    #[error("Transport operation failed with status {code}: {message}")]
    TransportOperationFailed { code: i32, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Unsupported {kind} value: {value}")]
    UnsupportedEnumValue { kind: &'static str, value: String },

    #[error("Establishing connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Device disconnected")]
    Disconnected,

    #[error("Invalid device address: {0}")]
    InvalidAddress(String),

    #[error("Timed out waiting for {0}")]
    Timeout(&'static str),
}

/// Failure reported by the transport for a characteristic or RSSI operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    /// Status code as reported by the BLE stack
    pub code: i32,
    pub message: String,
}

impl TransportFailure {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<TransportFailure> for BandError {
    fn from(failure: TransportFailure) -> Self {
        BandError::TransportOperationFailed {
            code: failure.code,
            message: failure.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err: BandError = TransportFailure::new(133, "onCharacteristicWrite fail").into();
        assert_eq!(
            err.to_string(),
            "Transport operation failed with status 133: onCharacteristicWrite fail"
        );

        let err = BandError::UnsupportedEnumValue {
            kind: "LED color",
            value: "purple".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported LED color value: purple");

        assert_eq!(
            BandError::Timeout("battery info").to_string(),
            "Timed out waiting for battery info"
        );
    }
}
