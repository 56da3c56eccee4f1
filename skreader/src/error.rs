//! High-level error types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] skreader_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] skreader_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] skreader_types::Error),

    /// Setting cannot be read from the device
    #[error("Setting {name}(0x{id:02X}) is not readable")]
    NotReadable {
        name: &'static str,
        id: u8,
    },
}

impl Error {
    /// Check if error is recoverable (retry might succeed)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Transport(skreader_transport::Error::Timeout))
    }

    /// Check if error requires reconnection
    pub fn requires_reconnect(&self) -> bool {
        matches!(
            self,
            Self::Transport(
                skreader_transport::Error::Disconnected | skreader_transport::Error::NotConnected
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_is_recoverable() {
        assert!(Error::from(skreader_transport::Error::Timeout).is_recoverable());

        let integrity = skreader_core::Error::ProtocolIntegrity {
            packet: Bytes::from_static(&[0x06, 0x02, 0x03, 0x55]),
            expected: 0x01,
            received: 0x55,
        };
        assert!(!Error::from(integrity).is_recoverable());

        let not_readable = Error::NotReadable {
            name: "SESSION_ID",
            id: 0x54,
        };
        assert!(!not_readable.is_recoverable());
    }

    #[test]
    fn test_requires_reconnect() {
        assert!(Error::from(skreader_transport::Error::Disconnected).requires_reconnect());
        assert!(!Error::from(skreader_transport::Error::Timeout).requires_reconnect());
    }

    #[test]
    fn test_not_readable_display() {
        let err = Error::NotReadable {
            name: "RESET_TO_DEFAULT",
            id: 0x18,
        };
        assert_eq!(err.to_string(), "Setting RESET_TO_DEFAULT(0x18) is not readable");
    }
}
