//! Transport errors

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Device {vendor_id:04X}:{product_id:04X} not detected")]
    DeviceNotFound {
        vendor_id: u16,
        product_id: u16,
    },

    #[error("Insufficient permissions to open device: {0}")]
    AccessDenied(String),

    #[error("Not connected")]
    NotConnected,

    #[error("Already connected")]
    AlreadyConnected,

    #[error("Transfer timeout")]
    Timeout,

    #[error("Short write: {actual} of {expected} bytes accepted")]
    ShortWrite {
        expected: usize,
        actual: usize,
    },

    #[error("Device disconnected")]
    Disconnected,

    #[error("USB error: {0}")]
    Usb(rusb::Error),

    #[error("Blocking task failed: {0}")]
    Blocking(String),
}

impl From<rusb::Error> for Error {
    fn from(e: rusb::Error) -> Self {
        match e {
            rusb::Error::Access | rusb::Error::Busy => Error::AccessDenied(e.to_string()),
            rusb::Error::NoDevice => Error::Disconnected,
            rusb::Error::Timeout => Error::Timeout,
            other => Error::Usb(other),
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Error::Blocking(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rusb_error() {
        assert!(matches!(Error::from(rusb::Error::Access), Error::AccessDenied(_)));
        assert!(matches!(Error::from(rusb::Error::Busy), Error::AccessDenied(_)));
        assert!(matches!(Error::from(rusb::Error::NoDevice), Error::Disconnected));
        assert!(matches!(Error::from(rusb::Error::Timeout), Error::Timeout));
        assert!(matches!(Error::from(rusb::Error::Pipe), Error::Usb(rusb::Error::Pipe)));
    }

    #[test]
    fn test_display() {
        let err = Error::DeviceNotFound {
            vendor_id: 0x0ACD,
            product_id: 0x2610,
        };
        assert_eq!(err.to_string(), "Device 0ACD:2610 not detected");
    }
}
