//! Protocol constants

use skreader_types::Status;

/// Start-of-text marker opening every command packet
pub const STX: u8 = 0x02;

/// End-of-text marker preceding the checksum
pub const ETX: u8 = 0x03;

/// Positive acknowledgement status byte
pub const ACK: u8 = Status::ACK;

/// USB frame size in bytes
pub const FRAME_SIZE: usize = 8;

/// Largest payload the one-byte length field can describe
pub const MAX_PAYLOAD_SIZE: usize = u8::MAX as usize;

/// Default bound on a single control transfer (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 2500;

/// USB identification of the reader
pub mod usb {
    /// ID TECH
    pub const VENDOR_ID: u16 = 0x0ACD;
    
    /// Magnetic-stripe reader, keyboard-emulation firmware
    pub const PRODUCT_ID: u16 = 0x2610;
    
    /// HID interface carrying the configuration reports
    pub const INTERFACE: u8 = 0;
}

/// HID class control transfer parameters
pub mod hid {
    /// Host-to-device, class, interface
    pub const REQUEST_TYPE_OUT: u8 = 0x21;
    
    /// Device-to-host, class, interface
    pub const REQUEST_TYPE_IN: u8 = 0xA1;
    
    pub const GET_REPORT: u8 = 0x01;
    pub const SET_REPORT: u8 = 0x09;
    
    /// Feature report, id 0
    pub const REPORT_VALUE: u16 = 0x0300;
}
