//! Transport layer for magnetic-stripe readers
//!
//! Moves 8-byte frames to and from the device over HID class control
//! transfers.

pub mod error;
pub mod usb;

pub use error::{Error, Result};
pub use usb::UsbTransport;

use async_trait::async_trait;
use bytes::Bytes;
use skreader_core::Frame;

/// Frame-level access to a reader
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open and claim the device
    async fn open(&mut self) -> Result<()>;

    /// Release the device
    async fn close(&mut self) -> Result<()>;

    /// Check if open
    fn is_open(&self) -> bool;

    /// Send one frame
    async fn send_frame(&mut self, frame: &Frame) -> Result<()>;

    /// Read one frame
    ///
    /// An empty result is a zero-length transfer and ends a reply.
    async fn read_frame(&mut self) -> Result<Bytes>;

    /// Human-readable device identity for logs
    fn description(&self) -> String;
}
