//! # skreader
//!
//! Host-side driver for USB magnetic-stripe card readers.
//!
//! ## Features
//!
//! - Framed, checksummed command/response codec
//! - Async/await API using Tokio over rusb control transfers
//! - Typed responses with per-setting segment decoding
//! - Static setting catalog with name and option lookup
//!
//! ## Quick Start
//!
//! ```no_run
//! use skreader::{settings, Reader};
//!
//! #[tokio::main]
//! async fn main() -> skreader::Result<()> {
//!     let mut reader = Reader::connect_usb().await?;
//!
//!     let serial = reader.read_setting(&settings::SERIAL_NUMBER).await?;
//!     for segment in serial.segments() {
//!         println!("{}", segment);
//!     }
//!
//!     reader.close().await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod reader;

// Re-exports
pub use error::{Error, Result};
pub use reader::Reader;

pub use skreader_core::{Command, Packet, Request};
pub use skreader_transport::{Transport, UsbTransport};
pub use skreader_types::{settings, Body, Catalog, Response, Segment, SettingDescriptor, Status};
