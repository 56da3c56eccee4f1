//! # skreader-core
//!
//! Core protocol implementation for USB magnetic-stripe readers.
//!
//! This crate provides the low-level protocol primitives:
//! - XOR checksum
//! - 8-byte frame codec
//! - Command encoding
//! - Reply reassembly, verification and decoding
//! - Protocol constants

pub mod checksum;
pub mod command;
pub mod constants;
pub mod error;
pub mod frame;
pub mod packet;
pub mod request;
pub mod response;

pub use command::Command;
pub use error::{Error, Result};
pub use frame::Frame;
pub use packet::{Packet, PacketAssembler};
pub use request::Request;
