//! Type definitions for skreader
//!
//! - The static setting catalog (`settings`, `Catalog`)
//! - Decoded response values (`Response`, `Body`, `Segment`)

pub mod error;
pub mod response;
pub mod settings;

pub use error::{Error, Result};
pub use response::{Body, Crc, Function, Payload, PayloadValue, Response, Segment, Status, StatusKind};
pub use settings::{Catalog, SettingDescriptor, SettingOption};
