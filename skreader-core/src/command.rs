//! Reader command opcodes

use std::fmt;

use crate::error::{Error, Result};

/// Command opcodes
///
/// Both are ASCII letters on the wire: `R` and `S`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Read a setting
    Read = 0x52,

    /// Write a setting
    Write = 0x53,
}

impl Command {
    /// Get command name
    pub fn name(self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::Write => "WRITE",
        }
    }

    /// Whether the command carries a payload
    pub fn takes_payload(self) -> bool {
        matches!(self, Self::Write)
    }
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> u8 {
        cmd as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x52 => Ok(Self::Read),
            0x53 => Ok(Self::Write),
            _ => Err(Error::UnknownCommand(value)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}
