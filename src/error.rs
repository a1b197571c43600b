//! Error related data structures.

use std::fmt::{self, Display, Formatter};

/// Top level enum for error handling within the core.
///
/// The first three variants are raised by the running core itself and
/// reach the host through the error hook; the last two are raised by
/// a loader before a core is ever constructed. They share one type so
/// that loader and core agree on a single vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidOpcode(u16),
    InvalidRead(u16),
    InvalidWrite(u16),
    InvalidCartridge(String),
    InvalidChecksum,
}

impl Error {
    pub fn description(&self) -> String {
        match self {
            Error::InvalidOpcode(addr) => format!("Invalid opcode fetched at 0x{:04x}", addr),
            Error::InvalidRead(addr) => format!("Invalid read at 0x{:04x}", addr),
            Error::InvalidWrite(addr) => format!("Invalid write at 0x{:04x}", addr),
            Error::InvalidCartridge(message) => message.clone(),
            Error::InvalidChecksum => "Invalid cartridge checksum".to_string(),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::error::Error for Error {}
