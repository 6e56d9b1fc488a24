//! Errors reported while configuring and starting the SimpleLink adapter.  Once the register
//! window is mapped nothing can fail: register accesses and teardown are infallible.
use std::path::PathBuf;

use crate::config::BaseAddress;

/// A rejected configuration command.  The previously configured value is left untouched.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Need exactly one argument for {command}, got {count}.")]
    ArgumentCount { command: &'static str, count: usize },

    #[error("Invalid SimpleLink baseaddr: {0}.")]
    InvalidAddress(String),

    #[error("Unknown command '{0}'.")]
    UnknownCommand(String),
}

/// Failure to bring the register window into the process.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("Failed to open the memory device '{}'.", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to map {size:#x} bytes at {address}.")]
    Map {
        address: BaseAddress,
        size: usize,
        #[source]
        source: nix::Error,
    },

    #[error("A window of {size:#x} bytes cannot hold the control register.")]
    WindowTooSmall { size: usize },

    #[error("Base address {0} is not aligned to a 32-bit register.")]
    Misaligned(BaseAddress),

    #[error("Base address {0} is beyond the file offsets mmap accepts on this platform.")]
    AddressOutOfRange(BaseAddress),
}

/// Failure of the adapter's start-up sequence.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("SimpleLink initialization error: {0}")]
    Mapping(#[from] MappingError),

    #[error("The SimpleLink register window is already mapped.")]
    AlreadyStarted,

    #[error("The SimpleLink adapter has been shut down.")]
    ShutDown,
}
