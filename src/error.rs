//! Crate-level error types.

use std::fmt;

/// Errors produced by the vantage crate.
#[derive(Debug)]
pub enum VantageError {
    /// GPU pixel readback failed (buffer mapping or device poll).
    Readback(String),
    /// A readback region does not fit the staging buffer or output slice.
    InvalidReadRegion {
        /// Requested region width in pixels.
        width: u32,
        /// Requested region height in pixels.
        height: u32,
    },
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
}

impl fmt::Display for VantageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Readback(msg) => write!(f, "pixel readback failed: {msg}"),
            Self::InvalidReadRegion { width, height } => {
                write!(f, "invalid readback region {width}x{height}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
        }
    }
}

impl std::error::Error for VantageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for VantageError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
