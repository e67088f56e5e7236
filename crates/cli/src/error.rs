//! Structured CLI errors with meaningful exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: core error (lookup failure, solver precondition or exhaustion)
//! - 11: I/O error (dataset read, image read/write)
//! - 12: input error (bad color notation, malformed dataset row, bad JSON params)
//! - 13: serialization error

use spectrum_core::SpectrumError;
use std::fmt;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
#[derive(Debug)]
pub enum CliError {
    /// A core library error that is not the user's input.
    Spectrum(SpectrumError),
    /// An I/O error (dataset or image files).
    Io(String),
    /// A user input error (color notation, dataset contents, JSON params).
    Input(String),
    /// A serialization error (JSON output failure).
    Serialization(String),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Spectrum(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Spectrum(e) => write!(f, "{e}"),
            CliError::Io(msg) => write!(f, "{msg}"),
            CliError::Input(msg) => write!(f, "{msg}"),
            CliError::Serialization(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<SpectrumError> for CliError {
    fn from(e: SpectrumError) -> Self {
        match e {
            SpectrumError::InvalidArgument(msg) => CliError::Input(msg),
            other => CliError::Spectrum(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
