//! Error types module.
//!
//! This module defines the error types used throughout dnsjumper.
//! Only boundary failures are represented here: a failed probe sample is
//! data (`ProbeSample::Unreachable`), never an `Error`.

use thiserror::Error;

/// A specialized `Result` type for dnsjumper operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for dnsjumper.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (file operations, process spawning, terminal input)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error (catalog files, JSON output)
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The candidate catalog is missing or malformed
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Network-related error (ICMP socket setup)
    #[error("Network error: {0}")]
    Network(String),

    /// Configuration error (invalid knob values)
    #[error("Config error: {0}")]
    Config(String),

    /// Parse error (invalid input format, malformed data)
    #[error("Parse error: {0}")]
    Parse(String),

    /// The process lacks administrative/root privileges
    #[error("This tool requires administrative/root privileges. Run it with 'sudo' (macOS/Linux) or as an Administrator (Windows).")]
    InsufficientPrivileges,

    /// The host OS has no configurator implementation
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// No active network interface could be determined
    #[error("Could not determine the active network interface")]
    InterfaceNotFound,

    /// An external command exited unsuccessfully
    #[error("Command `{program}` failed: {message}")]
    Command {
        /// Program that was executed
        program: String,
        /// Exit status or stderr excerpt
        message: String,
    },

    /// Applying the DNS configuration failed
    #[error("Failed to apply DNS settings: {0}")]
    Apply(String),

    /// Every candidate was unreachable
    #[error("None of the {0} DNS servers responded")]
    NoReachableServers(usize),

    /// The run was interrupted before completion
    #[error("Benchmark cancelled")]
    Cancelled,
}

impl Error {
    /// Create a new network error with a message.
    #[must_use]
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new configuration error with a message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new catalog error with a message.
    #[must_use]
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    /// Create a new parse error with a message.
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new apply error with a message.
    #[must_use]
    pub fn apply(msg: impl Into<String>) -> Self {
        Self::Apply(msg.into())
    }

    /// Create a command failure for `program`.
    #[must_use]
    pub fn command(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            program: program.into(),
            message: message.into(),
        }
    }
}
