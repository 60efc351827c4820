//! Host platform detection.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating system families with a DNS configurator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// macOS (`networksetup`, `scutil`)
    MacOs,
    /// Linux with NetworkManager (`nmcli`)
    Linux,
    /// Windows (`netsh`, PowerShell)
    Windows,
}

impl Platform {
    /// Detect the platform this binary runs on.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedPlatform` for any other OS.
    pub fn detect() -> Result<Self> {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to a platform.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedPlatform` for unknown names.
    pub fn from_os(os: &str) -> Result<Self> {
        match os {
            "macos" => Ok(Self::MacOs),
            "linux" => Ok(Self::Linux),
            "windows" => Ok(Self::Windows),
            other => Err(Error::UnsupportedPlatform(other.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MacOs => write!(f, "macOS"),
            Self::Linux => write!(f, "Linux"),
            Self::Windows => write!(f, "Windows"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_os() {
        assert_eq!(Platform::from_os("macos").unwrap(), Platform::MacOs);
        assert_eq!(Platform::from_os("linux").unwrap(), Platform::Linux);
        assert_eq!(Platform::from_os("windows").unwrap(), Platform::Windows);
        assert!(matches!(
            Platform::from_os("freebsd"),
            Err(Error::UnsupportedPlatform(os)) if os == "freebsd"
        ));
    }
}
