//! System DNS configuration.
//!
//! This module hides every OS-specific operation behind the
//! [`NetworkConfigurator`] trait. The concrete variant is chosen once at
//! startup with [`configurator_for`]; nothing else branches on platform.
//!
//! The DNS write is not reentrant: running two instances at once can leave
//! the interface with either instance's server list.

pub mod command;
mod linux;
mod macos;
pub mod platform;
mod windows;

pub use command::CommandSpec;
pub use linux::LinuxConfigurator;
pub use macos::MacOsConfigurator;
pub use platform::Platform;
pub use windows::WindowsConfigurator;

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::fmt;
use std::net::Ipv4Addr;

/// The network interface (or connection/service name) DNS is applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceHandle(String);

impl InterfaceHandle {
    /// Wrap an interface name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Interface name as understood by the platform tools.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InterfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reads and writes the DNS settings of the active network interface.
#[async_trait]
pub trait NetworkConfigurator: Send + Sync {
    /// Platform this configurator drives.
    fn platform(&self) -> Platform;

    /// Find the interface currently carrying the default route.
    ///
    /// # Errors
    ///
    /// Returns `Error::InterfaceNotFound` when no active interface exists.
    async fn detect_active_interface(&self) -> Result<InterfaceHandle>;

    /// Replace the interface's DNS servers with `addresses`.
    ///
    /// The first address becomes the primary resolver.
    ///
    /// # Errors
    ///
    /// Returns `Error::Apply` if the platform tools reject the change.
    async fn apply_dns(&self, interface: &InterfaceHandle, addresses: &[Ipv4Addr]) -> Result<()>;

    /// Flush local resolver caches. Failures are logged, never returned.
    async fn flush_resolver_cache(&self);
}

/// Create the configurator for `platform`.
#[must_use]
pub fn configurator_for(platform: Platform) -> Box<dyn NetworkConfigurator> {
    match platform {
        Platform::MacOs => Box::new(MacOsConfigurator),
        Platform::Linux => Box::new(LinuxConfigurator),
        Platform::Windows => Box::new(WindowsConfigurator),
    }
}

/// Check for administrative/root privileges.
///
/// # Errors
///
/// Returns `Error::InsufficientPrivileges` when not elevated.
pub fn ensure_privileged() -> Result<()> {
    if is_root::is_root() {
        Ok(())
    } else {
        Err(Error::InsufficientPrivileges)
    }
}

/// Reject empty server lists before touching the system.
fn require_addresses(addresses: &[Ipv4Addr]) -> Result<()> {
    if addresses.is_empty() {
        Err(Error::apply("no DNS servers to apply"))
    } else {
        Ok(())
    }
}

/// Run an apply plan, mapping any command failure to `Error::Apply`.
///
/// Steps already run are not rolled back: a failure after the first step
/// leaves the interface partially configured, and the error says so.
async fn run_apply_plan(plan: &[CommandSpec]) -> Result<()> {
    for (idx, spec) in plan.iter().enumerate() {
        if let Err(e) = spec.run().await {
            if idx == 0 {
                return Err(Error::apply(e.to_string()));
            }
            return Err(Error::apply(format!(
                "{e} ({idx} of {} steps had succeeded; DNS settings may be partially applied)",
                plan.len()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configurator_for() {
        for platform in [Platform::MacOs, Platform::Linux, Platform::Windows] {
            assert_eq!(configurator_for(platform).platform(), platform);
        }
    }

    #[test]
    fn test_require_addresses() {
        assert!(matches!(require_addresses(&[]), Err(Error::Apply(_))));
        assert!(require_addresses(&[Ipv4Addr::new(1, 1, 1, 1)]).is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_apply_plan_reports_partial_failure() {
        let plan = [
            CommandSpec::new("true", Vec::<String>::new()),
            CommandSpec::new("dnsjumper-no-such-program", Vec::<String>::new()),
        ];
        let err = run_apply_plan(&plan).await.unwrap_err();
        assert!(matches!(err, Error::Apply(ref msg) if msg.contains("partially applied")));

        let err = run_apply_plan(&plan[1..]).await.unwrap_err();
        assert!(matches!(err, Error::Apply(ref msg) if !msg.contains("partially applied")));

        assert!(run_apply_plan(&plan[..1]).await.is_ok());
    }

    #[test]
    fn test_interface_handle() {
        let handle = InterfaceHandle::new("Wi-Fi");
        assert_eq!(handle.name(), "Wi-Fi");
        assert_eq!(handle.to_string(), "Wi-Fi");
    }
}
