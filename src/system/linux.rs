//! Linux configurator built on NetworkManager (`nmcli`).

use super::command::CommandSpec;
use super::{require_addresses, run_apply_plan, InterfaceHandle, NetworkConfigurator, Platform};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Configures the active NetworkManager connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinuxConfigurator;

impl LinuxConfigurator {
    /// Commands that set `addresses` on the connection and re-activate it.
    #[must_use]
    pub fn apply_plan(interface: &InterfaceHandle, addresses: &[Ipv4Addr]) -> Vec<CommandSpec> {
        let servers = addresses
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");

        vec![
            CommandSpec::new("nmcli", ["con", "mod", interface.name(), "ipv4.dns", servers.as_str()]),
            CommandSpec::new("nmcli", ["con", "up", interface.name()]),
        ]
    }

    /// Cache flush alternatives, tried in order until one succeeds.
    #[must_use]
    pub fn flush_plan() -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("resolvectl", ["flush-caches"]),
            CommandSpec::new("systemd-resolve", ["--flush-caches"]),
            CommandSpec::new("nscd", ["-i", "hosts"]),
        ]
    }
}

#[async_trait]
impl NetworkConfigurator for LinuxConfigurator {
    fn platform(&self) -> Platform {
        Platform::Linux
    }

    async fn detect_active_interface(&self) -> Result<InterfaceHandle> {
        let devices = CommandSpec::new("nmcli", ["-t", "-f", "DEVICE,STATE", "d"])
            .run()
            .await?;
        let device = connected_device(&devices).ok_or(Error::InterfaceNotFound)?;

        let connections =
            CommandSpec::new("nmcli", ["-t", "-f", "NAME,DEVICE", "c", "show", "--active"])
                .run()
                .await?;
        connection_for_device(&connections, &device)
            .map(InterfaceHandle::new)
            .ok_or(Error::InterfaceNotFound)
    }

    /// Modifies the connection, then re-activates it. NetworkManager has
    /// no transaction for this: if `con up` fails, the new servers are
    /// saved on the connection but not yet active.
    async fn apply_dns(&self, interface: &InterfaceHandle, addresses: &[Ipv4Addr]) -> Result<()> {
        require_addresses(addresses)?;
        run_apply_plan(&Self::apply_plan(interface, addresses)).await
    }

    async fn flush_resolver_cache(&self) {
        for spec in Self::flush_plan() {
            match spec.run().await {
                Ok(_) => {
                    tracing::info!("DNS cache cleared successfully.");
                    return;
                }
                Err(e) => tracing::debug!("{e}"),
            }
        }
        tracing::warn!("No DNS cache service found on this Linux system.");
    }
}

/// First device reported as connected by `nmcli -t -f DEVICE,STATE d`.
///
/// Devices NetworkManager does not manage show up as
/// `connected (externally)` and are ignored.
fn connected_device(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (device, state) = line.rsplit_once(':')?;
        (state == "connected").then(|| device.to_string())
    })
}

/// Active connection name bound to `device`.
///
/// In terse mode `nmcli` escapes colons inside names as `\:`.
fn connection_for_device(output: &str, device: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (name, dev) = line.rsplit_once(':')?;
        (dev == device).then(|| name.replace("\\:", ":"))
    })
}
