//! Windows configurator built on PowerShell and `netsh`.

use super::command::CommandSpec;
use super::{require_addresses, run_apply_plan, InterfaceHandle, NetworkConfigurator, Platform};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::net::Ipv4Addr;

const ACTIVE_INTERFACE_QUERY: &str = "Get-NetIPConfiguration | Where-Object { $_.IPv4DefaultGateway -ne $null -and $_.NetAdapter.Status -eq 'Up' } | Select-Object -ExpandProperty InterfaceAlias";

/// Configures the interface holding the IPv4 default gateway.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsConfigurator;

impl WindowsConfigurator {
    /// Commands that set `addresses` on `interface`.
    ///
    /// The first address is set as the static primary; the others are
    /// appended with explicit indexes so their order survives.
    #[must_use]
    pub fn apply_plan(interface: &InterfaceHandle, addresses: &[Ipv4Addr]) -> Vec<CommandSpec> {
        let name = format!("name={}", interface.name());
        let mut plan = Vec::with_capacity(addresses.len());

        if let Some((primary, rest)) = addresses.split_first() {
            plan.push(CommandSpec::new(
                "netsh",
                [
                    "interface".to_string(),
                    "ipv4".into(),
                    "set".into(),
                    "dnsservers".into(),
                    name.clone(),
                    "static".into(),
                    primary.to_string(),
                    "primary".into(),
                ],
            ));
            for (idx, address) in rest.iter().enumerate() {
                plan.push(CommandSpec::new(
                    "netsh",
                    [
                        "interface".to_string(),
                        "ipv4".into(),
                        "add".into(),
                        "dnsservers".into(),
                        name.clone(),
                        address.to_string(),
                        format!("index={}", idx + 2),
                    ],
                ));
            }
        }

        plan
    }

    /// Command that flushes the resolver cache.
    #[must_use]
    pub fn flush_plan() -> CommandSpec {
        CommandSpec::new("ipconfig", ["/flushdns"])
    }
}

#[async_trait]
impl NetworkConfigurator for WindowsConfigurator {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    async fn detect_active_interface(&self) -> Result<InterfaceHandle> {
        let output = CommandSpec::new(
            "powershell",
            ["-NoProfile", "-Command", ACTIVE_INTERFACE_QUERY],
        )
        .run()
        .await?;

        output
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(InterfaceHandle::new)
            .ok_or(Error::InterfaceNotFound)
    }

    /// `netsh` sets one server per call with no rollback. If a later
    /// `add` fails, the interface keeps the primary and any servers added
    /// before the failure.
    async fn apply_dns(&self, interface: &InterfaceHandle, addresses: &[Ipv4Addr]) -> Result<()> {
        require_addresses(addresses)?;
        run_apply_plan(&Self::apply_plan(interface, addresses)).await
    }

    async fn flush_resolver_cache(&self) {
        match Self::flush_plan().run().await {
            Ok(_) => tracing::info!("DNS cache cleared successfully."),
            Err(e) => tracing::warn!("Could not clear DNS cache: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_plan_indexes() {
        let plan = WindowsConfigurator::apply_plan(
            &InterfaceHandle::new("Ethernet 2"),
            &[
                Ipv4Addr::new(1, 1, 1, 1),
                Ipv4Addr::new(8, 8, 8, 8),
                Ipv4Addr::new(9, 9, 9, 9),
            ],
        );

        assert_eq!(plan.len(), 3);
        assert_eq!(
            plan[0].to_string(),
            "netsh interface ipv4 set dnsservers name=Ethernet 2 static 1.1.1.1 primary"
        );
        assert_eq!(
            plan[1].to_string(),
            "netsh interface ipv4 add dnsservers name=Ethernet 2 8.8.8.8 index=2"
        );
        assert_eq!(
            plan[2].to_string(),
            "netsh interface ipv4 add dnsservers name=Ethernet 2 9.9.9.9 index=3"
        );
    }

    #[test]
    fn test_apply_plan_empty() {
        assert!(WindowsConfigurator::apply_plan(&InterfaceHandle::new("Wi-Fi"), &[]).is_empty());
    }
}
