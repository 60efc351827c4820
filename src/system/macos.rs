//! macOS configurator built on `scutil` and `networksetup`.

use super::command::CommandSpec;
use super::{require_addresses, run_apply_plan, InterfaceHandle, NetworkConfigurator, Platform};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Configures the primary network service on macOS.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacOsConfigurator;

impl MacOsConfigurator {
    /// Commands that set `addresses` on `interface`.
    #[must_use]
    pub fn apply_plan(interface: &InterfaceHandle, addresses: &[Ipv4Addr]) -> Vec<CommandSpec> {
        let mut args = vec!["-setdnsservers".to_string(), interface.name().to_string()];
        args.extend(addresses.iter().map(ToString::to_string));
        vec![CommandSpec::new("networksetup", args)]
    }

    /// Commands that flush the resolver cache; each is attempted.
    #[must_use]
    pub fn flush_plan() -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("dscacheutil", ["-flushcache"]),
            CommandSpec::new("killall", ["-HUP", "mDNSResponder"]),
        ]
    }

    async fn primary_service_name() -> Result<Option<String>> {
        let scutil = CommandSpec::new("scutil", Vec::<String>::new());

        let state = scutil
            .run_with_input(Some("show State:/Network/Global/IPv4\n"))
            .await?;
        let Some(service_id) = scutil_field(&state, "PrimaryService") else {
            return Ok(None);
        };

        let setup = scutil
            .run_with_input(Some(format!("show Setup:/Network/Service/{service_id}\n").as_str()))
            .await?;
        Ok(scutil_field(&setup, "UserDefinedName"))
    }
}

#[async_trait]
impl NetworkConfigurator for MacOsConfigurator {
    fn platform(&self) -> Platform {
        Platform::MacOs
    }

    async fn detect_active_interface(&self) -> Result<InterfaceHandle> {
        match Self::primary_service_name().await {
            Ok(Some(name)) => return Ok(InterfaceHandle::new(name)),
            Ok(None) => tracing::debug!("scutil reported no primary service"),
            Err(e) => tracing::debug!("scutil lookup failed: {e}"),
        }

        let services = CommandSpec::new("networksetup", ["-listallnetworkservices"])
            .run()
            .await?;
        fallback_service(&services)
            .map(InterfaceHandle::new)
            .ok_or(Error::InterfaceNotFound)
    }

    async fn apply_dns(&self, interface: &InterfaceHandle, addresses: &[Ipv4Addr]) -> Result<()> {
        require_addresses(addresses)?;
        run_apply_plan(&Self::apply_plan(interface, addresses)).await
    }

    async fn flush_resolver_cache(&self) {
        let mut flushed = true;
        for spec in Self::flush_plan() {
            if let Err(e) = spec.run().await {
                tracing::warn!("Could not clear DNS cache: {e}");
                flushed = false;
            }
        }
        if flushed {
            tracing::info!("DNS cache cleared successfully.");
        }
    }
}

/// Value of `key` in `scutil` dictionary output (`  key : value`).
fn scutil_field(output: &str, key: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (k, v) = line.split_once(" : ")?;
        (k.trim() == key).then(|| v.trim().to_string())
    })
}

/// First Wi-Fi or Ethernet service from `networksetup -listallnetworkservices`.
///
/// The first line of that output is an explanatory header.
fn fallback_service(output: &str) -> Option<String> {
    output
        .lines()
        .skip(1)
        .map(|line| line.trim_start_matches('*').trim())
        .find(|service| {
            let lower = service.to_lowercase();
            lower.contains("wi-fi") || lower.contains("ethernet")
        })
        .map(ToString::to_string)
}
