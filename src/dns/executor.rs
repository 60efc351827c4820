//! Single-shot latency measurement.
//!
//! A [`ProbeExecutor`] sends one echo request to an address and reports a
//! typed [`ProbeSample`]. Every failure mode (spawn error, non-zero exit,
//! unparseable output, timeout) collapses to `ProbeSample::Unreachable`.
//!
//! Two adapters are provided:
//! - [`PingCommand`] runs the system `ping` binary and scrapes its output.
//! - [`IcmpSocket`] sends ICMP echo requests directly using `surge-ping`.

#![allow(clippy::missing_errors_doc)]

use crate::dns::types::ProbeSample;
use crate::error::{Error, Result};
use crate::system::Platform;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::process::Stdio;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use surge_ping::{Client, Config, PingIdentifier, PingSequence};
use tokio::process::Command;
use tokio::time::timeout;

/// Default timeout for a single echo request.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Extra time granted to the `ping` process on top of its own deadline.
const PROCESS_GRACE: Duration = Duration::from_millis(500);

/// Payload size for native ICMP echo requests in bytes.
const ICMP_PAYLOAD_SIZE: usize = 32;

/// Performs one reachability measurement.
#[async_trait]
pub trait ProbeExecutor: Send + Sync {
    /// Measure the round trip to `address` once.
    async fn probe(&self, address: Ipv4Addr) -> ProbeSample;
}

/// How latency samples are taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMethod {
    /// Spawn the system `ping` command
    #[default]
    Ping,
    /// Native ICMP echo via a raw or datagram socket
    Icmp,
}

impl ProbeMethod {
    /// Get all available method names.
    #[must_use]
    pub fn names() -> &'static [&'static str] {
        &["ping", "icmp"]
    }
}

impl std::str::FromStr for ProbeMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ping" => Ok(Self::Ping),
            "icmp" => Ok(Self::Icmp),
            _ => Err(format!(
                "Unknown probe method: {}. Valid options are: {:?}",
                s,
                Self::names()
            )),
        }
    }
}

impl std::fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ping => write!(f, "ping"),
            Self::Icmp => write!(f, "icmp"),
        }
    }
}

/// Build the executor for `method`.
///
/// # Errors
///
/// Returns an error if the ICMP socket cannot be opened.
pub fn executor_for(
    method: ProbeMethod,
    platform: Platform,
    probe_timeout: Duration,
) -> Result<Arc<dyn ProbeExecutor>> {
    Ok(match method {
        ProbeMethod::Ping => Arc::new(PingCommand::new(platform, probe_timeout)),
        ProbeMethod::Icmp => Arc::new(IcmpSocket::new(probe_timeout)?),
    })
}

/// Runs the platform `ping` binary for a single echo request.
#[derive(Debug, Clone)]
pub struct PingCommand {
    platform: Platform,
    timeout: Duration,
}

impl PingCommand {
    /// Create a `ping` executor for `platform`.
    #[must_use]
    pub fn new(platform: Platform, timeout: Duration) -> Self {
        Self { platform, timeout }
    }

    /// Arguments for one echo request with the configured deadline.
    ///
    /// Linux `ping -W` takes whole seconds; macOS and Windows take
    /// milliseconds.
    #[must_use]
    pub fn args(&self, address: Ipv4Addr) -> Vec<String> {
        let millis = self.timeout.as_millis().max(1);
        match self.platform {
            Platform::Windows => vec![
                "-n".into(),
                "1".into(),
                "-w".into(),
                millis.to_string(),
                address.to_string(),
            ],
            Platform::MacOs => vec![
                "-c".into(),
                "1".into(),
                "-W".into(),
                millis.to_string(),
                address.to_string(),
            ],
            Platform::Linux => {
                let secs = millis.div_ceil(1000);
                vec![
                    "-c".into(),
                    "1".into(),
                    "-W".into(),
                    secs.to_string(),
                    address.to_string(),
                ]
            }
        }
    }
}

#[async_trait]
impl ProbeExecutor for PingCommand {
    async fn probe(&self, address: Ipv4Addr) -> ProbeSample {
        let mut command = Command::new("ping");
        command
            .args(self.args(address))
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let output = match timeout(self.timeout + PROCESS_GRACE, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::debug!("Failed to run ping for {address}: {e}");
                return ProbeSample::Unreachable;
            }
            Err(_) => {
                tracing::debug!("ping for {address} exceeded its deadline");
                return ProbeSample::Unreachable;
            }
        };

        if !output.status.success() {
            tracing::debug!("ping for {address} exited with {}", output.status);
            return ProbeSample::Unreachable;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_latency(self.platform, &stdout) {
            Some(ms) => ProbeSample::from_latency(ms),
            None => {
                tracing::debug!("Could not find a latency in ping output for {address}");
                ProbeSample::Unreachable
            }
        }
    }
}

/// Extract the round-trip time in milliseconds from `ping` output.
///
/// Unix output carries `time=<float>` per reply; Windows prints a summary
/// line `Average = <int>ms`.
#[must_use]
pub fn parse_latency(platform: Platform, output: &str) -> Option<f64> {
    static UNIX_TIME: OnceLock<Regex> = OnceLock::new();
    static WINDOWS_AVERAGE: OnceLock<Regex> = OnceLock::new();

    let pattern = match platform {
        Platform::Windows => WINDOWS_AVERAGE
            .get_or_init(|| Regex::new(r"Average = (\d+)").expect("static regex")),
        Platform::MacOs | Platform::Linux => {
            UNIX_TIME.get_or_init(|| Regex::new(r"time=([\d.]+)").expect("static regex"))
        }
    };

    pattern
        .captures(output)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Sends ICMP echo requests without spawning processes.
///
/// Requires raw socket access (root) or unprivileged ICMP datagram
/// sockets enabled on the host.
pub struct IcmpSocket {
    client: Client,
    timeout: Duration,
    next_id: AtomicU16,
}

impl IcmpSocket {
    /// Open the ICMP socket.
    ///
    /// # Errors
    ///
    /// Returns an error if the ICMP client cannot be initialized
    /// (e.g., due to insufficient permissions or system limitations).
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::new(&Config::default()).map_err(|e| Error::network(e.to_string()))?;

        Ok(Self {
            client,
            timeout,
            next_id: AtomicU16::new(std::process::id() as u16),
        })
    }
}

#[async_trait]
impl ProbeExecutor for IcmpSocket {
    async fn probe(&self, address: Ipv4Addr) -> ProbeSample {
        let payload = [0u8; ICMP_PAYLOAD_SIZE];
        let identifier = PingIdentifier(self.next_id.fetch_add(1, Ordering::Relaxed));

        let mut pinger = self.client.pinger(IpAddr::V4(address), identifier).await;
        pinger.timeout(self.timeout);

        match pinger.ping(PingSequence(0), &payload).await {
            Ok((_packet, rtt)) => ProbeSample::from_latency(rtt.as_secs_f64() * 1000.0),
            Err(e) => {
                tracing::debug!("Ping error for {address}: {e}");
                ProbeSample::Unreachable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINUX_OUTPUT: &str = "PING 1.1.1.1 (1.1.1.1) 56(84) bytes of data.
64 bytes from 1.1.1.1: icmp_seq=1 ttl=57 time=14.3 ms

--- 1.1.1.1 ping statistics ---
1 packets transmitted, 1 received, 0% packet loss, time 0ms
rtt min/avg/max/mdev = 14.312/14.312/14.312/0.000 ms
";

    const MACOS_OUTPUT: &str = "PING 8.8.8.8 (8.8.8.8): 56 data bytes
64 bytes from 8.8.8.8: icmp_seq=0 ttl=117 time=21.874 ms
";

    const WINDOWS_OUTPUT: &str = "Pinging 9.9.9.9 with 32 bytes of data:
Reply from 9.9.9.9: bytes=32 time=18ms TTL=56

Ping statistics for 9.9.9.9:
    Packets: Sent = 1, Received = 1, Lost = 0 (0% loss),
Approximate round trip times in milli-seconds:
    Minimum = 18ms, Maximum = 18ms, Average = 18ms
";

    #[test]
    fn test_parse_linux() {
        assert_eq!(parse_latency(Platform::Linux, LINUX_OUTPUT), Some(14.3));
    }

    #[test]
    fn test_parse_macos() {
        assert_eq!(parse_latency(Platform::MacOs, MACOS_OUTPUT), Some(21.874));
    }

    #[test]
    fn test_parse_windows() {
        assert_eq!(parse_latency(Platform::Windows, WINDOWS_OUTPUT), Some(18.0));
    }

    #[test]
    fn test_parse_no_reply() {
        let output = "PING 10.255.255.1 (10.255.255.1) 56(84) bytes of data.

--- 10.255.255.1 ping statistics ---
1 packets transmitted, 0 received, 100% packet loss, time 0ms
";
        assert_eq!(parse_latency(Platform::Linux, output), None);
        assert_eq!(parse_latency(Platform::Windows, "Request timed out."), None);
    }

    #[test]
    fn test_ping_args() {
        let addr = Ipv4Addr::new(1, 0, 0, 1);
        let timeout = Duration::from_millis(1000);

        assert_eq!(
            PingCommand::new(Platform::Linux, timeout).args(addr),
            vec!["-c", "1", "-W", "1", "1.0.0.1"]
        );
        assert_eq!(
            PingCommand::new(Platform::MacOs, timeout).args(addr),
            vec!["-c", "1", "-W", "1000", "1.0.0.1"]
        );
        assert_eq!(
            PingCommand::new(Platform::Windows, timeout).args(addr),
            vec!["-n", "1", "-w", "1000", "1.0.0.1"]
        );
    }

    #[test]
    fn test_linux_timeout_rounds_up() {
        let cmd = PingCommand::new(Platform::Linux, Duration::from_millis(1500));
        assert_eq!(cmd.args(Ipv4Addr::LOCALHOST)[3], "2");
    }

    #[test]
    fn test_probe_method_parse() {
        assert_eq!("ping".parse::<ProbeMethod>(), Ok(ProbeMethod::Ping));
        assert_eq!("ICMP".parse::<ProbeMethod>(), Ok(ProbeMethod::Icmp));
        assert!("tcp".parse::<ProbeMethod>().is_err());
        assert_eq!(ProbeMethod::default().to_string(), "ping");
    }

    #[tokio::test]
    async fn test_ping_localhost() {
        // Needs a `ping` binary and ICMP access, which CI runners lack
        if std::env::var("CI").is_ok() {
            return;
        }

        let platform = Platform::detect().unwrap_or(Platform::Linux);
        let executor = PingCommand::new(platform, DEFAULT_PROBE_TIMEOUT);
        if let ProbeSample::Latency(ms) = executor.probe(Ipv4Addr::LOCALHOST).await {
            assert!(ms >= 0.0);
            assert!(ms < 100.0);
        }
    }
}
