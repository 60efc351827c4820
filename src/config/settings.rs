//! Benchmark settings.

use crate::dns::executor::ProbeMethod;
use crate::dns::rank::DEFAULT_TOP_K;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of samples per server.
pub const DEFAULT_SAMPLE_COUNT: usize = 15;

/// Default spacing between two samples of the same server in milliseconds.
pub const DEFAULT_INTER_SAMPLE_DELAY_MS: u64 = 500;

/// Default timeout for one echo request in milliseconds.
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1000;

/// Default number of servers probed at the same time.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Settings for one benchmark run.
///
/// Built once at startup and handed to the prober and ranker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Samples taken per server
    pub sample_count: usize,
    /// Servers recommended for the system configuration
    pub top_k: usize,
    /// Spacing between samples of one server in milliseconds
    pub inter_sample_delay_ms: u64,
    /// Timeout for one echo request in milliseconds
    pub probe_timeout_ms: u64,
    /// Servers probed concurrently (1 probes strictly one after another)
    pub concurrency: usize,
    /// How samples are taken
    pub method: ProbeMethod,
}

impl BenchConfig {
    /// Check that every knob has a usable value.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.sample_count == 0 {
            return Err(Error::config("sample count must be at least 1"));
        }
        if self.top_k == 0 {
            return Err(Error::config("top-k must be at least 1"));
        }
        if self.concurrency == 0 {
            return Err(Error::config("concurrency must be at least 1"));
        }
        if self.probe_timeout_ms == 0 {
            return Err(Error::config("probe timeout must be greater than 0"));
        }
        Ok(())
    }

    /// Spacing between samples of one server.
    #[must_use]
    pub fn inter_sample_delay(&self) -> Duration {
        Duration::from_millis(self.inter_sample_delay_ms)
    }

    /// Timeout for one echo request.
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Upper bound on the time one unreachable server can take.
    ///
    /// Saturates at `Duration::MAX` for extreme settings.
    #[must_use]
    pub fn worst_case_per_server(&self) -> Duration {
        let count = u32::try_from(self.sample_count).unwrap_or(u32::MAX);
        self.probe_timeout()
            .saturating_add(self.inter_sample_delay())
            .saturating_mul(count)
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            top_k: DEFAULT_TOP_K,
            inter_sample_delay_ms: DEFAULT_INTER_SAMPLE_DELAY_MS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            concurrency: DEFAULT_CONCURRENCY,
            method: ProbeMethod::Ping,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BenchConfig::default();
        assert_eq!(config.sample_count, 15);
        assert_eq!(config.top_k, 4);
        assert_eq!(config.inter_sample_delay(), Duration::from_millis(500));
        assert_eq!(config.probe_timeout(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero() {
        let cases = [
            BenchConfig {
                sample_count: 0,
                ..BenchConfig::default()
            },
            BenchConfig {
                top_k: 0,
                ..BenchConfig::default()
            },
            BenchConfig {
                concurrency: 0,
                ..BenchConfig::default()
            },
            BenchConfig {
                probe_timeout_ms: 0,
                ..BenchConfig::default()
            },
        ];
        for config in cases {
            assert!(matches!(config.validate(), Err(Error::Config(_))));
        }
    }

    #[test]
    fn test_zero_delay_is_valid() {
        let config = BenchConfig {
            inter_sample_delay_ms: 0,
            ..BenchConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_worst_case_per_server() {
        let config = BenchConfig {
            sample_count: 4,
            ..BenchConfig::default()
        };
        assert_eq!(config.worst_case_per_server(), Duration::from_secs(6));
    }

    #[test]
    fn test_worst_case_saturates() {
        let config = BenchConfig {
            sample_count: 2000,
            inter_sample_delay_ms: u64::MAX,
            ..BenchConfig::default()
        };
        assert_eq!(config.worst_case_per_server(), Duration::MAX);

        let config = BenchConfig {
            sample_count: usize::MAX,
            probe_timeout_ms: u64::MAX,
            ..BenchConfig::default()
        };
        assert_eq!(config.worst_case_per_server(), Duration::MAX);
    }
}
