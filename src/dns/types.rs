//! DNS types and data structures.
//!
//! This module provides the core types used for candidate representation,
//! raw probe samples, per-server summaries and the ranked recommendation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// A DNS server under test.
///
/// Immutable once loaded from the catalog. Address uniqueness is not
/// enforced: duplicate addresses are probed independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DnsCandidate {
    /// Stable identifier taken from the catalog entry
    pub id: String,
    /// IPv4 address of the resolver
    pub address: Ipv4Addr,
    /// Provider name (e.g., "Cloudflare", "Google")
    pub provider: String,
}

impl DnsCandidate {
    /// Create a new candidate.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let candidate = DnsCandidate::new("1", Ipv4Addr::new(1, 1, 1, 1), "Cloudflare");
    /// ```
    #[must_use]
    pub fn new(id: impl Into<String>, address: Ipv4Addr, provider: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address,
            provider: provider.into(),
        }
    }
}

impl fmt::Display for DnsCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.address, self.provider)
    }
}

/// Ordered list of candidates, as loaded from the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsCatalog {
    /// Candidates in catalog order
    pub candidates: Vec<DnsCandidate>,
}

impl DnsCatalog {
    /// Create a catalog from a vector of candidates.
    #[must_use]
    pub fn from_candidates(candidates: Vec<DnsCandidate>) -> Self {
        Self { candidates }
    }

    /// Get the number of candidates in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Outcome of one latency measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeSample {
    /// Round-trip latency in milliseconds
    Latency(f64),
    /// Failure, timeout, or unparseable probe output
    Unreachable,
}

impl ProbeSample {
    /// Build a sample from a measured latency.
    ///
    /// Negative or non-finite values cannot be real round trips and are
    /// recorded as `Unreachable`. `-0.0` becomes `0.0`.
    #[must_use]
    pub fn from_latency(ms: f64) -> Self {
        valid_latency(ms).map_or(Self::Unreachable, Self::Latency)
    }

    /// Latency in milliseconds, if the probe succeeded.
    ///
    /// A `Latency` built directly with a negative or non-finite value
    /// counts as a failure here too.
    #[must_use]
    pub fn latency_ms(&self) -> Option<f64> {
        match *self {
            Self::Latency(ms) => valid_latency(ms),
            Self::Unreachable => None,
        }
    }

    /// Check if the probe got a reply.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.latency_ms().is_some()
    }
}

fn valid_latency(ms: f64) -> Option<f64> {
    // adding +0.0 turns -0.0 into +0.0
    (ms.is_finite() && ms >= 0.0).then_some(ms + 0.0)
}

impl fmt::Display for ProbeSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latency(ms) => write!(f, "{ms:.2} ms"),
            Self::Unreachable => write!(f, "Timeout or Unreachable"),
        }
    }
}

/// Aggregated statistics for one candidate.
///
/// When no sample succeeded, `min_ms` and `avg_ms` are `+inf` and `max_ms`
/// is `0`. These sentinels only serve to sort the server last; check
/// [`ServerSummary::is_reachable`] before displaying them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSummary {
    /// The candidate that was probed
    pub candidate: DnsCandidate,
    /// Number of samples issued
    pub samples_attempted: usize,
    /// Number of samples that returned a latency
    pub samples_succeeded: usize,
    /// Fastest successful sample
    pub min_ms: f64,
    /// Slowest successful sample
    pub max_ms: f64,
    /// Arithmetic mean of the successful samples
    pub avg_ms: f64,
}

impl ServerSummary {
    /// Check if at least one sample succeeded.
    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.samples_succeeded > 0
    }

    /// Packet loss ratio (0.0 = no loss, 1.0 = all lost).
    #[must_use]
    pub fn packet_loss(&self) -> f64 {
        if self.samples_attempted == 0 {
            1.0
        } else {
            1.0 - (self.samples_succeeded as f64 / self.samples_attempted as f64)
        }
    }

    /// Average latency, guarded against the unreachable sentinel.
    #[must_use]
    pub fn avg_latency(&self) -> Option<f64> {
        self.is_reachable().then_some(self.avg_ms)
    }
}

/// Reachable summaries in recommendation order, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    /// Ranked summaries
    pub entries: Vec<ServerSummary>,
}

impl RankedResult {
    /// Get the number of ranked servers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no server was eligible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first `top_k` entries, or all of them when fewer are ranked.
    #[must_use]
    pub fn recommended(&self, top_k: usize) -> &[ServerSummary] {
        &self.entries[..top_k.min(self.entries.len())]
    }

    /// Addresses of the recommended servers, primary first.
    #[must_use]
    pub fn recommended_addresses(&self, top_k: usize) -> Vec<Ipv4Addr> {
        self.recommended(top_k)
            .iter()
            .map(|s| s.candidate.address)
            .collect()
    }

    /// Iterate over the ranked summaries.
    pub fn iter(&self) -> std::slice::Iter<'_, ServerSummary> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a RankedResult {
    type Item = &'a ServerSummary;
    type IntoIter = std::slice::Iter<'a, ServerSummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
