//! Benchmark run: probe the catalog, rank, and apply the recommendation.

use crate::config::BenchConfig;
use crate::dns::executor::ProbeExecutor;
use crate::dns::prober::Prober;
use crate::dns::rank::rank;
use crate::dns::types::{DnsCatalog, RankedResult, ServerSummary};
use crate::error::{Error, Result};
use crate::system::{InterfaceHandle, NetworkConfigurator};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::net::Ipv4Addr;
use std::sync::Arc;

/// Outcome of probing a whole catalog.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    /// When probing finished
    pub generated_at: DateTime<Local>,
    /// Number of candidates in the catalog
    pub total_candidates: usize,
    /// Size of the recommendation
    pub top_k: usize,
    /// Every summary, in catalog order
    pub summaries: Vec<ServerSummary>,
    /// Reachable servers, fastest first
    pub ranked: RankedResult,
    /// The first `top_k` ranked servers
    pub recommended: Vec<ServerSummary>,
}

impl BenchmarkReport {
    /// Build a report from summaries collected in catalog order.
    #[must_use]
    pub fn new(total_candidates: usize, top_k: usize, summaries: Vec<ServerSummary>) -> Self {
        let ranked = rank(&summaries);
        let recommended = ranked.recommended(top_k).to_vec();
        Self {
            generated_at: Local::now(),
            total_candidates,
            top_k,
            summaries,
            ranked,
            recommended,
        }
    }

    /// Number of servers that answered at least once.
    #[must_use]
    pub fn responded(&self) -> usize {
        self.ranked.len()
    }

    /// Addresses to apply, primary first.
    #[must_use]
    pub fn recommended_addresses(&self) -> Vec<Ipv4Addr> {
        self.recommended
            .iter()
            .map(|s| s.candidate.address)
            .collect()
    }
}

/// Probes a catalog and ranks the results.
pub struct Benchmark {
    prober: Prober,
    top_k: usize,
}

impl Benchmark {
    /// Create a benchmark from a prober and recommendation size.
    #[must_use]
    pub fn new(prober: Prober, top_k: usize) -> Self {
        Self { prober, top_k }
    }

    /// Create a benchmark from validated settings.
    #[must_use]
    pub fn from_config(executor: Arc<dyn ProbeExecutor>, config: &BenchConfig) -> Self {
        Self::new(Prober::from_config(executor, config), config.top_k)
    }

    /// Probe every candidate and rank them.
    ///
    /// Dropping the returned future aborts the run between samples; no
    /// probe is issued afterwards.
    pub async fn run(&self, catalog: &DnsCatalog) -> BenchmarkReport {
        tracing::info!(
            "Starting performance tests on {} DNS servers ({} samples each)...",
            catalog.len(),
            self.prober.sample_count()
        );
        let summaries = self.prober.probe_all(&catalog.candidates).await;
        BenchmarkReport::new(catalog.len(), self.top_k, summaries)
    }
}

/// Apply the recommended servers to `interface`, then flush caches.
///
/// # Errors
///
/// Returns `Error::NoReachableServers` when nothing can be recommended,
/// or the configurator's error when applying fails.
pub async fn apply_recommendation(
    configurator: &dyn NetworkConfigurator,
    interface: &InterfaceHandle,
    report: &BenchmarkReport,
) -> Result<Vec<Ipv4Addr>> {
    let addresses = report.recommended_addresses();
    if addresses.is_empty() {
        return Err(Error::NoReachableServers(report.total_candidates));
    }

    let list = addresses
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    tracing::info!("Setting DNS for '{interface}' to {list}");

    configurator.apply_dns(interface, &addresses).await?;
    configurator.flush_resolver_cache().await;
    Ok(addresses)
}
