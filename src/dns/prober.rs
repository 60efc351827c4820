//! Latency sampling across the candidate catalog.
//!
//! Samples of one server are taken strictly one after another and spaced
//! by the inter-sample delay. Different servers are probed concurrently,
//! bounded by a semaphore. Summaries come back in catalog order whatever
//! the completion order, so ranking stays deterministic.

use crate::config::BenchConfig;
use crate::dns::aggregate::summarize;
use crate::dns::executor::ProbeExecutor;
use crate::dns::types::{DnsCandidate, ProbeSample, ServerSummary};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Drives a [`ProbeExecutor`] over candidates.
///
/// # Example
///
/// ```ignore
/// let executor = executor_for(ProbeMethod::Ping, Platform::detect()?, DEFAULT_PROBE_TIMEOUT)?;
/// let prober = Prober::new(executor, 15, Duration::from_millis(500));
/// let summary = prober.probe(&candidate).await;
/// ```
#[derive(Clone)]
pub struct Prober {
    executor: Arc<dyn ProbeExecutor>,
    sample_count: usize,
    inter_sample_delay: Duration,
    concurrency: usize,
}

impl Prober {
    /// Create a prober that probes one server at a time.
    #[must_use]
    pub fn new(
        executor: Arc<dyn ProbeExecutor>,
        sample_count: usize,
        inter_sample_delay: Duration,
    ) -> Self {
        Self {
            executor,
            sample_count,
            inter_sample_delay,
            concurrency: 1,
        }
    }

    /// Create a prober from validated settings.
    #[must_use]
    pub fn from_config(executor: Arc<dyn ProbeExecutor>, config: &BenchConfig) -> Self {
        Self::new(executor, config.sample_count, config.inter_sample_delay())
            .with_concurrency(config.concurrency)
    }

    /// Set how many servers may be probed at the same time.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Samples taken per server.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Take `sample_count` samples of one candidate and summarize them.
    ///
    /// A failed sample is recorded as unreachable; this never fails.
    pub async fn probe(&self, candidate: &DnsCandidate) -> ServerSummary {
        let mut samples: Vec<ProbeSample> = Vec::with_capacity(self.sample_count);

        for i in 0..self.sample_count {
            let sample = self.executor.probe(candidate.address).await;
            tracing::info!(
                "  Ping {}/{} to {}: {}",
                i + 1,
                self.sample_count,
                candidate.address,
                sample
            );
            samples.push(sample);

            if i + 1 < self.sample_count && !self.inter_sample_delay.is_zero() {
                tokio::time::sleep(self.inter_sample_delay).await;
            }
        }

        let summary = summarize(candidate, &samples);
        log_summary(&summary);
        summary
    }

    /// Probe every candidate and return their summaries in input order.
    ///
    /// A candidate whose probing task dies is reported and left out.
    /// Dropping the returned future aborts every probing task.
    pub async fn probe_all(&self, candidates: &[DnsCandidate]) -> Vec<ServerSummary> {
        let total = candidates.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (idx, candidate) in candidates.iter().enumerate() {
            let prober = self.clone();
            let candidate = candidate.clone();
            let semaphore = semaphore.clone();

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (idx, None);
                };
                tracing::info!(
                    "[{}/{}] Testing DNS server: {} ({})",
                    idx + 1,
                    total,
                    candidate.address,
                    candidate.provider
                );
                (idx, Some(prober.probe(&candidate).await))
            });
        }

        let mut slots: Vec<Option<ServerSummary>> = vec![None; total];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, summary)) => slots[idx] = summary,
                Err(e) => tracing::warn!("Probing task failed: {e}"),
            }
        }

        candidates
            .iter()
            .zip(slots)
            .filter_map(|(candidate, slot)| {
                if slot.is_none() {
                    tracing::warn!("Skipped {candidate}: no result");
                }
                slot
            })
            .collect()
    }
}

fn log_summary(summary: &ServerSummary) {
    let address = summary.candidate.address;
    if summary.is_reachable() {
        tracing::info!(
            "Summary for {}: Min={:.2}ms, Max={:.2}ms, Avg={:.2}ms ({}/{} replies)",
            address,
            summary.min_ms,
            summary.max_ms,
            summary.avg_ms,
            summary.samples_succeeded,
            summary.samples_attempted
        );
    } else {
        tracing::info!("Failed to ping {address}");
    }
}
