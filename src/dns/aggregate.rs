//! Reduction of raw probe samples into per-server statistics.

use crate::dns::types::{DnsCandidate, ProbeSample, ServerSummary};

/// Summarize the samples collected for one candidate.
///
/// Statistics cover the successful samples only: a failed sample is neither
/// counted as zero nor as the timeout ceiling. Pure and deterministic.
#[must_use]
pub fn summarize(candidate: &DnsCandidate, samples: &[ProbeSample]) -> ServerSummary {
    let latencies: Vec<f64> = samples.iter().filter_map(ProbeSample::latency_ms).collect();

    let (min_ms, max_ms, avg_ms) = if latencies.is_empty() {
        (f64::INFINITY, 0.0, f64::INFINITY)
    } else {
        let min = latencies.iter().copied().fold(f64::INFINITY, f64::min);
        let max = latencies.iter().copied().fold(0.0, f64::max);
        let avg = latencies.iter().sum::<f64>() / latencies.len() as f64;
        (min, max, avg)
    };

    ServerSummary {
        candidate: candidate.clone(),
        samples_attempted: samples.len(),
        samples_succeeded: latencies.len(),
        min_ms,
        max_ms,
        avg_ms,
    }
}
