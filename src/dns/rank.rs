//! Ranking of server summaries.

use crate::dns::types::{RankedResult, ServerSummary};

/// Default number of servers recommended for the system configuration.
pub const DEFAULT_TOP_K: usize = 4;

/// Rank summaries by average latency, fastest first.
///
/// Servers that never answered are dropped. The sort is stable: servers
/// with equal averages keep their input order, and no secondary key is
/// applied.
#[must_use]
pub fn rank(summaries: &[ServerSummary]) -> RankedResult {
    let mut entries: Vec<ServerSummary> = summaries
        .iter()
        .filter(|s| s.is_reachable())
        .cloned()
        .collect();

    entries.sort_by(|a, b| a.avg_ms.total_cmp(&b.avg_ms));

    RankedResult { entries }
}

/// Rank summaries and keep only the `top_k` best.
///
/// Fewer eligible servers than `top_k` is not an error; the result is the
/// whole eligible set.
#[must_use]
pub fn rank_top(summaries: &[ServerSummary], top_k: usize) -> RankedResult {
    let mut ranked = rank(summaries);
    ranked.entries.truncate(top_k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::aggregate::summarize;
    use crate::dns::types::{DnsCandidate, ProbeSample};
    use std::net::Ipv4Addr;

    fn summary(id: &str, last: u8, samples: &[ProbeSample]) -> ServerSummary {
        let candidate = DnsCandidate::new(id, Ipv4Addr::new(10, 0, 0, last), "Test");
        summarize(&candidate, samples)
    }

    fn ids(ranked: &RankedResult) -> Vec<&str> {
        ranked.iter().map(|s| s.candidate.id.as_str()).collect()
    }

    #[test]
    fn test_ascending_by_average() {
        let summaries = vec![
            summary("slow", 1, &[ProbeSample::Latency(50.0)]),
            summary("fast", 2, &[ProbeSample::Latency(5.0)]),
            summary("mid", 3, &[ProbeSample::Latency(20.0)]),
        ];
        let ranked = rank(&summaries);
        assert_eq!(ids(&ranked), vec!["fast", "mid", "slow"]);
        assert!(ranked
            .entries
            .windows(2)
            .all(|w| w[0].avg_ms <= w[1].avg_ms));
    }

    #[test]
    fn test_unreachable_excluded() {
        let summaries = vec![
            summary("dead", 1, &[ProbeSample::Unreachable, ProbeSample::Unreachable]),
            summary("alive", 2, &[ProbeSample::Unreachable, ProbeSample::Latency(900.0)]),
        ];
        let ranked = rank(&summaries);
        assert_eq!(ids(&ranked), vec!["alive"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let summaries = vec![
            summary("c", 1, &[ProbeSample::Latency(10.0)]),
            summary("a", 2, &[ProbeSample::Latency(8.0), ProbeSample::Latency(12.0)]),
            summary("b", 3, &[ProbeSample::Latency(10.0), ProbeSample::Unreachable]),
            summary("first", 4, &[ProbeSample::Latency(1.0)]),
        ];
        let ranked = rank(&summaries);
        assert_eq!(ids(&ranked), vec!["first", "c", "a", "b"]);
    }

    #[test]
    fn test_signed_zero_ties_keep_input_order() {
        let summaries = vec![
            summary("plus", 1, &[ProbeSample::Latency(0.0)]),
            summary("minus", 2, &[ProbeSample::Latency(-0.0)]),
        ];
        assert_eq!(ids(&rank(&summaries)), vec!["plus", "minus"]);
    }

    #[test]
    fn test_top_k_length() {
        let summaries: Vec<_> = (0..6)
            .map(|i| summary(&i.to_string(), i, &[ProbeSample::Latency(f64::from(i))]))
            .collect();

        assert_eq!(rank_top(&summaries, DEFAULT_TOP_K).len(), 4);
        assert_eq!(rank_top(&summaries, 10).len(), 6);
        assert_eq!(rank(&summaries).recommended(3).len(), 3);
    }

    #[test]
    fn test_fewer_eligible_than_top_k() {
        let summaries = vec![
            summary("b", 1, &[ProbeSample::Latency(30.0)]),
            summary("x", 2, &[ProbeSample::Unreachable]),
            summary("a", 3, &[ProbeSample::Latency(3.0)]),
        ];
        let ranked = rank_top(&summaries, 4);
        assert_eq!(ids(&ranked), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank(&[]).is_empty());
    }
}
