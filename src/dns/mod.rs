//! DNS module.
//!
//! This module provides the probing-and-ranking engine:
//! - Single-shot latency measurement (`executor`)
//! - Per-server sampling with bounded concurrency (`prober`)
//! - Sample aggregation and ranking (`aggregate`, `rank`)
//! - The benchmark run tying them together (`bench`)

pub mod aggregate;
pub mod bench;
pub mod executor;
pub mod prober;
pub mod rank;
pub mod types;

pub use aggregate::summarize;
pub use bench::{apply_recommendation, Benchmark, BenchmarkReport};
pub use executor::{executor_for, IcmpSocket, PingCommand, ProbeExecutor, ProbeMethod};
pub use prober::Prober;
pub use rank::{rank, rank_top};
pub use types::*;
