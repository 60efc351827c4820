//! dnsjumper - Benchmark DNS resolvers by latency and switch to the fastest.
//!
//! This crate provides both a library API and a CLI tool for:
//! - Measuring ICMP latency to every DNS server in a catalog
//! - Ranking servers by average latency, deterministically
//! - Applying the best servers as the system DNS configuration
//!   (macOS, Linux with NetworkManager, Windows)
//!
//! # Library Usage
//!
//! ```ignore
//! use dnsjumper::{executor_for, BenchConfig, Benchmark, CatalogLoader, Platform};
//!
//! let config = BenchConfig::default();
//! let catalog = CatalogLoader::load_from_file("dnsList.json")?;
//! let executor = executor_for(config.method, Platform::detect()?, config.probe_timeout())?;
//! let report = Benchmark::from_config(executor, &config).run(&catalog).await;
//! println!("fastest: {:?}", report.recommended_addresses());
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Benchmark the catalog and offer to apply the top 4
//! sudo dnsjumper
//!
//! # Faster run, only report
//! dnsjumper --count 5 --no-apply
//!
//! # Custom servers, JSON output
//! dnsjumper --dns 1.1.1.1#Cloudflare --dns 9.9.9.9#Quad9 --no-apply --format json
//!
//! # List the catalog
//! dnsjumper list
//! ```
//!
//! Only ICMP reachability is measured. It is a proxy for network path
//! quality, not for resolver correctness or query latency.

pub mod cli;
pub mod config;
pub mod dns;
pub mod error;
pub mod system;

// Re-export commonly used types
pub use cli::{Cli, Commands, OutputFormat};
pub use config::{BenchConfig, CatalogLoader};
pub use dns::types::{DnsCandidate, DnsCatalog, ProbeSample, RankedResult, ServerSummary};
pub use dns::{executor_for, Benchmark, BenchmarkReport, ProbeExecutor, ProbeMethod, Prober};
pub use error::{Error, Result};
pub use system::{configurator_for, InterfaceHandle, NetworkConfigurator, Platform};
