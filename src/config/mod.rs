//! Configuration module.
//!
//! This module loads the candidate catalog and holds the benchmark
//! settings passed explicitly to the prober and ranker.

pub mod loader;
pub mod settings;

pub use loader::CatalogLoader;
pub use settings::BenchConfig;
