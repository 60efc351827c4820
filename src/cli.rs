//! Command-line interface (CLI) argument parsing module.
//!
//! This module provides CLI argument parsing using `clap`. Running without
//! a subcommand benchmarks the catalog; `list` prints the catalog and
//! `completions` emits a shell completion script.

use crate::config::settings::{
    BenchConfig, DEFAULT_CONCURRENCY, DEFAULT_INTER_SAMPLE_DELAY_MS, DEFAULT_PROBE_TIMEOUT_MS,
    DEFAULT_SAMPLE_COUNT,
};
use crate::dns::executor::ProbeMethod;
use crate::dns::rank::DEFAULT_TOP_K;
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI argument parser using clap derive macro.
///
/// # Example
///
/// ```ignore
/// let cli = Cli::parse();
/// match cli.command {
///     Some(Commands::List { file }) => { /* ... */ }
///     None => { /* benchmark with cli.bench */ }
/// }
/// ```
#[derive(Parser, Debug)]
#[command(
    name = "dnsjumper",
    version,
    about = "Benchmark DNS servers and switch to the fastest ones",
    long_about = "Pings every DNS server in the catalog, ranks them by average latency \
                  and offers to set the fastest ones as the system DNS servers.",
    args_conflicts_with_subcommands = true,
    infer_subcommands = true
)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (only errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub bench: BenchArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options of a benchmark run.
#[derive(Args, Debug, Clone)]
pub struct BenchArgs {
    /// DNS catalog file (JSON format)
    #[arg(short, long, env = "DNSJUMPER_CATALOG")]
    pub file: Option<PathBuf>,

    /// Custom DNS servers instead of the catalog (format: IP#Provider)
    #[arg(long = "dns")]
    pub dns_servers: Vec<String>,

    /// Number of pings per server
    #[arg(short, long, env = "DNSJUMPER_SAMPLES", default_value_t = DEFAULT_SAMPLE_COUNT)]
    pub count: usize,

    /// Number of servers to recommend
    #[arg(short = 'k', long = "top", env = "DNSJUMPER_TOP", default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Delay between two pings of the same server, in milliseconds
    #[arg(long = "delay-ms", env = "DNSJUMPER_DELAY_MS", default_value_t = DEFAULT_INTER_SAMPLE_DELAY_MS)]
    pub delay_ms: u64,

    /// Timeout of a single ping, in milliseconds
    #[arg(short, long = "timeout-ms", env = "DNSJUMPER_TIMEOUT_MS", default_value_t = DEFAULT_PROBE_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Servers probed at the same time (1 = one after another)
    #[arg(short = 'j', long, env = "DNSJUMPER_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Probe method: system `ping` command or native ICMP socket
    #[arg(short, long, env = "DNSJUMPER_METHOD", default_value = "ping")]
    pub method: ProbeMethod,

    /// Apply the recommendation without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Only report results, never touch the system configuration
    #[arg(long = "no-apply", conflicts_with = "yes")]
    pub no_apply: bool,
}

impl BenchArgs {
    /// Collect the benchmark knobs into one settings value.
    #[must_use]
    pub fn to_config(&self) -> BenchConfig {
        BenchConfig {
            sample_count: self.count,
            top_k: self.top_k,
            inter_sample_delay_ms: self.delay_ms,
            probe_timeout_ms: self.timeout_ms,
            concurrency: self.concurrency,
            method: self.method,
        }
    }
}

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default, human-readable)
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
    /// TSV format (tab-separated)
    Tsv,
}

impl OutputFormat {
    /// Get all available output format names.
    #[must_use]
    pub fn names() -> &'static [&'static str] {
        &["table", "json", "csv", "tsv"]
    }

    /// Field separator for delimited formats.
    #[must_use]
    pub fn separator(&self) -> Option<char> {
        match self {
            Self::Csv => Some(','),
            Self::Tsv => Some('\t'),
            Self::Table | Self::Json => None,
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            _ => Err(format!(
                "Unknown format: {}. Valid options are: {:?}",
                s,
                Self::names()
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Tsv => write!(f, "tsv"),
        }
    }
}

/// Subcommands besides the default benchmark.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the DNS servers in the catalog
    #[command(alias = "l")]
    List {
        /// DNS catalog file
        #[arg(short, long, env = "DNSJUMPER_CATALOG")]
        file: Option<PathBuf>,
    },

    /// Generate a shell completion script
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Parse CLI arguments and return verbose flag.
///
/// # Returns
///
/// Returns a tuple of `(Cli, verbose)` where `verbose` indicates
/// whether verbose logging was enabled.
#[must_use]
pub fn parse_verbose() -> (Cli, bool) {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    (cli, verbose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["dnsjumper"]).unwrap();
        assert!(cli.command.is_none());
        let config = cli.bench.to_config();
        assert_eq!(config.sample_count, 15);
        assert_eq!(config.top_k, 4);
        assert_eq!(config.inter_sample_delay_ms, 500);
        assert_eq!(config.probe_timeout_ms, 1000);
        assert_eq!(config.method, ProbeMethod::Ping);
        assert!(!cli.bench.yes);
    }

    #[test]
    fn test_bench_flags() {
        let cli = Cli::try_parse_from([
            "dnsjumper",
            "-c",
            "5",
            "-k",
            "2",
            "-j",
            "16",
            "--method",
            "icmp",
            "--dns",
            "1.1.1.1#Cloudflare",
            "--no-apply",
            "--format",
            "json",
        ])
        .unwrap();

        let config = cli.bench.to_config();
        assert_eq!(config.sample_count, 5);
        assert_eq!(config.top_k, 2);
        assert_eq!(config.concurrency, 16);
        assert_eq!(config.method, ProbeMethod::Icmp);
        assert_eq!(cli.bench.dns_servers, vec!["1.1.1.1#Cloudflare"]);
        assert!(cli.bench.no_apply);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_yes_conflicts_with_no_apply() {
        assert!(Cli::try_parse_from(["dnsjumper", "--yes", "--no-apply"]).is_err());
    }

    #[test]
    fn test_list_subcommand() {
        let cli = Cli::try_parse_from(["dnsjumper", "list", "-f", "servers.json"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::List { file: Some(ref f) }) if f == &PathBuf::from("servers.json")
        ));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("table".parse::<OutputFormat>(), Ok(OutputFormat::Table));
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("csv".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert_eq!("tsv".parse::<OutputFormat>(), Ok(OutputFormat::Tsv));
        assert!("invalid".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_separator() {
        assert_eq!(OutputFormat::Csv.separator(), Some(','));
        assert_eq!(OutputFormat::Tsv.separator(), Some('\t'));
        assert_eq!(OutputFormat::Table.separator(), None);
    }
}
