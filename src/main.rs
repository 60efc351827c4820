//! dnsjumper - DNS benchmark and switcher
//!
//! Binary entry point for the dnsjumper CLI application.

#![warn(clippy::all, warnings)]
#![warn(clippy::pedantic, clippy::nursery)]

use clap::CommandFactory;
use dnsjumper::cli::{BenchArgs, Cli, Commands, OutputFormat};
use dnsjumper::config::CatalogLoader;
use dnsjumper::dns::{self, executor_for, Benchmark, BenchmarkReport, DnsCatalog, ServerSummary};
use dnsjumper::error::{Error, Result};
use dnsjumper::system::{self, configurator_for, InterfaceHandle, NetworkConfigurator, Platform};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Set up logging based on verbosity level.
///
/// Logs go to stderr so JSON/CSV output on stdout stays parseable.
///
/// # Arguments
///
/// * `verbose` - Enable debug-level logging
/// * `quiet` - Enable error-level only logging
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    } else if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

/// Load the candidate catalog from command-line servers or a JSON file.
///
/// # Arguments
///
/// * `file` - Optional path to the catalog JSON file
/// * `dns_args` - Optional command-line DNS server specifications (IP#Provider)
fn load_catalog(file: Option<PathBuf>, dns_args: Vec<String>) -> Result<DnsCatalog> {
    if !dns_args.is_empty() {
        return CatalogLoader::from_args(dns_args);
    }

    let path = CatalogLoader::locate(file)?;
    tracing::debug!("Loading catalog from {}", path.display());
    CatalogLoader::load_from_file(path)
}

/// Check privileges and find the interface to configure.
async fn prepare_configurator(
    platform: Platform,
) -> Result<(Box<dyn NetworkConfigurator>, InterfaceHandle)> {
    system::ensure_privileged()?;

    let configurator = configurator_for(platform);
    if platform == Platform::Linux {
        tracing::info!("Linux detected. DNS changes require NetworkManager (nmcli).");
    } else {
        tracing::info!("{platform} detected.");
    }

    let interface = configurator.detect_active_interface().await?;
    tracing::info!("Active network interface: '{interface}'");
    Ok((configurator, interface))
}

/// Run the benchmark and, once confirmed, apply the recommendation.
///
/// # Arguments
///
/// * `args` - Benchmark options
/// * `format` - Output format
async fn run_benchmark(args: BenchArgs, format: OutputFormat) -> Result<()> {
    let config = args.to_config();
    config.validate()?;

    let catalog = load_catalog(args.file.clone(), args.dns_servers.clone())?;
    let platform = Platform::detect()?;

    let target = if args.no_apply {
        None
    } else {
        Some(prepare_configurator(platform).await?)
    };

    if let Some((configurator, _)) = &target {
        configurator.flush_resolver_cache().await;
    }

    let executor = executor_for(config.method, platform, config.probe_timeout())?;
    let benchmark = Benchmark::from_config(executor, &config);

    tracing::info!(
        "Each unreachable server costs up to {:.1}s; this may take a few minutes...",
        config.worst_case_per_server().as_secs_f64()
    );

    let report = tokio::select! {
        report = benchmark.run(&catalog) => report,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted. DNS settings were not changed.");
            return Err(Error::Cancelled);
        }
    };

    print_report(&report, format)?;

    if report.recommended.is_empty() {
        return Err(Error::NoReachableServers(report.total_candidates));
    }

    let Some((configurator, interface)) = target else {
        return Ok(());
    };

    if !args.yes && !confirm("[y/n] Set your DNS to these recommended servers? ").await? {
        tracing::info!("DNS settings were not changed.");
        return Ok(());
    }

    dns::apply_recommendation(configurator.as_ref(), &interface, &report).await?;
    tracing::info!("DNS settings updated successfully!");
    Ok(())
}

/// Ask a yes/no question on the terminal.
async fn confirm(prompt: &str) -> Result<bool> {
    println!("{}", "-".repeat(60));
    print!("{prompt}");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await?;

    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Print the benchmark report in the requested format.
fn print_report(report: &BenchmarkReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_report_table(report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Csv | OutputFormat::Tsv => {
            print_report_delimited(report, format.separator().unwrap_or(','));
        }
    }
    Ok(())
}

/// Print results in table format.
fn print_report_table(report: &BenchmarkReport) {
    println!("\n{}", "=".repeat(60));
    println!(
        "PERFORMANCE TEST RESULTS ({}/{} servers responded)",
        report.responded(),
        report.total_candidates
    );
    println!("{}", "=".repeat(60));

    for (idx, s) in report.ranked.iter().enumerate() {
        println!(
            "{:>2}. {:<18} ({:<30}) | Avg: {:7.2}ms | Min: {:7.2}ms | Max: {:7.2}ms | {}/{}",
            idx + 1,
            s.candidate.address,
            s.candidate.provider,
            s.avg_ms,
            s.min_ms,
            s.max_ms,
            s.samples_succeeded,
            s.samples_attempted
        );
    }

    println!("\n{}", "=".repeat(60));
    println!("TOP {} RECOMMENDED DNS SERVERS:", report.top_k);
    println!("{}", "=".repeat(60));
    if report.recommended.is_empty() {
        println!("(none: no server responded)");
    }
    for (idx, s) in report.recommended.iter().enumerate() {
        println!(
            "{:>2}. {:<18} ({:<30}) | Avg latency: {:.2}ms",
            idx + 1,
            s.candidate.address,
            s.candidate.provider,
            s.avg_ms
        );
    }
}

/// Print every summary as CSV or TSV, ranked servers first.
fn print_report_delimited(report: &BenchmarkReport, sep: char) {
    let header = [
        "#Rank",
        "Id",
        "IP",
        "Provider",
        "Avg(ms)",
        "Min(ms)",
        "Max(ms)",
        "Replies",
        "Samples",
        "Recommended",
    ];
    println!("{}", header.join(sep.to_string().as_str()));

    let unreachable = report.summaries.iter().filter(|s| !s.is_reachable());
    let rows = report
        .ranked
        .iter()
        .enumerate()
        .map(|(idx, s)| (Some(idx + 1), s))
        .chain(unreachable.map(|s| (None, s)));

    for (rank, s) in rows {
        let recommended = rank.is_some_and(|r| r <= report.recommended.len());
        println!(
            "{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}",
            rank.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()),
            s.candidate.id,
            s.candidate.address,
            s.candidate.provider,
            latency_field(s, s.avg_ms),
            latency_field(s, s.min_ms),
            latency_field(s, s.max_ms),
            s.samples_succeeded,
            s.samples_attempted,
            recommended
        );
    }
}

/// Format a latency, printing -1 for servers that never answered.
fn latency_field(summary: &ServerSummary, value: f64) -> String {
    if summary.is_reachable() {
        format!("{value:.2}")
    } else {
        "-1".to_string()
    }
}

/// List catalog entries.
///
/// # Arguments
///
/// * `file` - Optional catalog file
/// * `format` - Output format
fn run_list(file: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let path = CatalogLoader::locate(file)?;
    let catalog = CatalogLoader::load_from_file(path)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&catalog.candidates)?);
        }
        OutputFormat::Csv | OutputFormat::Tsv => {
            let sep = format.separator().unwrap_or(',');
            println!("Id{sep}IP{sep}Provider");
            for c in &catalog.candidates {
                println!("{}{sep}{}{sep}{}", c.id, c.address, c.provider);
            }
        }
        OutputFormat::Table => {
            println!("DNS servers in catalog ({}):\n", catalog.len());
            println!("{:<6} {:<18} {:<30}", "Id", "IP", "Provider");
            println!("{}", "-".repeat(56));
            for c in &catalog.candidates {
                println!("{:<6} {:<18} {:<30}", c.id, c.address, c.provider);
            }
        }
    }

    Ok(())
}

/// Main entry point for the dnsjumper CLI application.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let (cli, verbose) = dnsjumper::cli::parse_verbose();
    setup_logging(verbose, cli.quiet);

    match cli.command {
        Some(Commands::List { file }) => run_list(file, cli.format)?,
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "dnsjumper", &mut std::io::stdout());
        }
        None => run_benchmark(cli.bench, cli.format).await?,
    }

    Ok(())
}
