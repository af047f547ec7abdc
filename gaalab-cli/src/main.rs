//! GAALab CLI: run the strategies, inspect state, manage config.
//!
//! Commands:
//! - `run`: fetch prices, run every enabled strategy, write/POST the messages
//! - `history`: print the GAA rebalance records
//! - `init-config`: write the default TOML configuration
//! - `fetch`: fetch symbols through the provider chain and summarize them

use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDate};
use clap::{Parser, Subcommand};
use gaalab_core::data::{FallbackProvider, PriceProvider};
use gaalab_core::domain::PriceSeries;
use gaalab_core::state::{FileStateStore, RebalanceStateStore};
use gaalab_core::StrategyOutcome;
use gaalab_runner::{
    build_strategies, deliver, provider_chain, run_strategies, AppConfig, MessageFileSink,
    NotificationSink, RunContext, WebhookSink,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Picked up from the working directory when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "gaalab.toml";

#[derive(Parser)]
#[command(
    name = "gaalab",
    version,
    about = "GAALab: monthly momentum rotation signals"
)]
struct Cli {
    /// Debug logging (overrides RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Data source switches shared by `run` and `fetch`.
#[derive(clap::Args, Debug, Clone, Default)]
struct DataArgs {
    /// Offline mode: no Yahoo requests.
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Fall back to synthetic prices (never for real signals).
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Directory of `{SYMBOL}.csv` files tried after Yahoo.
    #[arg(long)]
    csv_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every enabled strategy and deliver the notifications.
    Run {
        /// Path to a TOML config file. Defaults to ./gaalab.toml when present.
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        data: DataArgs,

        /// Evaluate as if today were this date (YYYY-MM-DD).
        #[arg(long)]
        today: Option<String>,

        /// Message file to rewrite. Overrides `output.message_file`.
        #[arg(long)]
        message_file: Option<PathBuf>,

        /// Webhook URL. Overrides config and GAALAB_WEBHOOK_URL.
        #[arg(long)]
        webhook: Option<String>,
    },
    /// Print the GAA rebalance history.
    History {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write the default configuration.
    InitConfig {
        /// Target file. Defaults to ./gaalab.toml.
        path: Option<PathBuf>,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Fetch symbols through the provider chain and print a summary.
    Fetch {
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Calendar days of history.
        #[arg(long, default_value_t = 365)]
        days: u32,

        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        data: DataArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            data,
            today,
            message_file,
            webhook,
        } => run_cmd(config.as_deref(), &data, today.as_deref(), message_file, webhook),
        Commands::History { config } => history_cmd(config.as_deref()),
        Commands::InitConfig { path, force } => init_config_cmd(path, force),
        Commands::Fetch {
            symbols,
            days,
            config,
            data,
        } => fetch_cmd(&symbols, days, config.as_deref(), &data),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = path {
        return AppConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()));
    }
    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.is_file() {
        return AppConfig::from_file(default_path)
            .with_context(|| format!("loading config {DEFAULT_CONFIG_FILE}"));
    }
    let mut config = AppConfig::default();
    config.apply_env();
    config.validate().context("validating default config")?;
    Ok(config)
}

fn apply_data_args(config: &mut AppConfig, args: &DataArgs) {
    config.data.offline |= args.offline;
    config.data.synthetic |= args.synthetic;
    if let Some(dir) = &args.csv_dir {
        config.data.csv_dir = Some(dir.clone());
    }
}

fn build_chain(config: &AppConfig) -> Result<FallbackProvider> {
    let chain = provider_chain(&config.data).context("building provider chain")?;
    if chain.is_empty() {
        bail!("no data provider configured (offline without --csv-dir or --synthetic)");
    }
    Ok(chain)
}

fn parse_day(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD")),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn run_cmd(
    config_path: Option<&Path>,
    data: &DataArgs,
    today: Option<&str>,
    message_file: Option<PathBuf>,
    webhook: Option<String>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    apply_data_args(&mut config, data);
    if let Some(path) = message_file {
        config.output.message_file = path;
    }
    if let Some(url) = webhook {
        config.output.webhook_url = Some(url);
    }

    let today = parse_day(today)?;
    let provider = build_chain(&config)?;
    let strategies = build_strategies(&config).context("building strategies")?;
    if strategies.is_empty() {
        warn!("no strategy enabled");
    }

    let ctx = RunContext::new(today, &provider);
    let runs = run_strategies(&strategies, &ctx);

    let mut sinks: Vec<Box<dyn NotificationSink>> =
        vec![Box::new(MessageFileSink::new(&config.output.message_file))];
    if let Some(url) = &config.output.webhook_url {
        sinks.push(Box::new(WebhookSink::new(url).context("building webhook client")?));
    }
    let delivered = deliver(&runs, &sinks).context("delivering notifications")?;

    for run in &runs {
        let status = match &run.outcome {
            StrategyOutcome::NoSignal => "skipped".to_string(),
            StrategyOutcome::Signal(n) => n.headline.clone(),
            StrategyOutcome::Error { message, .. } => format!("error: {message}"),
        };
        println!("{:<14} {status}", run.name);
    }
    info!(
        today = %today,
        delivered,
        message_file = %config.output.message_file.display(),
        "run complete"
    );
    Ok(())
}

fn history_cmd(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let store = FileStateStore::new(&config.gaa.state_file);
    let records = store
        .records()
        .with_context(|| format!("reading {}", store.path().display()))?;

    if records.is_empty() {
        println!("No rebalance recorded yet ({}).", store.path().display());
        return Ok(());
    }
    for record in &records {
        println!("{}  {}", record.period_end, record.selection());
    }
    Ok(())
}

fn init_config_cmd(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let text = AppConfig::default()
        .to_toml()
        .context("serializing default config")?;
    std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn fetch_cmd(symbols: &[String], days: u32, config_path: Option<&Path>, data: &DataArgs) -> Result<()> {
    let mut config = load_config(config_path)?;
    apply_data_args(&mut config, data);
    let provider = build_chain(&config)?;

    let end = chrono::Local::now().date_naive();
    let start = end - Duration::days(i64::from(days));
    let mut failed = 0usize;

    for symbol in symbols {
        match provider.fetch(symbol, start, end) {
            Ok(result) => {
                let series = PriceSeries::new(result.points);
                match (series.first(), series.last()) {
                    (Some(first), Some(last)) => println!(
                        "{symbol:<10} {:>5} closes  {} .. {}  last {:.2}  ({:?})",
                        series.len(),
                        first.date,
                        last.date,
                        last.close,
                        result.source
                    ),
                    _ => {
                        failed += 1;
                        eprintln!("{symbol:<10} no usable closes");
                    }
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("{symbol:<10} {e}");
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} symbols failed", symbols.len());
    }
    Ok(())
}
