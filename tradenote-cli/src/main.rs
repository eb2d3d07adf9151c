//! tradenote CLI: export a closed trade from the terminal deal history into the ledger.
//!
//! Commands:
//! - `interactive` (default) prompts for a date range and symbol, repeatedly
//! - `export` runs one export from command-line arguments
//! - `show-config` prints the effective configuration as TOML

mod shell;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tradenote_core::{parse_user_datetime, TradeSummary};
use tradenote_runner::{
    export_trade, summarize, AppConfig, CsvLedger, ExportReport, ExportRequest, HistoryFile,
    LedgerSink,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::shell::Shell;

#[derive(Parser)]
#[command(
    name = "tradenote",
    about = "Export closed trades from the terminal deal history to a ledger"
)]
struct Cli {
    /// Path to the TOML config file. Built-in defaults are used when it is absent.
    #[arg(long, global = true, default_value = "tradenote.toml")]
    config: PathBuf,

    /// Ledger CSV file, overriding `[ledger] path`.
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    /// Deal history export, overriding `[source] history_path`.
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Prompt for date ranges and symbols until told to stop.
    Interactive,
    /// Export one trade.
    Export {
        /// Range start, `YYYY/M/D` or `YYYY/M/DTHH:MM:SS`.
        #[arg(long)]
        from: String,

        /// Range end, same formats as `--from`.
        #[arg(long)]
        to: String,

        /// Symbol to export (matched as *SYMBOL*).
        #[arg(long)]
        symbol: String,

        /// Print the summary without writing to the ledger.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Print the effective configuration.
    ShowConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(&cli)?;

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => {
            let stdin = io::stdin();
            let mut shell = Shell::new(stdin.lock(), io::stdout());
            shell.run(&config)?;
            Ok(())
        }
        Commands::Export {
            from,
            to,
            symbol,
            dry_run,
        } => run_export(&config, &from, &to, symbol, dry_run),
        Commands::ShowConfig => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    if let Some(ledger) = &cli.ledger {
        config.ledger.path = ledger.clone();
    }
    if let Some(history) = &cli.history {
        config.source.history_path = history.clone();
    }
    config.validate()?;
    debug!(?config, "effective configuration");
    Ok(config)
}

fn run_export(
    config: &AppConfig,
    from: &str,
    to: &str,
    symbol: String,
    dry_run: bool,
) -> Result<()> {
    let request = build_request(from, to, symbol)?;
    let source = HistoryFile::open(&config.source.history_path)?;
    let localization = config.localization();

    let report = if dry_run {
        let (summary, deal_count) = summarize(&source, &request, &localization)?;
        ExportReport {
            summary,
            position: None,
            deal_count,
        }
    } else {
        let mut ledger = CsvLedger::new(&config.ledger.path)
            .create_if_missing(config.ledger.create_if_missing);
        let report = export_trade(&source, &mut ledger, &request, &localization)?;
        println!("Trade history saved to {}", ledger.describe());
        report
    };

    print_summary(&report);
    Ok(())
}

fn build_request(from: &str, to: &str, symbol: String) -> Result<ExportRequest> {
    let Some(from) = parse_user_datetime(from) else {
        bail!("--from '{from}' does not match YYYY/M/D or YYYY/M/DTHH:MM:SS");
    };
    let Some(to) = parse_user_datetime(to) else {
        bail!("--to '{to}' does not match YYYY/M/D or YYYY/M/DTHH:MM:SS");
    };
    if symbol.trim().is_empty() {
        bail!("--symbol must not be empty");
    }
    Ok(ExportRequest { from, to, symbol })
}

fn print_summary(report: &ExportReport) {
    let s: &TradeSummary = &report.summary;
    println!();
    println!("=== Trade Summary ===");
    println!("Date:           {} ({})", s.date.format("%Y/%m/%d"), s.day_of_week);
    println!("Symbol:         {}", s.symbol);
    println!("Direction:      {}", s.direction);
    println!("Deals:          {}", report.deal_count);
    println!();
    println!("--- Prices ---");
    println!("Entry:          {}", s.entry_price);
    println!("Stop loss:      {}", s.stop_loss_price);
    println!("Close:          {}", s.close_price);
    println!("Volume:         {}", s.entry_volume);
    println!();
    println!("--- Result ---");
    println!("Gross profit:   {}", s.gross_profit);
    println!("Commission:     {}", s.commission_total);
    println!("Swap:           {}", s.swap_total);
    println!("Net profit:     {}", s.net_profit);
    println!("Risk-reward:    {:.2}", s.risk_reward);
    match report.position {
        Some(position) => println!("Ledger row:     {}", position.row),
        None => println!("Ledger row:     (dry run, not written)"),
    }
}
