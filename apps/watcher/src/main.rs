//! Listing Watch - Exchange-listing calendar watcher
//!
//! Polls the day's listing calendar, filters announcements against a
//! watch-list of exchange sites, and pushes one batched webhook message
//! for everything not yet sent too many times.

mod config;

use clap::Parser;
use config::{AppConfig, ConfigError};
use listing_alerts::{CsvLedger, Dispatcher, LedgerError, WebhookNotifier};
use listing_calendar::{CalendarClient, CalendarError};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Listing Watch CLI
#[derive(Parser, Debug)]
#[command(name = "listing-watch")]
#[command(about = "Exchange-listing calendar watcher", long_about = None)]
struct Args {
    /// Configuration file path (defaults apply when the file is absent)
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Scan a fixed date (YYYY-MM-DD) instead of the current UTC day
    #[arg(short, long)]
    date: Option<String>,

    /// Send-history CSV path
    #[arg(long)]
    ledger: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Failures that end the run with a non-zero exit. Webhook delivery is not
/// among them: a lost message is logged and the run keeps going.
#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fetch(#[from] CalendarError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

fn parse_level(level: &str) -> Level {
    match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn init_logging(level: &str) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(level))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

async fn run(args: Args) -> Result<(), RunError> {
    let mut config = AppConfig::load(&args.config)?;
    if let Some(date) = args.date {
        config.check_date = date;
    }
    if let Some(ledger) = args.ledger {
        config.ledger_path = ledger;
    }
    config.log_level = args.log_level.clone();

    let check_date = config.check_date()?;
    let watch = config.watch_list();
    if watch.is_empty() {
        warn!("Watch-list is empty; no announcement can match");
    }
    if config.webhook_token.is_empty() {
        warn!("No webhook token configured; deliveries will be rejected");
    }

    let client = CalendarClient::new((&config).into());
    let ledger = CsvLedger::open(&config.ledger_path)?;
    let notifier = WebhookNotifier::new((&config).into());
    let mut dispatcher = Dispatcher::new(ledger, notifier, (&config).into());

    info!(date = %check_date, sites = watch.len(), "🔍 Scanning listing calendar");
    let buckets = client.fetch_day(check_date).await?;

    let events = watch.filter_events(&buckets);
    info!(days = buckets.len(), watched = events.len(), "Calendar filtered");

    let outcome = dispatcher.run(&events).await?;
    info!(
        sent = outcome.sent,
        suppressed = outcome.suppressed,
        delivered = outcome.delivered,
        "✅ Run complete"
    );

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_logging(&args.log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Watcher failed");
            ExitCode::FAILURE
        }
    }
}
