//! Cashfeed main entry point
//!
//! Opens a user's feed from a JSON fixture, scrolls it to the end the way a
//! screen would, optionally records a forecast, and prints the merged view.

use anyhow::Context;
use cashfeed_config::{Config, ConfigError};
use cashfeed_core::{ChannelObserver, CoreError, FeedView, ForecastDraft, StaticSession};
use cashfeed_store::MemoryStore;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "cashfeed")]
#[command(version = "0.1.0")]
#[command(about = "Paginated transaction feed with forecast overlay", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Signed-in user whose feed is opened
    #[arg(short, long)]
    user: Option<String>,

    /// Override the fixture file from the configuration
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Override the page size from the configuration
    #[arg(long)]
    page_size: Option<usize>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,

    /// Forecast amount to add before printing, e.g. "50"
    #[arg(long, requires_all = ["forecast_date", "forecast_name"])]
    forecast_amount: Option<String>,

    /// Forecast date (YYYY-MM-DD)
    #[arg(long)]
    forecast_date: Option<String>,

    /// Forecast counterparty
    #[arg(long)]
    forecast_name: Option<String>,

    /// Print the merged feed as JSON
    #[arg(long)]
    json: bool,
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match Config::load(args.config.clone()) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound { .. }) => Config::default(),
        Err(e) => {
            eprintln!("{}", e.to_details());
            return Err(e).context("Failed to load configuration");
        }
    };

    if let Some(fixture) = &args.fixture {
        config.store.fixture = fixture.clone();
    }
    if let Some(page_size) = args.page_size {
        config.feed.page_size = page_size;
    }
    if let Err(e) = config.validate() {
        eprintln!("{}", e.to_details());
        return Err(e).context("Invalid configuration");
    }
    Ok(config)
}

/// Initial load; a missing user leaves the feed empty instead of failing
async fn open_feed(view: &mut FeedView) -> anyhow::Result<()> {
    match view.open().await {
        Ok(outcome) => log::debug!("Initial page: {} records", outcome.appended()),
        Err(CoreError::AuthMissing) => log::warn!("No user signed in; showing an empty feed"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn run(args: Args, config: Config) -> anyhow::Result<()> {
    let store = MemoryStore::from_fixture(&config.store.fixture)
        .await
        .with_context(|| format!("Failed to read fixture {}", config.store.fixture.display()))?;

    let session = match &args.user {
        Some(user) => StaticSession::signed_in(user),
        None => StaticSession::anonymous(),
    };

    let max_scroll_events = config.feed.max_scroll_events;
    let mut view = FeedView::new(config, Arc::new(store), Arc::new(session));
    open_feed(&mut view).await?;

    let observer = Arc::new(ChannelObserver::new());
    let mut trigger = view.visibility_trigger(observer.clone());
    for _ in 0..max_scroll_events {
        trigger.arm();
        observer.report_sentinel();
        if trigger.next_request().await.is_none() {
            break;
        }
        match view.load_more().await {
            Ok(outcome) => log::debug!("Load-more: +{} records", outcome.appended()),
            Err(e) => log::warn!("Load-more failed: {}", e),
        }
    }
    trigger.dispose();

    if let Some(amount) = &args.forecast_amount {
        let draft = ForecastDraft::new(
            ForecastDraft::parse_amount(amount)?,
            args.forecast_date.as_deref().unwrap_or_default(),
            args.forecast_name.as_deref().unwrap_or_default(),
        );
        let id = view.add_forecast(draft).await?;
        log::info!("Forecast {} added", id);
    }

    let items = view.display_items();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        let fmt = view.formatter();
        for item in &items {
            let marker = if item.is_forecast() { "*" } else { " " };
            let payee = match item.merchant_name() {
                Some(merchant) if merchant != item.counterparty_name() => {
                    format!("{} ({})", item.counterparty_name(), merchant)
                }
                _ => item.counterparty_name().to_string(),
            };
            println!(
                "{} {:<10}  {:<40} {:>14}",
                marker,
                item.date().get(..10).unwrap_or(item.date()),
                payee,
                fmt.format(item.amount())
            );
        }
    }

    let snapshot = view.snapshot();
    log::info!(
        "{} records, {} forecasts, phase {}",
        snapshot.records.len(),
        view.forecasts().len(),
        snapshot.phase
    );
    view.close();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = load_config(&args)?;
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();
    log::debug!("Config loaded: fixture={}", config.store.fixture.display());

    let rt = Runtime::new()?;
    rt.block_on(run(args, config))
}
