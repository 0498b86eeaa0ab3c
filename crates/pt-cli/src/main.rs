//! pt-backtest entry point.
//!
//! Thin on purpose: parse flags, resolve file paths, pick a strategy,
//! run one session, write the report. Everything with behavior worth
//! testing lives in the library crates.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use tokio::sync::watch;
use tracing::{info, warn};

use pt_schemas::money::parse_micros;
use pt_session::{run_session, write_report, SessionConfig};
use pt_strategy::{BuyThenSellLimit, RsiBullish, Strategy};

#[derive(Parser)]
#[command(name = "pt-backtest")]
#[command(about = "Replay a recorded bar history against a strategy", long_about = None)]
struct Cli {
    /// Ticker symbol of the recorded history.
    #[arg(long)]
    symbol: String,

    /// First session date (YYYY-MM-DD), used to locate the data file.
    #[arg(long)]
    start: NaiveDate,

    /// Last session date (YYYY-MM-DD), used to locate the data file.
    #[arg(long)]
    end: NaiveDate,

    /// Bar CSV path. Default: {symbol}_{start}_{end}.csv
    #[arg(long)]
    data: Option<PathBuf>,

    /// Report path. Default: results_{symbol}_{start}_{end}.json
    #[arg(long)]
    out: Option<PathBuf>,

    /// Starting cash, decimal text (e.g. 100000 or 2500.50).
    #[arg(long, default_value = "100000")]
    cash: String,

    #[arg(long, value_enum, default_value_t = StrategyKind::BuySell)]
    strategy: StrategyKind,

    /// buy-sell: shares to buy, decimal text.
    #[arg(long, default_value = "1")]
    qty: String,

    /// buy-sell: sell limit offset over the entry fill, decimal text.
    #[arg(long, default_value = "5")]
    offset: String,

    /// rsi-bullish: RSI lookback period in bars.
    #[arg(long, default_value_t = 14)]
    rsi_period: u32,

    /// rsi-bullish: oversold threshold the RSI must cross up through.
    #[arg(long, default_value_t = 30.0)]
    oversold: f64,

    /// rsi-bullish: entry size in dollars, decimal text.
    #[arg(long, default_value = "500")]
    notional: String,

    /// rsi-bullish: take-profit markup over entry, in basis points.
    #[arg(long, default_value_t = 500)]
    take_profit_bps: i64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum StrategyKind {
    /// Buy a fixed quantity on the first bar, sell at entry + offset.
    BuySell,
    /// Enter on an RSI cross up through oversold, exit at a markup.
    RsiBullish,
}

// One pipeline per invocation; the single-threaded runtime keeps the
// event interleaving, and therefore the report bytes, reproducible
// across runs.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Dev convenience; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    let data_path = cli.data.clone().unwrap_or_else(|| {
        PathBuf::from(format!("{}_{}_{}.csv", cli.symbol, cli.start, cli.end))
    });
    let out_path = cli.out.clone().unwrap_or_else(|| {
        PathBuf::from(format!("results_{}_{}_{}.json", cli.symbol, cli.start, cli.end))
    });

    if !data_path.exists() {
        // No live fetching here: the history must already be on disk.
        bail!(
            "bar data file not found: {} (record the {} history for {}..{} there, or pass --data)",
            data_path.display(),
            cli.symbol,
            cli.start,
            cli.end
        );
    }

    let cash_micros = parse_micros(&cli.cash)
        .with_context(|| format!("--cash '{}' is not a decimal amount", cli.cash))?;
    if cash_micros < 0 {
        bail!("--cash must not be negative");
    }

    let strategy = build_strategy(&cli)?;
    let config = SessionConfig::new(cli.symbol.clone(), data_path.clone(), cash_micros);

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping replay");
            let _ = cancel_tx.send(true);
        }
    });

    info!(
        symbol = %cli.symbol,
        data = %data_path.display(),
        strategy = ?cli.strategy,
        "starting backtest"
    );

    let report = run_session(config, strategy, cancel_rx)
        .await
        .context("backtest session failed")?;

    write_report(&report, &out_path)
        .with_context(|| format!("writing report to {}", out_path.display()))?;

    info!(
        out = %out_path.display(),
        trades = report.num_trades,
        cash = %report.state.cash,
        "backtest complete"
    );
    println!("{}", out_path.display());

    Ok(())
}

fn build_strategy(cli: &Cli) -> Result<Box<dyn Strategy>> {
    match cli.strategy {
        StrategyKind::BuySell => {
            let qty = parse_micros(&cli.qty)
                .with_context(|| format!("--qty '{}' is not a decimal amount", cli.qty))?;
            let offset = parse_micros(&cli.offset)
                .with_context(|| format!("--offset '{}' is not a decimal amount", cli.offset))?;
            if qty <= 0 {
                bail!("--qty must be positive");
            }
            Ok(Box::new(BuyThenSellLimit::new(qty, offset)))
        }
        StrategyKind::RsiBullish => {
            let notional = parse_micros(&cli.notional)
                .with_context(|| format!("--notional '{}' is not a decimal amount", cli.notional))?;
            if notional <= 0 {
                bail!("--notional must be positive");
            }
            if cli.rsi_period == 0 {
                bail!("--rsi-period must be at least 1");
            }
            Ok(Box::new(RsiBullish::new(
                cli.rsi_period,
                cli.oversold,
                notional,
                cli.take_profit_bps,
            )))
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
