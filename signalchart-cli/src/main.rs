//! SignalChart CLI: fuse, synthetic series, and watchlist commands.
//!
//! Commands:
//! - `fuse`: load prices and signals for one symbol (or the whole watchlist), fuse, emit chart payloads
//! - `synth`: print a seeded synthetic price/signal series in wire format
//! - `watchlist add|remove|list`: manage the watchlist file
//!
//! Logs go to stderr (`RUST_LOG`, default `info`) so JSON on stdout stays clean.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use signalchart_core::config::AppConfig;
use signalchart_core::data::{PriceRecord, SignalRecord};
use signalchart_core::rng::SeedPolicy;
use signalchart_core::synthetic::SyntheticGenerator;
use signalchart_core::watchlist::{normalize_symbol, Watchlist};
use signalchart_runner::{ChartPayload, ChartSession, FusionService, LoadOptions, SourceSelection};

#[derive(Parser)]
#[command(
    name = "signalchart",
    about = "SignalChart CLI: fuse trading signals onto price charts"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fuse prices and signals into chart payloads.
    Fuse {
        /// Symbol to fuse.
        #[arg(long, conflicts_with = "all")]
        symbol: Option<String>,

        /// Fuse every symbol in the watchlist.
        #[arg(long, default_value_t = false)]
        all: bool,

        /// Watchlist file (used with --all).
        #[arg(long, default_value = "watchlist.toml")]
        watchlist: PathBuf,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Price file (CSV or JSON); `{symbol}` is replaced. Defaults to the chart API.
        #[arg(long)]
        prices: Option<String>,

        /// Signal file (JSON); `{symbol}` is replaced. Defaults to the configured signals endpoint.
        #[arg(long)]
        signals: Option<String>,

        /// Offline mode: no network access.
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Generate a synthetic series when no real prices are available.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Master seed for synthetic series. Random when omitted.
        #[arg(long)]
        seed: Option<u64>,

        /// Synthetic sessions end before this date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end_date: Option<String>,

        /// Write `<SYMBOL>.json` payloads here instead of printing JSON to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a synthetic price/signal series in wire format.
    Synth {
        #[arg(long)]
        symbol: String,

        #[arg(long)]
        seed: Option<u64>,

        /// Sessions end before this date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end_date: Option<String>,

        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Watchlist management commands.
    Watchlist {
        #[command(subcommand)]
        action: WatchlistAction,
    },
}

#[derive(Subcommand)]
enum WatchlistAction {
    /// Add a symbol.
    Add {
        symbol: String,

        /// Display name. Defaults to "Custom Stock".
        #[arg(long)]
        name: Option<String>,

        #[arg(long, default_value = "watchlist.toml")]
        file: PathBuf,
    },
    /// Remove a symbol.
    Remove {
        symbol: String,

        #[arg(long, default_value = "watchlist.toml")]
        file: PathBuf,
    },
    /// List symbols in insertion order.
    List {
        #[arg(long, default_value = "watchlist.toml")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fuse {
            symbol,
            all,
            watchlist,
            config,
            prices,
            signals,
            offline,
            synthetic,
            seed,
            end_date,
            output,
        } => run_fuse(FuseArgs {
            symbol,
            all,
            watchlist,
            config,
            selection: SourceSelection {
                price_file: prices,
                signal_file: signals,
                offline,
            },
            synthetic,
            seed,
            end_date,
            output,
        }),
        Commands::Synth {
            symbol,
            seed,
            end_date,
            config,
        } => run_synth(&symbol, seed, end_date.as_deref(), config.as_deref()),
        Commands::Watchlist { action } => run_watchlist(action),
    }
}

struct FuseArgs {
    symbol: Option<String>,
    all: bool,
    watchlist: PathBuf,
    config: Option<PathBuf>,
    selection: SourceSelection,
    synthetic: bool,
    seed: Option<u64>,
    end_date: Option<String>,
    output: Option<PathBuf>,
}

/// Symbols to fuse. `--symbol` goes through the same validation as watchlist entries,
/// since it is substituted into file paths and URLs.
fn requested_symbols(symbol: Option<&str>, all: bool, watchlist: &Path) -> Result<Vec<String>> {
    let symbols: Vec<String> = match (symbol, all) {
        (Some(s), false) => vec![normalize_symbol(s)?],
        (None, true) => Watchlist::load_or_seed(watchlist)?
            .symbols()
            .into_iter()
            .map(String::from)
            .collect(),
        _ => bail!("one of --symbol or --all is required"),
    };
    if symbols.is_empty() {
        bail!("watchlist {} is empty", watchlist.display());
    }
    Ok(symbols)
}

fn run_fuse(args: FuseArgs) -> Result<()> {
    let symbols = requested_symbols(args.symbol.as_deref(), args.all, &args.watchlist)?;

    let config = load_config(args.config.as_deref())?;
    tracing::debug!(symbols = ?symbols, offline = args.selection.offline, "starting fusion");
    let options = LoadOptions {
        synthetic_fallback: args.synthetic,
        seed: seed_policy(args.seed),
        end_date: parse_date(args.end_date.as_deref())?,
    };
    let service = Arc::new(FusionService::from_sources(config, &args.selection, options)?);

    let payloads: Vec<Arc<ChartPayload>> = if symbols.len() == 1 {
        let session = ChartSession::new(Arc::clone(&service));
        session.refresh(&symbols[0]);
        session.current().into_iter().collect()
    } else {
        service.run_many(&symbols).into_iter().map(Arc::new).collect()
    };

    for payload in &payloads {
        print_summary(payload);
        match &args.output {
            Some(dir) => {
                let path = write_payload(dir, payload)?;
                eprintln!("  Payload: {}", path.display());
            }
            None => println!("{}", payload.to_json_pretty()?),
        }
    }
    Ok(())
}

fn run_synth(
    symbol: &str,
    seed: Option<u64>,
    end_date: Option<&str>,
    config_path: Option<&Path>,
) -> Result<()> {
    let symbol = normalize_symbol(symbol)?;
    let config = load_config(config_path)?;
    let generator = SyntheticGenerator::new(config.synthetic)?;
    let end = parse_date(end_date)?.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let series = generator.generate(&symbol, end, &seed_policy(seed));

    let prices: Vec<PriceRecord> = series.prices.iter().map(PriceRecord::from).collect();
    let signals: Vec<SignalRecord> = series.events.iter().map(SignalRecord::from).collect();
    let out = serde_json::json!({
        "symbol": series.symbol,
        "seed": series.seed,
        "prices": prices,
        "signals": signals,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn run_watchlist(action: WatchlistAction) -> Result<()> {
    match action {
        WatchlistAction::Add { symbol, name, file } => {
            let mut list = Watchlist::load_or_seed(&file)?;
            if list.add(&symbol, name.as_deref())? {
                list.save(&file)?;
                println!("Added {} to {}", symbol.trim().to_ascii_uppercase(), file.display());
            } else {
                println!("{} is already in the watchlist", symbol.trim().to_ascii_uppercase());
            }
        }
        WatchlistAction::Remove { symbol, file } => {
            let mut list = Watchlist::load_or_seed(&file)?;
            if !list.remove(&symbol) {
                bail!("{symbol} is not in the watchlist");
            }
            list.save(&file)?;
            println!("Removed {symbol} from {}", file.display());
        }
        WatchlistAction::List { file } => {
            let list = Watchlist::load_or_seed(&file)?;
            for entry in &list.entries {
                println!("{:<8} {}", entry.symbol, entry.name);
            }
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(p) => AppConfig::from_file(p).with_context(|| format!("loading {}", p.display())),
        None => Ok(AppConfig::default()),
    }
}

fn seed_policy(seed: Option<u64>) -> SeedPolicy {
    seed.map_or(SeedPolicy::Entropy, SeedPolicy::Fixed)
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
    })
    .transpose()
}

fn write_payload(dir: &Path, payload: &ChartPayload) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;
    let path = dir.join(format!("{}.json", payload.symbol));
    std::fs::write(&path, payload.to_json_pretty()?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn print_summary(payload: &ChartPayload) {
    let s = &payload.summary;
    eprintln!("\n=== {} ({}) ===", payload.symbol, payload.source);
    if payload.is_empty() {
        eprintln!("  No price data.");
        return;
    }
    eprintln!("  Points:       {}", payload.rows.len());
    eprintln!("  Range:        {:.2} – {:.2}", s.min_price, s.max_price);
    eprintln!("  Change:       {:+.2}%", s.change_pct);
    eprintln!(
        "  Signals:      {} buy / {} sell / {} hold",
        s.action_counts.buy, s.action_counts.sell, s.action_counts.hold
    );
    if let Some(latest) = payload.rows.last() {
        eprintln!(
            "  Latest:       {} {:.2} {} ({:+.1}) {}",
            latest.display_time, latest.price, latest.action, latest.score, latest.reason
        );
    }
    if !payload.session_labels.is_empty() {
        eprintln!("  Sessions:     {}", payload.session_labels.join(", "));
    }
    if let Some(seed) = payload.synthetic_seed {
        eprintln!("  Synthetic seed: {seed}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_flag_is_normalized() {
        let got = requested_symbols(Some(" rgti "), false, Path::new("unused.toml")).unwrap();
        assert_eq!(got, vec!["RGTI".to_string()]);
    }

    #[test]
    fn symbol_flag_rejects_path_segments() {
        for bad in ["../x", "data/RGTI", ".."] {
            assert!(
                requested_symbols(Some(bad), false, Path::new("unused.toml")).is_err(),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn symbol_or_all_required() {
        assert!(requested_symbols(None, false, Path::new("unused.toml")).is_err());
    }
}
