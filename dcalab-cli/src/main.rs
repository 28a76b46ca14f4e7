//! DCA Lab CLI — run simulations, search symbols, and manage the cache.
//!
//! Commands:
//! - `run` — simulate plans from a TOML config or ad-hoc flags
//! - `search` — look up symbols by name or ticker
//! - `popular` — quote snapshots for the curated popular symbols
//! - `warmup` — pre-fetch the popular symbols into the cache
//! - `cache status` — report entry count and size
//! - `cache clean` — remove cached entries

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dcalab_core::data::{
    warm_up, CachedHistoryProvider, CircuitBreaker, CsvHistoryProvider, FmpProvider,
    StdoutProgress, SymbolDirectory, SyntheticProvider, TtlCache, POPULAR_SYMBOLS,
};
use dcalab_runner::{
    aggregate, export_batch, format_currency, format_percent, format_shares, rank_by_roi,
    run_batch, BatchConfig, BatchOutcome, PlanConfig,
};

#[derive(Parser)]
#[command(name = "dcalab", about = "DCA Lab CLI — dollar-cost-averaging simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate monthly plans from a TOML config or ad-hoc flags.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Symbols to simulate (e.g., AAPL MSFT VTI).
        #[arg(conflicts_with = "config")]
        symbols: Vec<String>,

        /// Contribution per month, in currency units.
        #[arg(long, default_value_t = 500.0)]
        monthly: f64,

        /// First month of the plan (YYYY-MM-DD). Defaults to 10 years ago.
        #[arg(long)]
        start: Option<String>,

        /// Offline mode: read series from CSV files in this directory.
        #[arg(long)]
        offline: Option<PathBuf>,

        /// Use deterministic synthetic series instead of live data.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Cache directory. Defaults to ./cache.
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,

        /// Export CSV artifacts to this directory.
        #[arg(long)]
        export: Option<PathBuf>,

        /// FMP API key. Defaults to the FMP_API_KEY environment variable.
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Search symbols by ticker or company name.
    Search {
        query: String,

        /// FMP API key. Defaults to the FMP_API_KEY environment variable.
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Quote snapshots for the curated popular symbols.
    Popular {
        /// FMP API key. Defaults to the FMP_API_KEY environment variable.
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Pre-fetch the popular symbols into the cache.
    Warmup {
        /// Cache directory. Defaults to ./cache.
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,

        /// FMP API key. Defaults to the FMP_API_KEY environment variable.
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report entry count and total size.
    Status {
        /// Cache directory. Defaults to ./cache.
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,
    },
    /// Remove all cached entries.
    Clean {
        /// Cache directory. Defaults to ./cache.
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,

        /// Actually delete (without this flag, only previews what would be removed).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            symbols,
            monthly,
            start,
            offline,
            synthetic,
            cache_dir,
            export,
            api_key,
        } => run_cmd(
            config, symbols, monthly, start, offline, synthetic, cache_dir, export, api_key,
        ),
        Commands::Search { query, api_key } => search_cmd(&query, api_key),
        Commands::Popular { api_key } => popular_cmd(api_key),
        Commands::Warmup { cache_dir, api_key } => warmup_cmd(&cache_dir, api_key),
        Commands::Cache { action } => match action {
            CacheAction::Status { cache_dir } => cache_status_cmd(&cache_dir),
            CacheAction::Clean { cache_dir, confirm } => cache_clean_cmd(&cache_dir, confirm),
        },
    }
}

fn resolve_api_key(flag: Option<String>) -> Result<String> {
    if let Some(key) = flag {
        return Ok(key);
    }
    std::env::var("FMP_API_KEY")
        .context("no API key: pass --api-key or set FMP_API_KEY")
}

fn fmp_provider(api_key: Option<String>) -> Result<FmpProvider> {
    let key = resolve_api_key(api_key)?;
    let breaker = Arc::new(CircuitBreaker::default_provider());
    Ok(FmpProvider::new(key, breaker))
}

#[allow(clippy::too_many_arguments)]
fn run_cmd(
    config_path: Option<PathBuf>,
    symbols: Vec<String>,
    monthly: f64,
    start: Option<String>,
    offline: Option<PathBuf>,
    synthetic: bool,
    cache_dir: PathBuf,
    export: Option<PathBuf>,
    api_key: Option<String>,
) -> Result<()> {
    let config = if let Some(path) = config_path {
        BatchConfig::from_toml_file(&path)?
    } else {
        if symbols.is_empty() {
            bail!("either --config or at least one symbol is required");
        }
        let start_date = start
            .as_deref()
            .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
            .transpose()?
            .unwrap_or_else(|| {
                chrono::Local::now().date_naive() - chrono::Duration::days(365 * 10)
            });

        let config = BatchConfig {
            monthly_investment: monthly,
            start_date,
            plans: symbols
                .into_iter()
                .map(|symbol| PlanConfig {
                    symbol,
                    display_name: None,
                    monthly_investment: None,
                    start_date: None,
                })
                .collect(),
        };
        config.validate()?;
        config
    };

    let outcome = if let Some(data_dir) = offline {
        let provider = CsvHistoryProvider::new(data_dir);
        run_batch(&provider, &config)
    } else if synthetic {
        let provider = SyntheticProvider::new();
        run_batch(&provider, &config)
    } else {
        let provider =
            CachedHistoryProvider::new(fmp_provider(api_key)?, TtlCache::new(&cache_dir));
        run_batch(&provider, &config)
    };

    print_outcome(&outcome);

    if let Some(export_dir) = export {
        let run_dir = export_batch(&export_dir, &config, &outcome.runs)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }

    if !outcome.all_succeeded() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_outcome(outcome: &BatchOutcome) {
    let mut summaries: Vec<_> = outcome.runs.iter().map(|r| r.summary.clone()).collect();
    rank_by_roi(&mut summaries);

    if !summaries.is_empty() {
        println!();
        println!(
            "{:<4} {:<8} {:>12} {:>12} {:>9} {:>8} {:>8} {:>10}",
            "Rank", "Symbol", "Invested", "Value", "ROI", "CAGR", "Vol", "Shares"
        );
        println!("{}", "-".repeat(78));
        for (i, s) in summaries.iter().enumerate() {
            println!(
                "{:<4} {:<8} {:>12} {:>12} {:>9} {:>8} {:>8} {:>10}",
                i + 1,
                s.symbol,
                format_currency(s.total_invested),
                format_currency(s.portfolio_value),
                format_percent(s.roi),
                format_percent(s.cagr),
                format_percent(s.volatility),
                format_shares(s.total_shares),
            );
        }

        let portfolio = aggregate(&summaries);
        println!();
        println!("--- Portfolio ---");
        println!("Symbols:        {}", portfolio.symbol_count);
        println!("Invested:       {}", format_currency(portfolio.total_invested));
        println!("Value:          {}", format_currency(portfolio.portfolio_value));
        println!("ROI:            {}", format_percent(portfolio.roi));
        println!("CAGR:           {}", format_percent(portfolio.cagr));
        println!("Avg plan years: {:.1}", portfolio.avg_years);
    }

    if !outcome.failures.is_empty() {
        println!();
        for (symbol, err) in &outcome.failures {
            eprintln!("Error for {symbol}: {err}");
        }
    }
    println!();
}

fn search_cmd(query: &str, api_key: Option<String>) -> Result<()> {
    let provider = fmp_provider(api_key)?;
    let matches = provider.search(query)?;

    if matches.is_empty() {
        println!("No matches for '{query}'.");
        return Ok(());
    }

    println!("{:<8} {:<40} {:<10}", "Symbol", "Name", "Exchange");
    println!("{}", "-".repeat(60));
    for m in &matches {
        println!("{:<8} {:<40} {:<10}", m.symbol, m.name, m.exchange);
    }
    Ok(())
}

fn popular_cmd(api_key: Option<String>) -> Result<()> {
    let provider = fmp_provider(api_key)?;
    let quotes = provider.popular_quotes()?;

    println!("{:<8} {:>10} {:>9} {:>9}", "Symbol", "Price", "Change", "Change%");
    println!("{}", "-".repeat(40));
    for q in &quotes {
        println!(
            "{:<8} {:>10.2} {:>9.2} {:>9}",
            q.symbol,
            q.price,
            q.change,
            format_percent(q.change_percent)
        );
    }
    Ok(())
}

fn warmup_cmd(cache_dir: &Path, api_key: Option<String>) -> Result<()> {
    let provider =
        CachedHistoryProvider::new(fmp_provider(api_key)?, TtlCache::new(cache_dir));
    let summary = warm_up(&provider, &POPULAR_SYMBOLS, &StdoutProgress);

    if !summary.all_succeeded() {
        for (sym, err) in &summary.errors {
            eprintln!("Error for {sym}: {err}");
        }
        std::process::exit(1);
    }
    Ok(())
}

fn cache_status_cmd(cache_dir: &Path) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let cache = TtlCache::new(cache_dir);
    let status = cache.status()?;

    if status.entries == 0 {
        println!("Cache is empty: {}", cache_dir.display());
        return Ok(());
    }

    println!("Cache: {}", cache_dir.display());
    println!("Entries: {}", status.entries);
    println!("Total size: {}", format_size(status.total_bytes));
    Ok(())
}

fn cache_clean_cmd(cache_dir: &Path, confirm: bool) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let cache = TtlCache::new(cache_dir);
    let status = cache.status()?;

    if status.entries == 0 {
        println!("Cache is already empty.");
        return Ok(());
    }

    println!(
        "Would remove {} entries ({}).",
        status.entries,
        format_size(status.total_bytes)
    );

    if !confirm {
        println!();
        println!("Dry run — pass --confirm to actually delete.");
        return Ok(());
    }

    let removed = cache.clear()?;
    println!("Done. Removed {removed} entries.");
    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
