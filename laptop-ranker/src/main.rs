use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use laptop_ranker::sources::default_registry;
use laptop_ranker::{
    extract, AppConfig, BenchmarkStore, Category, FetchMode, HttpDriver, Profile, RankerError,
    RankingPipeline, ResultCache, ScrapeOrchestrator, SearchRequest, ValuationEngine,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "laptop-ranker",
    about = "Find laptop listings on French retailers and rank them by value for money"
)]
struct Cli {
    /// Root of the per-day listing cache
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Directory holding cpu_ranks.json, gpu_ranks.json and deep_specs.json
    #[arg(long, global = true)]
    bench_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search every retailer and print the best-value listings
    Rank {
        query: String,

        /// gaming, work or general
        #[arg(long, default_value = "gaming")]
        category: Category,

        #[arg(long)]
        country: Option<String>,

        #[arg(long)]
        min_price: Option<f64>,

        #[arg(long)]
        max_price: Option<f64>,

        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Ignore today's cached snapshots
        #[arg(long, default_value_t = false)]
        refresh: bool,

        /// Attach the full score breakdown to every row
        #[arg(long, default_value_t = false)]
        breakdown: bool,

        /// Print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the hardware fingerprint found in a product title
    Extract { text: String },
    /// Score one listing and print its breakdown
    Score {
        title: String,

        #[arg(long)]
        price: f64,

        #[arg(long, default_value = "")]
        specs: String,

        #[arg(long, default_value = "gaming")]
        category: Category,
    },
    /// List the registered retailers
    Sources,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    if let Some(dir) = cli.cache_dir {
        config.cache_dir = dir;
    }
    if let Some(dir) = cli.bench_dir {
        config.bench_dir = dir;
    }

    match cli.command {
        Command::Rank {
            query,
            category,
            country,
            min_price,
            max_price,
            limit,
            refresh,
            breakdown,
            json,
        } => {
            let country = country.unwrap_or_else(|| config.default_country.clone());
            let request = SearchRequest::new(query, category)
                .with_country(country)
                .with_price_range(min_price, max_price)
                .with_limit(limit);
            let mode = if refresh {
                FetchMode::ForceRefresh
            } else {
                FetchMode::CacheFirst
            };
            run_rank(&config, &request, mode, breakdown, json).await
        }
        Command::Extract { text } => {
            println!("{}", serde_json::to_string_pretty(&extract(&text))?);
            Ok(())
        }
        Command::Score {
            title,
            price,
            specs,
            category,
        } => {
            let store = load_store(&config).await?;
            let engine = ValuationEngine::new(store).profiled(Profile::for_category(category));
            let breakdown = engine.breakdown(&title, &specs, price);
            println!("{}", serde_json::to_string_pretty(&breakdown)?);
            Ok(())
        }
        Command::Sources => {
            let driver = Arc::new(HttpDriver::new(&config.scrape)?);
            for adapter in default_registry(driver, &config.scrape) {
                println!("{}", serde_json::to_string(&adapter.metadata())?);
            }
            Ok(())
        }
    }
}

async fn load_store(config: &AppConfig) -> Result<Arc<BenchmarkStore>> {
    let store = BenchmarkStore::load(config)
        .await
        .with_context(|| format!("loading benchmarks from {}", config.bench_dir.display()))?;
    info!(
        "Loaded {} CPU and {} GPU benchmark entries",
        store.cpu_table().len(),
        store.gpu_table().len()
    );
    Ok(Arc::new(store))
}

async fn run_rank(
    config: &AppConfig,
    request: &SearchRequest,
    mode: FetchMode,
    include_breakdown: bool,
    json: bool,
) -> Result<()> {
    let store = load_store(config).await?;
    let driver = Arc::new(HttpDriver::new(&config.scrape).context("building HTTP driver")?);

    let cache = Arc::new(ResultCache::new(&config.cache_dir));
    let mut orchestrator = ScrapeOrchestrator::new(cache, &config.scrape)
        .with_lookback_days(config.lookback_days);
    for adapter in default_registry(driver, &config.scrape) {
        orchestrator.register(adapter);
    }

    let pipeline = RankingPipeline::new(Arc::new(orchestrator), ValuationEngine::new(store));
    let outcome = match pipeline.rank(request, mode).await {
        Ok(outcome) => outcome,
        Err(RankerError::NoResults { diagnostics }) => {
            error!("No listings found: {}", diagnostics);
            for source in &diagnostics.sources {
                error!("  {}: {:?}", source.source, source.status);
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let items = outcome.to_ranked_items(include_breakdown);
    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    println!("Results for '{}' ({})", outcome.query, outcome.diagnostics);
    for item in &items {
        println!(
            "{:>3}. {:>7.3}  {:>9.2} {}  [{}] {}",
            item.rank, item.score, item.price, item.currency, item.source, item.title
        );
        println!("       {}", item.url);
        if let Some(breakdown) = &item.breakdown {
            println!("       {}", breakdown);
        }
    }
    Ok(())
}
