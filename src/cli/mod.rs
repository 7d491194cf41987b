//! `vitrine-cli`: manual operations on the filter cache.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use vitrine_cache::{CacheConfig, FilterStore, MemoryFilterStore};
use vitrine_config::{AggregatorConfig, ClassifierConfig, PricingConfig};
use vitrine_db::InMemoryCatalog;
use vitrine_models::{
    CatalogItem, CategoryId, CollectionId, ContextKey, FilterSnapshot, FilterSummary,
    ProductTypeId,
};

use crate::aggregation::FacetClassifier;
use crate::jobs::{FilterCacheJob, JobOutcome, JobReport};
use crate::modules::filters::FilterMetadataService;
use crate::state::{init_app_state, init_filter_store};

#[derive(Parser)]
#[command(name = "vitrine-cli")]
#[command(about = "Vitrine CLI - Filter cache maintenance tools", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rebuild the filter cache from the catalog now
    Warm,
    /// Print the cached mapping and its remaining TTL
    Show {
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Resolve one listing context the way the HTTP endpoint does
    Lookup {
        /// Product type id (repeatable)
        #[arg(long = "type-id")]
        type_id: Vec<String>,

        /// Collection id (repeatable)
        #[arg(long = "collection-id")]
        collection_id: Vec<String>,

        /// Category id (repeatable)
        #[arg(long = "category-id")]
        category_id: Vec<String>,
    },
    /// Aggregate a JSON array of catalog items offline
    Aggregate {
        /// Path to the fixture file
        #[arg(short = 'f', long)]
        fixture: PathBuf,

        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Delete the cached mapping
    Clear,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Warm => warm().await,
        Commands::Show { json } => show(json).await,
        Commands::Lookup {
            type_id,
            collection_id,
            category_id,
        } => {
            let context = ContextKey::from_filters(
                type_id.into_iter().map(ProductTypeId::from),
                collection_id.into_iter().map(CollectionId::from),
                category_id.into_iter().map(CategoryId::from),
            );
            lookup(context).await
        }
        Commands::Aggregate { fixture, json } => aggregate(fixture, json).await,
        Commands::Clear => clear().await,
    }
}

/// Store for one-shot commands: an unreachable Redis is an error here,
/// never a silent in-memory substitute.
async fn connect_store() -> anyhow::Result<Arc<dyn FilterStore>> {
    let config = CacheConfig {
        fallback_in_memory: false,
        ..CacheConfig::from_env()
    };
    init_filter_store(&config).await
}

async fn warm() -> anyhow::Result<()> {
    let state = init_app_state().await?;
    match FilterCacheJob::from_state(&state).run_once().await? {
        JobOutcome::Completed(report) => print_report(&report),
        JobOutcome::Skipped => bail!("Another instance is rebuilding the filter cache"),
    }
    Ok(())
}

async fn show(json: bool) -> anyhow::Result<()> {
    let store = connect_store().await?;
    let snapshot = store.load_snapshot().await?;
    let ttl = store.ttl().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    match ttl {
        Some(ttl) => println!("TTL: {}s", ttl.as_secs()),
        None => println!("TTL: none (mapping absent)"),
    }
    print!("{}", format_snapshot(&snapshot));
    Ok(())
}

async fn lookup(context: ContextKey) -> anyhow::Result<()> {
    let state = init_app_state().await?;
    let resolution = FilterMetadataService::resolve(&state, &context)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    println!("Context: {context}");
    println!("Source:  {}", resolution.source.as_str());
    println!("{}", serde_json::to_string_pretty(&resolution.summary)?);
    Ok(())
}

async fn aggregate(fixture: PathBuf, json: bool) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(&fixture)
        .await
        .with_context(|| format!("Failed to read {}", fixture.display()))?;
    let items: Vec<CatalogItem> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of catalog items", fixture.display()))?;

    let (report, snapshot) = aggregate_items(
        items,
        FacetClassifier::from_config(&ClassifierConfig::from_env()),
        PricingConfig::from_env(),
    )
    .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_report(&report);
        print!("{}", format_snapshot(&snapshot));
    }
    Ok(())
}

/// Runs the scheduled job over a fixed item list and an in-process store.
pub async fn aggregate_items(
    items: Vec<CatalogItem>,
    classifier: FacetClassifier,
    pricing: PricingConfig,
) -> anyhow::Result<(JobReport, FilterSnapshot)> {
    let store = Arc::new(MemoryFilterStore::new(Duration::from_secs(3600)));
    let job = FilterCacheJob::new(
        Arc::new(InMemoryCatalog::new(items)),
        store.clone(),
        Arc::new(classifier),
        pricing,
        AggregatorConfig {
            batch_delay: Duration::ZERO,
            ..AggregatorConfig::default()
        },
    );

    match job.run_once().await? {
        JobOutcome::Completed(report) => Ok((report, store.load_snapshot().await?)),
        JobOutcome::Skipped => bail!("in-process lock unexpectedly held"),
    }
}

async fn clear() -> anyhow::Result<()> {
    connect_store().await?.clear().await?;
    println!("Filter cache cleared");
    Ok(())
}

fn print_report(report: &JobReport) {
    println!(
        "Aggregated {} products into {} contexts ({} pages, {} ms)",
        report.products,
        report.contexts,
        report.pages,
        report.duration.as_millis()
    );
    if !report.unclassified.is_empty() {
        let titles: Vec<&str> = report.unclassified.iter().map(String::as_str).collect();
        println!("Unclassified option titles: {}", titles.join(", "));
    }
}

fn join(values: &std::collections::BTreeSet<String>) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

fn format_summary(summary: &FilterSummary) -> String {
    format!(
        "  products: {}\n  price:    {}..{}\n  colors:   {}\n  styles:   {}\n  sizes:    {}\n",
        summary.product_count,
        summary.price_range.min,
        summary.price_range.max,
        join(&summary.colors),
        join(&summary.styles),
        join(&summary.sizes),
    )
}

pub fn format_snapshot(snapshot: &FilterSnapshot) -> String {
    if snapshot.is_empty() {
        return "No cached contexts\n".to_string();
    }

    snapshot
        .iter()
        .map(|(key, summary)| format!("{key}\n{}", format_summary(summary)))
        .collect()
}
