use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tracing::info;

use graphload_core::aggregate::BatchSummary;
use graphload_core::ingest::BulkImporter;
use graphload_core::model::GraphElement;
use graphload_core::progress::IndicatifReporter;
use graphload_core::store::http::HttpDocumentStore;
use graphload_core::store::{DocumentStore, InMemoryStore};

use super::Outcome;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Dataset JSON file with `vertices` and `edges`
    pub dataset: PathBuf,

    /// Config file (default: ./graphload.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write into an in-memory store instead of the configured endpoint
    #[arg(long)]
    pub dry_run: bool,

    /// Cap on concurrent writes (overrides batch.max_in_flight)
    #[arg(long)]
    pub max_in_flight: Option<NonZeroUsize>,

    /// Token forwarded verbatim in the authorization header
    #[arg(long, env = "GRAPHLOAD_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,
}

pub async fn run(args: ImportArgs, quiet: bool) -> anyhow::Result<Outcome> {
    let mut config = super::load_config(args.config.as_deref())?;
    if let Some(token) = args.auth_token {
        config.store.auth_token = Some(token);
    }
    let dataset = super::load_dataset(&args.dataset)?;

    let store: Arc<dyn DocumentStore> = if args.dry_run {
        Arc::new(InMemoryStore::new())
    } else {
        Arc::new(
            HttpDocumentStore::from_config(&config.store)
                .context("Cannot create store client")?,
        )
    };
    info!(store = store.name(), elements = dataset.len(), "Starting import");

    let mut options = config.batch_options();
    if args.max_in_flight.is_some() {
        options.max_in_flight = args.max_in_flight;
    }
    let importer = BulkImporter::new(store, config.encoder_config(), options);

    let reporter = if quiet {
        IndicatifReporter::hidden()
    } else {
        IndicatifReporter::stderr()
    };
    let summary = importer
        .import_dataset(dataset, &reporter)
        .await
        .with_context(|| format!("Cannot import dataset: {}", args.dataset.display()))?;

    if !quiet {
        print_summary(&summary);
    }

    Ok(if summary.has_failures() {
        Outcome::Partial
    } else {
        Outcome::Complete
    })
}

fn print_summary(summary: &BatchSummary<GraphElement>) {
    println!(
        "Imported {} of {} elements in {:.2?} ({:.2} cost units)",
        summary.success_count,
        summary.total_count(),
        summary.elapsed,
        summary.total_cost_units,
    );
    for (element, detail) in &summary.failures {
        println!("  failed {element}: {detail}");
    }
}
