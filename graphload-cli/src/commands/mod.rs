pub mod encode;
pub mod import;
pub mod init;

use std::path::Path;

use anyhow::Context;
use clap::Subcommand;
use tracing::debug;

use graphload_core::config::{CONFIG_FILE, GraphLoadConfig};
use graphload_core::dataset::GraphDataset;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default graphload.toml
    Init(init::InitArgs),
    /// Print the store documents a dataset encodes to, without writing them
    Encode(encode::EncodeArgs),
    /// Encode a dataset and bulk-import it into the document store
    Import(import::ImportArgs),
}

/// How a successful command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Complete,
    /// Some writes failed; the rest were applied.
    Partial,
}

pub async fn run(cmd: Command, quiet: bool) -> anyhow::Result<Outcome> {
    match cmd {
        Command::Init(args) => init::run(&args).map(|()| Outcome::Complete),
        Command::Encode(args) => encode::run(&args).map(|()| Outcome::Complete),
        Command::Import(args) => import::run(args, quiet).await,
    }
}

/// Load the config named on the command line, else `graphload.toml` in the
/// working directory if present, else the defaults.
pub(crate) fn load_config(explicit: Option<&Path>) -> anyhow::Result<GraphLoadConfig> {
    if let Some(path) = explicit {
        return GraphLoadConfig::load(path)
            .with_context(|| format!("Cannot load config: {}", path.display()));
    }

    let local = Path::new(CONFIG_FILE);
    if local.exists() {
        return GraphLoadConfig::load(local)
            .with_context(|| format!("Cannot load config: {}", local.display()));
    }

    debug!("No {CONFIG_FILE} found, using defaults");
    Ok(GraphLoadConfig::default())
}

pub(crate) fn load_dataset(path: &Path) -> anyhow::Result<GraphDataset> {
    GraphDataset::load(path).with_context(|| format!("Cannot load dataset: {}", path.display()))
}
