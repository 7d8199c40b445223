use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use graphload_core::encode::GraphDocumentEncoder;
use graphload_core::ingest::encode_elements;

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Dataset JSON file with `vertices` and `edges`
    pub dataset: PathBuf,

    /// Config file (default: ./graphload.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Emit every vertex property as a plain scalar
    #[arg(long)]
    pub flatten: bool,
}

pub fn run(args: &EncodeArgs) -> anyhow::Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let dataset = super::load_dataset(&args.dataset)?;

    let mut encoder_config = config.encoder_config();
    encoder_config.flatten_properties |= args.flatten;
    let encoder = GraphDocumentEncoder::new(encoder_config);

    let documents = encode_elements(&encoder, dataset.vertices, dataset.edges)?;

    let mut out = std::io::stdout().lock();
    for document in &documents {
        writeln!(out, "{}", document.body)?;
    }
    Ok(())
}
