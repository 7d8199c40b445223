use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use graphload_core::config::{CONFIG_FILE, GraphLoadConfig};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to write graphload.toml into (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite an existing graphload.toml
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &InitArgs) -> anyhow::Result<()> {
    if !args.path.is_dir() {
        anyhow::bail!("Cannot resolve path: {}", args.path.display());
    }

    let config_path = args.path.join(CONFIG_FILE);
    if config_path.exists() && !args.force {
        anyhow::bail!(
            "A config already exists at {}. Use --force to overwrite it.",
            config_path.display()
        );
    }

    let text = GraphLoadConfig::default().to_toml_string()?;
    std::fs::write(&config_path, text)
        .with_context(|| format!("Cannot write config: {}", config_path.display()))?;

    println!("Wrote {}", config_path.display());
    Ok(())
}
