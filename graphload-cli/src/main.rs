use clap::Parser;

use graphload_core::error::{ConfigError, DatasetError, GraphLoadError, StoreError};

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "graphload",
    version,
    about = "Encode graph vertices and edges into store documents and bulk-import them"
)]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Exit code for a run where some writes failed and the rest succeeded.
const EXIT_PARTIAL: i32 = 10;

/// Classify an error into a process exit code.
///
///   0  success
///   1  general/unknown error
///   2  configuration error
///   3  dataset not found or invalid
///   4  store error
///   10 partial success (some writes failed)
fn classify_exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if cause.is::<ConfigError>() {
            return 2;
        }
        if cause.is::<DatasetError>() {
            return 3;
        }
        if cause.is::<StoreError>() {
            return 4;
        }
        if let Some(err) = cause.downcast_ref::<GraphLoadError>() {
            return match err {
                GraphLoadError::Config(_) => 2,
                GraphLoadError::Dataset(_) | GraphLoadError::Model(_) | GraphLoadError::Encode(_) => 3,
                GraphLoadError::Store(_) => 4,
            };
        }
    }

    let lower = format!("{err:#}").to_lowercase();
    if lower.contains("config") {
        2
    } else if lower.contains("dataset") {
        3
    } else if lower.contains("store") {
        4
    } else {
        1
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (_, 0) => "warn",
        (_, 1) => "info",
        (_, 2) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: Failed to create runtime: {e}");
            std::process::exit(1);
        }
    };

    match runtime.block_on(commands::run(cli.command, cli.quiet)) {
        Ok(commands::Outcome::Complete) => std::process::exit(0),
        Ok(commands::Outcome::Partial) => std::process::exit(EXIT_PARTIAL),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(classify_exit_code(&e));
        }
    }
}
