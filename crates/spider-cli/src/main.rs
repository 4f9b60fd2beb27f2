//! `spider` binary: serve the map API, or run a scenario in batch.
//!
//! # Startup Sequence
//!
//! 1. Parse the command line
//! 2. Load the deployment configuration
//! 3. Initialize structured logging (tracing), honouring `RUST_LOG` and
//!    falling back to the configured level
//! 4. Load the hex dataset and run the first evaluation
//! 5. Serve the HTTP API, or apply the batch scenario and write the result

mod batch;
mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use spider_core::{Session, SpiderConfig};
use spider_server::{AppState, start_server};
use spider_types::ParameterSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "spider")]
#[command(about = "Interactive hex-grid siting models for infrastructure planning")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the map API
    Serve {
        /// Deployment configuration (YAML)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Apply parameter overrides and drawn lines, then export the grid
    Run {
        /// Deployment configuration (YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// GeoJSON FeatureCollection of drawn infrastructure; each feature
        /// names its attribute in `properties.type`
        #[arg(long)]
        lines: Option<PathBuf>,

        /// Parameter override, repeatable (e.g. `--set duration=15`)
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,

        /// Where to write the resulting FeatureCollection
        #[arg(short, long)]
        out: PathBuf,
    },
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, data loading, the server, or the
/// batch run fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Command::Serve { config } => serve(&config).await?,
        Command::Run {
            config,
            lines,
            set,
            out,
        } => run(&config, lines.as_deref(), &set, &out)?,
    }
    Ok(())
}

fn init_tracing(config: &SpiderConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();
}

fn load(path: &Path) -> Result<(SpiderConfig, Session), CliError> {
    let config = SpiderConfig::from_file(path)?;
    init_tracing(&config);
    info!(
        name = %config.name,
        model = %config.model,
        data = %config.data.display(),
        parameters = config.pars.len(),
        "configuration loaded"
    );
    let session = Session::from_config(&config)?;
    Ok((config, session))
}

async fn serve(path: &Path) -> Result<(), CliError> {
    let (config, session) = load(path)?;
    let state = Arc::new(AppState::new(session));
    start_server(&config.server, state).await?;
    Ok(())
}

fn run(
    path: &Path,
    lines: Option<&Path>,
    set: &[String],
    out: &Path,
) -> Result<(), CliError> {
    let (_, mut session) = load(path)?;

    let overrides = set
        .iter()
        .map(|s| batch::parse_assignment(s))
        .collect::<Result<ParameterSet, _>>()?;
    let lines = match lines {
        Some(p) => {
            let collection: serde_json::Value =
                serde_json::from_str(&std::fs::read_to_string(p)?)?;
            batch::parse_lines(&collection)?
        }
        None => Vec::new(),
    };

    batch::apply(&mut session, &overrides, &lines)?;

    let summary = session.summary();
    std::fs::write(out, serde_json::to_string_pretty(&session.feature_collection())?)?;
    info!(
        out = %out.display(),
        cells = summary.cells,
        techs = ?summary.tech_counts,
        "scenario written"
    );
    Ok(())
}
