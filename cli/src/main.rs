//! rdfsync CLI: run one SPARQL request against a configured graph store
//!
//! ```text
//! rdfsync -j store.xml -J modelName=http://example.org/g -q 'SELECT * WHERE { ?s ?p ?o }' -Q RS_JSON
//! ```
//!
//! Results go to stdout; logging goes to stderr (`RUST_LOG` overrides the
//! default `info` level).

use anyhow::Context;
use clap::Parser;
use rdfsync::config::parse_override;
use rdfsync::{QueryKind, StoreFactory};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rdfsync", version, about = "Run a SPARQL request against a graph store")]
struct Cli {
    /// Store configuration document
    #[arg(short = 'j', long = "config", value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Override a configuration parameter (repeatable)
    #[arg(
        short = 'J',
        long = "config-override",
        value_name = "KEY=VALUE",
        value_parser = parse_override
    )]
    overrides: Vec<(String, String)>,

    /// SPARQL query or update
    #[arg(short = 'q', long = "query")]
    query: String,

    /// Result format (RS_TEXT, RS_JSON, ... for SELECT; RDF/XML, N-TRIPLE, ... for CONSTRUCT/DESCRIBE)
    #[arg(short = 'Q', long = "result-format", value_name = "RESULT_FORMAT")]
    result_format: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut store = StoreFactory::from_config_file(cli.config.as_deref(), cli.overrides)
        .context("cannot build graph store")?;

    if QueryKind::detect(&cli.query)?.is_update() {
        let outcome = store.execute_update(&cli.query)?;
        tracing::info!(
            "update applied: {} added, {} removed",
            outcome.added,
            outcome.removed
        );
    } else {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        store.execute_query(&cli.query, cli.result_format.as_deref(), &mut out)?;
        out.flush()?;
    }

    store.close()?;
    Ok(())
}
