//! # Order Pipeline Harness
//!
//! Runs one pipeline invocation against a JSON event read from a file or
//! stdin and prints the result. `ingest` and `publish` talk to PostgreSQL;
//! `validate` and `enrich` are pure and need no database.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use order_pipeline::logging::{init_structured_logging, init_structured_logging_for};
use order_pipeline::messaging::{InMemoryEventChannel, PgmqEventChannel};
use order_pipeline::pipeline::OrderPipeline;
use order_pipeline::storage::{InMemoryOrderStore, PgOrderStore};
use order_pipeline::PipelineConfig;
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "order-pipeline")]
#[command(about = "Run order pipeline invocations from the command line")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Invocation event JSON file (reads stdin when omitted)
    #[arg(short, long, global = true)]
    payload: Option<PathBuf>,

    /// Configuration file layered under environment variables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate, enrich, assign ids and persist every record of a batch
    Ingest,

    /// Emit every record of a batch to the event channel
    Publish {
        /// Event bus whose queue should be created before publishing (repeatable)
        #[arg(long = "create-queue")]
        create_queues: Vec<String>,
    },

    /// Validate the `detail` of a single envelope
    Validate,

    /// Add `detail.priority` to a single envelope
    Enrich,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match PipelineConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_structured_logging();
            error!(error = %e, "Configuration could not be loaded");
            eprintln!("error: {e}");
            process::exit(2);
        }
    };
    init_structured_logging_for(&config.environment);

    match run(cli, config).await {
        Ok(success) => {
            if !success {
                process::exit(1);
            }
        }
        Err(e) => {
            error!(error = %e, "Invocation could not be run");
            eprintln!("error: {e:#}");
            process::exit(2);
        }
    }
}

/// Returns whether the invocation reported success
async fn run(cli: Cli, config: PipelineConfig) -> Result<bool> {
    let event = read_event(cli.payload.as_deref())?;

    match cli.command {
        Commands::Ingest => {
            let store = PgOrderStore::connect(&config)
                .await
                .context("connecting order store")?;
            let channel = PgmqEventChannel::new(store.pool().clone());
            let pipeline = OrderPipeline::from_config(&config, Arc::new(store), Arc::new(channel));

            let result = pipeline.ingest(&event).await;
            print_json(&serde_json::to_value(&result)?)?;
            Ok(result.is_success())
        }
        Commands::Publish { create_queues } => {
            let store = PgOrderStore::connect(&config)
                .await
                .context("connecting event channel")?;
            let channel = PgmqEventChannel::new(store.pool().clone());
            for bus in &create_queues {
                channel
                    .ensure_queue(bus)
                    .await
                    .with_context(|| format!("creating queue for event bus '{bus}'"))?;
                info!(bus = %bus, "Event queue ready");
            }
            let pipeline = OrderPipeline::from_config(&config, Arc::new(store), Arc::new(channel));

            let result = pipeline.publish(&event).await;
            print_json(&serde_json::to_value(&result)?)?;
            Ok(result.is_success())
        }
        Commands::Validate => {
            let result = offline_pipeline(&config).validate(&event);
            print_json(&serde_json::to_value(&result)?)?;
            Ok(result.is_success())
        }
        Commands::Enrich => {
            let enriched = offline_pipeline(&config).enrich(event);
            print_json(&enriched)?;
            Ok(true)
        }
    }
}

/// Pure invocations never reach the store or the channel
fn offline_pipeline(config: &PipelineConfig) -> OrderPipeline {
    OrderPipeline::from_config(
        config,
        Arc::new(InMemoryOrderStore::new()),
        Arc::new(InMemoryEventChannel::default()),
    )
}

fn read_event(path: Option<&std::path::Path>) -> Result<Value> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading payload from {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("reading payload from stdin")?;
            buffer
        }
    };

    serde_json::from_str(&text).context("payload is not valid JSON")
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
