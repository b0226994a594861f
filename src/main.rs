//! # Outreach Connectors CLI
//!
//! Local host harness: lists operations, tests credentials and runs batches
//! described by a JSON input file.

use std::{fs, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use outreach_connectors::{
    config::ConfigLoader,
    connectors::Registry,
    credentials::InMemoryCredentialStore,
    execution::{Dispatcher, ExecutionOptions, ItemParameters},
    http::{AuthenticatedClient, ReqwestTransport},
    telemetry::{self, RunContext},
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "outreach-connectors", version, about = "Anymailfinder and Smartlead workflow connectors")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the registered connectors
    Connectors,
    /// Print the operations offered for a resource
    Operations { connector: String, resource: String },
    /// Send the connector's credential test request
    TestCredentials { connector: String },
    /// Execute a batch from a JSON file of the form {"parameters": {...}, "items": [...]}
    Run {
        connector: String,
        #[arg(long, short)]
        input: PathBuf,
        /// Record failing items as {"error": ...} instead of aborting
        #[arg(long)]
        continue_on_fail: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;
    telemetry::init_tracing(&config).context("initializing telemetry")?;
    info!(profile = %config.profile, "Loaded configuration");

    let registry = Registry::from_config(&config).context("building connector registry")?;

    match cli.command {
        Command::Connectors => {
            println!("{}", serde_json::to_string_pretty(&registry.list_metadata())?);
        }
        Command::Operations {
            connector,
            resource,
        } => {
            let connector = registry.get(&connector)?;
            let operations = connector.load_operations(&resource);
            println!("{}", serde_json::to_string_pretty(&operations)?);
        }
        Command::TestCredentials { connector } => {
            let connector = registry.get(&connector)?;
            let client = authenticated_client(&config);
            client
                .test_credentials(connector.as_ref())
                .await
                .with_context(|| format!("credential test for '{}' failed", connector.name()))?;
            println!("Credentials for '{}' are valid", connector.name());
        }
        Command::Run {
            connector,
            input,
            continue_on_fail,
        } => {
            let connector = registry.get(&connector)?;
            let raw = fs::read_to_string(&input)
                .with_context(|| format!("reading input file {}", input.display()))?;
            let params: ItemParameters = serde_json::from_str(&raw)
                .with_context(|| format!("parsing input file {}", input.display()))?;
            if params.parameters.is_empty() && params.items.is_empty() {
                bail!("input file {} contains no parameters", input.display());
            }
            // An input without items runs once on its shared parameters.
            let params = params.or_single_item();

            let dispatcher = Dispatcher::new(connector, authenticated_client(&config));
            let options = ExecutionOptions {
                continue_on_fail: continue_on_fail || config.continue_on_fail,
            };
            let records = telemetry::with_run_context(
                RunContext::generate(),
                dispatcher.execute(&params, options),
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}

fn authenticated_client(config: &outreach_connectors::config::AppConfig) -> AuthenticatedClient {
    let transport = ReqwestTransport::new(Some(Duration::from_secs(config.request_timeout_secs)));
    let credentials = InMemoryCredentialStore::from_config(config);
    AuthenticatedClient::new(Arc::new(transport), Arc::new(credentials))
}
