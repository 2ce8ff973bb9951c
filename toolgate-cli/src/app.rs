//! Subcommand execution.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use toolgate_catalog::{SpecLoader, SpecSource};
use toolgate_config::{ConfigLoader, GatewayConfig};
use toolgate_forwarder::{HttpDocumentFetcher, HttpTransport, HyperTransport, RequestForwarder};
use toolgate_navigator::{Gateway, NavigationState, NavigationTool};
use toolgate_policy::TracingPolicyObserver;
use tracing::info;

use crate::cli::{Cli, Command};

pub async fn run(cli: Cli) -> Result<std::process::ExitCode> {
    let mut loader = ConfigLoader::new().with_overrides(cli.global.overrides());
    if let Some(path) = &cli.global.config {
        loader = loader.with_file(path);
    }
    let config = loader.load().context("invalid configuration")?;

    toolgate_telemetry::init(toolgate_telemetry::verbosity_directive(
        cli.global.verbose,
        &config.log_filter,
    ))?;

    let gateway = build_gateway(&config).await?;
    let mut state = NavigationState::default();

    match cli.command {
        Command::Categories => {
            let outcome = gateway.navigate(&mut state, NavigationTool::BrowseCategories, &Value::Null)?;
            println!("{}", outcome.text().unwrap_or_default());
        }
        Command::Tools { category } => {
            if let Some(category) = category {
                gateway.navigate(
                    &mut state,
                    NavigationTool::SelectCategory,
                    &serde_json::json!({ "category": category }),
                )?;
            }
            println!("{}", serde_json::to_string_pretty(&gateway.list_tools(&state))?);
        }
        Command::Call { tool, args } => {
            let arguments: Value =
                serde_json::from_str(&args).context("--args must be a JSON object")?;
            match gateway.call(&mut state, &tool, &arguments, None).await {
                Ok(outcome) => println!("{}", serde_json::to_string_pretty(outcome.output())?),
                Err(failure) => {
                    println!("{}", serde_json::to_string_pretty(&failure)?);
                    return Ok(std::process::ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(std::process::ExitCode::SUCCESS)
}

async fn build_gateway(config: &GatewayConfig) -> Result<Gateway> {
    let transport: Arc<dyn HttpTransport> = Arc::new(HyperTransport::new(config.request_timeout()));
    let credential = config.credential()?;

    let fetcher = HttpDocumentFetcher::new(Arc::clone(&transport), credential.clone());
    let source = SpecSource::parse(&config.spec_source());
    let catalog = SpecLoader::new()
        .with_fetcher(Arc::new(fetcher))
        .load(&source, None)
        .await
        .with_context(|| format!("failed to load API description from {}", source.location()))?;
    info!(
        title = catalog.title().unwrap_or("untitled"),
        operations = catalog.len(),
        rejected = catalog.rejected().len(),
        "catalog ready"
    );

    let forwarder = RequestForwarder::new(transport, &config.base_url)?.with_credential(credential);
    Ok(Gateway::new(Arc::new(catalog), forwarder, config.mode)
        .with_strategy(config.discovery)
        .with_policy_observer(Arc::new(TracingPolicyObserver)))
}
