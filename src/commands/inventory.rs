use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use nim_inventory::nim::{collect_hosts, collect_master, collect_resources, CollectionWarning, HostRole, Inventory};
use nim_inventory::{collect_nim_inventory, CommandRunner, Settings, ShellRunner};
use serde::Serialize;
use tracing::info;

use crate::cli::{CollectArgs, Commands};
use crate::output::{output_data, print_success, print_warnings};

/// Document published to the inventory API, the estate under `nim` and the
/// hosts and resources that could not be fully collected under `warnings`.
#[derive(Debug, Serialize)]
struct Publication<'a> {
    collected_at: DateTime<Utc>,
    nim: &'a Inventory,
    warnings: &'a [CollectionWarning],
}

impl<'a> Publication<'a> {
    fn new(inventory: &'a Inventory, collected_at: DateTime<Utc>) -> Self {
        Self {
            collected_at,
            nim: inventory,
            warnings: &inventory.warnings,
        }
    }
}

fn build_settings(config: Option<&Path>, collect: &CollectArgs) -> anyhow::Result<Arc<Settings>> {
    let mut settings = Settings::load(config)?;
    if let Some(path) = &collect.niminfo {
        settings.niminfo_path = path.clone();
    }
    if let Some(timeout) = collect.timeout {
        settings.remote_timeout_secs = timeout;
    }
    if let Some(parallelism) = collect.parallelism {
        settings.max_parallelism = parallelism;
    }
    Ok(Arc::new(settings))
}

pub async fn handle_command(cmd: &Commands, config: Option<&Path>) -> anyhow::Result<()> {
    let runner: Arc<dyn CommandRunner> = Arc::new(ShellRunner);

    match cmd {
        Commands::Inventory { collect, format } => {
            let settings = build_settings(config, collect)?;
            let inventory = collect_nim_inventory(runner, settings).await?;
            output_data(&inventory, format)?;
            print_warnings(&inventory.warnings);
        }
        Commands::Master { collect, format } => {
            let settings = build_settings(config, collect)?;
            let (master, warning) = collect_master(runner.as_ref(), &settings).await?;
            output_data(&master, format)?;
            print_warnings(warning.as_slice());
        }
        Commands::Clients { collect, format } => {
            let settings = build_settings(config, collect)?;
            let clients = collect_hosts(runner, settings, HostRole::Standalone).await;
            output_data(&clients.entries, format)?;
            print_warnings(&clients.warnings);
        }
        Commands::Vioses { collect, format } => {
            let settings = build_settings(config, collect)?;
            let vioses = collect_hosts(runner, settings, HostRole::Vios).await;
            output_data(&vioses.entries, format)?;
            print_warnings(&vioses.warnings);
        }
        Commands::Resources { kind, collect, format } => {
            let settings = build_settings(config, collect)?;
            let resources = collect_resources(runner, settings, *kind).await;
            output_data(&resources.entries, format)?;
            print_warnings(&resources.warnings);
        }
        Commands::Post { url, collect } => {
            let settings = build_settings(config, collect)?;
            let inventory = collect_nim_inventory(runner, settings).await?;
            print_warnings(&inventory.warnings);
            post_inventory(url, &inventory).await?;
        }
    }
    Ok(())
}

async fn post_inventory(url: &str, inventory: &Inventory) -> anyhow::Result<()> {
    let api_url = format!("{}/api/v1/inventory/nim", url.trim_end_matches('/'));
    info!(url = %api_url, "posting NIM inventory");

    let publication = Publication::new(inventory, Utc::now());

    let client = reqwest::Client::new();
    let response = client
        .post(&api_url)
        .json(&publication)
        .send()
        .await
        .with_context(|| format!("failed to reach {}", api_url))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        bail!("failed to post NIM inventory: HTTP {}: {}", status, error_text.trim());
    }

    print_success(&format!("NIM inventory posted to {}", api_url));
    Ok(())
}
