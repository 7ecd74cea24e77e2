use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{NimError, Result};
use crate::exec::CommandRunner;
use crate::nim::hosts::{collect_hosts, HostRole};
use crate::nim::parse::{chomp, parse_niminfo};
use crate::nim::resources::{collect_resources, ResourceKind};
use crate::nim::types::{AttributeMap, CollectionWarning, Inventory, MasterRecord};

/// Whether a parsed niminfo describes the NIM master.
pub fn is_master(niminfo: &AttributeMap) -> bool {
    niminfo
        .get("configuration")
        .and_then(|value| value.as_scalar())
        == Some("master")
}

/// Parse the local niminfo file. Every NIM participant has one, so its
/// absence is fatal.
pub async fn read_local_niminfo(path: &Path) -> Result<AttributeMap> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| NimError::Config {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(parse_niminfo(&text))
}

/// Describe the local machine: its niminfo plus its oslevel. A failing
/// oslevel leaves the field empty and records a warning.
pub async fn collect_master(
    runner: &dyn CommandRunner,
    settings: &Settings,
) -> Result<(MasterRecord, Option<CollectionWarning>)> {
    let niminfo = read_local_niminfo(&settings.niminfo_path).await?;

    let command = format!("{} -s", settings.commands.oslevel);
    let (oslevel, warning) = match runner.run(&command, settings.local_timeout()).await {
        Ok(output) => (chomp(output.stdout), None),
        Err(e) => {
            let warning = CollectionWarning::from_exec("master", &e);
            debug!("{}", warning);
            (String::new(), Some(warning))
        }
    };

    Ok((MasterRecord { niminfo, oslevel }, warning))
}

/// Build a snapshot of the NIM estate.
///
/// Only the local niminfo read can fail this call. On a master the clients,
/// VIOSes and the three resource catalogs are collected concurrently; each of
/// them degrades to fewer entries (and warnings) rather than failing.
pub async fn collect_nim_inventory(runner: Arc<dyn CommandRunner>, settings: Arc<Settings>) -> Result<Inventory> {
    let (master, master_warning) = collect_master(runner.as_ref(), &settings).await?;

    let mut inventory = Inventory {
        master,
        clients: None,
        vioses: None,
        lpp_sources: None,
        spots: None,
        mksysbs: None,
        warnings: master_warning.into_iter().collect(),
    };

    if !is_master(&inventory.master.niminfo) {
        info!("not a NIM master, skipping clients and resources");
        return Ok(inventory);
    }

    let [lpp_source, spot, mksysb] = ResourceKind::ALL;
    let (clients, vioses, lpp_sources, spots, mksysbs) = tokio::join!(
        collect_hosts(runner.clone(), settings.clone(), HostRole::Standalone),
        collect_hosts(runner.clone(), settings.clone(), HostRole::Vios),
        collect_resources(runner.clone(), settings.clone(), lpp_source),
        collect_resources(runner.clone(), settings.clone(), spot),
        collect_resources(runner.clone(), settings.clone(), mksysb),
    );

    inventory.warnings.extend(clients.warnings);
    inventory.warnings.extend(vioses.warnings);
    inventory.warnings.extend(lpp_sources.warnings);
    inventory.warnings.extend(spots.warnings);
    inventory.warnings.extend(mksysbs.warnings);

    inventory.clients = Some(clients.entries);
    inventory.vioses = Some(vioses.entries);
    inventory.lpp_sources = Some(lpp_sources.entries);
    inventory.spots = Some(spots.entries);
    inventory.mksysbs = Some(mksysbs.entries);

    info!(warnings = inventory.warnings.len(), "NIM inventory collected");
    Ok(inventory)
}
