use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Settings;
use crate::error::ExecError;
use crate::exec::CommandRunner;
use crate::nim::lsnim::{list_objects, object_attributes};
use crate::nim::merge::deep_merge;
use crate::nim::parse::{chomp, parse_niminfo};
use crate::nim::tasks::BoundedTaskSet;
use crate::nim::types::{Collected, CollectionWarning, HostRecord, WarningKind};

/// Exit status `c_rsh` uses when the remote side did not answer in time.
const C_RSH_TIMEOUT_STATUS: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRole {
    Standalone,
    Vios,
}

impl HostRole {
    pub fn nim_type(&self) -> &'static str {
        match self {
            HostRole::Standalone => "standalone",
            HostRole::Vios => "vios",
        }
    }
}

/// What one host task hands back to the merge step.
#[derive(Debug, Default)]
struct HostOutcome {
    record: Option<HostRecord>,
    warnings: Vec<CollectionWarning>,
}

fn host_warning(host: &str, err: &ExecError) -> CollectionWarning {
    let mut warning = CollectionWarning::from_exec(host, err);
    if let ExecError::Failed { code: C_RSH_TIMEOUT_STATUS, .. } = err {
        warning.kind = WarningKind::TimedOut;
    }
    warning
}

/// Query one host: its niminfo file and oslevel over `c_rsh`, then its
/// `lsnim -l` attributes locally.
///
/// Without a niminfo file there is nothing to report for the host, so a
/// failure there drops the host entirely. A later failure keeps whatever was
/// collected up to that point.
async fn inquire_host(runner: Arc<dyn CommandRunner>, settings: Arc<Settings>, host: String) -> HostOutcome {
    let c_rsh = &settings.commands.c_rsh;
    let remote_timeout = Some(settings.remote_timeout());

    let cat_niminfo = format!("{} {} \"cat {}\"", c_rsh, host, settings.remote_niminfo_path);
    let niminfo = match runner.run(&cat_niminfo, remote_timeout).await {
        Ok(output) => parse_niminfo(&output.stdout),
        Err(e) => {
            return HostOutcome {
                record: None,
                warnings: vec![host_warning(&host, &e)],
            }
        }
    };

    let mut record = HostRecord {
        niminfo,
        ..HostRecord::default()
    };

    let oslevel = format!("{} {} \"{} -s\"", c_rsh, host, settings.commands.oslevel);
    match runner.run(&oslevel, remote_timeout).await {
        Ok(output) => record.oslevel = Some(chomp(output.stdout)),
        Err(e) => {
            return HostOutcome {
                record: Some(record),
                warnings: vec![host_warning(&host, &e)],
            }
        }
    }

    let mut warnings = Vec::new();
    match object_attributes(runner.as_ref(), &settings, &host).await {
        Ok(attributes) => record.lsnim = Some(attributes),
        Err(e) => warnings.push(host_warning(&host, &e)),
    }

    HostOutcome {
        record: Some(record),
        warnings,
    }
}

/// Collect every NIM host of `role`, one bounded concurrent task per host.
///
/// Individual host failures are reported as warnings and never fail the
/// collection as a whole. The result is ordered by host name.
pub async fn collect_hosts(
    runner: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
    role: HostRole,
) -> Collected<HostRecord> {
    let mut collected = Collected::default();

    let hosts = match list_objects(runner.as_ref(), &settings, role.nim_type()).await {
        Ok(hosts) => hosts,
        Err(e) => {
            let warning = CollectionWarning::from_exec(role.nim_type(), &e);
            debug!("{}", warning);
            collected.warnings.push(warning);
            return collected;
        }
    };

    let mut tasks = BoundedTaskSet::new(settings.parallelism());
    for host in hosts {
        let task = inquire_host(runner.clone(), settings.clone(), host.clone());
        tasks.spawn(host, task);
    }
    let spawned = tasks.len();

    for (host, outcome) in tasks.join_all().await {
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => HostOutcome {
                record: None,
                warnings: vec![CollectionWarning::from_join(&host, &e)],
            },
        };

        for warning in &outcome.warnings {
            debug!(host = %host, "{}", warning);
        }
        collected.warnings.extend(outcome.warnings);

        if let Some(record) = outcome.record {
            let partial = BTreeMap::from([(host, record)]);
            collected.entries = deep_merge(std::mem::take(&mut collected.entries), partial);
        }
    }

    info!(
        nim_type = role.nim_type(),
        hosts = spawned,
        collected = collected.entries.len(),
        "host collection finished"
    );
    collected
}
