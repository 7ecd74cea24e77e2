use std::sync::Arc;

use clap::ValueEnum;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::ExecError;
use crate::exec::CommandRunner;
use crate::nim::lsnim::{list_objects, object_attributes};
use crate::nim::tasks::BoundedTaskSet;
use crate::nim::types::{Collected, CollectionWarning, ResourceRecord};

/// Installable resource types reported by the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    #[value(name = "lpp_source")]
    LppSource,
    Spot,
    Mksysb,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [ResourceKind::LppSource, ResourceKind::Spot, ResourceKind::Mksysb];

    pub fn nim_type(&self) -> &'static str {
        match self {
            ResourceKind::LppSource => "lpp_source",
            ResourceKind::Spot => "spot",
            ResourceKind::Mksysb => "mksysb",
        }
    }
}

/// Collect the attributes of every resource of `kind`, one bounded concurrent
/// task per resource. A resource whose `lsnim -l` fails is left out.
pub async fn collect_resources(
    runner: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
    kind: ResourceKind,
) -> Collected<ResourceRecord> {
    let mut collected = Collected::default();

    let names = match list_objects(runner.as_ref(), &settings, kind.nim_type()).await {
        Ok(names) => names,
        Err(e) => {
            let warning = CollectionWarning::from_exec(kind.nim_type(), &e);
            debug!("{}", warning);
            collected.warnings.push(warning);
            return collected;
        }
    };

    let mut tasks: BoundedTaskSet<Result<ResourceRecord, ExecError>> =
        BoundedTaskSet::new(settings.parallelism());
    for name in names {
        let runner = runner.clone();
        let settings = settings.clone();
        let resource = name.clone();
        tasks.spawn(name, async move {
            object_attributes(runner.as_ref(), &settings, &resource).await
        });
    }

    for (name, outcome) in tasks.join_all().await {
        let warning = match outcome {
            Ok(Ok(attributes)) => {
                collected.entries.insert(name, attributes);
                continue;
            }
            Ok(Err(e)) => CollectionWarning::from_exec(&name, &e),
            Err(e) => CollectionWarning::from_join(&name, &e),
        };
        debug!(resource = %name, "{}", warning);
        collected.warnings.push(warning);
    }

    info!(
        nim_type = kind.nim_type(),
        collected = collected.entries.len(),
        "resource collection finished"
    );
    collected
}
