use tracing::debug;

use crate::config::Settings;
use crate::error::ExecError;
use crate::exec::CommandRunner;
use crate::nim::normalize::purge_superfluous_attributes;
use crate::nim::parse::{listed_names, parse_attribute_list};
use crate::nim::types::AttributeMap;

/// Names of every NIM object of the given type (`lsnim -t <type>`).
pub async fn list_objects(
    runner: &dyn CommandRunner,
    settings: &Settings,
    nim_type: &str,
) -> Result<Vec<String>, ExecError> {
    let command = format!("{} -t {}", settings.commands.lsnim, nim_type);
    let output = runner.run(&command, settings.local_timeout()).await?;
    let names = listed_names(&output.stdout);
    debug!(nim_type, count = names.len(), "listed NIM objects");
    Ok(names)
}

/// Detailed attributes of one NIM object (`lsnim -l <name>`), without the
/// superfluous ones.
pub async fn object_attributes(
    runner: &dyn CommandRunner,
    settings: &Settings,
    name: &str,
) -> Result<AttributeMap, ExecError> {
    let command = format!("{} -l {}", settings.commands.lsnim, name);
    let output = runner.run(&command, settings.local_timeout()).await?;
    Ok(purge_superfluous_attributes(parse_attribute_list(&output.stdout)))
}
