use crate::nim::types::AttributeMap;

/// `lsnim -l` attributes that describe the object itself rather than its
/// configuration.
pub const SUPERFLUOUS_ATTRIBUTES: [&str; 7] = [
    "class",
    "type",
    "arch",
    "prev_state",
    "simages",
    "bos_license",
    "name",
];

pub fn purge_superfluous_attributes(mut attributes: AttributeMap) -> AttributeMap {
    for key in SUPERFLUOUS_ATTRIBUTES {
        attributes.remove(key);
    }
    attributes
}
