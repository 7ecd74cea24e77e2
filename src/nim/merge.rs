use std::collections::BTreeMap;

use crate::nim::types::{AttributeMap, HostRecord};

/// Merge `later` into `earlier`: keys present in both take the later value.
fn merge_attributes(mut earlier: AttributeMap, later: AttributeMap) -> AttributeMap {
    earlier.extend(later);
    earlier
}

impl HostRecord {
    /// Merge two partial records for the same host. Nested attribute maps are
    /// merged key by key; for everything else the later value wins, and an
    /// absent later field leaves the earlier one in place.
    pub fn merge(self, later: HostRecord) -> HostRecord {
        let lsnim = match (self.lsnim, later.lsnim) {
            (Some(earlier), Some(later)) => Some(merge_attributes(earlier, later)),
            (earlier, later) => later.or(earlier),
        };

        HostRecord {
            niminfo: merge_attributes(self.niminfo, later.niminfo),
            oslevel: later.oslevel.or(self.oslevel),
            lsnim,
        }
    }
}

/// Recursively merge two host maps. Host names present in both have their
/// records merged with [`HostRecord::merge`].
pub fn deep_merge(
    mut merged: BTreeMap<String, HostRecord>,
    later: BTreeMap<String, HostRecord>,
) -> BTreeMap<String, HostRecord> {
    for (name, record) in later {
        let record = match merged.remove(&name) {
            Some(existing) => existing.merge(record),
            None => record,
        };
        merged.insert(name, record);
    }
    merged
}
