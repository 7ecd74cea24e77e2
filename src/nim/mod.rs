// NIM estate inventory collection
pub mod types;
pub mod parse;
pub mod normalize;
pub mod merge;
pub mod tasks;
pub mod lsnim;
pub mod hosts;
pub mod resources;
pub mod collector;

// Re-export main collection functions
pub use collector::{collect_master, collect_nim_inventory, is_master};
pub use hosts::{collect_hosts, HostRole};
pub use resources::{collect_resources, ResourceKind};
pub use types::{AttrValue, AttributeMap, CollectionWarning, HostRecord, Inventory, MasterRecord, ResourceRecord, WarningKind};
