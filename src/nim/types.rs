use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use tokio::task::JoinError;

use crate::error::ExecError;

/// A single attribute value. niminfo keys naming hosts, routes or mounts
/// carry whitespace-separated lists, everything else is a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Scalar(String),
    List(Vec<String>),
}

impl AttrValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            AttrValue::Scalar(s) => Some(s),
            AttrValue::List(_) => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Scalar(s) => f.write_str(s),
            AttrValue::List(items) => f.write_str(&items.join(" ")),
        }
    }
}

pub type AttributeMap = BTreeMap<String, AttrValue>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostRecord {
    #[serde(flatten)]
    pub niminfo: AttributeMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oslevel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lsnim: Option<AttributeMap>,
}

pub type ResourceRecord = AttributeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MasterRecord {
    #[serde(flatten)]
    pub niminfo: AttributeMap,
    pub oslevel: String,
}

/// Snapshot of a NIM estate. The five collections are only present when the
/// local machine is the NIM master.
#[derive(Debug, Clone, Serialize)]
pub struct Inventory {
    pub master: MasterRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clients: Option<BTreeMap<String, HostRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vioses: Option<BTreeMap<String, HostRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lpp_sources: Option<BTreeMap<String, ResourceRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spots: Option<BTreeMap<String, ResourceRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mksysbs: Option<BTreeMap<String, ResourceRecord>>,
    #[serde(skip)]
    pub warnings: Vec<CollectionWarning>,
}

/// Result of one collection phase: the merged entries plus whatever went
/// wrong along the way.
#[derive(Debug, Clone)]
pub struct Collected<T> {
    pub entries: BTreeMap<String, T>,
    pub warnings: Vec<CollectionWarning>,
}

impl<T> Default for Collected<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    TimedOut,
    Execution,
    Unexpected,
}

/// Operator-facing diagnostic for a host or resource that could not be fully
/// collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionWarning {
    pub subject: String,
    pub kind: WarningKind,
    pub message: String,
}

impl CollectionWarning {
    pub fn from_exec(subject: &str, err: &ExecError) -> Self {
        let kind = match err {
            ExecError::TimedOut { .. } => WarningKind::TimedOut,
            ExecError::Failed { .. } | ExecError::Killed { .. } => WarningKind::Execution,
            ExecError::Spawn { .. } => WarningKind::Unexpected,
        };
        Self {
            subject: subject.to_string(),
            kind,
            message: err.to_string(),
        }
    }

    pub fn from_join(subject: &str, err: &JoinError) -> Self {
        let message = if err.is_panic() {
            "task panicked"
        } else {
            "task cancelled"
        };
        Self {
            subject: subject.to_string(),
            kind: WarningKind::Unexpected,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for CollectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WarningKind::TimedOut => write!(f, "{} timed out", self.subject),
            WarningKind::Execution => write!(f, "{}: {}", self.subject, self.message),
            WarningKind::Unexpected => write!(f, "{} error: {}", self.subject, self.message),
        }
    }
}
