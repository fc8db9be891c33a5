//! Identifiers of the known signal modules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every module the aggregator knows about.
///
/// `Channel` is the reserved key of the channel adjuster; it is never
/// registered as an ordinary signal module. Declaration order is the order
/// used in verdict maps and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleId {
    Url,
    Header,
    Content,
    Channel,
}

impl ModuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleId::Url => "url",
            ModuleId::Header => "header",
            ModuleId::Content => "content",
            ModuleId::Channel => "channel",
        }
    }

    /// Check if this id is reserved for the channel adjuster.
    pub fn is_reserved(&self) -> bool {
        matches!(self, ModuleId::Channel)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
