//! Configuration type definitions.

use crate::aggregator::Combiner;
use crate::types::ModuleId;
use serde::{Deserialize, Serialize};

/// Main configuration structure for lure-scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Aggregation policy.
    pub aggregator: AggregatorConfig,
    /// Signal modules to leave out of the registry.
    pub disabled_modules: Vec<ModuleId>,
    /// Link analysis settings.
    pub url: UrlConfig,
}

impl Config {
    pub fn is_module_disabled(&self, id: ModuleId) -> bool {
        self.disabled_modules.contains(&id)
    }
}

/// Aggregation policy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// How module scores are combined: "sum" or "max".
    pub combiner: Combiner,
    /// Run independent modules on the rayon pool.
    pub parallel: bool,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            combiner: Combiner::Sum,
            parallel: true,
        }
    }
}

/// Link analysis configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlConfig {
    /// Hosts treated as link shorteners in addition to the built-in list.
    pub extra_shorteners: Vec<String>,
}
