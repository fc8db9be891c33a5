//! Score and flag combination policies.

use crate::signal::{ModuleResult, clamp_score};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How module scores are merged into the verdict score.
///
/// Both policies are monotonic: raising any one contribution never lowers the
/// combined score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Combiner {
    /// Sum of all contributions, capped at 100. Independent signals accumulate.
    #[default]
    Sum,
    /// The single highest contribution.
    Max,
}

impl Combiner {
    pub fn combine<I>(&self, scores: I) -> u8
    where
        I: IntoIterator<Item = u8>,
    {
        match self {
            Combiner::Sum => clamp_score(scores.into_iter().map(i64::from).sum()),
            Combiner::Max => scores.into_iter().max().unwrap_or(0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Combiner::Sum => "sum",
            Combiner::Max => "max",
        }
    }
}

impl std::fmt::Display for Combiner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Union of every result's flags; a flag raised more than once appears once.
pub fn union_flags<'a, I>(results: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a ModuleResult>,
{
    results
        .into_iter()
        .flat_map(|result| result.flags.iter().cloned())
        .collect()
}
