//! Module results and the evidence that justifies them.

use crate::signal::Unevaluable;
use crate::types::ModuleId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Upper bound of every score, per module and overall.
pub const MAX_SCORE: i32 = 100;

/// Clamp a raw score into `0..=MAX_SCORE`.
pub fn clamp_score(raw: i64) -> u8 {
    raw.clamp(0, MAX_SCORE as i64) as u8
}

/// Structured audit record explaining a module's score and flags.
///
/// The aggregator treats it as opaque; it is carried into the verdict as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Evidence(Map<String, Value>);

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evidence for a module that was skipped because it could not evaluate.
    pub fn skipped(reason: &Unevaluable) -> Self {
        Self::new()
            .with("skipped", true)
            .with("kind", reason.kind())
            .with("reason", reason.to_string())
    }

    /// Add a field, builder style.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace a field. Values that fail to serialize are stored as null.
    pub fn insert(&mut self, key: &str, value: impl Serialize) {
        let value = serde_json::to_value(value).unwrap_or_else(|e| {
            warn!(key, error = %e, "Evidence field could not be serialized; storing null");
            Value::Null
        });
        self.0.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Read a field as a list of strings; missing or non-string entries are skipped.
    pub fn str_list(&self, key: &str) -> Vec<&str> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Check if this evidence marks a skipped module.
    pub fn is_skipped(&self) -> bool {
        self.0.get("skipped").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Output of one signal module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleResult {
    /// The module's own contribution, expected in `0..=100`.
    pub score: i32,
    #[serde(default)]
    pub flags: BTreeSet<String>,
    #[serde(default)]
    pub evidence: Evidence,
}

impl ModuleResult {
    /// Create a result with `score` clamped into bounds.
    pub fn new(score: i32) -> Self {
        Self {
            score: score.clamp(0, MAX_SCORE),
            flags: BTreeSet::new(),
            evidence: Evidence::new(),
        }
    }

    /// The zero contribution recorded for a module that could not evaluate.
    pub fn unevaluable(reason: &Unevaluable) -> Self {
        Self {
            score: 0,
            flags: BTreeSet::new(),
            evidence: Evidence::skipped(reason),
        }
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    pub fn with_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags.extend(flags.into_iter().map(Into::into));
        self
    }

    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// Check the score invariant `0 <= score <= 100`.
    pub fn is_in_bounds(&self) -> bool {
        (0..=MAX_SCORE).contains(&self.score)
    }

    pub fn clamped_score(&self) -> u8 {
        clamp_score(self.score as i64)
    }
}

/// Results of every module that ran, keyed by module id.
///
/// Filled in by the aggregator only; modules and the channel adjuster
/// receive it by shared reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleResults(BTreeMap<ModuleId, ModuleResult>);

impl ModuleResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a result, returning the previous one for that id if any.
    pub fn insert(&mut self, id: ModuleId, result: ModuleResult) -> Option<ModuleResult> {
        self.0.insert(id, result)
    }

    pub fn get(&self, id: ModuleId) -> Option<&ModuleResult> {
        self.0.get(&id)
    }

    /// Check if module `id` ran and raised `flag`.
    pub fn has_flag(&self, id: ModuleId, flag: &str) -> bool {
        self.get(id).is_some_and(|result| result.has_flag(flag))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, &ModuleResult)> {
        self.0.iter().map(|(id, result)| (*id, result))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(ModuleId, ModuleResult)> for ModuleResults {
    fn from_iter<T: IntoIterator<Item = (ModuleId, ModuleResult)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ModuleResults {
    type Item = (ModuleId, ModuleResult);
    type IntoIter = std::collections::btree_map::IntoIter<ModuleId, ModuleResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
