//! Rule bookkeeping shared by the built-in modules.
//!
//! A rule contributes its points at most once per evaluation, however many
//! values it matches; every match is still kept as evidence.

use crate::signal::{Evidence, MAX_SCORE, ModuleResult};
use serde::Serialize;
use tracing::trace;

/// Longest matched value kept in evidence, in characters.
const MAX_VALUE_CHARS: usize = 80;

/// A detection rule of a built-in module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalRule {
    pub id: &'static str,
    pub name: &'static str,
    /// Flag raised when the rule fires.
    pub flag: &'static str,
    pub points: i32,
}

/// One value that triggered a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleMatch {
    pub rule: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
    pub value: String,
}

/// Accumulates the rules that fired during one evaluation.
#[derive(Debug, Default)]
pub struct RuleHits {
    fired: Vec<SignalRule>,
    matches: Vec<RuleMatch>,
}

impl RuleHits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `rule` matched `value`.
    pub fn record(&mut self, rule: &SignalRule, value: &str) {
        trace!(rule = rule.id, flag = rule.flag, value, "Rule matched");
        if !self.fired.iter().any(|r| r.id == rule.id) {
            self.fired.push(*rule);
        }
        self.matches.push(RuleMatch {
            rule: rule.id,
            name: rule.name,
            flag: rule.flag,
            value: truncate(value, MAX_VALUE_CHARS),
        });
    }

    /// Sum of the points of every distinct rule that fired, capped at 100.
    pub fn score(&self) -> i32 {
        self.fired
            .iter()
            .map(|rule| rule.points)
            .sum::<i32>()
            .min(MAX_SCORE)
    }

    /// Build the module result, adding the rule trail to `evidence`.
    pub fn into_result(self, evidence: Evidence) -> ModuleResult {
        let score = self.score();
        let rules_fired: Vec<&str> = self.fired.iter().map(|rule| rule.id).collect();
        let evidence = evidence
            .with("rules_fired", rules_fired)
            .with("matches", &self.matches);

        ModuleResult::new(score)
            .with_flags(self.fired.iter().map(|rule| rule.flag))
            .with_evidence(evidence)
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &value[..idx]),
        None => value.to_string(),
    }
}
