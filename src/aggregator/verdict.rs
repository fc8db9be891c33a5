//! The final combined result of one evaluation.

use crate::aggregator::combine::{Combiner, union_flags};
use crate::signal::{Evidence, ModuleResults};
use crate::types::ModuleId;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Risk level based on score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => RiskLevel::Safe,
            1..=25 => RiskLevel::Low,
            26..=50 => RiskLevel::Medium,
            51..=75 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "SAFE",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a module's contribution was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModuleStatus {
    /// The module returned an in-bounds result.
    Evaluated,
    /// The module could not evaluate; it contributed zero.
    Unevaluable { kind: &'static str, reason: String },
    /// The module returned a score outside `0..=100`; it was clamped.
    InvariantViolation { raw_score: i32 },
}

impl ModuleStatus {
    pub fn is_evaluated(&self) -> bool {
        matches!(self, ModuleStatus::Evaluated)
    }
}

/// Per-module line of the verdict's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleReport {
    /// Contribution after clamping.
    pub score: u8,
    #[serde(flatten)]
    pub status: ModuleStatus,
}

/// Combined risk verdict for one message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    score: u8,
    level: RiskLevel,
    flags: BTreeSet<String>,
    evidence: BTreeMap<ModuleId, Evidence>,
    modules: BTreeMap<ModuleId, ModuleReport>,
}

impl Verdict {
    /// Merge module results into a verdict.
    ///
    /// Every contribution is re-clamped before combination, so a result that
    /// escaped its module's own bound cannot push the total out of range.
    pub(crate) fn combine(
        results: ModuleResults,
        modules: BTreeMap<ModuleId, ModuleReport>,
        combiner: Combiner,
    ) -> Self {
        let score = combiner.combine(results.iter().map(|(_, result)| result.clamped_score()));
        let flags = union_flags(results.iter().map(|(_, result)| result));
        let evidence = results
            .into_iter()
            .map(|(id, result)| (id, result.evidence))
            .collect();

        Self {
            score,
            level: RiskLevel::from_score(score),
            flags,
            evidence,
            modules,
        }
    }

    /// Final combined risk in `0..=100`.
    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn level(&self) -> RiskLevel {
        self.level
    }

    pub fn flags(&self) -> &BTreeSet<String> {
        &self.flags
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn evidence(&self) -> &BTreeMap<ModuleId, Evidence> {
        &self.evidence
    }

    pub fn evidence_for(&self, id: ModuleId) -> Option<&Evidence> {
        self.evidence.get(&id)
    }

    pub fn modules(&self) -> &BTreeMap<ModuleId, ModuleReport> {
        &self.modules
    }

    pub fn report_for(&self, id: ModuleId) -> Option<&ModuleReport> {
        self.modules.get(&id)
    }

    /// Modules that could not evaluate and contributed zero.
    pub fn unevaluable_modules(&self) -> Vec<ModuleId> {
        self.modules
            .iter()
            .filter(|(_, report)| matches!(report.status, ModuleStatus::Unevaluable { .. }))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Check if any module was skipped or clamped.
    pub fn is_degraded(&self) -> bool {
        self.modules
            .values()
            .any(|report| !report.status.is_evaluated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{ModuleResult, Unevaluable};

    #[test]
    fn test_risk_level_from_score() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(1), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(25), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(26), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(50), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(51), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(75), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(76), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::Critical);
    }

    #[test]
    fn test_risk_level_display() {
        assert_eq!(format!("{}", RiskLevel::Safe), "SAFE");
        assert_eq!(format!("{}", RiskLevel::Critical), "CRITICAL");
        assert!(RiskLevel::Low < RiskLevel::High);
    }

    fn report(score: u8, status: ModuleStatus) -> ModuleReport {
        ModuleReport { score, status }
    }

    #[test]
    fn test_combine_sums_and_unions() {
        let results: ModuleResults = [
            (ModuleId::Url, ModuleResult::new(25).with_flag("shortener")),
            (
                ModuleId::Content,
                ModuleResult::new(40).with_flags(["urgency", "shortener"]),
            ),
            (ModuleId::Channel, ModuleResult::new(15)),
        ]
        .into_iter()
        .collect();
        let modules = BTreeMap::from([
            (ModuleId::Url, report(25, ModuleStatus::Evaluated)),
            (ModuleId::Content, report(40, ModuleStatus::Evaluated)),
            (ModuleId::Channel, report(15, ModuleStatus::Evaluated)),
        ]);

        let verdict = Verdict::combine(results, modules, Combiner::Sum);
        assert_eq!(verdict.score(), 80);
        assert_eq!(verdict.level(), RiskLevel::Critical);
        assert_eq!(verdict.flags().len(), 2);
        assert!(verdict.has_flag("shortener"));
        assert_eq!(verdict.evidence().len(), 3);
        assert!(!verdict.is_degraded());
    }

    #[test]
    fn test_combine_reclamps_escaped_scores() {
        let mut rogue = ModuleResult::new(0);
        rogue.score = 500;
        let results: ModuleResults = [(ModuleId::Url, rogue)].into_iter().collect();

        let verdict = Verdict::combine(results, BTreeMap::new(), Combiner::Sum);
        assert_eq!(verdict.score(), 100);
    }

    #[test]
    fn test_unevaluable_modules_listed() {
        let reason = Unevaluable::MissingInput;
        let results: ModuleResults = [(ModuleId::Header, ModuleResult::unevaluable(&reason))]
            .into_iter()
            .collect();
        let modules = BTreeMap::from([(
            ModuleId::Header,
            report(
                0,
                ModuleStatus::Unevaluable {
                    kind: reason.kind(),
                    reason: reason.to_string(),
                },
            ),
        )]);

        let verdict = Verdict::combine(results, modules, Combiner::Sum);
        assert_eq!(verdict.unevaluable_modules(), vec![ModuleId::Header]);
        assert!(verdict.is_degraded());
        assert!(verdict.evidence_for(ModuleId::Header).unwrap().is_skipped());
    }

    #[test]
    fn test_module_report_serialization() {
        let json = serde_json::to_value(report(
            0,
            ModuleStatus::Unevaluable {
                kind: "malformed",
                reason: "bad".to_string(),
            },
        ))
        .unwrap();
        assert_eq!(json["status"], "unevaluable");
        assert_eq!(json["kind"], "malformed");
        assert_eq!(json["score"], 0);

        let json =
            serde_json::to_value(report(100, ModuleStatus::InvariantViolation { raw_score: 140 }))
                .unwrap();
        assert_eq!(json["status"], "invariant_violation");
        assert_eq!(json["raw_score"], 140);
    }
}
