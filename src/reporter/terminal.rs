use crate::aggregator::{ModuleReport, ModuleStatus, RiskLevel, Verdict};
use crate::reporter::Reporter;
use crate::signal::Evidence;
use crate::types::ModuleId;
use colored::Colorize;

const BAR_WIDTH: usize = 20;

pub struct TerminalReporter {
    verbose: bool,
}

impl TerminalReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn risk_level_color(&self, level: &RiskLevel) -> colored::ColoredString {
        let label = level.as_str();
        match level {
            RiskLevel::Safe => label.green().bold(),
            RiskLevel::Low => label.white(),
            RiskLevel::Medium => label.cyan().bold(),
            RiskLevel::High => label.yellow().bold(),
            RiskLevel::Critical => label.red().bold(),
        }
    }

    fn status_label(&self, status: &ModuleStatus) -> colored::ColoredString {
        match status {
            ModuleStatus::Evaluated => "evaluated".green(),
            ModuleStatus::Unevaluable { kind, .. } => format!("skipped ({kind})").yellow(),
            ModuleStatus::InvariantViolation { raw_score } => {
                format!("clamped from {raw_score}").red().bold()
            }
        }
    }

    fn score_bar(&self, score: u8) -> String {
        let filled = usize::from(score) * BAR_WIDTH / 100;
        format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
    }

    fn format_module(&self, id: ModuleId, report: &ModuleReport, evidence: Option<&Evidence>) -> String {
        let mut output = format!(
            "  {:8} {:>3} {} {}\n",
            id.as_str(),
            report.score,
            self.score_bar(report.score).dimmed(),
            self.status_label(&report.status)
        );

        if let ModuleStatus::Unevaluable { reason, .. } = &report.status {
            output.push_str(&format!("           {}\n", reason.dimmed()));
        }

        if !self.verbose {
            return output;
        }

        let Some(evidence) = evidence else {
            return output;
        };

        if id == ModuleId::Channel {
            let applied = evidence.str_list("applied");
            if !applied.is_empty() {
                output.push_str(&format!("           applied: {}\n", applied.join(", ")));
            }
        }

        let matches = evidence
            .get("matches")
            .and_then(|m| m.as_array())
            .map(Vec::as_slice)
            .unwrap_or_default();
        for entry in matches {
            let rule = entry["rule"].as_str().unwrap_or_default();
            let name = entry["name"].as_str().unwrap_or_default();
            let value = entry["value"].as_str().unwrap_or_default();
            output.push_str(&format!(
                "           {} {}: {}\n",
                rule.cyan(),
                name,
                value.dimmed()
            ));
        }

        output
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, verdict: &Verdict) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            format!(
                "lure-scan v{} - Social Engineering Risk Scorer",
                env!("CARGO_PKG_VERSION")
            )
            .bold()
        ));

        output.push_str(&format!(
            "{}\n\n",
            format!(
                "━━━ RISK SCORE: {}/100 ({}) ━━━",
                verdict.score(),
                self.risk_level_color(&verdict.level())
            )
            .bold()
        ));

        output.push_str("Module Breakdown:\n");
        for (id, report) in verdict.modules() {
            output.push_str(&self.format_module(*id, report, verdict.evidence_for(*id)));
        }
        output.push('\n');

        if verdict.flags().is_empty() {
            output.push_str(&"No risk signals found.\n".green().to_string());
        } else {
            let flags: Vec<&str> = verdict.flags().iter().map(String::as_str).collect();
            output.push_str(&format!("Flags: {}\n", flags.join(", ").yellow()));
        }

        output.push_str(&format!("{}\n", "━".repeat(50)));

        let skipped = verdict.unevaluable_modules();
        if !skipped.is_empty() {
            let names: Vec<&str> = skipped.iter().map(|id| id.as_str()).collect();
            output.push_str(&format!(
                "Note: {} module(s) could not evaluate: {}\n",
                skipped.len(),
                names.join(", ")
            ));
        }

        output
    }
}
