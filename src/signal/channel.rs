//! Channel-conditional risk adjustment.
//!
//! The adjuster runs after every other module and amplifies their findings
//! according to the delivery channel. It contributes score and evidence only:
//! its result never carries flags, since the condition it reacts to is already
//! flagged by the module that detected it.

use crate::signal::{Evidence, MAX_SCORE, ModuleResult, ModuleResults};
use crate::types::{Channel, ModuleId};
use tracing::debug;

/// When a channel rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelCondition {
    /// The normalized channel is one of these (lower case) names.
    ChannelIs(&'static [&'static str]),
    /// Module `module` ran and raised `flag`.
    ModuleFlag {
        module: ModuleId,
        flag: &'static str,
    },
}

impl ChannelCondition {
    pub fn holds(&self, channel: &Channel, results: &ModuleResults) -> bool {
        match self {
            Self::ChannelIs(names) => channel.is_any(names),
            Self::ModuleFlag { module, flag } => results.has_flag(*module, flag),
        }
    }
}

/// One row of the adjustment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelRule {
    /// Identifier recorded in evidence when the rule fires.
    pub tag: &'static str,
    pub points: u32,
    pub condition: ChannelCondition,
}

/// The adjustment table. Rules are evaluated in this order and stack additively.
pub const DEFAULT_CHANNEL_RULES: [ChannelRule; 3] = [
    ChannelRule {
        tag: "sms_shortlink_risk",
        points: 10,
        condition: ChannelCondition::ChannelIs(&["sms"]),
    },
    ChannelRule {
        tag: "internal_impersonation_risk",
        points: 5,
        condition: ChannelCondition::ChannelIs(&["slack", "teams"]),
    },
    ChannelRule {
        tag: "shortener_in_channel",
        points: 5,
        condition: ChannelCondition::ModuleFlag {
            module: ModuleId::Url,
            flag: "shortener",
        },
    },
];

/// Applies channel rules against the results of the other modules.
#[derive(Debug, Clone)]
pub struct ChannelAdjuster {
    rules: Vec<ChannelRule>,
}

impl ChannelAdjuster {
    pub fn new() -> Self {
        Self {
            rules: DEFAULT_CHANNEL_RULES.to_vec(),
        }
    }

    /// Build an adjuster over a custom rule table.
    pub fn with_rules(rules: Vec<ChannelRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ChannelRule] {
        &self.rules
    }

    /// Compute the channel boost for a message.
    ///
    /// `results` must already hold every other module's result.
    pub fn adjust(&self, channel: &Channel, results: &ModuleResults) -> ModuleResult {
        let mut boost: u32 = 0;
        let mut applied: Vec<&str> = Vec::new();

        for rule in &self.rules {
            if rule.condition.holds(channel, results) {
                boost = boost.saturating_add(rule.points);
                applied.push(rule.tag);
            }
        }

        let score = boost.min(MAX_SCORE as u32) as i32;
        debug!(channel = %channel, boost, score, applied = ?applied, "Applied channel rules");

        let evidence = Evidence::new()
            .with("channel", channel.as_str())
            .with("applied", applied);
        ModuleResult::new(score).with_evidence(evidence)
    }
}

impl Default for ChannelAdjuster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url_result(flags: &[&str]) -> ModuleResults {
        let mut results = ModuleResults::new();
        results.insert(
            ModuleId::Url,
            ModuleResult::new(25).with_flags(flags.iter().copied()),
        );
        results
    }

    fn adjust(channel: &str, results: &ModuleResults) -> ModuleResult {
        ChannelAdjuster::new().adjust(&Channel::new(channel), results)
    }

    #[test]
    fn test_sms_alone() {
        let result = adjust("sms", &ModuleResults::new());
        assert_eq!(result.score, 10);
        assert_eq!(result.evidence.str_list("applied"), vec!["sms_shortlink_risk"]);
        assert_eq!(*result.evidence.get("channel").unwrap(), "sms");
    }

    #[test]
    fn test_case_insensitive() {
        let results = url_result(&["shortener"]);
        let expected = adjust("sms", &results);
        assert_eq!(adjust("SMS", &results), expected);
        assert_eq!(adjust("Sms", &results), expected);
    }

    #[test]
    fn test_slack_with_shortener() {
        let result = adjust("slack", &url_result(&["shortener"]));
        assert_eq!(result.score, 10);
        assert_eq!(
            result.evidence.str_list("applied"),
            vec!["internal_impersonation_risk", "shortener_in_channel"]
        );
    }

    #[test]
    fn test_teams_alone() {
        let result = adjust("Teams", &ModuleResults::new());
        assert_eq!(result.score, 5);
        assert_eq!(
            result.evidence.str_list("applied"),
            vec!["internal_impersonation_risk"]
        );
    }

    #[test]
    fn test_sms_with_shortener_stacks() {
        let result = adjust("sms", &url_result(&["shortener"]));
        assert_eq!(result.score, 15);
        assert_eq!(
            result.evidence.str_list("applied"),
            vec!["sms_shortlink_risk", "shortener_in_channel"]
        );
    }

    #[test]
    fn test_shortener_on_email() {
        let result = adjust("email", &url_result(&["shortener", "ip_address_host"]));
        assert_eq!(result.score, 5);
        assert_eq!(result.evidence.str_list("applied"), vec!["shortener_in_channel"]);
    }

    #[test]
    fn test_url_without_shortener_flag() {
        let result = adjust("email", &url_result(&["ip_address_host"]));
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_shortener_flag_from_other_module_ignored() {
        let mut results = ModuleResults::new();
        results.insert(ModuleId::Content, ModuleResult::new(0).with_flag("shortener"));
        let result = adjust("email", &results);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_missing_channel_and_url() {
        let result = ChannelAdjuster::new().adjust(&Channel::none(), &ModuleResults::new());
        assert_eq!(result.score, 0);
        assert!(result.evidence.str_list("applied").is_empty());
        assert_eq!(*result.evidence.get("channel").unwrap(), "");
    }

    #[test]
    fn test_never_raises_flags_and_stays_in_bounds() {
        let with_url = url_result(&["shortener"]);
        for channel in ["", "sms", "SMS", "slack", "teams", "email", "whatsapp", " sms"] {
            for results in [&ModuleResults::new(), &with_url] {
                let result = adjust(channel, results);
                assert!(result.flags.is_empty());
                assert!(result.is_in_bounds());
            }
        }
    }

    #[test]
    fn test_boost_over_100_clamps() {
        let adjuster = ChannelAdjuster::with_rules(vec![
            ChannelRule {
                tag: "big",
                points: 80,
                condition: ChannelCondition::ChannelIs(&["sms"]),
            },
            ChannelRule {
                tag: "bigger",
                points: 90,
                condition: ChannelCondition::ModuleFlag {
                    module: ModuleId::Url,
                    flag: "shortener",
                },
            },
        ]);
        let result = adjuster.adjust(&Channel::new("sms"), &url_result(&["shortener"]));
        assert_eq!(result.score, 100);
        assert_eq!(result.evidence.str_list("applied"), vec!["big", "bigger"]);
    }

    #[test]
    fn test_default_table() {
        let adjuster = ChannelAdjuster::default();
        let tags: Vec<&str> = adjuster.rules().iter().map(|r| r.tag).collect();
        assert_eq!(
            tags,
            vec![
                "sms_shortlink_risk",
                "internal_impersonation_risk",
                "shortener_in_channel"
            ]
        );
        let points: Vec<u32> = adjuster.rules().iter().map(|r| r.points).collect();
        assert_eq!(points, vec![10, 5, 5]);
    }
}
