//! Message text analysis.
//!
//! Pattern rules over the subject and body for the classic social-engineering
//! levers: urgency, credential requests, payment pressure, threats and secrecy.
//!
//! SECURITY: patterns are plain alternations without nested quantifiers so
//! matching stays linear on very large bodies.

use crate::context::{AnalysisContext, ContentInput, ModuleInput};
use crate::signal::rule::{RuleHits, SignalRule};
use crate::signal::{Evidence, ModuleResult, SignalModule, Unevaluable};
use crate::types::ModuleId;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

pub const CNT_001: SignalRule = SignalRule {
    id: "CNT-001",
    name: "Urgency pressure",
    flag: "urgency",
    points: 15,
};

pub const CNT_002: SignalRule = SignalRule {
    id: "CNT-002",
    name: "Credential request",
    flag: "credential_request",
    points: 25,
};

pub const CNT_003: SignalRule = SignalRule {
    id: "CNT-003",
    name: "Payment or gift card request",
    flag: "payment_request",
    points: 20,
};

pub const CNT_004: SignalRule = SignalRule {
    id: "CNT-004",
    name: "Account threat",
    flag: "account_threat",
    points: 15,
};

pub const CNT_005: SignalRule = SignalRule {
    id: "CNT-005",
    name: "Generic greeting",
    flag: "generic_greeting",
    points: 5,
};

pub const CNT_006: SignalRule = SignalRule {
    id: "CNT-006",
    name: "Secrecy request",
    flag: "secrecy_request",
    points: 10,
};

struct ContentPattern {
    rule: SignalRule,
    patterns: Vec<Regex>,
}

static CONTENT_PATTERNS: LazyLock<Vec<ContentPattern>> = LazyLock::new(|| {
    vec![
        ContentPattern {
            rule: CNT_001,
            patterns: vec![
                Regex::new(
                    r"(?i)\b(urgent|immediately|right away|act now|final (notice|warning)|within (24|48) hours|expires? today)\b",
                )
                .unwrap(),
            ],
        },
        ContentPattern {
            rule: CNT_002,
            patterns: vec![
                Regex::new(
                    r"(?i)\b(verify|confirm|validate|update) your (account|password|identity|login|credentials|details)\b",
                )
                .unwrap(),
                Regex::new(
                    r"(?i)\b(enter|provide|send)( us)? your (password|pin|passcode|one-time code|otp|security code)\b",
                )
                .unwrap(),
            ],
        },
        ContentPattern {
            rule: CNT_003,
            patterns: vec![
                Regex::new(
                    r"(?i)\b(gift ?cards?|wire transfer|bank details|payment (is )?overdue|outstanding invoice|bitcoin|crypto ?wallet)\b",
                )
                .unwrap(),
            ],
        },
        ContentPattern {
            rule: CNT_004,
            patterns: vec![
                Regex::new(
                    r"(?i)\byour account (has been|will be|is) (suspended|locked|closed|disabled|deactivated|restricted)\b",
                )
                .unwrap(),
                Regex::new(r"(?i)\bunusual (sign-in|login|activity)\b").unwrap(),
            ],
        },
        ContentPattern {
            rule: CNT_005,
            patterns: vec![
                Regex::new(
                    r"(?im)^\s*dear (valued customer|customer|user|member|client|account holder)\b",
                )
                .unwrap(),
            ],
        },
        ContentPattern {
            rule: CNT_006,
            patterns: vec![
                Regex::new(
                    r"(?i)\b(keep this (confidential|between us)|do not (tell|share this with) anyone|don't tell anyone)\b",
                )
                .unwrap(),
            ],
        },
    ]
});

/// Scores the subject and body of a message.
#[derive(Debug, Clone, Default)]
pub struct ContentModule;

impl ContentModule {
    pub fn new() -> Self {
        Self
    }
}

impl SignalModule for ContentModule {
    type Input = ContentInput;
    const ID: ModuleId = ModuleId::Content;

    fn select(context: &AnalysisContext) -> Option<&ModuleInput<ContentInput>> {
        context.modules().content.as_ref()
    }

    fn evaluate(&self, input: &ContentInput) -> Result<ModuleResult, Unevaluable> {
        let subject = input.subject.as_deref().unwrap_or("").trim();
        if subject.is_empty() && input.body.trim().is_empty() {
            return Err(Unevaluable::malformed("message has no subject or body"));
        }

        let text = format!("{subject}\n{}", input.body);
        let mut hits = RuleHits::new();

        for entry in CONTENT_PATTERNS.iter() {
            if let Some(found) = entry.patterns.iter().find_map(|p| p.find(&text)) {
                hits.record(&entry.rule, found.as_str().trim());
            }
        }

        debug!(
            chars = text.chars().count(),
            score = hits.score(),
            "Evaluated content"
        );

        let evidence = Evidence::new()
            .with("has_subject", !subject.is_empty())
            .with("body_chars", input.body.chars().count());
        Ok(hits.into_result(evidence))
    }
}
