//! Sender and authentication header analysis.

use crate::context::{AnalysisContext, HeaderInput, ModuleInput};
use crate::signal::rule::{RuleHits, SignalRule};
use crate::signal::{Evidence, ModuleResult, SignalModule, Unevaluable};
use crate::types::ModuleId;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

pub const HDR_001: SignalRule = SignalRule {
    id: "HDR-001",
    name: "SPF failure",
    flag: "spf_fail",
    points: 15,
};

pub const HDR_002: SignalRule = SignalRule {
    id: "HDR-002",
    name: "DKIM failure",
    flag: "dkim_fail",
    points: 15,
};

pub const HDR_003: SignalRule = SignalRule {
    id: "HDR-003",
    name: "DMARC failure",
    flag: "dmarc_fail",
    points: 20,
};

pub const HDR_004: SignalRule = SignalRule {
    id: "HDR-004",
    name: "Reply-To domain differs from sender",
    flag: "reply_to_mismatch",
    points: 15,
};

pub const HDR_005: SignalRule = SignalRule {
    id: "HDR-005",
    name: "Return-Path domain differs from sender",
    flag: "return_path_mismatch",
    points: 10,
};

pub const HDR_006: SignalRule = SignalRule {
    id: "HDR-006",
    name: "Display name embeds another address",
    flag: "display_name_spoof",
    points: 25,
};

pub const HDR_007: SignalRule = SignalRule {
    id: "HDR-007",
    name: "Authority display name on freemail",
    flag: "freemail_impersonation",
    points: 15,
};

/// Consumer mailbox providers anyone can register an address at.
const FREEMAIL_DOMAINS: &[&str] = &[
    "aol.com",
    "gmail.com",
    "gmx.com",
    "hotmail.com",
    "icloud.com",
    "mail.com",
    "outlook.com",
    "proton.me",
    "protonmail.com",
    "yahoo.com",
    "yandex.com",
    "zoho.com",
];

static ANGLE_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\s*([^<>\s@]+@[^<>\s@]+)\s*>").unwrap());

static BARE_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^<>\s@]+@[^<>\s@]+$").unwrap());

static EMBEDDED_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

static SPF_FAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bspf\s*=\s*(fail|softfail)\b").unwrap());

static DKIM_FAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdkim\s*=\s*fail\b").unwrap());

static DMARC_FAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdmarc\s*=\s*fail\b").unwrap());

static AUTHORITY_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(support|security|admin|administrator|help ?desk|it department|billing|payroll|ceo|bank|service desk)\b",
    )
    .unwrap()
});

/// A parsed mailbox: `"Display Name" <local@domain>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    pub display_name: Option<String>,
    pub address: String,
}

impl Mailbox {
    /// Parse a header value; `None` when no address can be found.
    ///
    /// The last `<addr>` is the real mailbox; earlier ones belong to the display name.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Some(caps) = ANGLE_ADDRESS.captures_iter(raw).last() {
            let whole = caps.get(0)?;
            let name = raw[..whole.start()].trim().trim_matches('"').trim();
            return Some(Self {
                display_name: (!name.is_empty()).then(|| name.to_string()),
                address: caps[1].to_string(),
            });
        }
        BARE_ADDRESS.is_match(raw).then(|| Self {
            display_name: None,
            address: raw.to_string(),
        })
    }

    /// Lower-cased domain part of the address.
    pub fn domain(&self) -> String {
        domain_of(&self.address)
    }
}

fn domain_of(address: &str) -> String {
    address
        .rsplit('@')
        .next()
        .unwrap_or_default()
        .trim_end_matches('.')
        .to_lowercase()
}

/// Two domains belong to the same organization if equal or one is a subdomain of the other.
fn same_organization(a: &str, b: &str) -> bool {
    a == b || a.ends_with(&format!(".{b}")) || b.ends_with(&format!(".{a}"))
}

/// Scores the sender headers of an email.
#[derive(Debug, Clone, Default)]
pub struct HeaderModule;

impl HeaderModule {
    pub fn new() -> Self {
        Self
    }

    fn check_authentication(results: &str, hits: &mut RuleHits) {
        for (pattern, rule) in [
            (&*SPF_FAIL, &HDR_001),
            (&*DKIM_FAIL, &HDR_002),
            (&*DMARC_FAIL, &HDR_003),
        ] {
            if let Some(found) = pattern.find(results) {
                hits.record(rule, found.as_str());
            }
        }
    }

    /// Compare a secondary address header against the sender domain.
    fn check_alignment(
        raw: Option<&str>,
        from_domain: &str,
        rule: &SignalRule,
        hits: &mut RuleHits,
        ignored: &mut Vec<String>,
    ) {
        let Some(raw) = raw else {
            return;
        };
        match Mailbox::parse(raw) {
            Some(mailbox) => {
                let domain = mailbox.domain();
                if !same_organization(&domain, from_domain) {
                    hits.record(rule, &format!("{domain} != {from_domain}"));
                }
            }
            None => ignored.push(raw.to_string()),
        }
    }
}

impl SignalModule for HeaderModule {
    type Input = HeaderInput;
    const ID: ModuleId = ModuleId::Header;

    fn select(context: &AnalysisContext) -> Option<&ModuleInput<HeaderInput>> {
        context.modules().header.as_ref()
    }

    fn evaluate(&self, input: &HeaderInput) -> Result<ModuleResult, Unevaluable> {
        let raw_from = input
            .from
            .as_deref()
            .ok_or_else(|| Unevaluable::malformed("missing From header"))?;
        let from = Mailbox::parse(raw_from)
            .ok_or_else(|| Unevaluable::malformed(format!("no address in From: {raw_from}")))?;
        let from_domain = from.domain();

        let mut hits = RuleHits::new();
        let mut ignored = Vec::new();

        if let Some(results) = input.authentication_results.as_deref() {
            Self::check_authentication(results, &mut hits);
        }

        Self::check_alignment(
            input.reply_to.as_deref(),
            &from_domain,
            &HDR_004,
            &mut hits,
            &mut ignored,
        );
        Self::check_alignment(
            input.return_path.as_deref(),
            &from_domain,
            &HDR_005,
            &mut hits,
            &mut ignored,
        );

        if let Some(name) = from.display_name.as_deref() {
            if let Some(embedded) = EMBEDDED_ADDRESS.find(name) {
                if !same_organization(&domain_of(embedded.as_str()), &from_domain) {
                    hits.record(&HDR_006, name);
                }
            }
            if FREEMAIL_DOMAINS.contains(&from_domain.as_str()) && AUTHORITY_NAME.is_match(name) {
                hits.record(&HDR_007, &format!("{name} <{}>", from.address));
            }
        }

        debug!(from_domain = %from_domain, score = hits.score(), "Evaluated headers");

        let evidence = Evidence::new()
            .with("from_address", &from.address)
            .with("from_domain", &from_domain)
            .with("display_name", &from.display_name)
            .with("ignored_headers", ignored);
        Ok(hits.into_result(evidence))
    }
}
