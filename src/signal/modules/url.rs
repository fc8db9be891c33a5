//! Link analysis.
//!
//! Parses every link with the `url` crate and checks the host, scheme and
//! path against the URL-* rules. Internationalized hosts are converted to
//! punycode by the parser, so homograph domains surface as `xn--` labels.

use crate::context::{AnalysisContext, ModuleInput, UrlInput};
use crate::signal::rule::{RuleHits, SignalRule};
use crate::signal::{Evidence, ModuleResult, SignalModule, Unevaluable};
use crate::types::ModuleId;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use tracing::debug;
use url::{Host, ParseError, Url};

pub const URL_001: SignalRule = SignalRule {
    id: "URL-001",
    name: "Link shortener",
    flag: "shortener",
    points: 25,
};

pub const URL_002: SignalRule = SignalRule {
    id: "URL-002",
    name: "Raw IP address host",
    flag: "ip_address_host",
    points: 30,
};

pub const URL_003: SignalRule = SignalRule {
    id: "URL-003",
    name: "Punycode domain",
    flag: "punycode_domain",
    points: 25,
};

pub const URL_004: SignalRule = SignalRule {
    id: "URL-004",
    name: "Credentials embedded in URL",
    flag: "credentials_in_url",
    points: 20,
};

pub const URL_005: SignalRule = SignalRule {
    id: "URL-005",
    name: "Suspicious top-level domain",
    flag: "suspicious_tld",
    points: 10,
};

pub const URL_006: SignalRule = SignalRule {
    id: "URL-006",
    name: "Credential lure in path",
    flag: "credential_lure_path",
    points: 10,
};

pub const URL_007: SignalRule = SignalRule {
    id: "URL-007",
    name: "Unencrypted link",
    flag: "insecure_transport",
    points: 5,
};

/// Well-known public link shorteners.
pub const DEFAULT_SHORTENERS: &[&str] = &[
    "bit.ly",
    "buff.ly",
    "cutt.ly",
    "goo.gl",
    "is.gd",
    "ow.ly",
    "rb.gy",
    "rebrand.ly",
    "s.id",
    "shorturl.at",
    "t.co",
    "t.ly",
    "tiny.cc",
    "tinyurl.com",
    "v.gd",
];

/// TLDs disproportionately used by throwaway phishing domains.
const SUSPICIOUS_TLDS: &[&str] = &[
    "cf", "click", "country", "gq", "ml", "mov", "rest", "support", "tk", "top", "work", "xyz",
    "zip",
];

static LURE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(log-?in|sign-?in|verify|verification|account|secure|update|password|wallet|unlock|confirm)",
    )
    .unwrap()
});

/// A link that parsed, and whether its scheme was guessed.
struct ParsedLink {
    url: Url,
    assumed_scheme: bool,
}

/// Scores the links found in a message.
#[derive(Debug, Clone)]
pub struct UrlModule {
    shorteners: BTreeSet<String>,
}

impl UrlModule {
    pub fn new() -> Self {
        Self {
            shorteners: DEFAULT_SHORTENERS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Treat additional hosts as link shorteners.
    pub fn with_extra_shorteners<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.shorteners.extend(
            hosts
                .into_iter()
                .map(|h| h.as_ref().trim().trim_end_matches('.').to_lowercase())
                .filter(|h| !h.is_empty()),
        );
        self
    }

    pub fn is_shortener(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        let host = host.trim_end_matches('.');
        let host = host.strip_prefix("www.").unwrap_or(host);
        self.shorteners.contains(host)
    }

    /// Parse a link, retrying bare `host/path` links as `http://`.
    ///
    /// `bit.ly:443/x` parses as scheme `bit.ly` with no host; a scheme that
    /// contains a dot is really a host with a port.
    fn parse(raw: &str) -> Option<ParsedLink> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match Url::parse(trimmed) {
            Ok(url) if url.has_host() => Some(ParsedLink {
                url,
                assumed_scheme: false,
            }),
            Ok(url) if url.scheme().contains('.') && !trimmed.contains("://") => {
                Self::parse_assumed(trimmed)
            }
            Ok(_) => None,
            Err(ParseError::RelativeUrlWithoutBase) => Self::parse_assumed(trimmed),
            Err(_) => None,
        }
    }

    fn parse_assumed(trimmed: &str) -> Option<ParsedLink> {
        Url::parse(&format!("http://{trimmed}"))
            .ok()
            .filter(Url::has_host)
            .map(|url| ParsedLink {
                url,
                assumed_scheme: true,
            })
    }

    fn check(&self, link: &ParsedLink, hits: &mut RuleHits) {
        let url = &link.url;
        let host = url.host_str().unwrap_or_default();

        if self.is_shortener(host) {
            hits.record(&URL_001, host);
        }

        match url.host() {
            Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => hits.record(&URL_002, host),
            Some(Host::Domain(domain)) => {
                if domain.split('.').any(|label| label.starts_with("xn--")) {
                    hits.record(&URL_003, domain);
                }
                let tld = domain.trim_end_matches('.').rsplit('.').next().unwrap_or("");
                if SUSPICIOUS_TLDS.contains(&tld) {
                    hits.record(&URL_005, domain);
                }
            }
            None => {}
        }

        if !url.username().is_empty() || url.password().is_some() {
            hits.record(&URL_004, url.as_str());
        }

        let path_and_query = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        if let Some(found) = LURE_PATH.find(&path_and_query) {
            hits.record(&URL_006, found.as_str());
        }

        if url.scheme() == "http" && !link.assumed_scheme {
            hits.record(&URL_007, url.as_str());
        }
    }
}

impl Default for UrlModule {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalModule for UrlModule {
    type Input = UrlInput;
    const ID: ModuleId = ModuleId::Url;

    fn select(context: &AnalysisContext) -> Option<&ModuleInput<UrlInput>> {
        context.modules().url.as_ref()
    }

    fn evaluate(&self, input: &UrlInput) -> Result<ModuleResult, Unevaluable> {
        let mut hits = RuleHits::new();
        let mut hosts = Vec::new();
        let mut unparseable = Vec::new();

        for raw in &input.urls {
            match Self::parse(raw) {
                Some(link) => {
                    hosts.push(link.url.host_str().unwrap_or_default().to_string());
                    self.check(&link, &mut hits);
                }
                None => unparseable.push(raw.clone()),
            }
        }

        if !input.urls.is_empty() && hosts.is_empty() {
            return Err(Unevaluable::malformed(format!(
                "none of {} links could be parsed",
                input.urls.len()
            )));
        }

        debug!(
            urls = input.urls.len(),
            unparseable = unparseable.len(),
            score = hits.score(),
            "Evaluated links"
        );

        let evidence = Evidence::new()
            .with("urls_checked", input.urls.len())
            .with("hosts", hosts)
            .with("unparseable", unparseable);
        Ok(hits.into_result(evidence))
    }
}
