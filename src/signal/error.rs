//! Module-level evaluation failures.

use thiserror::Error;

/// A signal module could not evaluate its input.
///
/// This never aborts an evaluation: the aggregator records the reason and
/// treats the module as a zero contribution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Unevaluable {
    #[error("no input supplied for this module")]
    MissingInput,

    #[error("malformed input: {0}")]
    Malformed(String),

    #[error("module panicked: {0}")]
    Panicked(String),
}

impl Unevaluable {
    /// Create a Malformed error from any string-like reason.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }

    /// Short machine-readable kind, used in evidence.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingInput => "missing_input",
            Self::Malformed(_) => "malformed",
            Self::Panicked(_) => "panicked",
        }
    }
}
