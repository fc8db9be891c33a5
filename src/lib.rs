//! Multi-signal social-engineering risk scoring.
//!
//! Independent signal modules (links, sender headers, message text) each score
//! one aspect of a message in `0..=100`. The [`Aggregator`] runs them, applies
//! the channel adjuster on top of their results, and combines everything into a
//! single [`Verdict`] with flags and per-module evidence.

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod reporter;
pub mod run;
pub mod signal;
pub mod types;

#[cfg(test)]
pub mod test_utils;

pub use aggregator::{
    Aggregator, Combiner, ModuleReport, ModuleStatus, RegistryError, RiskLevel, Verdict,
};
pub use cli::{Cli, OutputFormat};
pub use config::{Config, ConfigError};
pub use context::{AnalysisContext, ContentInput, HeaderInput, ModuleInput, ModuleInputs, UrlInput};
pub use error::{LureError, Result};
pub use reporter::{Reporter, json::JsonReporter, terminal::TerminalReporter};
pub use run::run;
pub use signal::{
    ChannelAdjuster, DynSignalModule, Evidence, ModuleResult, ModuleResults, SignalModule,
    Unevaluable,
};
pub use types::{Channel, ModuleId};
