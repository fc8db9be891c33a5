//! Signal layer.
//!
//! This module provides the per-message analyses:
//! - The signal module contract and its object-safe registry form
//! - Bounded module results with their evidence
//! - The built-in url, header and content modules
//! - The channel adjuster, which runs after every other module
//!
//! Signal modules produce independent results for the aggregator.

pub mod channel;
pub mod error;
pub mod modules;
pub mod result;
pub mod rule;
pub mod traits;

pub use channel::{ChannelAdjuster, ChannelCondition, ChannelRule, DEFAULT_CHANNEL_RULES};
pub use error::Unevaluable;
pub use modules::{ContentModule, HeaderModule, UrlModule, builtin_modules};
pub use result::{Evidence, MAX_SCORE, ModuleResult, ModuleResults, clamp_score};
pub use rule::{RuleHits, RuleMatch, SignalRule};
pub use traits::{DynSignalModule, SignalModule};
