//! Configuration layer for lure-scan.
//!
//! ## Layers
//! - `types`: Configuration type definitions
//! - `loading`: File loading and search logic

mod error;
mod loading;
mod types;

pub use error::ConfigError;
pub use loading::CONFIG_FILENAMES;
pub use types::{AggregatorConfig, Config, UrlConfig};
