//! Aggregator registration errors.

use crate::types::ModuleId;
use thiserror::Error;

/// Error type for module registration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("module already registered: {0}")]
    DuplicateModule(ModuleId),

    #[error("module id is reserved for the channel adjuster: {0}")]
    ReservedModule(ModuleId),
}
