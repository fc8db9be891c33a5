//! Type-safe wrapper types for improved compile-time guarantees.
//!
//! Module identifiers are a closed enum so a lookup of another module's
//! result is checked at compile time rather than by string key.

mod module_id;
mod newtypes;

pub use module_id::ModuleId;
pub use newtypes::Channel;
