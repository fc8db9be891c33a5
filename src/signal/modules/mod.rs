//! Built-in signal modules.

pub mod content;
pub mod header;
pub mod url;

pub use content::ContentModule;
pub use header::{HeaderModule, Mailbox};
pub use self::url::{DEFAULT_SHORTENERS, UrlModule};

use crate::signal::DynSignalModule;

/// Static registry of the built-in modules, in registration order.
pub fn builtin_modules() -> Vec<Box<dyn DynSignalModule>> {
    vec![
        Box::new(UrlModule::new()),
        Box::new(HeaderModule::new()),
        Box::new(ContentModule::new()),
    ]
}
