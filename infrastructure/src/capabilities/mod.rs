//! Capability implementations
//!
//! - [`builtin`]: `echo` and `wait`
//! - [`command`]: shell commands declared in configuration
//! - [`catalog`]: builds the registry from a [`FileConfig`](crate::config::FileConfig)

pub mod builtin;
pub mod catalog;
pub mod command;

pub use builtin::{BUILTIN_NAMES, builtin_capabilities};
pub use catalog::CapabilityCatalog;
pub use command::{CommandCapability, shell_escape};
