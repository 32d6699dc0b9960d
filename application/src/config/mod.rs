//! Application-level configuration.
//!
//! - [`DispatchConfig`]: dispatcher behavior (default deadline)

pub mod dispatch_config;

pub use dispatch_config::DispatchConfig;
