//! Configuration file loading for capdispatch
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. `CAPDISPATCH_*` environment variables
//! 3. Project root: `./capdispatch.toml` or `./.capdispatch.toml`
//! 4. Global: `$XDG_CONFIG_HOME/capdispatch/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    DEFAULT_TIMEOUT_SECS, FileBuiltinConfig, FileCapabilitiesConfig, FileCapabilityParameter,
    FileCommandCapabilityConfig, FileConfig, FileDispatchConfig, FileOutputConfig, PLACEHOLDER,
};
pub use loader::{ConfigLoader, ConfigSource};
