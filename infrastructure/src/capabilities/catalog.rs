//! Registry assembly from configuration.
//!
//! Collects every configuration issue up front, then registers the
//! built-ins and each command capability whose definition has no errors.
//! A broken definition is skipped with an error log; the rest still load.

use capdispatch_application::CommandRunner;
use capdispatch_domain::capability::{CapabilityRegistry, SchemaError};
use capdispatch_domain::config::ConfigIssue;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::builtin::{BUILTIN_NAMES, builtin_capabilities};
use super::command::CommandCapability;
use crate::config::FileConfig;

/// The registry built from configuration, plus everything wrong with it.
#[derive(Debug)]
pub struct CapabilityCatalog {
    pub registry: CapabilityRegistry,
    pub issues: Vec<ConfigIssue>,
    /// Configured command capabilities that were not registered
    pub skipped: Vec<String>,
}

impl CapabilityCatalog {
    /// Build the registry.
    ///
    /// Fails only if a built-in schema is malformed, which is a bug.
    pub fn from_config(
        config: &FileConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self, SchemaError> {
        let issues = config.validate();
        let mut registry = CapabilityRegistry::new();
        let mut skipped = Vec::new();

        for issue in issues.iter().filter(|i| !i.is_error()) {
            warn!(code = ?issue.code, "{}", issue.message);
        }

        if config.builtin.enabled {
            for err in registry.register_all(builtin_capabilities()?) {
                error!(error = %err, "failed to register built-in capability");
            }
        }

        for (name, command) in &config.capabilities.command {
            let shadows = config.builtin.enabled && BUILTIN_NAMES.contains(&name.as_str());
            let errors: Vec<ConfigIssue> = command
                .validate(name)
                .into_iter()
                .filter(ConfigIssue::is_error)
                .collect();

            if shadows || !errors.is_empty() {
                for issue in &errors {
                    error!(capability = %name, code = ?issue.code, "{}", issue.message);
                }
                error!(capability = %name, "skipping invalid command capability");
                skipped.push(name.clone());
                continue;
            }

            let registered = CommandCapability::from_config(name, command, runner.clone())
                .map_err(|issue| issue.message)
                .and_then(|capability| {
                    registry.register(capability).map_err(|e| e.to_string())
                });

            match registered {
                Ok(()) => debug!(capability = %name, "registered command capability"),
                Err(message) => {
                    error!(capability = %name, error = %message, "skipping command capability");
                    skipped.push(name.clone());
                }
            }
        }

        Ok(Self {
            registry,
            issues,
            skipped,
        })
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ConfigIssue::is_error)
    }

    pub fn into_registry(self) -> CapabilityRegistry {
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ShellCommandRunner;

    fn catalog(toml_str: &str) -> CapabilityCatalog {
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        CapabilityCatalog::from_config(&config, Arc::new(ShellCommandRunner::new())).unwrap()
    }

    #[test]
    fn test_defaults_register_builtins_only() {
        let catalog = catalog("");
        assert_eq!(catalog.registry.names(), vec!["echo", "wait"]);
        assert!(catalog.issues.is_empty());
        assert!(catalog.skipped.is_empty());
    }

    #[test]
    fn test_builtins_can_be_disabled() {
        let catalog = catalog("[builtin]\nenabled = false\n");
        assert!(catalog.registry.is_empty());
    }

    #[test]
    fn test_invalid_entries_are_skipped_others_register() {
        let catalog = catalog(
            r#"
[capabilities.command.disk_usage]
description = "Report disk usage"
command = "du -sh {path}"
[[capabilities.command.disk_usage.parameters]]
name = "path"
required = true

[capabilities.command.broken]
command = ""

[capabilities.command.bad_type]
command = "ls {path}"
[[capabilities.command.bad_type.parameters]]
name = "path"
type = "path"

[capabilities.command.echo]
command = "echo {message}"
[[capabilities.command.echo.parameters]]
name = "message"
"#,
        );

        assert_eq!(catalog.registry.names(), vec!["disk_usage", "echo", "wait"]);
        assert_eq!(catalog.skipped, vec!["bad_type", "broken", "echo"]);
        assert!(catalog.has_errors());
        // The built-in kept its own schema.
        assert!(catalog.registry.describe("echo").unwrap().parameter("uppercase").is_some());
    }

    #[test]
    fn test_warnings_do_not_skip() {
        let catalog = catalog(
            r#"
[capabilities.command.hello]
command = "echo hello {name}"
"#,
        );
        assert!(catalog.registry.contains("hello"));
        assert_eq!(catalog.issues.len(), 1);
        assert!(!catalog.has_errors());
    }
}
