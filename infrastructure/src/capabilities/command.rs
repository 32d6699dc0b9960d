//! Command capabilities: user-defined shell commands as capabilities.
//!
//! Each command capability wraps a command template with `{param_name}`
//! placeholders, declared in `[capabilities.command.<name>]`. Arguments are
//! validated against the capability's schema before the template is
//! rendered, so every placeholder value has already passed its type and
//! constraint checks.
//!
//! # Security
//!
//! All parameter values are shell-escaped before substitution to prevent
//! command injection: single-quote wrapping on Unix, double-quote wrapping
//! with character escaping on Windows.

use async_trait::async_trait;
use capdispatch_application::{CommandOutput, CommandRunner, RunnerError};
use capdispatch_domain::capability::{
    Arguments, Capability, CapabilityError, CapabilitySchema, ExecutionEnvelope,
    InvocationContext, ValidatedArguments, Value,
};
use capdispatch_domain::config::ConfigIssue;
use regex::Captures;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::config::{FileCommandCapabilityConfig, PLACEHOLDER};

/// A capability that runs a shell command built from a template.
pub struct CommandCapability {
    schema: CapabilitySchema,
    template: String,
    working_dir: Option<PathBuf>,
    runner: Arc<dyn CommandRunner>,
}

impl CommandCapability {
    pub fn new(
        schema: CapabilitySchema,
        template: impl Into<String>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            schema,
            template: template.into(),
            working_dir: None,
            runner,
        }
    }

    /// Build from a `[capabilities.command.<name>]` entry.
    ///
    /// Only the schema is checked here; callers run
    /// [`FileCommandCapabilityConfig::validate`] first to collect every issue.
    pub fn from_config(
        name: &str,
        config: &FileCommandCapabilityConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self, ConfigIssue> {
        let schema = config.to_schema(name)?;
        let mut capability = Self::new(schema, config.command.as_str(), runner);
        capability.working_dir = config.working_dir.clone();
        Ok(capability)
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Build the final command string by substituting parameters.
    ///
    /// `{param_name}` placeholders are replaced with shell-escaped argument
    /// values. Placeholders without a value (absent, or `null`) are removed.
    /// Anything else in braces is left untouched.
    pub fn render(&self, arguments: &Arguments) -> String {
        PLACEHOLDER
            .replace_all(&self.template, |caps: &Captures| match arguments.get(&caps[1]) {
                Some(Value::Null) | None => String::new(),
                Some(value) => shell_escape(&value.canonical_string()),
            })
            .into_owned()
    }

    fn envelope_for(output: CommandOutput, started: Instant) -> ExecutionEnvelope {
        let elapsed = started.elapsed();
        let text = output.combined();
        let bytes = text.len();

        let envelope = if output.success() {
            let text = if text.is_empty() {
                "Command completed successfully (no output)".to_string()
            } else {
                text
            };
            ExecutionEnvelope::success(text, elapsed)
        } else {
            let status = match output.exit_code {
                Some(code) => format!("command failed with exit code {}", code),
                None => "command terminated by signal".to_string(),
            };
            let message = if text.is_empty() {
                status
            } else {
                format!("{}: {}", status, text.trim_end())
            };
            let error = CapabilityError::execution(message);
            ExecutionEnvelope::failure(&error, elapsed).with_metadata("error_code", error.code())
        };

        let mut envelope = envelope
            .with_metadata("exit_code", output.exit_code)
            .with_metadata("bytes", bytes);
        if output.truncated {
            envelope.insert_metadata("truncated", true);
        }
        envelope
    }
}

#[async_trait]
impl Capability for CommandCapability {
    fn schema(&self) -> &CapabilitySchema {
        &self.schema
    }

    async fn execute(
        &self,
        ctx: &InvocationContext,
        input: &ValidatedArguments,
    ) -> ExecutionEnvelope {
        assert_eq!(
            input.schema_name(),
            self.schema.name(),
            "arguments validated for '{}' passed to capability '{}'",
            input.schema_name(),
            self.schema.name()
        );

        let started = Instant::now();
        if let Err(error) = ctx.check_cancelled() {
            return ExecutionEnvelope::failure(&error, started.elapsed())
                .with_metadata("error_code", error.code());
        }

        let command = self.render(input.arguments());
        debug!(capability = %self.schema.name(), command = %command, "running command capability");

        match self
            .runner
            .run(&command, self.working_dir.as_deref(), ctx.cancellation_token())
            .await
        {
            Ok(output) => Self::envelope_for(output, started),
            Err(error) => {
                let error = match error {
                    RunnerError::Cancelled => CapabilityError::Cancelled,
                    other => CapabilityError::execution(other.to_string()),
                };
                ExecutionEnvelope::failure(&error, started.elapsed())
                    .with_metadata("error_code", error.code())
            }
        }
    }
}

impl fmt::Debug for CommandCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandCapability")
            .field("name", &self.schema.name())
            .field("template", &self.template)
            .field("working_dir", &self.working_dir)
            .finish_non_exhaustive()
    }
}

/// Escape a string for safe shell substitution.
///
/// Uses OS-appropriate escaping:
/// - **Unix**: Single-quote wrapping (`hello 'world'` → `'hello '\''world'\'''`)
/// - **Windows**: Double-quote wrapping with `"` → `\"`, `%` → `%%`, `!` → `^!`
pub fn shell_escape(s: &str) -> String {
    // If the string contains no special characters, return as-is
    if !s.is_empty()
        && s.chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '/')
    {
        return s.to_string();
    }

    if cfg!(target_os = "windows") {
        shell_escape_windows(s)
    } else {
        shell_escape_unix(s)
    }
}

/// Unix shell escape: wrap in single quotes, escape internal single quotes.
fn shell_escape_unix(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len() + 4);
    escaped.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            escaped.push_str("'\\''");
        } else {
            escaped.push(ch);
        }
    }
    escaped.push('\'');
    escaped
}

/// Windows cmd.exe escape: wrap in double quotes, escape `"`, `%`, and `!`.
fn shell_escape_windows(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len() + 4);
    escaped.push('"');
    for ch in s.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '%' => escaped.push_str("%%"),
            '!' => escaped.push_str("^!"),
            _ => escaped.push(ch),
        }
    }
    escaped.push('"');
    escaped
}
