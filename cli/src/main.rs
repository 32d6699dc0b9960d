//! CLI entrypoint for capdispatch
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use capdispatch_application::{
    DispatchCapabilityUseCase, DispatchConfig, DispatchOptions, DispatchRequest, InvocationLogger,
    NoInvocationLogger, SchemaExportPort,
};
use capdispatch_domain::{Arguments, CapabilityError, ExecutionEnvelope};
use capdispatch_infrastructure::{
    CapabilityCatalog, ConfigLoader, FileConfig, JsonSchemaExporter, JsonlInvocationLogger,
    ShellCommandRunner,
};
use capdispatch_presentation::{
    ArgsInput, Cli, Command, ConfigReport, OutputConfig, OutputFormatter, ProgressReporter,
    SourceLine, formatter_for,
};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting capdispatch");

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("failed to load configuration: {}", e))?
    };

    let output = OutputConfig {
        format: config.output.format,
        color: config.output.color,
        show_progress: config.output.progress,
    }
    .with_format_override(cli.output.map(Into::into));
    output.apply_color();
    let formatter = formatter_for(output.format);

    match cli.command {
        Command::Config => {
            let report = config_report(&config, cli.config.as_deref(), cli.no_config)?;
            print!("{}", formatter.format_config(&report));
            Ok(ExitCode::SUCCESS)
        }
        Command::List => {
            let dispatcher = build_dispatcher(&config, None)?;
            print!("{}", formatter.format_list(&dispatcher.schemas()));
            Ok(ExitCode::SUCCESS)
        }
        Command::Describe { name } => {
            let dispatcher = build_dispatcher(&config, None)?;
            let schema = dispatcher
                .describe(&name)
                .ok_or_else(|| anyhow!("{}", CapabilityError::NotFound(name.clone())))?;
            print!("{}", formatter.format_schema(schema));
            Ok(ExitCode::SUCCESS)
        }
        Command::Schema { name } => {
            let dispatcher = build_dispatcher(&config, None)?;
            let exporter = JsonSchemaExporter;
            let exported = match name {
                Some(name) => {
                    let schema = dispatcher
                        .describe(&name)
                        .ok_or_else(|| anyhow!("{}", CapabilityError::NotFound(name.clone())))?;
                    exporter.schema_to_json(schema)
                }
                None => serde_json::Value::Array(exporter.all_schemas(dispatcher.registry())),
            };
            println!("{}", serde_json::to_string_pretty(&exported)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate { name, input } => {
            let dispatcher = build_dispatcher(&config, None)?;
            let result = read_arguments(&input)
                .and_then(|arguments| dispatcher.validate(&DispatchRequest::new(&name, arguments)));
            print!("{}", formatter.format_validation(&name, &result));
            Ok(exit_code(result.is_ok()))
        }
        Command::Call {
            name,
            input,
            timeout,
            no_progress,
        } => {
            let dispatcher = build_dispatcher(&config, timeout)?;
            let envelope = match read_arguments(&input) {
                Ok(arguments) => {
                    call(
                        &dispatcher,
                        DispatchRequest::new(&name, arguments),
                        output.progress_enabled(no_progress),
                    )
                    .await
                }
                Err(error) => ExecutionEnvelope::failure(&error, Duration::ZERO)
                    .with_metadata("error_code", error.code())
                    .with_metadata("capability", name.as_str()),
            };
            print!("{}", formatter.format_envelope(&name, &envelope));
            Ok(exit_code(envelope.succeeded))
        }
    }
}

/// Initialize logging based on verbosity level; `RUST_LOG` takes precedence.
///
/// The returned guard flushes the file writer when dropped.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("--log-file must name a file: {}", path.display()))?;
            std::fs::create_dir_all(directory)
                .with_context(|| format!("failed to create log directory {}", directory.display()))?;

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Build the registry from configuration and wrap it in the dispatcher.
///
/// `timeout_secs` (from `--timeout`) replaces the configured default deadline.
fn build_dispatcher(
    config: &FileConfig,
    timeout_secs: Option<u64>,
) -> Result<DispatchCapabilityUseCase> {
    // === Dependency Injection ===
    let runner = Arc::new(ShellCommandRunner::new());
    let catalog = CapabilityCatalog::from_config(config, runner)
        .context("built-in capability schema is invalid")?;
    if !catalog.skipped.is_empty() {
        warn!(
            skipped = ?catalog.skipped,
            "some configured capabilities were not registered (see `capdispatch config`)"
        );
    }
    let registry = Arc::new(catalog.into_registry());
    debug!(capabilities = registry.len(), "registry built");

    let dispatch_config = match timeout_secs {
        Some(seconds) => DispatchConfig::from_timeout_seconds(seconds),
        None => config.dispatch.to_dispatch_config(),
    };

    let logger: Arc<dyn InvocationLogger> = match &config.dispatch.invocation_log {
        Some(path) => match JsonlInvocationLogger::open(path) {
            Ok(logger) => {
                info!(path = %logger.path().display(), "writing invocation log");
                Arc::new(logger)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invocation log disabled");
                Arc::new(NoInvocationLogger)
            }
        },
        None => Arc::new(NoInvocationLogger),
    };

    Ok(DispatchCapabilityUseCase::new(registry)
        .with_config(dispatch_config)
        .with_logger(logger))
}

/// Dispatch one call; Ctrl-C cancels it through the cancellation token.
async fn call(
    dispatcher: &DispatchCapabilityUseCase,
    request: DispatchRequest,
    show_progress: bool,
) -> ExecutionEnvelope {
    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, cancelling call");
                cancel.cancel();
            }
        })
    };

    let mut options = DispatchOptions::default().with_cancellation(cancel);
    let reporter = show_progress.then(|| Arc::new(ProgressReporter::new()));
    if let Some(reporter) = &reporter {
        options = options.with_progress(reporter.clone());
    }

    let envelope = dispatcher.execute(request, options).await;

    if let Some(reporter) = reporter {
        reporter.finish(envelope.succeeded);
    }
    ctrl_c.abort();
    envelope
}

/// Raw `--args`/`--args-file` input as [`Arguments`]; nothing given means `{}`.
fn read_arguments(input: &ArgsInput) -> Result<Arguments, CapabilityError> {
    match input.read() {
        Ok(Some(text)) => Arguments::parse_json(&text),
        Ok(None) => Ok(Arguments::new()),
        Err(e) => Err(CapabilityError::invalid_arguments(format!(
            "failed to read arguments: {}",
            e
        ))),
    }
}

fn config_report(
    config: &FileConfig,
    config_path: Option<&Path>,
    no_config: bool,
) -> Result<ConfigReport> {
    let sources = if no_config {
        vec![SourceLine {
            label: "Default".to_string(),
            location: "built-in defaults (--no-config)".to_string(),
            found: true,
        }]
    } else {
        ConfigLoader::sources(config_path)
            .into_iter()
            .map(|s| SourceLine {
                label: s.label.to_string(),
                location: s.location,
                found: s.found,
            })
            .collect()
    };

    Ok(ConfigReport {
        sources,
        resolved: serde_json::to_value(config).context("failed to serialize configuration")?,
        issues: config.validate(),
    })
}

fn exit_code(succeeded: bool) -> ExitCode {
    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_arguments_defaults_to_empty() {
        let args = read_arguments(&ArgsInput::default()).unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn test_read_arguments_rejects_non_object() {
        let input = ArgsInput {
            args: Some("[1, 2]".to_string()),
            args_file: None,
        };
        let err = read_arguments(&input).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
    }

    #[test]
    fn test_timeout_flag_overrides_config() {
        let config = FileConfig::default();
        let dispatcher = build_dispatcher(&config, Some(0)).unwrap();
        assert_eq!(dispatcher.config().default_timeout, None);

        let dispatcher = build_dispatcher(&config, None).unwrap();
        assert_eq!(
            dispatcher.config().default_timeout,
            Some(Duration::from_secs(30))
        );
    }

    #[tokio::test]
    async fn test_call_builtin_echo() {
        let dispatcher = build_dispatcher(&FileConfig::default(), None).unwrap();
        let request = DispatchRequest::new(
            "echo",
            Arguments::new().with("message", "hi").with("uppercase", true),
        );

        let envelope = call(&dispatcher, request, false).await;
        assert!(envelope.succeeded);
        assert_eq!(envelope.output.unwrap()["message"], "HI");
    }

    #[test]
    fn test_config_report_no_config() {
        let report = config_report(&FileConfig::default(), None, true).unwrap();
        assert_eq!(report.sources.len(), 1);
        assert_eq!(report.resolved["dispatch"]["timeout_secs"], 30);
        assert!(report.issues.is_empty());
    }
}
