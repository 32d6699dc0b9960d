//! Built-in capabilities
//!
//! Registered unless `[builtin] enabled = false`:
//!
//! - `echo`: returns its (validated) input, optionally uppercased
//! - `wait`: sleeps in steps, reporting progress and honoring cancellation

use capdispatch_domain::capability::{
    Arguments, Capability, CapabilityError, CapabilityExample, CapabilitySchema, FnCapability,
    HandlerOutput, InvocationContext, ParameterSpec, Progress, SchemaError,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

pub const ECHO: &str = "echo";
pub const WAIT: &str = "wait";

/// Names of all built-in capabilities
pub const BUILTIN_NAMES: [&str; 2] = [ECHO, WAIT];

/// Longest accepted `echo` message, in bytes
pub const ECHO_MAX_LENGTH: usize = 4096;

/// Longest accepted `wait`, in milliseconds
pub const WAIT_MAX_MS: f64 = 600_000.0;

const WAIT_DEFAULT_STEPS: i64 = 10;

pub fn echo() -> Result<FnCapability, SchemaError> {
    let schema = CapabilitySchema::new(
        ECHO,
        "Return the given message, optionally uppercased",
        vec![
            ParameterSpec::string("message", "Text to return")
                .required()
                .with_length(1, ECHO_MAX_LENGTH),
            ParameterSpec::boolean("uppercase", "Uppercase the message").with_default(false),
        ],
    )?
    .with_example(CapabilityExample::new(
        "Shout a greeting",
        Arguments::new().with("message", "hello").with("uppercase", true),
        r#"{"message": "HELLO", "uppercase": true}"#,
    ));

    Ok(FnCapability::new(schema, |_ctx, args| async move { run_echo(&args) }))
}

fn run_echo(args: &Arguments) -> Result<HandlerOutput, CapabilityError> {
    let message = args.require_str("message")?;
    let uppercase = args.get_bool("uppercase").unwrap_or(false);
    let message = if uppercase {
        message.to_uppercase()
    } else {
        message.to_string()
    };

    Ok(HandlerOutput::new(json!({ "message": message, "uppercase": uppercase }))
        .with_metadata("operation", ECHO))
}

pub fn wait() -> Result<FnCapability, SchemaError> {
    let schema = CapabilitySchema::new(
        WAIT,
        "Sleep for a number of milliseconds, reporting progress",
        vec![
            ParameterSpec::integer("ms", "How long to wait")
                .required()
                .with_range(0.0, WAIT_MAX_MS),
            ParameterSpec::integer("steps", "Number of progress updates")
                .with_range(1.0, 100.0)
                .with_default(WAIT_DEFAULT_STEPS),
        ],
    )?
    .with_example(CapabilityExample::new(
        "Wait one second in four steps",
        Arguments::new().with("ms", 1000).with("steps", 4),
        r#"{"waited_ms": 1000}"#,
    ));

    Ok(FnCapability::new(schema, |ctx, args| async move { run_wait(ctx, args).await }))
}

async fn run_wait(ctx: InvocationContext, args: Arguments) -> Result<HandlerOutput, CapabilityError> {
    let ms = args
        .get_i64("ms")
        .ok_or_else(|| CapabilityError::invalid_arguments("missing integer argument: ms"))?;
    let steps = args.get_i64("steps").unwrap_or(WAIT_DEFAULT_STEPS);
    // Both are range-checked by validation.
    let (ms, steps) = (ms.max(0) as u64, steps.max(1) as u64);

    let mut waited = 0;
    for current in 1..=steps {
        // Cumulative target, so the last step lands exactly on `ms`.
        let target = ms * current / steps;
        tokio::select! {
            _ = ctx.cancelled() => return Err(CapabilityError::Cancelled),
            _ = tokio::time::sleep(Duration::from_millis(target - waited)) => {}
        }
        waited = target;
        ctx.report_progress(Progress::new(current, steps, format!("waited {}ms", waited)));
    }

    Ok(HandlerOutput::new(json!({ "waited_ms": ms })).with_metadata("operation", WAIT))
}

/// All built-in capabilities, ready for registration.
pub fn builtin_capabilities() -> Result<Vec<Arc<dyn Capability>>, SchemaError> {
    Ok(vec![Arc::new(echo()?), Arc::new(wait()?)])
}
