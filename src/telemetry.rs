//! Telemetry: global subscriber setup and the task-local run context that
//! correlates every log line of one batch execution.

use std::any::type_name_of_val;
use std::sync::atomic::{AtomicBool, Ordering};

use log::LevelFilter;
use thiserror::Error;
use tokio::task_local;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::Layer,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};
use uuid::Uuid;

use crate::config::AppConfig;

/// Correlation data for one batch execution.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
}

impl RunContext {
    /// Context with a fresh random run id.
    pub fn generate() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
        }
    }
}

task_local! {
    static ACTIVE_RUN_CONTEXT: RunContext;
}

/// Errors that can occur while initializing global telemetry.
#[derive(Debug, Error)]
pub enum TelemetryInitError {
    #[error("failed to install log tracer bridge: {0}")]
    LogTracer(#[from] log::SetLoggerError),
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] TryInitError),
}

static TELEMETRY_INITIALIZED: AtomicBool = AtomicBool::new(false);

const CRATE_TARGET: &str = "outreach_connectors";

/// Filter used when `RUST_LOG` is unset: this crate logs at the configured
/// level while HTTP client internals stay at `warn`.
fn default_directives(log_level: &str) -> String {
    format!("warn,{CRATE_TARGET}={log_level}")
}

fn env_filter(config: &AppConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(&config.log_level)))
        .unwrap_or_else(|_| EnvFilter::new(default_directives("info")))
}

/// Initialize global tracing/logging exactly once, wiring `log::` macros into the tracing pipeline.
///
/// Output goes to stderr so batch results on stdout stay machine-readable.
pub fn init_tracing(config: &AppConfig) -> Result<(), TelemetryInitError> {
    if TELEMETRY_INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Ok(());
    }

    if let Err(err) = LogTracer::builder()
        .with_max_level(LevelFilter::Trace)
        .init()
    {
        // Another LogTracer already installed is fine.
        let logger_type = type_name_of_val(log::logger());
        if !logger_type.contains("LogTracer") {
            eprintln!(
                "Warning: Failed to install log tracer bridge: {}. legacy `log::` macros will not emit structured tracing events.",
                err
            );
        }
    }

    // JSON lines carry the enclosing `connector_run` span so every event of a
    // batch has its run id.
    let fmt_layer = match config.log_format.as_str() {
        "pretty" => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
        _ => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    if let Err(err) = tracing_subscriber::registry()
        .with(env_filter(config))
        .with(fmt_layer)
        .try_init()
    {
        TELEMETRY_INITIALIZED.store(false, Ordering::SeqCst);
        eprintln!(
            "Warning: Failed to set global tracing subscriber: {}. Default subscriber remains in effect.",
            err
        );
    }

    Ok(())
}

/// Execute `future` within the provided run context, making it available
/// through task-local storage until the future completes.
pub async fn with_run_context<Fut, R>(context: RunContext, future: Fut) -> R
where
    Fut: std::future::Future<Output = R>,
{
    ACTIVE_RUN_CONTEXT.scope(context, future).await
}

/// The active run id, if the current task runs inside [`with_run_context`].
pub fn current_run_id() -> Option<String> {
    ACTIVE_RUN_CONTEXT.try_with(|ctx| ctx.run_id.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_id_is_scoped_to_future() {
        assert!(current_run_id().is_none());
        let context = RunContext {
            run_id: "run-42".to_string(),
        };
        let seen = with_run_context(context, async { current_run_id() }).await;
        assert_eq!(seen.as_deref(), Some("run-42"));
        assert!(current_run_id().is_none());
    }

    #[test]
    fn test_generated_run_ids_differ() {
        assert_ne!(RunContext::generate().run_id, RunContext::generate().run_id);
    }

    #[test]
    fn test_default_directives_scope_level_to_crate() {
        assert_eq!(default_directives("debug"), "warn,outreach_connectors=debug");
        assert!(EnvFilter::try_new(default_directives("trace")).is_ok());
        assert!(EnvFilter::try_new(default_directives("loud")).is_err());
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        let config = AppConfig::default();
        assert!(init_tracing(&config).is_ok());
        assert!(init_tracing(&config).is_ok());
    }
}
