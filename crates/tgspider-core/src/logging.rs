//! Logging init plus the diagnostics sink the pipeline reports through.

use crate::Result;

/// Initialize tracing for a binary.
///
/// Default: info for our crates, warn for everything else. Can be overridden
/// with `RUST_LOG`.
pub fn init(service_name: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "info,tgspider=info,tgspider_core=info,{service_name}=info"
        ))
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .init();

    Ok(())
}

/// Severity of a pipeline diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagLevel {
    Info,
    Warn,
    Error,
}

/// Leveled diagnostics sink injected into the pipeline components.
///
/// Keeps the core free of process-wide logger state; tests swap in a
/// capturing fake to assert on reported failures.
pub trait Diagnostics: Send + Sync {
    fn emit(&self, level: DiagLevel, message: &str);
}

/// Production sink: forwards diagnostics as `tracing` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn emit(&self, level: DiagLevel, message: &str) {
        match level {
            DiagLevel::Info => tracing::info!("{message}"),
            DiagLevel::Warn => tracing::warn!("{message}"),
            DiagLevel::Error => tracing::error!("{message}"),
        }
    }
}
