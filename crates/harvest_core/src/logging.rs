use anyhow::Result;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::HarvestConfig;

/// Filter used when `RUST_LOG` is unset: third-party crates at `warn`,
/// our own crates at `level`.
pub fn default_filter(level: &str) -> String {
    format!("warn,harvest_app={level},harvest_core={level},harvest_export={level}")
}

/// Log to `~/.harvest/logs` and to stderr. `RUST_LOG` overrides `level`.
/// The returned guard flushes the file writer on drop; keep it alive.
pub fn init_logging(level: &str) -> Result<WorkerGuard> {
    let logs_dir = HarvestConfig::logs_dir()?;
    install(&logs_dir, &default_filter(level), true)
}

/// File-only logging into `logs_dir`, for tests and embedding hosts.
pub fn init_logging_to_dir(logs_dir: &Path, filter: &str) -> Result<WorkerGuard> {
    install(logs_dir, filter, false)
}

fn install(logs_dir: &Path, filter: &str, console: bool) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, "harvest");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // stdout is reserved for command results
    let console_layer = console.then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_scopes_own_crates() {
        let filter = default_filter("debug");
        assert!(filter.starts_with("warn,"));
        assert!(filter.contains("harvest_export=debug"));
        assert!(filter.contains("harvest_app=debug"));
        // Must be a valid directive list.
        drop(EnvFilter::new(filter));
    }

    #[test]
    fn test_init_logging_to_dir_creates_directory() {
        let tmp = tempfile::tempdir().expect("Failed to create tempdir");
        let logs_dir = tmp.path().join("nested").join("logs");
        assert!(!logs_dir.exists());

        // The global subscriber can only be installed once per process, so
        // only the directory creation is asserted unconditionally.
        let result = init_logging_to_dir(&logs_dir, "warn");
        assert!(logs_dir.exists());

        if let Err(e) = result {
            assert!(e.to_string().contains("logging"), "unexpected error: {e}");
        }
    }
}
