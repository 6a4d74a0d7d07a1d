//! File-based logging
//!
//! The command shell owns stdin/stdout, so tracing output goes to a daily
//! rotating file instead.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

pub const DEFAULT_LOG_DIR: &str = ".logs";
const LOG_FILE_PREFIX: &str = "musicplayer-rs";

/// Initialize the logging system.
///
/// Logs are written to `<log_dir>/musicplayer-rs.YYYY-MM-DD.log`. The level
/// is taken from `RUST_LOG`, falling back to:
/// - `musicplayer_rs` modules: DEBUG
/// - `rspotify`: INFO
/// - Other crates: WARN
///
/// The returned guard flushes the writer on drop and must be kept alive.
pub fn init_logging(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("musicplayer_rs=debug,rspotify=info,warn")
    });

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!("Logging initialized - logs written to {}/", log_dir.display());

    Ok(guard)
}

/// Log a backend load request
#[macro_export]
macro_rules! log_load_request {
    ($backend:expr, $($field:tt)*) => {
        tracing::debug!(backend = $backend, $($field)*, "Load request started");
    };
}

/// Log the outcome of a backend load request
#[macro_export]
macro_rules! log_load_result {
    ($backend:expr, $identifier:expr, $outcome:expr) => {
        match &$outcome {
            $crate::backend::LoadResult::LoadFailed(reason) => {
                tracing::warn!(
                    backend = $backend,
                    identifier = %$identifier,
                    reason = %reason,
                    "Load request failed"
                )
            }
            other => {
                tracing::debug!(
                    backend = $backend,
                    identifier = %$identifier,
                    outcome = other.kind(),
                    "Load request finished"
                )
            }
        }
    };
}
