//! Tracing initialization for the server binary.
//!
//! Controlled by environment variables:
//! - `CARRION_LOG`: filter string (`RUST_LOG` syntax). Falls back to `RUST_LOG`.
//! - Default level is `warn` when neither is set.
//!
//! Logs go to stderr (stdout carries the protocol) or to the file given
//! with `--log-file`.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{prelude::*, EnvFilter, Registry};

/// Initialize the subscriber. The returned guard must stay alive for the
/// process lifetime when file logging is active.
pub fn init(log_file: Option<&str>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_env("CARRION_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let file = match std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
            {
                Ok(file) => file,
                Err(err) => {
                    eprintln!("cannot open log file {path}: {err}");
                    std::process::exit(2);
                }
            };
            let (writer, guard) = tracing_appender::non_blocking(file);
            Registry::default()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .with_ansi(false)
                        .with_writer(writer)
                        .compact(),
                )
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            Registry::default()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .with_writer(std::io::stderr)
                        .compact(),
                )
                .with(filter)
                .init();
            None
        }
    }
}
