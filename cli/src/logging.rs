use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes logging for the command line tool.
///
/// Human-readable output goes to stderr so that report output on stdout stays clean. A JSON
/// copy is written to the `logs` directory under the application data dir, rotated daily.
///
/// The default filter is `info,service=debug,database=info`; `RUST_LOG` overrides it.
///
/// Returns a guard that must be kept alive for the duration of the program.
pub fn init_logging(verbose: bool) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = file_system::get_log_dir();

    let file_layer = match std::fs::create_dir_all(&log_dir) {
        Ok(()) => {
            let file_appender =
                RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "file-use-checker.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_file(true)
                .with_line_number(true);
            Some((layer, guard))
        }
        Err(e) => {
            eprintln!(
                "Warning: Failed to create log directory at {}: {}",
                log_dir.display(),
                e
            );
            None
        }
    };
    let (file_layer, guard) = match file_layer {
        Some((layer, guard)) => (Some(layer), Some(guard)),
        None => (None, None),
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    let default_filter = if verbose {
        "debug"
    } else {
        "info,service=debug,database=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::debug!(log_dir = %log_dir.display(), "Logging initialized");
    guard
}
