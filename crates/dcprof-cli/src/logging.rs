//! Logging and tracing setup for the `dcprof` binary
//!
//! Console output goes to stderr so it never mixes with command output.
//! JSON logs are written to a daily rolling file for bug reports.
//! `RUST_LOG` overrides the configured filter.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory where log files should be written
    pub log_dir: PathBuf,

    /// Whether to enable JSON output to files (for bug reports)
    pub enable_json_logs: bool,

    /// Whether to log to the console (stderr)
    pub enable_console_logs: bool,

    /// Whether to include file/line information in logs
    pub include_location: bool,

    /// Whether to log spans (for performance tracing)
    pub enable_spans: bool,

    /// Default log level filter
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: log_directory(),
            enable_json_logs: true,
            enable_console_logs: true,
            include_location: cfg!(debug_assertions),
            enable_spans: cfg!(debug_assertions),
            default_filter: "warn,dcprof_cli=info,dcprof_services=info,dcprof_wizard=info"
                .to_string(),
        }
    }
}

impl LoggingConfig {
    /// Console quiet unless something goes wrong, JSON logs kept for bug reports
    pub fn production() -> Self {
        Self {
            enable_console_logs: true,
            include_location: false,
            enable_spans: false,
            default_filter: "error,dcprof_cli=warn".to_string(),
            ..Self::default()
        }
    }

    /// Verbose console output for `-v`
    pub fn verbose() -> Self {
        Self {
            include_location: true,
            enable_spans: true,
            default_filter: "info,dcprof_cli=debug,dcprof_core=debug,dcprof_drivers=debug,dcprof_driver_csv=debug,dcprof_wizard=debug,dcprof_services=debug".to_string(),
            ..Self::default()
        }
    }
}

/// Initialize the logging system with the given configuration.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the program.
pub fn init(config: LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    // NEW fires once when the span is created; ENTER would fire on every async
    // re-poll.
    let span_events = if config.enable_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let mut layers = Vec::new();
    let mut guard = None;

    if config.enable_console_logs {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_span_events(span_events.clone())
            .with_ansi(true)
            .with_writer(std::io::stderr)
            .compact()
            .with_filter(env_filter.clone())
            .boxed();

        layers.push(console_layer);
    }

    if config.enable_json_logs {
        std::fs::create_dir_all(&config.log_dir)?;
        let file_appender = tracing_appender::rolling::daily(&config.log_dir, "dcprof.log");
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(file_guard);

        let json_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(span_events)
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(non_blocking)
            .with_filter(env_filter)
            .boxed();

        layers.push(json_layer);
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    tracing::debug!(
        log_dir = %config.log_dir.display(),
        json_enabled = config.enable_json_logs,
        console_enabled = config.enable_console_logs,
        "Logging system initialized"
    );

    Ok(guard)
}

/// Get the log directory path
pub fn log_directory() -> PathBuf {
    dcprof_settings::logs_dir().unwrap_or_else(|_| PathBuf::from("logs"))
}
