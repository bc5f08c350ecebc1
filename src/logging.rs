use crate::config::AppConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Target used by per-request spans (`tower_http::trace`)
const HTTP_TRACE_TARGET: &str = "tower_http";

/// Install the global subscriber. Keep the returned guard alive for the
/// lifetime of the process or buffered file output is lost.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let file_appender = match config.rotation.as_str() {
        "hourly" => tracing_appender::rolling::hourly(&config.log_dir, &config.log_file),
        "daily" => tracing_appender::rolling::daily(&config.log_dir, &config.log_file),
        _ => tracing_appender::rolling::never(&config.log_dir, &config.log_file),
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        let file_layer = fmt::layer()
            .json()
            .with_target(true) // Keep target in JSON for structured queries
            .with_writer(non_blocking)
            .with_ansi(false);
        registry.with(file_layer).init();
    } else {
        let file_layer = fmt::layer()
            .with_target(false) // Hide redundant target in text output
            .with_writer(non_blocking)
            .with_ansi(false);
        let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
        registry.with(file_layer).with(stdout_layer).init();
    }

    guard
}

/// `RUST_LOG`-style directives for the configured level
fn filter_directives(config: &AppConfig) -> String {
    if config.enable_tracing {
        format!("{},{}=debug", config.log_level, HTTP_TRACE_TARGET)
    } else {
        format!("{},{}=off", config.log_level, HTTP_TRACE_TARGET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(enable_tracing: bool) -> AppConfig {
        let yaml = format!(
            "log_level: warn\nlog_dir: ./logs\nlog_file: t.log\nuse_json: true\nrotation: never\nenable_tracing: {}\ngateway:\n  host: 0.0.0.0\n  port: 1\njwt_secret: s\n",
            enable_tracing
        );
        AppConfig::from_yaml(&yaml).unwrap()
    }

    #[test]
    fn test_filter_directives() {
        assert_eq!(filter_directives(&config(true)), "warn,tower_http=debug");
        assert_eq!(filter_directives(&config(false)), "warn,tower_http=off");
    }
}
