use std::sync::Once;

/// Filter used when neither the config nor `RUST_LOG` provides one.
///
/// The wgpu stack is chatty at info level; keep it to warnings.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "nabu_engine=debug,wgpu=warn"). It takes precedence over `RUST_LOG`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Prefix every line with a millisecond timestamp.
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            timestamps: true,
        }
    }
}

static INIT: Once = Once::new();

/// Picks the filter string: explicit config, then the environment, then
/// [`DEFAULT_FILTER`].
fn resolve_filter(config: &LoggingConfig, env: Option<String>) -> String {
    config
        .env_filter
        .clone()
        .or(env)
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Initializes the global logger once.
///
/// Idempotent; subsequent calls are ignored. Call early in `main`, before the
/// runtime creates the window.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = resolve_filter(&config, std::env::var("RUST_LOG").ok());

        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&filter);
        builder.write_style(config.write_style);
        if config.timestamps {
            builder.format_timestamp_millis();
        } else {
            builder.format_timestamp(None);
        }

        // Another logger may already be installed (tests, embedding hosts).
        if let Err(e) = builder.try_init() {
            eprintln!("nabu: logger not installed: {e}");
            return;
        }

        log::debug!("logging initialized ({filter})");
    });
}
