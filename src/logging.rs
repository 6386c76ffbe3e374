use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax. When unset the
/// `RUST_LOG` variable is used, then `info`.
#[derive(Debug)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub target: env_logger::Target,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            target: env_logger::Target::Stdout,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        builder.target(config.target);
        builder.init();

        log::debug!("logging initialized");
    });
}
