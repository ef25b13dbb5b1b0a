//! Logging setup for the CLI

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize stderr logging. `RUST_LOG` wins over `--log-level`.
pub fn init_simple_logging(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("meridian_cli={level},meridian_fes={level}", level = level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
