//! Tracing subscriber setup.

use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::models::index::LoggingConfig;

/// `RUST_LOG` wins over the configured directives.
pub fn build_filter(rust_log: Option<&str>, config: &LoggingConfig) -> anyhow::Result<EnvFilter> {
    match rust_log.filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => EnvFilter::try_new(raw).context("invalid RUST_LOG directives"),
        None => EnvFilter::try_new(&config.filter)
            .with_context(|| format!("invalid logging.filter {:?}", config.filter)),
    }
}

/// Install a fmt subscriber filtered per [`build_filter`].
///
/// Returns `false` when a global subscriber was already installed, which
/// leaves that subscriber in place.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<bool> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = build_filter(rust_log.as_deref(), config)?;

    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_takes_precedence() {
        let config = LoggingConfig {
            filter: "mediadex_core=loud".to_string(),
        };
        assert!(build_filter(None, &config).is_err());
        assert!(build_filter(Some("mediadex_core=debug"), &config).is_ok());
        assert!(build_filter(Some("  "), &LoggingConfig::default()).is_ok());
    }

    #[test]
    fn second_install_is_a_no_op() {
        let config = LoggingConfig::default();
        init_tracing(&config).unwrap();
        assert!(!init_tracing(&config).unwrap());
    }
}
