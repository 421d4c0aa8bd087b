//! Tracing initialisation

use crate::config::Config;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Pick the log level: `RUST_LOG` first, then the configured level, then INFO
pub fn log_level(config: &Config) -> Level {
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| v.parse::<Level>().ok())
        .or_else(|| config.log_level.parse::<Level>().ok())
        .unwrap_or(Level::INFO)
}

/// Install a global fmt subscriber.
///
/// Returns `false` when a global subscriber was already installed, which is
/// not treated as an error.
pub fn init(config: &Config) -> bool {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(config))
        .finish();

    tracing::subscriber::set_global_default(subscriber).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_level_is_used() {
        let config = Config {
            log_level: "debug".to_string(),
            ..Default::default()
        };
        if std::env::var("RUST_LOG").is_err() {
            assert_eq!(log_level(&config), Level::DEBUG);
        }
    }

    #[test]
    fn test_repeated_init_is_harmless() {
        let config = Config::default();
        init(&config);
        assert!(!init(&config));
    }
}
