//! Tracing initialisation for the preview-auth binaries.
//!
//! Call [`init_tracing`] once at program start. Later calls are ignored
//! because the global subscriber can only be set once per process.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global tracing subscriber.
///
/// `preview-authd` calls this once from `main` with its `--json` and
/// `--verbose` flags; JSON mode is meant for log shippers, the plain mode for
/// a terminal.
///
/// * `json`: emit newline-delimited JSON instead of human-readable lines.
/// * `level`: default verbosity when `RUST_LOG` is not set.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing(false, Level::INFO);
        init_tracing(true, Level::DEBUG);
        tracing::info!("still logging");
    }
}
