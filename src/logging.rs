// src/logging.rs

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global fmt subscriber. `RUST_LOG` wins over `verbose`.
pub fn init(verbose: bool) {
    let default = if verbose {
        "info,aptscraper=debug"
    } else {
        "info,aptscraper=info"
    };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .try_init();
}
