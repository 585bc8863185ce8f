//! Logging utilities
//!
//! The engine and game crates log through the `log` facade; the host binary
//! installs `env_logger` once at startup. `RUST_LOG` overrides the default
//! filter.

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system using `RUST_LOG` only
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with a fallback filter when `RUST_LOG` is unset
///
/// Safe to call more than once; later calls are ignored so tests and hosts can
/// both initialize without coordinating.
pub fn init_with_default_filter(filter: &str) {
    // A logger already installed is not an error here
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .try_init();
}
