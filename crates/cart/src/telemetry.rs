//! Tracing subscriber setup for hosts embedding the cart store.

use tracing_subscriber::{
    EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
};

use crate::config::LogFormat;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "go_marketplace_cart=info,go_marketplace_core=info";

/// Install a global tracing subscriber.
///
/// Defaults to info level for the cart crates if `RUST_LOG` is not set.
///
/// # Errors
///
/// Returns `TryInitError` if a global subscriber is already installed, which
/// hosts and tests that initialize more than once can ignore.
pub fn init(format: LogFormat) -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    }
}
