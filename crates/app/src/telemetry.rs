//! Process-wide tracing setup.

use tracing_subscriber::EnvFilter;

/// Install the JSON tracing subscriber.
///
/// The filter comes from `RUST_LOG` when set; the export pipeline logs at
/// `debug`, everything else defaults to `info`. Calling this more than
/// once is harmless.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,factura_render=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_target(false)
        .try_init();
}
