use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initializes tracing with a compact stderr layer.
///
/// - Default level: `warn`, or `info,shinsa=debug` when `verbose` is set
/// - `RUST_LOG` overrides both
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(verbose: bool) {
    let default_directives = if verbose { "info,shinsa=debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .compact();

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()
        .is_ok()
    {
        tracing::debug!("Tracing initialized");
    }
}
