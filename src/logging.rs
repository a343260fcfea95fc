use tracing_subscriber::EnvFilter;

/// Initialise logging for the embedding shell. The default level is `info`;
/// passing `debug` raises it and also allows `RUST_LOG` to override the
/// filter. Without `debug` the environment variable is ignored so a stray
/// `RUST_LOG` cannot flood the panel's console.
pub fn init(debug: bool) {
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
