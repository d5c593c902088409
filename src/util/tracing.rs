use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt};

/// Initializes the `tracing` logging framework.
///
/// Log output is influenced by the
/// [`RUST_LOG`](tracing_subscriber::filter::EnvFilter) environment variable
/// and defaults to the `INFO` level. Everything is written to stderr, since
/// stdout is reserved for the report itself.
pub fn init() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    fmt()
        .compact()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
