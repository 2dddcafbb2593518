use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global subscriber on stderr so tables and `--json` output on
/// stdout stay machine-readable.
pub fn init_logging(verbose: bool) {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .compact(),
        )
        .with(log_filter(verbose, directives.as_deref()))
        .init();
}

/// `RUST_LOG` wins when set; otherwise `--verbose` turns on this crate's debug
/// events and everything else stays off.
fn log_filter(verbose: bool, directives: Option<&str>) -> EnvFilter {
    match directives {
        Some(directives) => EnvFilter::new(directives),
        None if verbose => EnvFilter::new(format!("{}=debug", env!("CARGO_CRATE_NAME"))),
        None => EnvFilter::new("off"),
    }
}
