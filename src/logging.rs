use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Logs go to stderr so that `--dry-run` output on stdout stays clean.
///
/// `RUST_LOG` wins over `-v` when set.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr).with_target(false)).with(filter).init();
}
