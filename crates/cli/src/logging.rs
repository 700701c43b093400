use std::io;

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs go to stderr so stdout carries only
/// command output.
///
/// `RUST_LOG` wins unless `--quiet` is set. Otherwise 0 = info, 1 = debug,
/// 2+ = trace.
pub fn init_logging(verbose_level: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        let default = match verbose_level {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
