//! Diagnostic logging to stderr.

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence; otherwise warnings only, or debug output for
/// faultline crates with `--verbose`.
pub fn init(verbose: bool) {
    let fallback = if verbose {
        "warn,faultline=debug,faultline_history=debug,faultline_metrics=debug,faultline_szz=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(verbose)
            .without_time(),
    );

    // A subscriber may already be set when running under a test harness.
    let _ = tracing::subscriber::set_global_default(subscriber);
}
