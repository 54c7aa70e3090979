//! Structured logging initialization for the brightness-control CLI.
//!
//! Logs go to stderr so they never interleave with the slot table or
//! brightness value printed on stdout.

use std::io::{self, IsTerminal};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Initialize the tracing subscriber based on CLI flags and environment.
///
/// # Arguments
///
/// * `verbose` - Verbosity level: 0 = warn, 1 = debug, 2+ = trace
/// * `quiet` - If true, suppress everything except errors
///
/// # Environment Variables
///
/// * `RUST_LOG` - Override default filter (e.g., "bctl=debug")
pub fn init_logging(verbose: u8, quiet: bool) {
    let default_directive = if quiet {
        "bctl=error"
    } else {
        match verbose {
            0 => "bctl=warn",
            1 => "bctl=debug",
            _ => "bctl=trace",
        }
    };

    // Allow RUST_LOG to override, but use our default otherwise
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    if io::stderr().is_terminal() {
        let fmt_layer = fmt::layer()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_thread_ids(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    } else {
        // Compact output for non-TTY (piped, redirected)
        let fmt_layer = fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_thread_ids(false)
            .with_span_events(FmtSpan::NONE)
            .compact()
            .with_writer(io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global subscriber can only be installed once per process, so
    // initialization itself is exercised by the end-to-end CLI tests.

    #[test]
    fn test_filter_directives() {
        assert!(EnvFilter::try_new("bctl=warn").is_ok());
        assert!(EnvFilter::try_new("bctl=debug").is_ok());
        assert!(EnvFilter::try_new("bctl=trace").is_ok());
        assert!(EnvFilter::try_new("bctl=error").is_ok());
    }
}
