//! Log output for the job binary.
//!
//! Compact single-line events with RFC3339 UTC timestamps. ANSI colors
//! are only used when stdout is a terminal, so CI logs stay clean.

use std::io::{self, IsTerminal};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// RFC3339 UTC timer implemented via `chrono`.
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        let s = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// Filter from `RUST_LOG`, falling back to `default`.
pub fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Installs the global subscriber. Safe to call more than once.
pub fn init(verbose: bool) {
    let filter = env_filter(if verbose { "debug" } else { "info" });

    let layer = fmt::layer().with_ansi(io::stdout().is_terminal()).event_format(
        fmt::format()
            .compact()
            .with_target(false)
            .with_timer(ChronoRfc3339Utc),
    );

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
