//! `tracing-subscriber` setup shared by the server and the ingestion tool.
//!
//! Output format:
//! - RFC3339 UTC timestamps
//! - compact single-line events with target and `file:line`
//! - span close events (duration at the end of instrumented calls)
//! - ANSI colors only when stdout is a terminal

use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Library targets of this workspace; [`env_filter_with_level`] tunes them together.
pub const WORKSPACE_TARGETS: [&str; 5] = [
    "ai_llm_service",
    "rag_store",
    "contextor",
    "api",
    "portfolio_chat",
];

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

/// Formatting layer used by [`init`].
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stdout().is_terminal();

    let format = fmt::format()
        .compact()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_source_location(true);

    fmt::layer()
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(format)
}

/// Level directives (`ai_llm_service=debug`, ...) for every workspace target.
pub fn level_directives(level: Level) -> Vec<Directive> {
    let level = level.as_str().to_lowercase();
    WORKSPACE_TARGETS
        .iter()
        .filter_map(|target| Directive::from_str(&format!("{target}={level}")).ok())
        .collect()
}

/// `RUST_LOG` if set, otherwise `default`; workspace crates get `level` unless
/// `RUST_LOG` is present.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    match EnvFilter::try_from_default_env() {
        Ok(from_env) => from_env,
        Err(_) => level_directives(level)
            .into_iter()
            .fold(EnvFilter::new(default), |f, d| f.add_directive(d)),
    }
}

/// Installs the global subscriber.
///
/// Calling it twice is harmless: the second install attempt is ignored.
pub fn init(default: &str, level: Level) {
    let installed = tracing_subscriber::registry()
        .with(env_filter_with_level(default, level))
        .with(layer())
        .try_init();
    if installed.is_err() {
        tracing::debug!("global subscriber already installed");
    }
}
