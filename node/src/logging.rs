//! # Node Logging
//!
//! One `tracing` subscriber for the node process. Events go to stderr so
//! that stdout only carries the key material `keygen` and `run` print.
//!
//! Filtering starts from the node's own crates (`shardline_node`,
//! `shardline_client`) at a level chosen by `-v`, with everything else at
//! `warn`. `RUST_LOG`, when set, replaces that default entirely:
//!
//! ```text
//! RUST_LOG=shardline_client::network::emulator=trace shardline-node run
//! ```

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Crates whose level `-v` raises.
const NODE_CRATES: [&str; 2] = ["shardline_node", "shardline_client"];

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Multi-line, colored, with source locations.
    Pretty,
    /// One short line per event.
    Compact,
    /// One JSON object per event with fields flattened, for log shippers.
    Json,
}

/// Filter used when `RUST_LOG` is unset: node crates at `info`, `debug`
/// or `trace` for a verbosity of 0, 1 or 2+, other crates at `warn`.
pub fn default_directives(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let mut directives = String::from("warn");
    for krate in NODE_CRATES {
        directives.push_str(&format!(",{krate}={level}"));
    }
    directives
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logging(format: LogFormat, verbosity: u8) -> anyhow::Result<()> {
    let (filter, source) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, "RUST_LOG"),
        Err(_) => (EnvFilter::try_new(default_directives(verbosity))?, "default"),
    };
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }

    tracing::debug!(?format, filter = source, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_node_crates_only() {
        assert_eq!(default_directives(0), "warn,shardline_node=info,shardline_client=info");
        assert_eq!(default_directives(1), "warn,shardline_node=debug,shardline_client=debug");
        assert_eq!(default_directives(5), "warn,shardline_node=trace,shardline_client=trace");
    }

    #[test]
    fn default_directives_parse() {
        for verbosity in 0..3 {
            EnvFilter::try_new(default_directives(verbosity)).unwrap();
        }
    }

    #[test]
    fn format_names() {
        assert_eq!(LogFormat::from_str("json", true), Ok(LogFormat::Json));
        assert_eq!(LogFormat::from_str("COMPACT", true), Ok(LogFormat::Compact));
        assert!(LogFormat::from_str("yaml", true).is_err());
    }
}
