//! Logging initialization.
//!
//! Logs always go to stderr; stdout carries the stdio transport.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::cli::{Cli, LogFormat};

/// Level selected by the verbosity flags
pub const fn log_level(cli: &Cli) -> Level {
    if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    }
}

/// Initialize the global tracing subscriber from CLI flags.
///
/// # Errors
///
/// Returns an error if the global tracing subscriber cannot be set.
pub fn initialize_logging(cli: &Cli) -> Result<()> {
    let level = log_level(cli);

    match cli.log_format {
        LogFormat::Text => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        },
        LogFormat::Json => {
            let subscriber = FmtSubscriber::builder()
                .json()
                .with_max_level(level)
                .with_target(false)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_log_levels() {
        let cli = Cli::try_parse_from(["sitedex-mcp"]).unwrap();
        assert_eq!(log_level(&cli), Level::INFO);

        let cli = Cli::try_parse_from(["sitedex-mcp", "-v"]).unwrap();
        assert_eq!(log_level(&cli), Level::DEBUG);

        let cli = Cli::try_parse_from(["sitedex-mcp", "--quiet"]).unwrap();
        assert_eq!(log_level(&cli), Level::ERROR);
    }
}
