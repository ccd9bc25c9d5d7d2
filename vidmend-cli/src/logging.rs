// ============================================================================
// vidmend-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console or file logging for the CLI
//
// By default the `log` facade goes to the console through env_logger, with
// RUST_LOG honoured on top of the level chosen by `--verbose`. With
// `--log-dir` it goes to a daily file through vidmend-core's log4rs setup
// instead, and daily files past the retention period are removed.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use console::style;
use log::LevelFilter;
use vidmend_core::file_logging::{
    DEFAULT_LOG_RETENTION, cleanup_old_logs, daily_log_path, setup_file_logging,
};

use crate::error::CliResult;

/// Level used when `--verbose` is given or not.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs the global logger.
pub fn init_logging(verbose: bool, log_dir: Option<&Path>) -> CliResult<()> {
    let level = level_for(verbose);

    match log_dir {
        Some(dir) => {
            let log_file = daily_log_path(dir);
            setup_file_logging(&log_file, level)
                .with_context(|| format!("Cannot set up logging to {}", log_file.display()))?;
            match cleanup_old_logs(dir, DEFAULT_LOG_RETENTION) {
                Ok(0) => {}
                Ok(n) => log::info!("Removed {n} expired log file(s)"),
                Err(e) => log::warn!("Could not clean up old logs in {}: {e}", dir.display()),
            }
            log::debug!("Logging to {} at {level}", log_file.display());
        }
        None => init_console_logging(level),
    }
    Ok(())
}

fn init_console_logging(level: LevelFilter) {
    let env = env_logger::Env::default().default_filter_or(level.as_str());
    let _ = env_logger::Builder::from_env(env)
        .format(|buf, record| {
            let label = match record.level() {
                log::Level::Error => style("ERROR").red().bold(),
                log::Level::Warn => style("WARN ").yellow(),
                log::Level::Info => style("INFO ").green(),
                log::Level::Debug => style("DEBUG").blue(),
                log::Level::Trace => style("TRACE").magenta(),
            };
            writeln!(buf, "{} {} {}", buf.timestamp_seconds(), label, record.args())
        })
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_selects_debug() {
        assert_eq!(level_for(true), LevelFilter::Debug);
        assert_eq!(level_for(false), LevelFilter::Info);
    }
}
