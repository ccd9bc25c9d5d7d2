//! Rolling daily log files.
//!
//! One file per day named `app-YYYY-MM-DD.log`, written through log4rs, with
//! files past the retention period removed on startup.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use log::LevelFilter;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

/// How long daily log files are kept by default.
pub const DEFAULT_LOG_RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Line layout of every log file.
pub const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} [{l}] {m}{n}";

const LOG_PREFIX: &str = "app-";
const LOG_SUFFIX: &str = ".log";
const FILE_APPENDER: &str = "daily";

/// Routes the `log` facade to `log_file` at `level`.
///
/// Appends to an existing file. Fails if a global logger is already set.
pub fn setup_file_logging(log_file: &Path, level: LevelFilter) -> anyhow::Result<()> {
    let config = file_config(log_file, level)?;
    log4rs::init_config(config).context("a logger is already installed")?;
    Ok(())
}

/// log4rs configuration with a single file appender at the root.
///
/// Creates the log directory and opens the file.
fn file_config(log_file: &Path, level: LevelFilter) -> anyhow::Result<Config> {
    if let Some(dir) = log_file.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
    }

    let appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(log_file)
        .with_context(|| format!("opening log file {}", log_file.display()))?;

    Config::builder()
        .appender(Appender::builder().build(FILE_APPENDER, Box::new(appender)))
        .build(Root::builder().appender(FILE_APPENDER).build(level))
        .context("building log configuration")
}

/// Today's log file inside `dir`.
#[must_use]
pub fn daily_log_path(dir: &Path) -> PathBuf {
    log_path_for(dir, Local::now().date_naive())
}

fn log_path_for(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("{LOG_PREFIX}{}{LOG_SUFFIX}", date.format("%Y-%m-%d")))
}

fn is_daily_log(name: &str) -> bool {
    name.strip_prefix(LOG_PREFIX)
        .and_then(|rest| rest.strip_suffix(LOG_SUFFIX))
        .is_some_and(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok())
}

/// Deletes daily log files in `dir` last modified more than `retention` ago.
///
/// Other files are left alone, as are logs whose age cannot be determined.
/// Returns how many files were removed; a missing directory removes none.
pub fn cleanup_old_logs(dir: &Path, retention: Duration) -> io::Result<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let now = SystemTime::now();
    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        if !is_daily_log(&name.to_string_lossy()) {
            continue;
        }

        let age = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok());
        if age.is_some_and(|age| age > retention) {
            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("Could not remove old log {}: {e}", entry.path().display()),
            }
        }
    }

    if removed > 0 {
        log::debug!("Removed {removed} old log file(s) from {}", dir.display());
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            log_path_for(Path::new("/var/log/vidmend"), date),
            PathBuf::from("/var/log/vidmend/app-2024-03-09.log")
        );
        let today = daily_log_path(Path::new("logs"));
        assert!(is_daily_log(&today.file_name().unwrap().to_string_lossy()));
    }

    #[test]
    fn recognises_daily_logs_only() {
        assert!(is_daily_log("app-2024-12-31.log"));
        assert!(!is_daily_log("app-latest.log"));
        assert!(!is_daily_log("app-2024-12-31.txt"));
        assert!(!is_daily_log("other-2024-12-31.log"));
    }

    #[test]
    fn cleanup_removes_only_expired_logs() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("app-2020-01-01.log");
        let keep = dir.path().join("notes.txt");
        fs::write(&log, "old").unwrap();
        fs::write(&keep, "keep").unwrap();

        // Just written, so well inside the default retention.
        assert_eq!(cleanup_old_logs(dir.path(), DEFAULT_LOG_RETENTION).unwrap(), 0);
        assert!(log.exists());

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(cleanup_old_logs(dir.path(), Duration::from_millis(1)).unwrap(), 1);
        assert!(!log.exists());
        assert!(keep.exists());
    }

    #[test]
    fn file_config_creates_log_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log = daily_log_path(&dir.path().join("nested").join("logs"));

        let config = file_config(&log, LevelFilter::Debug).unwrap();
        assert!(log.is_file());
        assert_eq!(config.root().level(), LevelFilter::Debug);
        assert_eq!(config.appenders().len(), 1);
    }

    #[test]
    fn file_config_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let err = file_config(&blocker.join("app.log"), LevelFilter::Info).unwrap_err();
        assert!(err.to_string().contains("creating log directory"), "{err}");
    }

    #[test]
    fn cleanup_of_missing_dir_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            cleanup_old_logs(&dir.path().join("absent"), DEFAULT_LOG_RETENTION).unwrap(),
            0
        );
    }
}
