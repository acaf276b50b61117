//! File logging for specbars.
//!
//! The histogram owns the terminal, so diagnostics go to daily log files under
//! `$XDG_STATE_HOME/specbars` (or `~/.local/state/specbars`). Only the most
//! recent [`KEEP_LOG_DAYS`] files are kept.
//!
//! Verbosity comes from `SPECBARS_LOG`, then `RUST_LOG`, then [`DEFAULT_FILTER`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// File name prefix of the daily log files.
pub const LOG_FILE_PREFIX: &str = "specbars.log";

/// Pipeline events at `info`, dependencies (cpal backends) only when they warn.
pub const DEFAULT_FILTER: &str = "warn,specbars=info";

/// Rotated files kept on disk.
pub const KEEP_LOG_DAYS: usize = 7;

static APPENDER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Installs the global subscriber writing to today's log file.
///
/// # Errors
/// - If the log directory cannot be determined or created
/// - If logging was already initialized
pub fn init_logging() -> Result<(), anyhow::Error> {
    let dir = log_dir()?;
    fs::create_dir_all(&dir)?;

    // Pruning happens before the subscriber exists, so its outcome is logged below.
    let pruned = prune_rotated_logs(&dir, KEEP_LOG_DAYS);

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(
        &dir,
        LOG_FILE_PREFIX,
    ));
    APPENDER_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Logging already initialized"))?;

    tracing_subscriber::registry()
        .with(session_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false),
        )
        .init();

    tracing::info!(
        "specbars {} logging to {}",
        env!("CARGO_PKG_VERSION"),
        dir.display()
    );
    match pruned {
        Ok(0) => {}
        Ok(removed) => tracing::debug!("Removed {} old log file(s)", removed),
        Err(e) => tracing::warn!("Could not prune old logs in {}: {}", dir.display(), e),
    }
    Ok(())
}

fn session_filter() -> EnvFilter {
    EnvFilter::try_from_env("SPECBARS_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Directory holding the log files. Not created here.
///
/// # Errors
/// - If `XDG_STATE_HOME` is unset and the home directory cannot be determined
pub fn log_dir() -> Result<PathBuf, anyhow::Error> {
    if let Some(state) = std::env::var_os("XDG_STATE_HOME") {
        return Ok(PathBuf::from(state).join("specbars"));
    }
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(home.join(".local/state/specbars"))
}

/// Deletes all but the `keep` newest rotated log files in `dir`.
///
/// Files are ordered by the date in their name, so copying the directory
/// around does not change which ones survive. Returns how many were removed.
///
/// # Errors
/// - If `dir` cannot be read
fn prune_rotated_logs(dir: &Path, keep: usize) -> io::Result<usize> {
    let mut dated: Vec<(String, PathBuf)> = fs::read_dir(dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let date = rotation_date(path.file_name()?.to_str()?)?.to_string();
            Some((date, path))
        })
        .collect();

    if dated.len() <= keep {
        return Ok(0);
    }

    // ISO dates sort chronologically as strings; newest first.
    dated.sort_unstable_by(|a, b| b.0.cmp(&a.0));

    let mut removed = 0;
    for (_, path) in &dated[keep..] {
        match fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(e) => eprintln!("Warning: could not delete {}: {}", path.display(), e),
        }
    }
    Ok(removed)
}

/// The `YYYY-MM-DD` suffix of a rotated log file name such as
/// `specbars.log.2026-10-17`.
fn rotation_date(file_name: &str) -> Option<&str> {
    let date = file_name.strip_prefix(LOG_FILE_PREFIX)?.strip_prefix('.')?;
    let well_formed = date.len() == 10
        && date
            .char_indices()
            .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });
    well_formed.then_some(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("specbars_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_rotation_date() {
        assert_eq!(rotation_date("specbars.log.2026-10-17"), Some("2026-10-17"));
        assert_eq!(rotation_date("specbars.log"), None);
        assert_eq!(rotation_date("other.log.2026-10-17"), None);
        assert_eq!(rotation_date("specbars.log.latest"), None);
        assert_eq!(rotation_date("specbars.log.2026-1-17x"), None);
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn test_prune_keeps_newest_dates() {
        let dir = scratch_dir("prune");
        for day in 1..=9 {
            fs::write(dir.join(format!("{LOG_FILE_PREFIX}.2026-10-{day:02}")), "").unwrap();
        }
        fs::write(dir.join("notes.txt"), "").unwrap();

        assert_eq!(prune_rotated_logs(&dir, KEEP_LOG_DAYS).unwrap(), 2);

        assert!(!dir.join("specbars.log.2026-10-01").exists());
        assert!(!dir.join("specbars.log.2026-10-02").exists());
        assert!(dir.join("specbars.log.2026-10-03").exists());
        assert!(dir.join("specbars.log.2026-10-09").exists());
        assert!(dir.join("notes.txt").exists());

        assert_eq!(prune_rotated_logs(&dir, KEEP_LOG_DAYS).unwrap(), 0);
        fs::remove_dir_all(&dir).unwrap();
    }
}
