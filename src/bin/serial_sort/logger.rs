use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use colored::Colorize;

/// Writes timestamped entries to a per-run log file under `Logs/`.
///
/// The file is opened and closed again for every entry so each line hits disk
/// immediately. Batches are small manual file drops, so the repeated
/// open/close overhead does not matter.
#[derive(Debug)]
pub struct Logger {
    path: PathBuf,
    verbose: bool,
}

impl Logger {
    /// Create a logger with a unique timestamped log file under `<base_dir>/Logs`.
    /// Falls back to `base_dir` itself if the `Logs` directory cannot be created.
    pub fn new(base_dir: &Path, verbose: bool) -> Self {
        let logs_dir = base_dir.join("Logs");
        let dir = if fs::create_dir_all(&logs_dir).is_ok() {
            logs_dir
        } else {
            base_dir.to_path_buf()
        };
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("transfer_log_{timestamp}.txt"));
        Self { path, verbose }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Log and echo to console.
    pub fn info(&self, message: &str) {
        self.append(message);
        println!("{message}");
    }

    /// Log, echoing to console only in verbose mode.
    pub fn detail(&self, message: &str) {
        self.append(message);
        if self.verbose {
            println!("{message}");
        }
    }

    /// Log a warning and echo it in yellow to stderr.
    pub fn warning(&self, message: &str) {
        self.append(&format!("Warning: {message}"));
        eprintln!("{}", message.yellow());
    }

    /// Append one `[YYYY-MM-DD HH:MM:SS] message` line.
    /// Log-write failures never abort a half-finished batch.
    fn append(&self, message: &str) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(file, "[{timestamp}] {message}");
        }
    }
}

#[cfg(test)]
mod logger_tests {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn logger_creates_logs_directory() {
        let dir = tempdir().unwrap();
        let logger = Logger::new(dir.path(), false);
        assert!(dir.path().join("Logs").is_dir());
        assert!(logger.path().starts_with(dir.path().join("Logs")));
    }

    #[test]
    fn entries_are_timestamped_lines() {
        let dir = tempdir().unwrap();
        let logger = Logger::new(dir.path(), false);
        logger.info("first entry");
        logger.warning("second entry");

        let contents = fs::read_to_string(logger.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] first entry"));
        assert!(lines[1].ends_with("] Warning: second entry"));
    }

    #[test]
    fn detail_entries_are_still_written_to_file() {
        let dir = tempdir().unwrap();
        let logger = Logger::new(dir.path(), false);
        logger.detail("quiet entry");

        let contents = fs::read_to_string(logger.path()).unwrap();
        assert!(contents.contains("quiet entry"));
    }
}
