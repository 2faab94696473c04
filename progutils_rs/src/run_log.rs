//! Flat text run logs.
//!
//! A log is created (and its header written) by one thread; afterwards any number
//! of threads may append through [`RunLog::append`], which issues one `write` per
//! line on a shared `&File` without further locking. Lap and total times are
//! written when the log is dropped.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::timer::{StopWatch, format_duration};

/// Timestamp used inside log lines.
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Timestamp safe to embed in a file name.
pub fn file_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d_%H.%M.%S").to_string()
}

#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
    file: File,
    watch: StopWatch,
}

impl RunLog {
    /// Create (or truncate) the log at `path`.
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = File::create(&path)?;
        tracing::debug!("run log opened at {}", path.display());
        Ok(Self {
            path,
            file,
            watch: StopWatch::new("start"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn watch(&self) -> &StopWatch {
        &self.watch
    }

    /// Start timestamp, working directory and the raw command line.
    pub fn write_header(&self, working_dir: &Path, command_line: &str) -> io::Result<()> {
        self.append(&format!("Ran on: {}", timestamp()))?;
        self.append(&format!("Ran from: {}", working_dir.display()))?;
        self.append(command_line)
    }

    /// Append one line.
    pub fn append(&self, line: &str) -> io::Result<()> {
        let mut out = &self.file;
        out.write_all(format!("{line}\n").as_bytes())
    }

    /// Close the running lap, log its time, and open lap `next`.
    pub fn log_current_time(&mut self, next: impl Into<String>) -> io::Result<()> {
        let lap = self.watch.start_new_lap(next);
        let line = format!("{}\t{}", lap.name, format_duration(lap.elapsed, 6));
        self.append(&line)
    }

    /// Open lap `next` without logging the one it closes.
    pub fn start_lap(&mut self, next: impl Into<String>) {
        self.watch.start_new_lap(next);
    }

    fn write_footer(&self) -> io::Result<()> {
        for lap in self.watch.laps() {
            self.append(&format!(
                "lap {}\t{}",
                lap.name,
                format_duration(lap.elapsed, 6)
            ))?;
        }
        self.append(&format!(
            "Total time\t{}",
            format_duration(self.watch.total(), 6)
        ))?;
        self.append(&format!("Finished: {}", timestamp()))
    }
}

impl Drop for RunLog {
    fn drop(&mut self) {
        if let Err(e) = self.write_footer() {
            tracing::warn!("failed to finish run log {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn header_laps_and_footer_are_written() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("runLog_test.txt");
        {
            let mut log = RunLog::create(&path).expect("create");
            log.write_header(temp.path(), "prog greet --name Ada")
                .expect("header");
            log.log_current_time("second").expect("lap");
            log.append("free text").expect("append");
        }
        let text = std::fs::read_to_string(&path).expect("read");
        let lines: Vec<_> = text.lines().collect();
        assert!(lines[0].starts_with("Ran on: "));
        assert_eq!(lines[1], format!("Ran from: {}", temp.path().display()));
        assert_eq!(lines[2], "prog greet --name Ada");
        assert!(lines[3].starts_with("start\t"));
        assert_eq!(lines[4], "free text");
        assert!(text.contains("lap second\t"));
        assert!(text.contains("Total time\t"));
    }
}
