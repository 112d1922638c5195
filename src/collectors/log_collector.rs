use crate::error::CollectorError;
use log::{debug, info, warn};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

/// Path value that selects standard input
pub const STDIN_SOURCE: &str = "-";

/// Line source reading a log file (or standard input) into memory
///
/// Lines are split on `\n`, a trailing `\r` is dropped, and bytes that are
/// not valid UTF-8 are replaced rather than rejected. Empty lines are kept;
/// filtering them is the aggregator's job.
#[derive(Debug, Clone)]
pub struct LogCollector {
    /// File to read, or `-` for stdin
    source: PathBuf,
}

impl LogCollector {
    /// Create a collector for the given path
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use logscan::collectors::LogCollector;
    ///
    /// let lines = LogCollector::new("system_logs.txt").collect_lines().unwrap();
    /// println!("read {} lines", lines.len());
    /// ```
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Display name of the source for logs and alerts
    pub fn source_name(&self) -> String {
        self.source.display().to_string()
    }

    fn is_stdin(&self) -> bool {
        self.source.as_os_str() == STDIN_SOURCE
    }

    /// Read every line from the source
    ///
    /// # Errors
    ///
    /// Returns `CollectorError::NotFound` if the file does not exist, and
    /// `CollectorError::IoError` for any other read failure.
    pub fn collect_lines(&self) -> Result<Vec<String>, CollectorError> {
        let lines = if self.is_stdin() {
            debug!("Reading log lines from stdin");
            Self::read_lines(io::stdin().lock())?
        } else {
            let file = File::open(&self.source).map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    warn!("Log source not found: {}", self.source.display());
                    CollectorError::NotFound(self.source_name())
                } else {
                    CollectorError::IoError(e)
                }
            })?;
            Self::read_lines(BufReader::new(file))?
        };

        info!("Read {} lines from {}", lines.len(), self.source_name());
        Ok(lines)
    }

    /// Split a reader into lossily decoded lines
    pub fn read_lines<R: BufRead>(mut reader: R) -> Result<Vec<String>, CollectorError> {
        let mut lines = Vec::new();
        let mut buffer = Vec::new();

        loop {
            buffer.clear();
            let read = reader.read_until(b'\n', &mut buffer)?;
            if read == 0 {
                break;
            }

            if buffer.last() == Some(&b'\n') {
                buffer.pop();
            }
            if buffer.last() == Some(&b'\r') {
                buffer.pop();
            }

            lines.push(String::from_utf8_lossy(&buffer).into_owned());
        }

        Ok(lines)
    }
}
