//! Log writer module
//!
//! Log output targets usable as `tracing-subscriber` writers.

use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// Log output target
#[derive(Debug, Clone)]
pub enum LogTarget {
    /// Write to stdout
    Stdout,
    /// Write to stderr
    Stderr,
    /// Append to file
    File(Arc<File>),
}

impl LogTarget {
    /// Open `path` for appending, or fall back to `default` when unset
    pub fn open(path: Option<&str>, default: Self) -> io::Result<Self> {
        match path {
            Some(p) => Ok(Self::File(Arc::new(open_log_file(p)?))),
            None => Ok(default),
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Stdout => io::stdout().is_terminal(),
            Self::Stderr => io::stderr().is_terminal(),
            Self::File(_) => false,
        }
    }
}

impl<'a> MakeWriter<'a> for LogTarget {
    type Writer = TargetWriter;

    fn make_writer(&'a self) -> Self::Writer {
        match self {
            Self::Stdout => TargetWriter::Stdout(io::stdout()),
            Self::Stderr => TargetWriter::Stderr(io::stderr()),
            Self::File(file) => TargetWriter::File(Arc::clone(file)),
        }
    }
}

/// Writer handed out per log event
#[derive(Debug)]
pub enum TargetWriter {
    Stdout(io::Stdout),
    Stderr(io::Stderr),
    File(Arc<File>),
}

impl Write for TargetWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(out) => out.write(buf),
            Self::Stderr(err) => err.write(buf),
            Self::File(file) => file.as_ref().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(out) => out.flush(),
            Self::Stderr(err) => err.flush(),
            Self::File(file) => file.as_ref().flush(),
        }
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}
