// src/output.rs
// =============================================================================
// Where a crawl writes what it did.
//
// - OutputSink: the list of successfully fetched URLs, either kept in memory
//   or appended to a file one URL per line
// - CrawlLog: optional named log streams ("general", "error", "redirect")
//   as files under a folder, plain text or CSV
//
// Every log record is also sent to `tracing`, so nothing is lost when no
// log folder is configured.
// =============================================================================

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{error, info};

use crate::config::{LogFormat, OutputTarget};
use crate::error::{Result, SessionError};

/// Append-only record of fetched URLs.
#[derive(Debug)]
pub enum OutputSink {
    Memory(Vec<String>),
    File { path: PathBuf, writer: BufWriter<File> },
}

impl OutputSink {
    pub fn open(target: &OutputTarget) -> Result<Self> {
        match target {
            OutputTarget::Memory => Ok(OutputSink::Memory(Vec::new())),
            OutputTarget::File(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|source| SessionError::Output {
                        path: path.clone(),
                        source,
                    })?;
                Ok(OutputSink::File {
                    path: path.clone(),
                    writer: BufWriter::new(file),
                })
            }
        }
    }

    pub fn append(&mut self, url: &str) -> Result<()> {
        match self {
            OutputSink::Memory(urls) => {
                urls.push(url.to_string());
                Ok(())
            }
            OutputSink::File { path, writer } => {
                writeln!(writer, "{}", url).map_err(|source| SessionError::Output {
                    path: path.clone(),
                    source,
                })
            }
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        if let OutputSink::File { path, writer } = self {
            writer.flush().map_err(|source| SessionError::Output {
                path: path.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Named log streams of a crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    General,
    Error,
    Redirect,
}

impl LogStream {
    fn name(self) -> &'static str {
        match self {
            LogStream::General => "general",
            LogStream::Error => "error",
            LogStream::Redirect => "redirect",
        }
    }
}

/// Writes log lines to `<folder>/<stream>.log` (or `.csv`).
#[derive(Debug)]
pub struct CrawlLog {
    folder: Option<PathBuf>,
    format: LogFormat,
}

impl CrawlLog {
    pub fn open(folder: Option<&Path>, format: LogFormat) -> Result<Self> {
        if let Some(folder) = folder {
            fs::create_dir_all(folder).map_err(|source| SessionError::Output {
                path: folder.to_path_buf(),
                source,
            })?;
        }
        Ok(Self {
            folder: folder.map(Path::to_path_buf),
            format,
        })
    }

    /// Records one event. `fields` become the columns of the line.
    ///
    /// Failing to write a log line never stops a crawl; it is reported
    /// through `tracing` instead.
    pub fn record(&self, stream: LogStream, fields: &[&str]) {
        match stream {
            LogStream::Error => error!(stream = stream.name(), "{}", fields.join(" ")),
            _ => info!(stream = stream.name(), "{}", fields.join(" ")),
        }

        let Some(folder) = &self.folder else {
            return;
        };

        let extension = match self.format {
            LogFormat::Plain => "log",
            LogFormat::Csv => "csv",
        };
        let path = folder.join(format!("{}.{}", stream.name(), extension));
        let line = self.format_line(fields);

        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| writeln!(file, "{}", line));
        if let Err(e) = written {
            error!(path = %path.display(), error = %e, "failed to write log line");
        }
    }

    fn format_line(&self, fields: &[&str]) -> String {
        let timestamp = Utc::now().to_rfc3339();
        match self.format {
            LogFormat::Plain => format!("[{}] {}", timestamp, fields.join(" ")),
            LogFormat::Csv => std::iter::once(timestamp.as_str())
                .chain(fields.iter().copied())
                .map(csv_escape)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

// RFC 4180: quote when the field holds a comma, quote or line break
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
