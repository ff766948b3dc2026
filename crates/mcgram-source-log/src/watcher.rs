//! Tailer for the game server's log file.
//!
//! Holds one open handle, reads whatever was appended since the last poll,
//! and detects rotation via inode changes. After any (re)open the tailer
//! seeks to EOF: backlog is never replayed.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use mcgram_core::batch::MAX_BATCH_CHARS;
use tracing::{debug, info};

use crate::classify::parse_header;

/// A partial line longer than this could never fit in a batch; it is dropped
/// along with the rest of its line.
pub const MAX_PARTIAL_LINE_BYTES: usize = 16 * MAX_BATCH_CHARS;

/// Tailer lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailState {
    /// No handle held (initial, or after an IO error).
    Closed,
    /// Freshly (re)opened and positioned at EOF; nothing read yet.
    OpenAtEnd,
    /// At least one non-empty read since the last open.
    Streaming,
}

/// File identity plus read position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TailCursor {
    /// Inode of the open file (0 where inodes are unavailable).
    pub inode: u64,
    /// Byte offset of the next unread byte.
    pub offset: u64,
}

/// One complete line read from the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub text: String,
    /// Byte offset at which the line starts.
    pub offset: u64,
    pub timestamp: Option<NaiveTime>,
    pub thread: Option<String>,
}

impl LogLine {
    pub fn new(text: impl Into<String>, offset: u64) -> Self {
        let text = text.into();
        let (timestamp, thread) = parse_header(&text);
        let thread = thread.map(String::from);
        Self {
            text,
            offset,
            timestamp,
            thread,
        }
    }
}

#[derive(Debug)]
pub struct LogTailer {
    path: PathBuf,
    file: Option<File>,
    cursor: Option<TailCursor>,
    state: TailState,
    /// Bytes of a line whose newline has not been written yet.
    incomplete: Vec<u8>,
    /// Offset at which `incomplete` starts.
    incomplete_offset: u64,
    /// Skipping the remainder of an overlong line up to its newline.
    discarding: bool,
}

impl LogTailer {
    /// Create a closed tailer. The first poll opens the file at EOF.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
            cursor: None,
            state: TailState::Closed,
            incomplete: Vec::new(),
            incomplete_offset: 0,
            discarding: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> TailState {
        self.state
    }

    pub fn cursor(&self) -> Option<TailCursor> {
        self.cursor
    }

    /// Read complete lines appended since the last poll.
    ///
    /// Never blocks waiting for data. On error the handle is dropped and the
    /// next poll starts over from a fresh open.
    pub fn poll(&mut self) -> io::Result<Vec<LogLine>> {
        match self.poll_inner() {
            Ok(lines) => Ok(lines),
            Err(e) => {
                self.close();
                Err(e)
            }
        }
    }

    fn poll_inner(&mut self) -> io::Result<Vec<LogLine>> {
        let (len, inode) = file_identity(&fs::metadata(&self.path)?);

        let needs_reopen = match (self.cursor, self.file.is_some()) {
            (Some(cursor), true) => cursor.inode != inode || len < cursor.offset,
            _ => true,
        };
        if needs_reopen {
            self.reopen_at_end()?;
        }

        let (Some(file), Some(cursor)) = (self.file.as_mut(), self.cursor.as_mut()) else {
            return Ok(Vec::new());
        };

        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        if buf.is_empty() {
            return Ok(Vec::new());
        }
        cursor.offset += buf.len() as u64;
        self.state = TailState::Streaming;

        Ok(self.split_lines(&buf))
    }

    fn reopen_at_end(&mut self) -> io::Result<()> {
        let previous = self.cursor;
        self.close();

        let mut file = File::open(&self.path)?;
        let (_, inode) = file_identity(&file.metadata()?);
        let offset = file.seek(SeekFrom::End(0))?;

        info!(
            path = %self.path.display(),
            inode,
            offset,
            rotated = previous.is_some(),
            "log file opened at end"
        );

        self.file = Some(file);
        self.cursor = Some(TailCursor { inode, offset });
        self.incomplete_offset = offset;
        self.state = TailState::OpenAtEnd;
        Ok(())
    }

    fn close(&mut self) {
        if self.file.take().is_some() {
            debug!(path = %self.path.display(), "log file closed");
        }
        self.incomplete.clear();
        self.discarding = false;
        self.state = TailState::Closed;
    }

    /// Split freshly read bytes into complete lines; keep a trailing partial
    /// line for the next poll unless it outgrows `MAX_PARTIAL_LINE_BYTES`.
    fn split_lines(&mut self, mut buf: &[u8]) -> Vec<LogLine> {
        if self.discarding {
            let Some(pos) = buf.iter().position(|b| *b == b'\n') else {
                self.incomplete_offset += buf.len() as u64;
                return Vec::new();
            };
            self.incomplete_offset += pos as u64 + 1;
            buf = &buf[pos + 1..];
            self.discarding = false;
        }
        self.incomplete.extend_from_slice(buf);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(pos) = self.incomplete[start..].iter().position(|b| *b == b'\n') {
            let end = start + pos;
            let offset = self.incomplete_offset + start as u64;
            let text = String::from_utf8_lossy(&self.incomplete[start..end]);
            let text = text.trim_end_matches('\r');
            if !text.is_empty() {
                lines.push(LogLine::new(text, offset));
            }
            start = end + 1;
        }

        self.incomplete.drain(..start);
        self.incomplete_offset += start as u64;

        if self.incomplete.len() > MAX_PARTIAL_LINE_BYTES {
            debug!(
                path = %self.path.display(),
                offset = self.incomplete_offset,
                bytes = self.incomplete.len(),
                "dropping overlong partial line"
            );
            self.incomplete_offset += self.incomplete.len() as u64;
            self.incomplete.clear();
            self.discarding = true;
        }
        lines
    }
}

/// File length and inode for rotation detection.
fn file_identity(meta: &fs::Metadata) -> (u64, u64) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        (meta.len(), meta.ino())
    }
    #[cfg(not(unix))]
    {
        (meta.len(), 0)
    }
}
