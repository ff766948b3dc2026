//! Outbound text batches built from classified log lines.

use std::fmt;

/// Batches shorter than this are noise and are never sent.
pub const MIN_BATCH_CHARS: usize = 3;

/// Batches longer than this would hit chat message limits (or spam the chat).
pub const MAX_BATCH_CHARS: usize = 1024;

/// Ordered, cleaned lines destined for a single chat message.
///
/// Length is measured in Unicode scalar values, each line counting its
/// trailing newline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBatch {
    lines: Vec<String>,
}

/// Why a batch was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchRejection {
    TooShort { len: usize },
    TooLong { len: usize },
}

impl fmt::Display for BatchRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { len } => write!(f, "batch too short ({len} < {MIN_BATCH_CHARS})"),
            Self::TooLong { len } => write!(f, "batch too long ({len} > {MAX_BATCH_CHARS})"),
        }
    }
}

impl TextBatch {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn char_len(&self) -> usize {
        self.lines.iter().map(|l| l.chars().count() + 1).sum()
    }

    /// Check the size bounds. A batch is accepted or rejected as a whole.
    pub fn check_bounds(&self) -> Result<(), BatchRejection> {
        let len = self.char_len();
        if len < MIN_BATCH_CHARS {
            return Err(BatchRejection::TooShort { len });
        }
        if len > MAX_BATCH_CHARS {
            return Err(BatchRejection::TooLong { len });
        }
        Ok(())
    }

    /// Message text: every line followed by a newline.
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.char_len());
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

impl<S: Into<String>> FromIterator<S> for TextBatch {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().map(Into::into).collect(),
        }
    }
}
