//! Batch assembly: classified, cleaned lines → one bounded chat message.

use mcgram_core::batch::{BatchRejection, TextBatch};

use crate::classify::{clean, should_emit};
use crate::watcher::LogLine;

/// Result of turning one poll's worth of lines into a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Nothing was read this tick.
    Idle,
    /// A batch within bounds, ready to send.
    Ready(TextBatch),
    /// Lines were read but the batch is out of bounds and is discarded.
    Dropped {
        lines_read: usize,
        rejection: BatchRejection,
    },
}

/// Keep relayable lines, clean them, and apply the batch size bounds.
pub fn assemble(lines: &[LogLine]) -> BatchOutcome {
    if lines.is_empty() {
        return BatchOutcome::Idle;
    }

    let batch: TextBatch = lines
        .iter()
        .filter(|line| should_emit(&line.text))
        .map(|line| clean(&line.text))
        .collect();

    match batch.check_bounds() {
        Ok(()) => BatchOutcome::Ready(batch),
        Err(rejection) => BatchOutcome::Dropped {
            lines_read: lines.len(),
            rejection,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcgram_core::batch::MAX_BATCH_CHARS;

    fn lines(raw: &[&str]) -> Vec<LogLine> {
        raw.iter()
            .enumerate()
            .map(|(i, text)| LogLine::new(*text, i as u64 * 100))
            .collect()
    }

    #[test]
    fn no_lines_is_idle() {
        assert_eq!(assemble(&[]), BatchOutcome::Idle);
    }

    #[test]
    fn keeps_order_and_cleans() {
        let outcome = assemble(&lines(&[
            "[12:00:00] [Server thread/INFO]: Alice joined the game",
            "[12:00:01] [Worker-Main-1/INFO]: noise",
            "[12:00:02] [Async Chat Thread - #0/INFO]: <Alice> hi",
        ]));
        let BatchOutcome::Ready(batch) = outcome else {
            panic!("expected a ready batch, got {outcome:?}");
        };
        assert_eq!(batch.text(), "Alice joined the game\n<Alice> hi\n");
    }

    #[test]
    fn everything_filtered_is_dropped_as_too_short() {
        let outcome = assemble(&lines(&["[12:00:01] [Worker-Main-1/INFO]: noise"]));
        assert_eq!(
            outcome,
            BatchOutcome::Dropped {
                lines_read: 1,
                rejection: BatchRejection::TooShort { len: 0 },
            }
        );
    }

    #[test]
    fn tiny_batch_is_dropped() {
        let outcome = assemble(&lines(&["[12:00:00] [Server thread/INFO]: a"]));
        assert!(matches!(
            outcome,
            BatchOutcome::Dropped {
                rejection: BatchRejection::TooShort { len: 2 },
                ..
            }
        ));
    }

    #[test]
    fn oversized_batch_is_dropped_whole() {
        let long = format!(
            "[12:00:00] [Server thread/INFO]: {}",
            "x".repeat(MAX_BATCH_CHARS)
        );
        let outcome = assemble(&lines(&[
            "[12:00:00] [Server thread/INFO]: Alice joined the game",
            long.as_str(),
        ]));
        assert!(matches!(
            outcome,
            BatchOutcome::Dropped {
                rejection: BatchRejection::TooLong { .. },
                ..
            }
        ));
    }
}
