//! Player-facing log.
//!
//! Every narrative line the engine produces goes through a FIFO
//! [`LogQueue`]. Entries are released strictly in the order they were
//! pushed and none is ever dropped.
//!
//! # Pacing
//!
//! When the queue is *paced* (the `queued_log` feature), it doubles as a
//! soft lock: from the moment an entry is pushed until the release that
//! finds the queue empty, [`LogQueue::is_busy`] is true and commands are
//! refused. A driver releases one entry, waits its display interval,
//! releases the next, and so on. The final empty release clears the lock,
//! so the last entry also gets its full interval.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Visual weight of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Severity {
    /// Plain information.
    #[default]
    Info,
    /// Week header.
    Turn,
    /// Something happened to the server.
    Event,
    /// Good news.
    Success,
    /// Bad news or a refusal.
    Danger,
}

/// One line of the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Text shown to the player.
    pub message: String,
    /// Visual weight.
    pub severity: Severity,
    /// Week during which the line was written.
    pub week: u32,
}

/// FIFO of log entries with an optional soft lock.
#[derive(Debug, Clone, Default)]
pub struct LogQueue {
    pending: VecDeque<LogEntry>,
    history: Vec<LogEntry>,
    paced: bool,
    in_flight: bool,
}

impl LogQueue {
    /// Create an empty queue. `paced` turns on the soft lock.
    #[must_use]
    pub fn new(paced: bool) -> Self {
        Self {
            paced,
            ..Self::default()
        }
    }

    /// Append an entry.
    pub fn push(&mut self, week: u32, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        tracing::trace!(week, ?severity, %message, "log entry queued");
        self.pending.push_back(LogEntry {
            message,
            severity,
            week,
        });
    }

    /// Whether commands must wait for the queue.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.paced && (self.in_flight || !self.pending.is_empty())
    }

    /// Whether the soft lock is in use at all.
    #[must_use]
    pub const fn is_paced(&self) -> bool {
        self.paced
    }

    /// Release the oldest pending entry.
    ///
    /// Returns `None` once the queue is empty, which also lifts the lock.
    pub fn release_next(&mut self) -> Option<LogEntry> {
        if let Some(entry) = self.pending.pop_front() {
            self.in_flight = true;
            self.history.push(entry.clone());
            Some(entry)
        } else {
            self.in_flight = false;
            None
        }
    }

    /// Release everything pending at once, oldest first, and lift the lock.
    pub fn release_all(&mut self) -> Vec<LogEntry> {
        let released: Vec<LogEntry> = self.pending.drain(..).collect();
        self.history.extend(released.iter().cloned());
        self.in_flight = false;
        released
    }

    /// Number of entries not yet released.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Entries waiting for release, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &LogEntry> {
        self.pending.iter()
    }

    /// Every released entry, oldest first.
    #[must_use]
    pub fn history(&self) -> &[LogEntry] {
        &self.history
    }
}
