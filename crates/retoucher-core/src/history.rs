//! Linear undo history and the activity log shown beside it.
//!
//! [`History`] keeps PNG-encoded snapshots of the committed image, oldest
//! first, with a cursor at the state currently on screen. It is bounded:
//! pushing past capacity evicts the oldest snapshot. Undo moves the cursor
//! back one step; there is no redo, and a push after an undo discards the
//! snapshots above the cursor.
//!
//! [`ActivityLog`] is the human-facing list of what happened. It is newest
//! first, has its own (smaller) bound, and is never rewound by undo; undo
//! just adds another line to it.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use thiserror::Error;

use crate::decode::{decode_image_no_orientation, DecodeError};
use crate::encode::{encode_png, EncodeError};
use crate::PixelBuffer;

/// Default number of undo snapshots.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Default number of activity log lines.
pub const DEFAULT_ACTIVITY_LIMIT: usize = 10;

/// Label recorded in the activity log for an undo.
pub const UNDO_LABEL: &str = "Undo Action";

/// Source of entry timestamps, in milliseconds since the Unix epoch.
pub type Clock = fn() -> u64;

/// Wall clock from the operating system.
///
/// Not available on `wasm32-unknown-unknown`; browser hosts install their
/// own clock.
pub fn system_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to store snapshot: {0}")]
    Encode(#[from] EncodeError),

    #[error("Failed to restore snapshot: {0}")]
    Decode(#[from] DecodeError),
}

/// One committed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// PNG bytes of the full image.
    pub snapshot: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub label: String,
    pub timestamp: u64,
}

impl HistoryEntry {
    /// Decode the snapshot back into pixels.
    pub fn restore(&self) -> Result<PixelBuffer, HistoryError> {
        Ok(decode_image_no_orientation(&self.snapshot)?)
    }
}

/// Bounded linear undo stack.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    current: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    /// Create an empty history. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            current: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position, or `None` when empty.
    pub fn current_index(&self) -> Option<usize> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.current)
        }
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.current)
    }

    /// Entries oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// True if [`History::undo`] would move the cursor.
    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = 0;
    }

    /// Snapshot `buffer` as the newest state.
    ///
    /// Entries above the cursor are dropped first. If the history is full the
    /// oldest entry is evicted. The cursor ends on the new entry.
    pub fn push(&mut self, buffer: &PixelBuffer, label: &str, timestamp: u64) -> Result<(), HistoryError> {
        let snapshot = encode_png(buffer)?;

        if !self.entries.is_empty() {
            self.entries.truncate(self.current + 1);
        }

        self.entries.push_back(HistoryEntry {
            snapshot,
            width: buffer.width(),
            height: buffer.height(),
            label: label.to_string(),
            timestamp,
        });

        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                log::debug!("History full, evicted '{}'", evicted.label);
            }
        }

        self.current = self.entries.len() - 1;
        Ok(())
    }

    /// Step back one entry and return its pixels.
    ///
    /// Returns `Ok(None)` without changing anything when there is nothing
    /// to undo. The cursor only moves once the snapshot decoded.
    pub fn undo(&mut self) -> Result<Option<PixelBuffer>, HistoryError> {
        if !self.can_undo() {
            return Ok(None);
        }
        let restored = self.entries[self.current - 1].restore()?;
        self.current -= 1;
        Ok(Some(restored))
    }
}

/// Icon name shown next to an activity log label.
pub fn icon_for_label(label: &str) -> &'static str {
    match label {
        "Brightness Adjusted" => "fas fa-sun",
        "Image Rotated" => "fas fa-redo",
        "Filter Applied" => "fas fa-filter",
        "Grayscale Applied" => "fas fa-circle-notch",
        "Edge Detection Applied" => "fas fa-border-all",
        UNDO_LABEL => "fas fa-undo",
        _ => "fas fa-check",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    pub label: String,
    pub icon: &'static str,
    pub timestamp: u64,
}

/// Newest-first list of recent actions.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    limit: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVITY_LIMIT)
    }
}

impl ActivityLog {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit + 1),
            limit,
        }
    }

    pub fn record(&mut self, label: &str, timestamp: u64) {
        self.entries.push_front(ActivityEntry {
            label: label.to_string(),
            icon: icon_for_label(label),
            timestamp,
        });
        self.entries.truncate(self.limit);
    }

    /// Entries newest first.
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
