//! History - fixed-capacity ring buffer of applied actions
//!
//! Fixed memory, oldest entry auto-evicted. Reads are always chronological
//! (oldest first) regardless of where the write head currently sits.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use thiserror::Error;

use crate::action::Signal;

/// One applied action as retained in history.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistoryEntry {
    /// Agent that submitted the action (`None` = anonymous).
    pub agent_id: Option<String>,

    /// What was communicated, or a nudge/noop marker.
    pub signal: Signal,

    /// Amount added to the field.
    pub delta: f64,

    /// Tick during which the action was applied.
    pub t: u64,
}

/// Bounded FIFO of [`HistoryEntry`] with O(1) push and eviction.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawHistory"))]
pub struct History {
    /// Slots; grows to `capacity` then is overwritten in place.
    slots: Vec<HistoryEntry>,

    /// Maximum number of retained entries.
    capacity: usize,

    /// Index of the oldest entry once the buffer is full.
    write_head: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            write_head: 0,
        }
    }

    /// Append an entry, returning the evicted one if the buffer was full.
    ///
    /// A zero-capacity history retains nothing; the pushed entry is returned.
    pub fn push(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
        if self.capacity == 0 {
            return Some(entry);
        }
        if self.slots.len() < self.capacity {
            self.slots.push(entry);
            return None;
        }
        let evicted = std::mem::replace(&mut self.slots[self.write_head], entry);
        self.write_head = (self.write_head + 1) % self.capacity;
        Some(evicted)
    }

    /// Iterate entries in chronological order (oldest first).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> + '_ {
        let (newer, older) = self.slots.split_at(self.write_head);
        older.iter().chain(newer.iter())
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.iter().next_back()
    }

    /// Retained signals, oldest first.
    pub fn signals(&self) -> Vec<Signal> {
        self.iter().map(|e| e.signal.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all entries, keeping capacity.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.write_head = 0;
    }
}

/// Serialized history whose slots and write head disagree.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("{len} slots exceed capacity {capacity}")]
    Overfull { len: usize, capacity: usize },

    #[error("write head {write_head} invalid for {len} slots (capacity {capacity})")]
    WriteHead {
        write_head: usize,
        len: usize,
        capacity: usize,
    },
}

/// Unchecked wire form of [`History`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawHistory {
    slots: Vec<HistoryEntry>,
    capacity: usize,
    write_head: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<RawHistory> for History {
    type Error = HistoryError;

    fn try_from(raw: RawHistory) -> Result<Self, Self::Error> {
        let len = raw.slots.len();
        if len > raw.capacity {
            return Err(HistoryError::Overfull {
                len,
                capacity: raw.capacity,
            });
        }
        // Head only moves once the buffer is full
        let head_ok = if len < raw.capacity {
            raw.write_head == 0
        } else {
            raw.write_head < raw.capacity.max(1)
        };
        if !head_ok {
            return Err(HistoryError::WriteHead {
                write_head: raw.write_head,
                len,
                capacity: raw.capacity,
            });
        }
        Ok(Self {
            slots: raw.slots,
            capacity: raw.capacity,
            write_head: raw.write_head,
        })
    }
}
