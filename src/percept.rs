//! Percept - read-only snapshot handed back to agents

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::action::Signal;

/// What an agent sees when it perceives the substrate.
///
/// Owned copy: mutating a percept never touches substrate state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Percept {
    /// Agent the snapshot was taken for (echoed, never validated).
    pub agent_id: Option<String>,

    /// Tick at snapshot time.
    pub t: u64,

    /// Field value at snapshot time.
    pub field: f64,

    /// Signal of the most recent history entry. `None` both for an empty
    /// history and for an entry whose signal is null; `history` keeps the null.
    pub last_signal: Option<Signal>,

    /// Agent behind the most recent history entry.
    pub last_signal_from: Option<String>,

    /// Retained signals, oldest first.
    pub history: Vec<Signal>,
}

impl Percept {
    /// Last `n` retained signals, oldest first.
    pub fn history_tail(&self, n: usize) -> &[Signal] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }
}
