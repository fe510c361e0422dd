//! Core domain types for gaslight
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Entry** | A single captured request awaiting delivery, identified by insertion order |
//! | **Destination** | A routing string `<category>:<suffix>`; the category picks a base URL |
//! | **Pass** | One attempt to drain and deliver every queued entry, head first |
//! | **Halt** | How a pass ends on the first delivery failure; undelivered entries stay queued |

use std::fmt;

use crate::relay::DeliveryError;

// ============================================
// Entry
// ============================================

/// Identity of a queued entry.
///
/// Assigned by the store at append time. Ids strictly increase in append order
/// and are never reused, so they double as the replay ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(pub i64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A captured request waiting in the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Queue identity and ordering key
    pub id: EntryId,
    /// Routing string, e.g. `gql` or `otel:/v1/traces`
    pub destination: String,
    /// Request body, stored and replayed byte-for-byte
    pub payload: Vec<u8>,
}

// ============================================
// Replay pass
// ============================================

/// How a replay pass ended.
#[derive(Debug)]
pub enum PassOutcome {
    /// Every entry present at the start of the pass was delivered
    Succeeded,
    /// Delivery failed; this entry and everything after it is still queued
    Halted {
        entry_id: EntryId,
        reason: DeliveryError,
    },
}

impl PassOutcome {
    /// Returns true if the pass drained the queue without failure
    pub fn is_success(&self) -> bool {
        matches!(self, PassOutcome::Succeeded)
    }
}

/// Result of a single replay pass.
#[derive(Debug)]
pub struct PassReport {
    /// Number of entries delivered and removed during the pass
    pub processed: usize,
    /// Terminal state of the pass
    pub outcome: PassOutcome,
}
