//! Error types for queue admission and scheduling.
//!
//! This module defines the recoverable error conditions of the instruction
//! queue. It provides:
//! 1. **Admission Errors:** Rejection of an insert under the resource policy.
//! 2. **Scheduling Errors:** Lookups of sequence numbers the queue no longer
//!    holds.
//! 3. **Error Trait Integration:** `Display` and `std::error::Error` for
//!    system-level reporting.
//!
//! All of these are steady-state conditions the caller recovers from; none
//! of them panic. Structural invariant violations are checked with
//! `debug_assert!` and compile out of release builds.

use std::fmt;

use super::reg::{SeqNum, ThreadId};

/// Recoverable error conditions raised by the instruction queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IqError {
    /// An insert was rejected because the resource policy forbids the thread
    /// from taking another entry. The caller stalls the front end; no queue
    /// state was mutated.
    Full {
        /// The thread whose insert was rejected.
        tid: ThreadId,
    },

    /// A sequence number was referenced (non-speculative scheduling, commit)
    /// that the queue does not hold, e.g. because it was squashed after the
    /// signal was sent.
    UnknownSeqNum {
        /// The sequence number that could not be found.
        seq: SeqNum,
    },
}

impl fmt::Display for IqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IqError::Full { tid } => write!(f, "instruction queue full for thread {}", tid),
            IqError::UnknownSeqNum { seq } => {
                write!(f, "no instruction with sequence number {} in queue", seq)
            }
        }
    }
}

impl std::error::Error for IqError {}
