//! Inter-stage wire payloads.
//!
//! This module defines the entry types carried on the time buffers
//! connecting the issue stage to its neighbors:
//! 1. **Commit Signals:** Per-thread squash and commit notifications that
//!    travel backwards from commit to the queue.
//! 2. **Issue Slots:** The issued-instruction slots that travel forward
//!    from the queue to execute.

use crate::common::constants::MAX_THREADS;
use crate::common::reg::SeqNum;
use crate::core::inst::InstId;

/// Per-thread communication from the commit stage.
#[derive(Clone, Copy, Default, Debug)]
pub struct CommitComm {
    /// A squash is requested for this thread.
    pub squash: bool,
    /// Squash boundary: instructions strictly younger are removed.
    pub squash_seq_num: SeqNum,
    /// All instructions up to and including this number have committed;
    /// the queue may retire its records of them.
    pub done_seq_num: Option<SeqNum>,
    /// A non-speculative instruction reached the head of the reorder
    /// buffer and may now be scheduled.
    pub commit_seq_num: Option<SeqNum>,
}

/// Backwards time-buffer payload: one `CommitComm` per thread.
#[derive(Clone, Copy, Default, Debug)]
pub struct TimeStruct {
    /// Commit-stage signals, indexed by thread.
    pub commit_info: [CommitComm; MAX_THREADS],
}

/// One issued instruction on its way to execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IssueSlot {
    /// Arena handle of the issued instruction.
    pub inst: InstId,
    /// Sequence number at issue, for staleness checks after a squash.
    pub seq: SeqNum,
}

/// Forward time-buffer payload: the instructions issued in one cycle, at
/// most `total_width` of them.
#[derive(Clone, Default, Debug)]
pub struct IssueStruct {
    /// Issued slots, in issue order.
    pub insts: Vec<IssueSlot>,
}
