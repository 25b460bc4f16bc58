//! SMT entry accounting for the instruction queue.
//!
//! Tracks the global free-entry count and the per-thread occupancy against
//! a configured sharing policy:
//! 1. **Dynamic:** all entries shared; any thread may fill the queue.
//! 2. **Partitioned:** entries split evenly among active threads.
//! 3. **Threshold:** shared pool with a fixed per-thread cap.
//!
//! The accountant counts *unissued* entries: an instruction returns its
//! entry when it issues, even though it stays findable in the thread list
//! until commit or squash.

use crate::common::error::IqError;
use crate::common::reg::ThreadId;
use crate::config::IqPolicy;

/// Global and per-thread entry bookkeeping under an SMT sharing policy.
pub struct EntryAccountant {
    policy: IqPolicy,
    num_entries: usize,
    threshold: usize,
    free_entries: usize,
    count: Vec<usize>,
    max_entries: Vec<usize>,
}

impl EntryAccountant {
    /// Creates an accountant for `num_threads` threads, all active.
    pub fn new(
        policy: IqPolicy,
        num_entries: usize,
        num_threads: usize,
        threshold: usize,
    ) -> Self {
        let mut accountant = Self {
            policy,
            num_entries,
            threshold,
            free_entries: num_entries,
            count: vec![0; num_threads],
            max_entries: vec![0; num_threads],
        };
        let active: Vec<ThreadId> = (0..num_threads).collect();
        accountant.reset_entries(&active);
        accountant
    }

    /// The per-thread entry cap the policy yields for `num_threads`
    /// active threads.
    pub fn entry_amount(&self, num_threads: usize) -> usize {
        match self.policy {
            IqPolicy::Dynamic => self.num_entries,
            IqPolicy::Partitioned => {
                if num_threads == 0 {
                    self.num_entries
                } else {
                    self.num_entries / num_threads
                }
            }
            IqPolicy::Threshold => self.num_entries.min(self.threshold),
        }
    }

    /// Recomputes per-thread caps when the set of active threads changes.
    /// Inactive threads get a cap of zero.
    pub fn reset_entries(&mut self, active_threads: &[ThreadId]) {
        let per_thread = self.entry_amount(active_threads.len());
        for cap in self.max_entries.iter_mut() {
            *cap = 0;
        }
        for &tid in active_threads {
            self.max_entries[tid] = per_thread;
        }
    }

    /// Total free entries.
    #[inline]
    pub fn num_free(&self) -> usize {
        self.free_entries
    }

    /// Free entries available to one thread under its cap.
    pub fn num_free_tid(&self, tid: ThreadId) -> usize {
        let under_cap = self.max_entries[tid].saturating_sub(self.count[tid]);
        under_cap.min(self.free_entries)
    }

    /// Unissued entries held by one thread.
    #[inline]
    pub fn count(&self, tid: ThreadId) -> usize {
        self.count[tid]
    }

    /// Current cap for one thread.
    #[inline]
    pub fn max_entries(&self, tid: ThreadId) -> usize {
        self.max_entries[tid]
    }

    /// Whether the queue can accept no instruction from any thread.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.free_entries == 0
    }

    /// Whether the queue can accept no instruction from this thread.
    pub fn is_full_tid(&self, tid: ThreadId) -> bool {
        self.free_entries == 0 || self.count[tid] >= self.max_entries[tid]
    }

    /// Takes one entry for a thread, or reports `Full` without mutating.
    pub fn allocate(&mut self, tid: ThreadId) -> Result<(), IqError> {
        if self.is_full_tid(tid) {
            return Err(IqError::Full { tid });
        }
        self.free_entries -= 1;
        self.count[tid] += 1;
        Ok(())
    }

    /// Returns one entry (instruction issued or squashed before issue).
    pub fn release(&mut self, tid: ThreadId) {
        debug_assert!(self.count[tid] > 0);
        debug_assert!(self.free_entries < self.num_entries);
        self.count[tid] -= 1;
        self.free_entries += 1;
    }

    /// Checks the conservation invariant: free plus per-thread counts
    /// equals capacity.
    pub fn check_invariant(&self) -> bool {
        self.free_entries + self.count.iter().sum::<usize>() == self.num_entries
    }
}
