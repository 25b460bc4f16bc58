//! Memory dependence tracking for one hardware thread.
//!
//! Memory operations need more than register readiness: loads and stores
//! must respect barriers and predicted store-to-load dependences. This
//! module tracks the in-flight memory operations of a thread and decides
//! when each is clear to issue:
//! 1. **Barriers:** A memory op younger than an incomplete barrier waits;
//!    the barrier itself waits for every older memory op to complete.
//! 2. **Dependence Prediction:** A load whose PC previously collided with
//!    a store waits for older in-flight instances of that store.
//! 3. **Violations:** Reported store/load pairs feed the predictor so the
//!    collision is avoided on future encounters.
//!
//! The unit never mutates the instruction queue; wakeups are returned as
//! lists of instruction handles for the queue to enqueue.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::trace;

use crate::common::reg::SeqNum;
use crate::core::inst::InstId;

/// What kind of memory-ordering participant an entry is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemDepKind {
    /// Memory read.
    Load,
    /// Memory write.
    Store,
    /// Ordering barrier: fences all memory ops around it.
    Barrier,
}

/// One tracked memory operation.
struct MemDepEntry {
    inst: InstId,
    pc: u64,
    kind: MemDepKind,
    regs_ready: bool,
    ordering_ready: bool,
    completed: bool,
}

/// Per-thread memory dependence unit.
#[derive(Default)]
pub struct MemDepUnit {
    entries: BTreeMap<SeqNum, MemDepEntry>,
    /// Store PC -> load PCs that must not bypass it.
    predictions: HashMap<u64, HashSet<u64>>,
}

impl MemDepUnit {
    /// Creates an empty unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked operations.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is tracked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a sequence number is tracked.
    #[inline]
    pub fn is_tracked(&self, seq: SeqNum) -> bool {
        self.entries.contains_key(&seq)
    }

    /// Starts tracking a load or store. Returns whether the op is already
    /// clear of ordering constraints.
    pub fn insert(&mut self, seq: SeqNum, inst: InstId, pc: u64, kind: MemDepKind) -> bool {
        let ordering_ready = self.ordering_clear(seq, kind, pc);
        self.entries.insert(
            seq,
            MemDepEntry {
                inst,
                pc,
                kind,
                regs_ready: false,
                ordering_ready,
                completed: false,
            },
        );
        ordering_ready
    }

    /// Starts tracking a barrier. Later memory ops wait for it; it waits
    /// for every older tracked op.
    pub fn insert_barrier(&mut self, seq: SeqNum, inst: InstId) {
        let ordering_ready = self.ordering_clear(seq, MemDepKind::Barrier, 0);
        self.entries.insert(
            seq,
            MemDepEntry {
                inst,
                pc: 0,
                kind: MemDepKind::Barrier,
                regs_ready: false,
                ordering_ready,
                completed: false,
            },
        );
    }

    /// Notes that all register operands of a tracked op are available.
    /// Returns whether the op is now fully clear to issue.
    pub fn regs_ready(&mut self, seq: SeqNum) -> bool {
        match self.entries.get_mut(&seq) {
            Some(entry) => {
                entry.regs_ready = true;
                entry.ordering_ready
            }
            None => false,
        }
    }

    /// Marks a tracked op completed and returns the instructions that this
    /// completion unblocks (ordering newly clear and registers already
    /// available).
    pub fn completed(&mut self, seq: SeqNum) -> Vec<InstId> {
        if let Some(entry) = self.entries.get_mut(&seq) {
            entry.completed = true;
        } else {
            return Vec::new();
        }
        trace!("memdep: [sn:{}] completed", seq);
        self.entries.remove(&seq);
        self.recompute_ordering()
    }

    /// Drops every tracked op strictly younger than `boundary`.
    pub fn squash(&mut self, boundary: SeqNum) {
        self.entries.split_off(&SeqNum(boundary.0 + 1));
    }

    /// Records an ordering violation between a store and a younger load,
    /// so future instances of the load wait for the store.
    pub fn record_violation(&mut self, store_pc: u64, load_pc: u64) {
        trace!(
            "memdep: violation store pc {:#x} -> load pc {:#x}",
            store_pc,
            load_pc
        );
        self.predictions.entry(store_pc).or_default().insert(load_pc);
    }

    /// Whether the predictor holds a dependence from `store_pc` to
    /// `load_pc`.
    pub fn predicts_dependence(&self, store_pc: u64, load_pc: u64) -> bool {
        self.predictions
            .get(&store_pc)
            .is_some_and(|loads| loads.contains(&load_pc))
    }

    /// Decides whether an op at `seq` is clear of ordering constraints
    /// from older tracked entries.
    fn ordering_clear(&self, seq: SeqNum, kind: MemDepKind, pc: u64) -> bool {
        for entry in self.entries.range(..seq).map(|(_, e)| e) {
            if entry.completed {
                continue;
            }
            match entry.kind {
                // An incomplete older barrier blocks every memory op.
                MemDepKind::Barrier => return false,
                MemDepKind::Store => {
                    if kind == MemDepKind::Barrier {
                        return false;
                    }
                    if kind == MemDepKind::Load && self.predicts_dependence(entry.pc, pc) {
                        return false;
                    }
                }
                MemDepKind::Load => {
                    if kind == MemDepKind::Barrier {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Re-derives ordering readiness after a completion; returns the
    /// entries that became fully issuable.
    fn recompute_ordering(&mut self) -> Vec<InstId> {
        let mut newly_clear = Vec::new();
        let snapshot: Vec<(SeqNum, MemDepKind, u64)> = self
            .entries
            .iter()
            .filter(|(_, e)| !e.ordering_ready && !e.completed)
            .map(|(&seq, e)| (seq, e.kind, e.pc))
            .collect();
        for (seq, kind, pc) in snapshot {
            if self.ordering_clear(seq, kind, pc) {
                let entry = self.entries.get_mut(&seq).expect("entry vanished");
                entry.ordering_ready = true;
                if entry.regs_ready {
                    newly_clear.push(entry.inst);
                }
            }
        }
        newly_clear
    }
}
