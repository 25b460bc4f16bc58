//! Dynamic instructions, op classes, and the instruction arena.
//!
//! This module defines the instruction record the issue model operates on.
//! It provides:
//! 1. **Op Classes:** The functional unit class tags instructions carry.
//! 2. **Dynamic Instructions:** Per-instruction rename info, readiness
//!    bookkeeping, and lifecycle flags.
//! 3. **Arena Storage:** Pooled ownership with non-owning `InstId` handles,
//!    so lists, queues, and the dependency graph never share ownership.

use serde::Deserialize;

use crate::common::constants::{MAX_DEST_REGS, MAX_SRC_REGS};
use crate::common::reg::{PhysRegId, SeqNum, ThreadId};

/// Functional unit class tag; selects which units can execute an
/// instruction and which ready queue holds it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum OpClass {
    /// Integer add, subtract, logic, shifts, compares.
    #[default]
    IntAlu,
    /// Integer multiply.
    IntMult,
    /// Integer divide.
    IntDiv,
    /// Floating-point add and subtract.
    FloatAdd,
    /// Floating-point compare.
    FloatCmp,
    /// Floating-point convert.
    FloatCvt,
    /// Floating-point multiply.
    FloatMult,
    /// Floating-point divide.
    FloatDiv,
    /// Floating-point square root.
    FloatSqrt,
    /// Memory read (load).
    MemRead,
    /// Memory write (store).
    MemWrite,
    /// Internal processor register access.
    IprAccess,
    /// Instruction prefetch hint.
    InstPrefetch,
    /// No functional unit required (nop, barrier).
    NoOpClass,
}

impl OpClass {
    /// Number of op classes.
    pub const COUNT: usize = 14;

    /// All op classes, in ready-queue index order.
    pub const ALL: [OpClass; Self::COUNT] = [
        OpClass::IntAlu,
        OpClass::IntMult,
        OpClass::IntDiv,
        OpClass::FloatAdd,
        OpClass::FloatCmp,
        OpClass::FloatCvt,
        OpClass::FloatMult,
        OpClass::FloatDiv,
        OpClass::FloatSqrt,
        OpClass::MemRead,
        OpClass::MemWrite,
        OpClass::IprAccess,
        OpClass::InstPrefetch,
        OpClass::NoOpClass,
    ];

    /// Index of this class into per-class arrays (ready queues, FU stats).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns true for the integer execution classes.
    #[inline]
    pub fn is_int(self) -> bool {
        matches!(self, OpClass::IntAlu | OpClass::IntMult | OpClass::IntDiv)
    }

    /// Returns true for the floating-point execution classes.
    #[inline]
    pub fn is_float(self) -> bool {
        matches!(
            self,
            OpClass::FloatAdd
                | OpClass::FloatCmp
                | OpClass::FloatCvt
                | OpClass::FloatMult
                | OpClass::FloatDiv
                | OpClass::FloatSqrt
        )
    }

    /// Returns true for the memory classes.
    #[inline]
    pub fn is_mem(self) -> bool {
        matches!(self, OpClass::MemRead | OpClass::MemWrite)
    }
}

/// Non-owning handle to an instruction in the arena.
///
/// A handle is only meaningful together with the sequence number it was
/// captured with: arena slots are recycled, so long-lived references
/// (completion events, issue slots) revalidate with
/// [`InstPool::get_checked`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InstId(pub u32);

/// A decoded, renamed instruction in flight through the issue model.
///
/// Carries the rename information the queue schedules on and the lifecycle
/// flags the queue maintains. The instruction body (opcode semantics,
/// operand values) is outside the issue model and never inspected here.
#[derive(Clone, Debug)]
pub struct DynInst {
    /// Globally unique dispatch-order sequence number.
    pub seq_num: SeqNum,
    /// Hardware thread this instruction belongs to.
    pub tid: ThreadId,
    /// Program counter, for violation tracking and diagnostics.
    pub pc: u64,
    /// Functional unit class.
    pub op_class: OpClass,
    /// Whether this is a control transfer (branch/jump), for issue mix
    /// accounting.
    pub control: bool,

    srcs: Vec<PhysRegId>,
    dests: Vec<PhysRegId>,
    src_ready: Vec<bool>,
    num_ready_srcs: usize,

    /// Sent to the issue-to-execute buffer; no longer counted against the
    /// thread's queue entries.
    pub issued: bool,
    /// Removed by a squash; any remaining references are stale.
    pub squashed: bool,
    /// Result produced; dependents have been or are being woken.
    pub completed: bool,
    /// Currently sitting in a ready queue.
    pub queued: bool,
    /// Memory op awaiting ordering clearance from the dependence unit.
    pub mem_blocked: bool,
    /// Gated until commit releases it (stores, barriers, serializing ops).
    pub non_spec_pending: bool,
    /// Still counted against its thread's queue entries. Cleared when the
    /// entry is released at issue, so a memory-op replay cannot release
    /// the entry twice.
    pub accounted: bool,
    /// Cycle this instruction entered the queue, for residency statistics.
    pub dispatch_tick: u64,
    /// Cycle this instruction first became issuable, for delay statistics.
    pub ready_tick: Option<u64>,
}

impl DynInst {
    /// Creates an instruction record from rename output.
    ///
    /// # Panics
    ///
    /// Panics if more than `MAX_SRC_REGS` sources or `MAX_DEST_REGS`
    /// destinations are supplied; rename never produces more.
    pub fn new(
        seq_num: SeqNum,
        tid: ThreadId,
        op_class: OpClass,
        srcs: Vec<PhysRegId>,
        dests: Vec<PhysRegId>,
    ) -> Self {
        assert!(srcs.len() <= MAX_SRC_REGS);
        assert!(dests.len() <= MAX_DEST_REGS);
        let num_srcs = srcs.len();
        Self {
            seq_num,
            tid,
            pc: 0,
            op_class,
            control: false,
            src_ready: vec![false; num_srcs],
            srcs,
            dests,
            num_ready_srcs: 0,
            issued: false,
            squashed: false,
            completed: false,
            queued: false,
            mem_blocked: false,
            non_spec_pending: false,
            accounted: false,
            dispatch_tick: 0,
            ready_tick: None,
        }
    }

    /// Source physical registers.
    #[inline]
    pub fn srcs(&self) -> &[PhysRegId] {
        &self.srcs
    }

    /// Destination physical registers.
    #[inline]
    pub fn dests(&self) -> &[PhysRegId] {
        &self.dests
    }

    /// Number of source registers.
    #[inline]
    pub fn num_src_regs(&self) -> usize {
        self.srcs.len()
    }

    /// Number of destination registers.
    #[inline]
    pub fn num_dest_regs(&self) -> usize {
        self.dests.len()
    }

    /// Whether the given source operand slot has its value available.
    #[inline]
    pub fn is_src_reg_ready(&self, idx: usize) -> bool {
        self.src_ready[idx]
    }

    /// Marks one source operand slot as having its value available.
    pub fn ready_src_reg(&mut self, idx: usize) {
        if !self.src_ready[idx] {
            self.src_ready[idx] = true;
            self.num_ready_srcs += 1;
        }
    }

    /// Marks every source operand slot reading `reg` as available.
    /// Returns how many slots were newly marked.
    pub fn ready_src_regs_for(&mut self, reg: PhysRegId) -> usize {
        let mut marked = 0;
        for idx in 0..self.srcs.len() {
            if self.srcs[idx] == reg && !self.src_ready[idx] {
                self.src_ready[idx] = true;
                self.num_ready_srcs += 1;
                marked += 1;
            }
        }
        marked
    }

    /// All register sources available.
    #[inline]
    pub fn ready_to_issue(&self) -> bool {
        self.num_ready_srcs == self.srcs.len()
    }

    /// Eligible for a ready queue: registers available, not squashed, not
    /// blocked on memory ordering, not gated behind commit.
    #[inline]
    pub fn can_issue(&self) -> bool {
        self.ready_to_issue() && !self.squashed && !self.mem_blocked && !self.non_spec_pending
    }

    /// Memory reference (load or store).
    #[inline]
    pub fn is_mem_ref(&self) -> bool {
        self.op_class.is_mem()
    }

    /// Load.
    #[inline]
    pub fn is_load(&self) -> bool {
        self.op_class == OpClass::MemRead
    }

    /// Store.
    #[inline]
    pub fn is_store(&self) -> bool {
        self.op_class == OpClass::MemWrite
    }

    /// Execution callback. The issue model never inspects the instruction
    /// body; completing the result is all that is modeled.
    pub fn execute(&mut self) {
        self.completed = true;
    }
}

/// Pooled storage for in-flight instructions.
///
/// The arena is the sole owner of `DynInst` values. Everything else (thread
/// lists, ready queues, the dependency graph, completion events) refers to
/// instructions through `InstId` handles. A slot is recycled when its
/// instruction leaves the queue at commit or squash, so stale handles are
/// revalidated by sequence number.
#[derive(Default)]
pub struct InstPool {
    slots: Vec<Option<DynInst>>,
    free: Vec<u32>,
    len: usize,
}

impl InstPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live instructions.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no instructions are live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Takes ownership of an instruction, returning its handle.
    pub fn insert(&mut self, inst: DynInst) -> InstId {
        self.len += 1;
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx as usize] = Some(inst);
                InstId(idx)
            }
            None => {
                self.slots.push(Some(inst));
                InstId((self.slots.len() - 1) as u32)
            }
        }
    }

    /// Borrows the instruction behind a handle, if the slot is live.
    #[inline]
    pub fn get(&self, id: InstId) -> Option<&DynInst> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Mutably borrows the instruction behind a handle.
    #[inline]
    pub fn get_mut(&mut self, id: InstId) -> Option<&mut DynInst> {
        self.slots.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// Borrows the instruction only if the slot still holds the
    /// instruction the handle was captured for.
    pub fn get_checked(&self, id: InstId, seq: SeqNum) -> Option<&DynInst> {
        self.get(id).filter(|inst| inst.seq_num == seq)
    }

    /// Mutable variant of [`InstPool::get_checked`].
    pub fn get_checked_mut(&mut self, id: InstId, seq: SeqNum) -> Option<&mut DynInst> {
        self.get_mut(id).filter(|inst| inst.seq_num == seq)
    }

    /// Releases a slot, returning the instruction that occupied it.
    pub fn remove(&mut self, id: InstId) -> Option<DynInst> {
        let slot = self.slots.get_mut(id.0 as usize)?;
        let inst = slot.take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(inst)
    }
}
