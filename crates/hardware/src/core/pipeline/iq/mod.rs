//! The instruction queue.
//!
//! Holds decoded, renamed instructions between dispatch and issue, and
//! selects up to `total_width` issuable instructions each cycle:
//! 1. **Dependency Tracking:** A scoreboard fast-path backed by a
//!    per-register dependency graph.
//! 2. **Selection:** One ready queue per op class, drained oldest-first
//!    across classes through the functional unit pool.
//! 3. **Speculation:** Bounded, suffix-precise squash walks per thread.
//! 4. **Memory Ordering:** A per-thread memory dependence unit gates loads
//!    and stores beyond register readiness.
//! 5. **SMT:** Entry accounting under a configurable sharing policy.
//!
//! The queue also owns execution timing: at issue it schedules a
//! completion event at the unit's latency, and the completion wakes
//! dependents so chains can issue back to back.

/// SMT entry accounting.
pub mod accountant;
/// Register dependency graph.
pub mod dep_graph;
/// Ready queues and the age-order list.
pub mod ready_list;
/// Register availability scoreboard.
pub mod scoreboard;

use std::collections::{BTreeMap, VecDeque};

use log::trace;

use crate::common::error::IqError;
use crate::common::reg::{RegSpace, SeqNum, ThreadId};
use crate::config::Config;
use crate::core::inst::{DynInst, InstId, InstPool, OpClass};
use crate::core::pipeline::mem_dep::{MemDepKind, MemDepUnit};
use crate::core::pipeline::signals::{IssueSlot, IssueStruct};
use crate::core::units::fu_pool::{FuAllocation, FuPool};
use crate::sim::events::{Event, EventQueue, Tick};
use crate::stats::IqStats;

use accountant::EntryAccountant;
use dep_graph::DepGraph;
use ready_list::{AgeOrderList, ReadyQueue};
use scoreboard::Scoreboard;

/// Out-of-order instruction queue with SMT support.
pub struct InstructionQueue {
    pool: InstPool,
    inst_list: Vec<VecDeque<InstId>>,
    ready: Vec<ReadyQueue>,
    list_order: AgeOrderList,
    non_spec_insts: BTreeMap<SeqNum, InstId>,
    accountant: EntryAccountant,
    dep_graph: DepGraph,
    scoreboard: Scoreboard,
    mem_dep_unit: Vec<MemDepUnit>,
    fu_pool: FuPool,
    reg_space: RegSpace,

    num_threads: usize,
    total_width: usize,
    squash_width: usize,

    /// Per-thread squash boundary while a squash walk is in progress.
    squashed_seq_num: Vec<Option<SeqNum>>,
    /// Youngest sequence number seen from dispatch, per thread.
    tail_seq: Vec<SeqNum>,

    cur_tick: Tick,

    /// Issue-side statistics.
    pub stats: IqStats,
}

impl InstructionQueue {
    /// Builds the queue from the configuration.
    pub fn new(config: &Config) -> Self {
        assert!(config.core.validate(), "invalid core configuration");
        let num_threads = config.core.num_threads;
        let reg_space = RegSpace::new(
            config.regs.num_phys_int_regs,
            config.regs.num_phys_float_regs,
        );
        Self {
            pool: InstPool::new(),
            inst_list: vec![VecDeque::new(); num_threads],
            ready: (0..OpClass::COUNT).map(|_| ReadyQueue::new()).collect(),
            list_order: AgeOrderList::new(),
            non_spec_insts: BTreeMap::new(),
            accountant: EntryAccountant::new(
                config.core.iq_policy,
                config.core.num_entries,
                num_threads,
                config.core.threshold,
            ),
            dep_graph: DepGraph::new(reg_space.total()),
            scoreboard: Scoreboard::new(reg_space.total()),
            mem_dep_unit: (0..num_threads).map(|_| MemDepUnit::new()).collect(),
            fu_pool: FuPool::from_config(&config.fu_pool),
            reg_space,
            num_threads,
            total_width: config.core.total_width,
            squash_width: config.core.squash_width,
            squashed_seq_num: vec![None; num_threads],
            tail_seq: vec![SeqNum(0); num_threads],
            cur_tick: 0,
            stats: IqStats::new(config.core.total_width),
        }
    }

    //////////////////////////////////////
    // Capacity and status
    //////////////////////////////////////

    /// Total free entries.
    #[inline]
    pub fn num_free_entries(&self) -> usize {
        self.accountant.num_free()
    }

    /// Free entries available to one thread.
    #[inline]
    pub fn num_free_entries_tid(&self, tid: ThreadId) -> usize {
        self.accountant.num_free_tid(tid)
    }

    /// Whether no thread can insert.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.accountant.is_full()
    }

    /// Whether this thread can insert.
    #[inline]
    pub fn is_full_tid(&self, tid: ThreadId) -> bool {
        self.accountant.is_full_tid(tid)
    }

    /// Unissued entries held by a thread.
    #[inline]
    pub fn get_count(&self, tid: ThreadId) -> usize {
        self.accountant.count(tid)
    }

    /// Instructions a thread has in flight (issued or not).
    #[inline]
    pub fn num_in_flight(&self, tid: ThreadId) -> usize {
        self.inst_list[tid].len()
    }

    /// Recomputes per-thread entry caps for a new set of active threads.
    pub fn reset_entries(&mut self, active_threads: &[ThreadId]) {
        self.accountant.reset_entries(active_threads);
    }

    /// Per-thread cap the sharing policy yields for `num_threads` threads.
    pub fn entry_amount(&self, num_threads: usize) -> usize {
        self.accountant.entry_amount(num_threads)
    }

    /// Whether any ready queue holds instructions.
    pub fn has_ready_insts(&self) -> bool {
        self.ready.iter().any(|q| !q.is_empty())
    }

    /// Whether a squash walk is still in progress for a thread.
    #[inline]
    pub fn is_squashing(&self, tid: ThreadId) -> bool {
        self.squashed_seq_num[tid].is_some()
    }

    /// Borrows an instruction.
    #[inline]
    pub fn get_inst(&self, id: InstId) -> Option<&DynInst> {
        self.pool.get(id)
    }

    /// Borrows an instruction if its slot still holds the expected
    /// sequence number.
    #[inline]
    pub fn get_inst_checked(&self, id: InstId, seq: SeqNum) -> Option<&DynInst> {
        self.pool.get_checked(id, seq)
    }

    /// Finds a thread's instruction by sequence number.
    pub fn find_by_seq(&self, tid: ThreadId, seq: SeqNum) -> Option<InstId> {
        self.inst_list[tid]
            .iter()
            .copied()
            .find(|&id| self.pool.get(id).map(|i| i.seq_num) == Some(seq))
    }

    /// The functional unit pool.
    #[inline]
    pub fn fu_pool(&self) -> &FuPool {
        &self.fu_pool
    }

    /// The register scoreboard.
    #[inline]
    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    /// The register dependency graph.
    #[inline]
    pub fn dep_graph(&self) -> &DepGraph {
        &self.dep_graph
    }

    //////////////////////////////////////
    // Insertion
    //////////////////////////////////////

    /// Inserts a speculative instruction. If all its sources are already
    /// available it goes straight to a ready queue.
    pub fn insert(&mut self, inst: DynInst) -> Result<InstId, IqError> {
        self.insert_common(inst, false, false)
    }

    /// Inserts an instruction that must not issue until commit releases it
    /// with [`InstructionQueue::schedule_non_spec`].
    pub fn insert_non_spec(&mut self, inst: DynInst) -> Result<InstId, IqError> {
        self.insert_common(inst, true, false)
    }

    /// Inserts a memory barrier: ordered against every older memory op and
    /// ordering every younger one, and gated behind commit like any
    /// non-speculative instruction.
    pub fn insert_barrier(&mut self, inst: DynInst) -> Result<InstId, IqError> {
        self.insert_common(inst, true, true)
    }

    /// Accounts for an instruction that bypasses the queue entirely:
    /// records sequence-number continuity without taking an entry.
    pub fn advance_tail(&mut self, seq: SeqNum, tid: ThreadId) {
        debug_assert!(seq > self.tail_seq[tid], "dispatch out of sequence order");
        self.tail_seq[tid] = seq;
    }

    fn insert_common(
        &mut self,
        mut inst: DynInst,
        non_spec: bool,
        barrier: bool,
    ) -> Result<InstId, IqError> {
        let tid = inst.tid;
        debug_assert!(tid < self.num_threads);
        debug_assert!(
            inst.seq_num > self.tail_seq[tid],
            "dispatch out of sequence order"
        );

        self.accountant.allocate(tid)?;

        let seq = inst.seq_num;
        let op_class = inst.op_class;
        let pc = inst.pc;
        let is_mem = inst.is_mem_ref();
        let is_load = inst.is_load();

        inst.accounted = true;
        inst.dispatch_tick = self.cur_tick;
        inst.non_spec_pending = non_spec;
        // Memory ops and barriers additionally wait for ordering clearance.
        inst.mem_blocked = is_mem || barrier;
        self.tail_seq[tid] = seq;

        // Scoreboard fast path: mark sources whose values are already
        // available; remember the rest for graph insertion.
        let mut pending_srcs = Vec::new();
        for idx in 0..inst.num_src_regs() {
            let reg = inst.srcs()[idx];
            if self.reg_space.is_zero_reg(reg) || self.scoreboard.is_ready(reg) {
                inst.ready_src_reg(idx);
            } else {
                pending_srcs.push(reg);
            }
        }
        let dests: Vec<_> = inst.dests().to_vec();

        let id = self.pool.insert(inst);
        self.inst_list[tid].push_back(id);
        self.stats.insts_added += 1;
        if non_spec {
            self.stats.non_spec_insts_added += 1;
            self.non_spec_insts.insert(seq, id);
        }

        for reg in pending_srcs {
            self.dep_graph.add_consumer(reg, id);
        }
        for reg in dests {
            if self.reg_space.is_zero_reg(reg) {
                continue;
            }
            self.dep_graph.set_producer(reg, id);
            self.scoreboard.clear(reg);
        }

        if barrier {
            self.mem_dep_unit[tid].insert_barrier(seq, id);
        } else if is_mem {
            let kind = if is_load {
                MemDepKind::Load
            } else {
                MemDepKind::Store
            };
            self.mem_dep_unit[tid].insert(seq, id, pc, kind);
        }

        trace!(
            "iq: [tid:{}] [sn:{}] inserted ({:?}{})",
            tid,
            seq,
            op_class,
            if non_spec { ", non-spec" } else { "" }
        );

        // Ordering-tracked ops are promoted through the dependence unit;
        // everything else can go ready immediately.
        if self.pool.get(id).is_some_and(|i| i.ready_to_issue()) {
            if is_mem || barrier {
                if self.mem_dep_unit[tid].regs_ready(seq) {
                    self.add_ready_mem_inst(id);
                }
            } else {
                self.add_if_ready(id);
            }
        }

        debug_assert!(self.accountant.check_invariant());
        Ok(id)
    }

    //////////////////////////////////////
    // Wakeup
    //////////////////////////////////////

    /// Moves an instruction to its ready queue if it is eligible.
    fn add_if_ready(&mut self, id: InstId) {
        let Some(inst) = self.pool.get_mut(id) else {
            return;
        };
        if inst.issued || inst.squashed || inst.queued || !inst.can_issue() {
            return;
        }
        inst.queued = true;
        if inst.ready_tick.is_none() {
            inst.ready_tick = Some(self.cur_tick);
        }
        let seq = inst.seq_num;
        let op_class = inst.op_class;
        trace!("iq: [tid:{}] [sn:{}] ready ({:?})", inst.tid, seq, op_class);

        let queue = &mut self.ready[op_class.index()];
        queue.push(seq, id);
        let top = queue.oldest_seq().expect("queue cannot be empty after push");
        self.list_order.refresh(op_class, top);
    }

    /// Wakes every consumer of a completed instruction's results. Returns
    /// the number of dependents notified.
    pub fn wake_dependents(&mut self, id: InstId) -> usize {
        let Some(inst) = self.pool.get(id) else {
            return 0;
        };
        debug_assert!(!inst.squashed, "cannot wake dependents of a squashed producer");
        let dests: Vec<_> = inst.dests().to_vec();
        let tid = inst.tid;
        let seq = inst.seq_num;

        let mut woken = 0;
        for reg in dests {
            if self.reg_space.is_zero_reg(reg) {
                continue;
            }
            self.dep_graph.clear_producer(reg, id);
            self.scoreboard.set_ready(reg);

            for consumer_id in self.dep_graph.take_consumers(reg) {
                let Some(consumer) = self.pool.get_mut(consumer_id) else {
                    continue;
                };
                consumer.ready_src_regs_for(reg);
                woken += 1;
                let ready = consumer.ready_to_issue();
                let consumer_seq = consumer.seq_num;
                let consumer_tid = consumer.tid;
                if !ready {
                    continue;
                }
                if self.mem_dep_unit[consumer_tid].is_tracked(consumer_seq) {
                    if self.mem_dep_unit[consumer_tid].regs_ready(consumer_seq) {
                        self.add_ready_mem_inst(consumer_id);
                    }
                } else {
                    self.add_if_ready(consumer_id);
                }
            }
        }
        trace!("iq: [tid:{}] [sn:{}] woke {} dependents", tid, seq, woken);
        woken
    }

    /// Completion: run the instruction's execute callback, wake register
    /// dependents, and release any memory-ordering constraints it was
    /// holding.
    fn complete_inst(&mut self, id: InstId) {
        let Some(inst) = self.pool.get_mut(id) else {
            return;
        };
        inst.execute();
        let seq = inst.seq_num;
        let tid = inst.tid;
        self.wake_dependents(id);
        if self.mem_dep_unit[tid].is_tracked(seq) {
            for ready_id in self.mem_dep_unit[tid].completed(seq) {
                self.add_ready_mem_inst(ready_id);
            }
        }
    }

    /// Handles a functional unit completion event. Releases the unit; for
    /// a live instruction, wakes its dependents. A squashed instruction
    /// releases the unit only.
    pub fn process_fu_completion(&mut self, id: InstId, seq: SeqNum, fu_idx: Option<usize>) {
        if let Some(idx) = fu_idx {
            self.fu_pool.free_unit(idx);
        }
        match self.pool.get_checked(id, seq) {
            Some(inst) if inst.squashed => {
                self.stats.squashed_insts_issued += 1;
                trace!("iq: [sn:{}] fu completion for squashed instruction", seq);
            }
            None => {
                self.stats.squashed_insts_issued += 1;
                trace!("iq: [sn:{}] fu completion for squashed instruction", seq);
            }
            // Rescheduled before the result came back; the completion
            // belongs to the abandoned execution.
            Some(inst) if !inst.issued => {}
            Some(_) => self.complete_inst(id),
        }
    }

    //////////////////////////////////////
    // Scheduling
    //////////////////////////////////////

    /// Cycle boundary housekeeping: releases pipelined units and records
    /// the current tick for statistics.
    pub fn begin_cycle(&mut self, now: Tick) {
        self.cur_tick = now;
        self.fu_pool.advance_cycle();
        self.stats.cycles = now;
    }

    /// Issues ready instructions, oldest first across op classes, into the
    /// issue-to-execute slot. Returns the number issued.
    pub fn schedule_ready_insts(
        &mut self,
        i2e: &mut IssueStruct,
        events: &mut EventQueue,
    ) -> usize {
        let mut total_issued = 0;
        let width = self.total_width.saturating_sub(i2e.insts.len());
        let mut idx = 0;

        while total_issued < width && idx < self.list_order.len() {
            let op_class = self.list_order.get(idx).op_class;
            let queue = &mut self.ready[op_class.index()];

            let Some(entry) = queue.peek() else {
                // Queue drained behind the list's back (lazy removal).
                self.list_order.remove_at(idx);
                continue;
            };

            // Drop entries whose instruction was squashed (and possibly
            // recycled) after it became ready.
            let live = self
                .pool
                .get_checked(entry.inst, entry.seq)
                .is_some_and(|inst| !inst.squashed);
            if !live {
                queue.pop();
                self.stats.squashed_insts_issued += 1;
                let next = queue.oldest_seq();
                self.list_order.move_to_younger(idx, next);
                continue;
            }

            match self.fu_pool.get_unit(op_class) {
                FuAllocation::NoneFree => {
                    self.stats.fu_busy[op_class.index()] += 1;
                    idx += 1;
                }
                FuAllocation::NotNeeded => {
                    self.issue_inst(entry.inst, i2e);
                    let next = self.ready[op_class.index()].oldest_seq();
                    self.list_order.move_to_younger(idx, next);
                    // No functional unit, no latency: complete in place so
                    // dependents can still issue this cycle.
                    self.complete_inst(entry.inst);
                    total_issued += 1;
                }
                FuAllocation::Unit {
                    idx: fu,
                    latency,
                    pipelined,
                } => {
                    self.issue_inst(entry.inst, i2e);
                    let next = self.ready[op_class.index()].oldest_seq();
                    self.list_order.move_to_younger(idx, next);

                    if latency == 0 {
                        // Pipelined-free immediately; back-to-back wakeup.
                        self.fu_pool.free_unit(fu);
                        self.complete_inst(entry.inst);
                    } else if pipelined {
                        self.fu_pool.free_unit_next_cycle(fu);
                        events.schedule(
                            self.cur_tick + latency,
                            Event::FuCompletion {
                                inst: entry.inst,
                                seq: entry.seq,
                                fu_idx: None,
                            },
                        );
                    } else {
                        events.schedule(
                            self.cur_tick + latency,
                            Event::FuCompletion {
                                inst: entry.inst,
                                seq: entry.seq,
                                fu_idx: Some(fu),
                            },
                        );
                    }
                    total_issued += 1;
                }
            }
        }

        self.stats.n_issued_dist.record(total_issued as u64);
        total_issued
    }

    /// Pops an instruction from its ready queue into the issue slot and
    /// returns its queue entry to the accountant.
    fn issue_inst(&mut self, id: InstId, i2e: &mut IssueStruct) {
        let inst = self.pool.get_mut(id).expect("issuing a missing instruction");
        debug_assert!(inst.queued && !inst.issued);
        inst.queued = false;
        inst.issued = true;

        let seq = inst.seq_num;
        let tid = inst.tid;
        let op_class = inst.op_class;
        let control = inst.control;
        let residency = self.cur_tick.saturating_sub(inst.dispatch_tick);
        let delay = inst
            .ready_tick
            .map(|t| self.cur_tick.saturating_sub(t))
            .unwrap_or(0);
        let was_accounted = inst.accounted;
        inst.accounted = false;

        self.ready[op_class.index()].pop();
        if was_accounted {
            self.accountant.release(tid);
        }

        i2e.insts.push(IssueSlot { inst: id, seq });
        self.stats.record_issue(tid, op_class, control);
        self.stats.queue_res_dist.record(residency);
        self.stats.issue_delay_dist.record(delay);
        trace!("iq: [tid:{}] [sn:{}] issued ({:?})", tid, seq, op_class);
    }

    //////////////////////////////////////
    // Non-speculative gate
    //////////////////////////////////////

    /// Releases a non-speculative instruction for scheduling; called when
    /// it reaches the head of the reorder buffer.
    pub fn schedule_non_spec(&mut self, seq: SeqNum) -> Result<(), IqError> {
        let id = self
            .non_spec_insts
            .remove(&seq)
            .ok_or(IqError::UnknownSeqNum { seq })?;
        let inst = self
            .pool
            .get_mut(id)
            .expect("non-spec table held a freed slot");
        inst.non_spec_pending = false;
        let tid = inst.tid;
        let ready = inst.ready_to_issue();
        trace!("iq: [tid:{}] [sn:{}] non-spec released", tid, seq);

        if !ready {
            return Ok(());
        }
        if self.mem_dep_unit[tid].is_tracked(seq) {
            if self.mem_dep_unit[tid].regs_ready(seq) {
                self.add_ready_mem_inst(id);
            }
        } else {
            self.add_if_ready(id);
        }
        Ok(())
    }

    /// Retires the queue's records of all instructions up to and including
    /// `limit` for a thread.
    pub fn commit(&mut self, limit: SeqNum, tid: ThreadId) {
        while let Some(&front) = self.inst_list[tid].front() {
            let Some(inst) = self.pool.get(front) else {
                self.inst_list[tid].pop_front();
                continue;
            };
            if inst.seq_num > limit {
                break;
            }
            debug_assert!(inst.issued, "committing an instruction that never issued");
            self.inst_list[tid].pop_front();
            self.pool.remove(front);
        }
    }

    //////////////////////////////////////
    // Memory op protocol
    //////////////////////////////////////

    /// A memory op's ordering constraints cleared; make it issuable.
    pub fn add_ready_mem_inst(&mut self, id: InstId) {
        if let Some(inst) = self.pool.get_mut(id) {
            inst.mem_blocked = false;
        }
        self.add_if_ready(id);
    }

    /// Marks a memory op as needing re-issue (translation miss, cache
    /// block). It leaves the issued state but is not queued again until
    /// [`InstructionQueue::replay_mem_inst`].
    pub fn reschedule_mem_inst(&mut self, id: InstId) {
        let Some(inst) = self.pool.get_mut(id) else {
            return;
        };
        debug_assert!(inst.is_mem_ref());
        inst.issued = false;
        inst.completed = false;
        inst.mem_blocked = true;
        inst.ready_tick = None;
        trace!("iq: [tid:{}] [sn:{}] rescheduled", inst.tid, inst.seq_num);
    }

    /// Replays a previously rescheduled memory op.
    pub fn replay_mem_inst(&mut self, id: InstId) {
        self.add_ready_mem_inst(id);
    }

    /// Terminal callback for a memory op: releases its ordering
    /// constraints and wakes any ops that were waiting on it.
    pub fn complete_mem_inst(&mut self, id: InstId) {
        let Some(inst) = self.pool.get_mut(id) else {
            return;
        };
        debug_assert!(inst.is_mem_ref());
        inst.completed = true;
        let seq = inst.seq_num;
        let tid = inst.tid;
        for ready_id in self.mem_dep_unit[tid].completed(seq) {
            self.add_ready_mem_inst(ready_id);
        }
    }

    /// Records an ordering violation between a store and a younger load
    /// that executed too early. The squash itself is initiated by commit.
    pub fn violation(&mut self, store: InstId, load: InstId) {
        let Some(store_inst) = self.pool.get(store) else {
            return;
        };
        let Some(load_inst) = self.pool.get(load) else {
            return;
        };
        debug_assert_eq!(store_inst.tid, load_inst.tid);
        debug_assert!(store_inst.seq_num < load_inst.seq_num);
        let tid = load_inst.tid;
        self.mem_dep_unit[tid].record_violation(store_inst.pc, load_inst.pc);
    }

    //////////////////////////////////////
    // Squashing
    //////////////////////////////////////

    /// Begins squashing every instruction of `tid` strictly younger than
    /// `squash_seq`, and performs the first bounded walk.
    pub fn squash(&mut self, tid: ThreadId, squash_seq: SeqNum) {
        trace!("iq: [tid:{}] squash younger than [sn:{}]", tid, squash_seq);
        self.squashed_seq_num[tid] = Some(squash_seq);
        self.mem_dep_unit[tid].squash(squash_seq);
        self.do_squash(tid);
    }

    /// One bounded squash walk from the tail of the thread list. Persists
    /// across cycles until the boundary is reached.
    pub fn do_squash(&mut self, tid: ThreadId) {
        let Some(boundary) = self.squashed_seq_num[tid] else {
            return;
        };

        let mut examined = 0;
        while examined < self.squash_width {
            let Some(&id) = self.inst_list[tid].back() else {
                self.squashed_seq_num[tid] = None;
                break;
            };
            let inst = self.pool.get(id).expect("thread list held a freed slot");
            if inst.seq_num <= boundary {
                self.squashed_seq_num[tid] = None;
                break;
            }

            let seq = inst.seq_num;
            let issued = inst.issued;
            let was_squashed = inst.squashed;
            let was_accounted = inst.accounted;
            let srcs: Vec<_> = inst.srcs().to_vec();
            let src_pending: Vec<bool> = (0..srcs.len())
                .map(|i| !inst.is_src_reg_ready(i))
                .collect();
            let dests: Vec<_> = inst.dests().to_vec();

            if !issued && !was_squashed {
                // Unlink from the consumer chain of every source still
                // waiting for its value.
                for (i, &reg) in srcs.iter().enumerate() {
                    if src_pending[i] && !self.reg_space.is_zero_reg(reg) {
                        self.dep_graph.remove_consumer(reg, id);
                    }
                    self.stats.squashed_operands_examined += 1;
                }
            }
            // The squash is a strict suffix: the only producers being
            // removed are the youngest, so each destination reads as
            // available again (any surviving older producer will clear
            // the bit when its own consumers are tracked).
            for &reg in &dests {
                if self.reg_space.is_zero_reg(reg) {
                    continue;
                }
                self.dep_graph.clear_producer(reg, id);
                self.scoreboard.set_ready(reg);
            }

            if self.non_spec_insts.remove(&seq).is_some() {
                self.stats.squashed_non_spec_removed += 1;
            }

            // Ready queue entries are dropped lazily when they surface at
            // the top of their queue; marking squashed is enough here.
            if let Some(inst) = self.pool.get_mut(id) {
                inst.squashed = true;
                inst.queued = false;
            }
            self.stats.squashed_insts_examined += 1;

            if was_accounted {
                self.accountant.release(tid);
            }
            self.inst_list[tid].pop_back();
            self.pool.remove(id);
            trace!("iq: [tid:{}] [sn:{}] squashed", tid, seq);
            examined += 1;
        }

        debug_assert!(self.accountant.check_invariant());
    }

    //////////////////////////////////////
    // Diagnostics
    //////////////////////////////////////

    /// Prints every in-flight instruction. Not for use on the hot path.
    pub fn dump_insts(&self) {
        for tid in 0..self.num_threads {
            println!("thread {} ({} in flight):", tid, self.inst_list[tid].len());
            for &id in &self.inst_list[tid] {
                if let Some(inst) = self.pool.get(id) {
                    println!(
                        "  [sn:{}] {:?} issued={} queued={} ready={}",
                        inst.seq_num,
                        inst.op_class,
                        inst.issued,
                        inst.queued,
                        inst.ready_to_issue()
                    );
                }
            }
        }
    }

    /// Prints ready queue and non-spec table occupancy. Not for use on
    /// the hot path.
    pub fn dump_lists(&self) {
        for op_class in OpClass::ALL {
            let queue = &self.ready[op_class.index()];
            if !queue.is_empty() {
                println!(
                    "ready[{:?}]: {} entries, oldest [sn:{}], on age list: {}",
                    op_class,
                    queue.len(),
                    queue.oldest_seq().expect("non-empty queue has an oldest"),
                    self.list_order.contains(op_class)
                );
            }
        }
        println!("non-spec: {} entries", self.non_spec_insts.len());
    }

    /// Prints the pending entries of the dependency graph. Not for use on
    /// the hot path.
    pub fn dump_depend_graph(&self) {
        for reg in 0..self.reg_space.total() {
            let producer = self.dep_graph.producer(reg);
            if producer.is_none() && !self.dep_graph.has_consumers(reg) {
                continue;
            }
            let consumers: Vec<String> = self
                .dep_graph
                .consumers(reg)
                .filter_map(|id| self.pool.get(id))
                .map(|inst| format!("[sn:{}]", inst.seq_num))
                .collect();
            let producer = producer
                .and_then(|id| self.pool.get(id))
                .map(|inst| format!("[sn:{}]", inst.seq_num))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "r{}: producer {} consumers {}",
                reg,
                producer,
                consumers.join(" ")
            );
        }
    }
}
