//! Per-cycle simulation driver.
//!
//! The simulator owns the instruction queue, the event calendar, and the
//! time buffers, and realizes the cycle discipline the queue expects:
//! squash continuation, then non-speculative promotion, then functional
//! unit completions due this cycle, then ready-queue scheduling. A small
//! commit model walks each thread's program order, retiring completed
//! instructions and releasing non-speculative ones when they reach the
//! head.
//!
//! Dispatch, execute, and commit are deliberately thin: the queue is the
//! subject of the simulation and everything here exists to drive it.

use std::collections::VecDeque;

use log::trace;

use crate::common::error::IqError;
use crate::common::reg::{SeqNum, ThreadId};
use crate::config::Config;
use crate::core::inst::{DynInst, InstId};
use crate::core::pipeline::iq::InstructionQueue;
use crate::core::pipeline::signals::{IssueStruct, TimeStruct};
use crate::core::pipeline::time_buffer::TimeBuffer;
use crate::sim::events::{Event, EventQueue, Tick};
use crate::stats::IqStats;

/// One dispatched-but-uncommitted instruction in the commit model.
#[derive(Clone, Copy)]
struct ProgramOrderEntry {
    seq: SeqNum,
    inst: InstId,
}

/// Discrete-event driver around the instruction queue.
pub struct Simulator {
    /// The instruction queue under simulation.
    pub iq: InstructionQueue,
    events: EventQueue,
    issue_to_execute: TimeBuffer<IssueStruct>,
    from_commit: TimeBuffer<TimeStruct>,
    commit_to_iew_delay: usize,
    num_threads: usize,
    now: Tick,
    program_order: Vec<VecDeque<ProgramOrderEntry>>,
    trace: bool,
}

impl Simulator {
    /// Builds a simulator from the configuration.
    pub fn new(config: &Config) -> Self {
        let num_threads = config.core.num_threads;
        // The wire needs at least one cycle for a signal to land.
        let delay = config.core.commit_to_iew_delay.max(1);
        Self {
            iq: InstructionQueue::new(config),
            events: EventQueue::new(),
            issue_to_execute: TimeBuffer::new(1, 0),
            from_commit: TimeBuffer::new(delay, 0),
            commit_to_iew_delay: delay,
            num_threads,
            now: 0,
            program_order: vec![VecDeque::new(); num_threads],
            trace: config.general.trace,
        }
    }

    /// Current simulated cycle.
    #[inline]
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Issue-side statistics.
    #[inline]
    pub fn stats(&self) -> &IqStats {
        &self.iq.stats
    }

    /// Whether all dispatched instructions have committed, the queue holds
    /// no records, and no events remain.
    pub fn is_drained(&self) -> bool {
        self.events.is_empty()
            && self.program_order.iter().all(VecDeque::is_empty)
            && (0..self.num_threads)
                .all(|tid| self.iq.num_in_flight(tid) == 0 && !self.iq.is_squashing(tid))
    }

    /// Dispatches a speculative instruction into the queue.
    pub fn dispatch(&mut self, inst: DynInst) -> Result<InstId, IqError> {
        let tid = inst.tid;
        let seq = inst.seq_num;
        let id = self.iq.insert(inst)?;
        self.program_order[tid].push_back(ProgramOrderEntry { seq, inst: id });
        Ok(id)
    }

    /// Dispatches an instruction gated behind commit.
    pub fn dispatch_non_spec(&mut self, inst: DynInst) -> Result<InstId, IqError> {
        let tid = inst.tid;
        let seq = inst.seq_num;
        let id = self.iq.insert_non_spec(inst)?;
        self.program_order[tid].push_back(ProgramOrderEntry { seq, inst: id });
        Ok(id)
    }

    /// Dispatches a memory barrier.
    pub fn dispatch_barrier(&mut self, inst: DynInst) -> Result<InstId, IqError> {
        let tid = inst.tid;
        let seq = inst.seq_num;
        let id = self.iq.insert_barrier(inst)?;
        self.program_order[tid].push_back(ProgramOrderEntry { seq, inst: id });
        Ok(id)
    }

    /// Requests a squash of everything strictly younger than `seq` on a
    /// thread. The request travels through the commit wire and takes
    /// effect after the configured delay.
    pub fn signal_squash(&mut self, tid: ThreadId, seq: SeqNum) {
        let comm = &mut self.from_commit.access_mut(0).commit_info[tid];
        comm.squash = true;
        comm.squash_seq_num = seq;
        // The commit model stops tracking the squashed suffix right away;
        // the queue removes it when the signal arrives.
        self.program_order[tid].retain(|entry| entry.seq <= seq);
    }

    /// Runs one simulated cycle.
    pub fn tick(&mut self) {
        self.now += 1;
        self.iq.begin_cycle(self.now);

        // Commit-side signals arrive after their wire delay.
        let signals = *self.from_commit.access(-(self.commit_to_iew_delay as isize));
        for tid in 0..self.num_threads {
            let comm = signals.commit_info[tid];
            if comm.squash {
                self.iq.squash(tid, comm.squash_seq_num);
            } else if self.iq.is_squashing(tid) {
                self.iq.do_squash(tid);
            }
            if let Some(seq) = comm.commit_seq_num {
                // The instruction may have been squashed since the signal
                // was sent; that is not an error here.
                let _ = self.iq.schedule_non_spec(seq);
            }
            if let Some(seq) = comm.done_seq_num {
                self.iq.commit(seq, tid);
            }
        }

        // Functional unit completions due this cycle wake dependents
        // before the scheduler scans, enabling back-to-back chains.
        while let Some(Event::FuCompletion { inst, seq, fu_idx }) = self.events.pop_due(self.now) {
            self.iq.process_fu_completion(inst, seq, fu_idx);
        }

        // Execute consumes last cycle's issue slots.
        let executed = std::mem::take(&mut self.issue_to_execute.access_mut(-1).insts);
        for slot in executed {
            if self.trace {
                if let Some(inst) = self.iq.get_inst_checked(slot.inst, slot.seq) {
                    trace!(
                        "exec: [tid:{}] [sn:{}] {:?}",
                        inst.tid,
                        inst.seq_num,
                        inst.op_class
                    );
                }
            }
        }

        // Issue into this cycle's slot.
        let mut slot = std::mem::take(self.issue_to_execute.access_mut(0));
        self.iq.schedule_ready_insts(&mut slot, &mut self.events);
        *self.issue_to_execute.access_mut(0) = slot;

        self.commit_stage();

        self.issue_to_execute.advance();
        self.from_commit.advance();
    }

    /// Runs `cycles` simulated cycles.
    pub fn run(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.tick();
        }
    }

    /// Runs until everything dispatched has committed, or the cycle
    /// budget is exhausted. Returns whether the drain completed.
    pub fn drain(&mut self, max_cycles: u64) -> bool {
        for _ in 0..max_cycles {
            if self.is_drained() {
                return true;
            }
            self.tick();
        }
        self.is_drained()
    }

    /// In-order commit model: retire completed instructions from each
    /// thread's head, release non-speculative heads, and send the
    /// resulting signals down the commit wire.
    fn commit_stage(&mut self) {
        for tid in 0..self.num_threads {
            let mut done_seq = None;
            let mut release_seq = None;

            while let Some(&entry) = self.program_order[tid].front() {
                match self.iq.get_inst_checked(entry.inst, entry.seq) {
                    // Squashed out from under the commit model.
                    None => {
                        self.program_order[tid].pop_front();
                    }
                    Some(inst) if inst.non_spec_pending => {
                        // Head of the reorder buffer: eligible for
                        // non-speculative scheduling.
                        release_seq = Some(entry.seq);
                        break;
                    }
                    Some(inst) if inst.issued && inst.completed => {
                        done_seq = Some(entry.seq);
                        self.program_order[tid].pop_front();
                    }
                    Some(_) => break,
                }
            }

            let comm = &mut self.from_commit.access_mut(0).commit_info[tid];
            comm.done_seq_num = done_seq;
            comm.commit_seq_num = release_seq;
        }
    }
}
