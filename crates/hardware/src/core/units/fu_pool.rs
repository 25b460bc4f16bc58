//! Functional unit pool.
//!
//! The pool owns a fixed set of functional units, each capable of a set of
//! op classes with one latency. The scheduler asks for a free unit by op
//! class; a unit stays allocated until it is freed — at the next cycle for
//! pipelined units, or by the completion event for unpipelined ones.

use crate::config::FuPoolConfig;
use crate::core::inst::OpClass;

/// Result of asking the pool for a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FuAllocation {
    /// Every capable unit is busy this cycle (or none exists).
    NoneFree,
    /// The op class needs no functional unit.
    NotNeeded,
    /// A unit was allocated.
    Unit {
        /// Pool index of the unit, for the later free.
        idx: usize,
        /// Cycles from issue until the result is available.
        latency: u64,
        /// Whether the unit accepts a new operation next cycle regardless
        /// of this operation completing.
        pipelined: bool,
    },
}

/// One functional unit.
struct FuUnit {
    caps: [bool; OpClass::COUNT],
    latency: u64,
    pipelined: bool,
    busy: bool,
}

/// Fixed pool of functional units with capability-matched allocation.
pub struct FuPool {
    units: Vec<FuUnit>,
    free_next_cycle: Vec<usize>,
}

impl FuPool {
    /// Builds the pool described by the configuration.
    pub fn from_config(config: &FuPoolConfig) -> Self {
        let mut units = Vec::new();
        for desc in &config.units {
            let mut caps = [false; OpClass::COUNT];
            for &op_class in &desc.op_classes {
                caps[op_class.index()] = true;
            }
            for _ in 0..desc.count {
                units.push(FuUnit {
                    caps,
                    latency: desc.op_latency,
                    pipelined: desc.pipelined,
                    busy: false,
                });
            }
        }
        Self {
            units,
            free_next_cycle: Vec::new(),
        }
    }

    /// Total number of units in the pool.
    #[inline]
    pub fn num_units(&self) -> usize {
        self.units.len()
    }

    /// Allocates a free unit capable of `op_class`, marking it busy.
    pub fn get_unit(&mut self, op_class: OpClass) -> FuAllocation {
        if op_class == OpClass::NoOpClass {
            return FuAllocation::NotNeeded;
        }
        for (idx, unit) in self.units.iter_mut().enumerate() {
            if !unit.busy && unit.caps[op_class.index()] {
                unit.busy = true;
                return FuAllocation::Unit {
                    idx,
                    latency: unit.latency,
                    pipelined: unit.pipelined,
                };
            }
        }
        FuAllocation::NoneFree
    }

    /// Releases a unit immediately.
    pub fn free_unit(&mut self, idx: usize) {
        self.units[idx].busy = false;
    }

    /// Releases a unit at the start of the next cycle. Used for pipelined
    /// units, which can start one operation per cycle.
    pub fn free_unit_next_cycle(&mut self, idx: usize) {
        self.free_next_cycle.push(idx);
    }

    /// Cycle boundary: releases the units queued for next-cycle freeing.
    pub fn advance_cycle(&mut self) {
        while let Some(idx) = self.free_next_cycle.pop() {
            self.units[idx].busy = false;
        }
    }

    /// Number of currently free units capable of `op_class`.
    pub fn get_free_units(&self, op_class: OpClass) -> usize {
        self.units
            .iter()
            .filter(|unit| !unit.busy && unit.caps[op_class.index()])
            .count()
    }
}
