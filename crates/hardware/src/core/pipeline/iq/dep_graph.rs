//! Register dependency graph.
//!
//! Per-physical-register chains of the consumers waiting on that register's
//! producer. Each register has a head recording the in-flight producer and
//! a singly-linked chain of consumer entries; the chain nodes live in a
//! slab indexed by integer, so the graph holds no owning references and no
//! reference cycles.
//!
//! An instruction appears in the chain of every source register that was
//! not yet available when it entered the queue, and in no chain once all
//! its sources are available.

use crate::common::reg::PhysRegId;
use crate::core::inst::InstId;

/// Sentinel index for "no node".
const NIL: u32 = u32::MAX;

/// Per-register head: the pending producer and the first consumer node.
#[derive(Clone, Copy)]
struct DepHead {
    producer: Option<InstId>,
    first: u32,
}

impl DepHead {
    const EMPTY: DepHead = DepHead {
        producer: None,
        first: NIL,
    };
}

/// Chain node in the slab.
#[derive(Clone, Copy)]
struct DepNode {
    inst: InstId,
    next: u32,
}

/// Slab-backed dependency graph over the flat physical register space.
pub struct DepGraph {
    heads: Vec<DepHead>,
    nodes: Vec<DepNode>,
    free: Vec<u32>,
    live_nodes: usize,
}

impl DepGraph {
    /// Creates an empty graph for `num_phys_regs` registers.
    pub fn new(num_phys_regs: usize) -> Self {
        Self {
            heads: vec![DepHead::EMPTY; num_phys_regs],
            nodes: Vec::new(),
            free: Vec::new(),
            live_nodes: 0,
        }
    }

    /// Number of live consumer nodes, across all registers.
    #[inline]
    pub fn live_nodes(&self) -> usize {
        self.live_nodes
    }

    /// The in-flight producer of `reg`, if any.
    #[inline]
    pub fn producer(&self, reg: PhysRegId) -> Option<InstId> {
        self.heads[reg].producer
    }

    /// Whether any consumer is waiting on `reg`.
    #[inline]
    pub fn has_consumers(&self, reg: PhysRegId) -> bool {
        self.heads[reg].first != NIL
    }

    /// Installs `inst` as the pending producer of `reg`. Returns whether
    /// consumers were already waiting on the register.
    pub fn set_producer(&mut self, reg: PhysRegId, inst: InstId) -> bool {
        debug_assert!(
            self.heads[reg].producer.is_none(),
            "rename must not leave two in-flight producers for one physical register"
        );
        self.heads[reg].producer = Some(inst);
        self.has_consumers(reg)
    }

    /// Clears the producer of `reg`, but only if it is `inst`.
    pub fn clear_producer(&mut self, reg: PhysRegId, inst: InstId) {
        if self.heads[reg].producer == Some(inst) {
            self.heads[reg].producer = None;
        }
    }

    /// Prepends `inst` to the consumer chain of `reg`.
    pub fn add_consumer(&mut self, reg: PhysRegId, inst: InstId) {
        let node = DepNode {
            inst,
            next: self.heads[reg].first,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx as usize] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                (self.nodes.len() - 1) as u32
            }
        };
        self.heads[reg].first = idx;
        self.live_nodes += 1;
    }

    /// Unlinks `inst` from the consumer chain of `reg`. Returns whether it
    /// was found.
    pub fn remove_consumer(&mut self, reg: PhysRegId, inst: InstId) -> bool {
        let mut prev = NIL;
        let mut cur = self.heads[reg].first;
        while cur != NIL {
            let node = self.nodes[cur as usize];
            if node.inst == inst {
                if prev == NIL {
                    self.heads[reg].first = node.next;
                } else {
                    self.nodes[prev as usize].next = node.next;
                }
                self.free.push(cur);
                self.live_nodes -= 1;
                return true;
            }
            prev = cur;
            cur = node.next;
        }
        false
    }

    /// Detaches and frees the whole consumer chain of `reg`, returning the
    /// waiting instructions in chain order (most recently added first).
    pub fn take_consumers(&mut self, reg: PhysRegId) -> Vec<InstId> {
        let mut consumers = Vec::new();
        let mut cur = self.heads[reg].first;
        self.heads[reg].first = NIL;
        while cur != NIL {
            let node = self.nodes[cur as usize];
            consumers.push(node.inst);
            self.free.push(cur);
            self.live_nodes -= 1;
            cur = node.next;
        }
        consumers
    }

    /// Non-destructive walk of the consumer chain of `reg`, for
    /// diagnostics.
    pub fn consumers(&self, reg: PhysRegId) -> impl Iterator<Item = InstId> + '_ {
        let mut cur = self.heads[reg].first;
        std::iter::from_fn(move || {
            if cur == NIL {
                return None;
            }
            let node = self.nodes[cur as usize];
            cur = node.next;
            Some(node.inst)
        })
    }
}
