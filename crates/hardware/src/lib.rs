//! SMT out-of-order processor simulator library.
//!
//! This crate implements the issue side of a cycle-accurate, simultaneously
//! multithreaded, out-of-order processor model:
//! 1. **Core:** Instruction model, instruction queue (dependency graph,
//!    scoreboard, ready queues, SMT entry accounting), and memory dependence
//!    tracking.
//! 2. **Units:** Functional unit pool with per-class capabilities and
//!    latencies.
//! 3. **Simulation:** Discrete-event calendar, time buffers, and the
//!    per-cycle driver connecting commit, issue, and execute.
//! 4. **Configuration:** Hierarchical JSON-deserializable parameters.
//! 5. **Statistics:** Issue-side counters and distributions.

/// Common types and constants (sequence numbers, register space, errors).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// CPU core model (instructions, instruction queue, memory dependence unit).
pub mod core;
/// Simulation driver, event calendar, and time buffers.
pub mod sim;
/// Issue-side statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// The instruction queue; the heart of the out-of-order backend.
pub use crate::core::pipeline::iq::InstructionQueue;
/// Per-cycle simulation driver; owns the IQ, event calendar, and wires.
pub use crate::sim::simulator::Simulator;
