//! CPU core model.
//!
//! This module contains the out-of-order issue model of the core. It
//! includes the following components:
//! 1. **Instructions:** The dynamic instruction record and op classes.
//! 2. **Pipeline:** The instruction queue, memory dependence unit, and the
//!    wires connecting issue to execute and commit.
//! 3. **Units:** The functional unit pool.

/// Dynamic instructions, op classes, and the instruction arena.
pub mod inst;

/// Issue pipeline: instruction queue, memory dependence unit, wires.
pub mod pipeline;

/// Functional units.
pub mod units;
