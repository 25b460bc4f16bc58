//! Global simulator constants.
//!
//! This module defines system-wide limits used across the issue model:
//! 1. **Thread Limits:** Maximum number of hardware threads per core.
//! 2. **Operand Limits:** Maximum source and destination registers per
//!    instruction.

/// Maximum number of SMT hardware threads a core can be configured with.
///
/// Per-thread state (instruction lists, counts, squash cursors) is sized by
/// the configured thread count, which must not exceed this limit.
pub const MAX_THREADS: usize = 4;

/// Maximum number of source registers an instruction can carry.
///
/// Three covers fused multiply-add, the widest consumer in the op class set.
pub const MAX_SRC_REGS: usize = 3;

/// Maximum number of destination registers an instruction can carry.
pub const MAX_DEST_REGS: usize = 2;
