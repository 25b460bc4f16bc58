//! Common utilities and types used throughout the simulator.
//!
//! This module provides fundamental building blocks shared across all
//! components of the issue model. It includes:
//! 1. **Identity Types:** Sequence numbers and thread identifiers.
//! 2. **Register Space:** The flat physical register index layout.
//! 3. **Constants:** System-wide limits for threads and source operands.
//! 4. **Error Handling:** The recoverable error taxonomy of the queue.

/// Common constants used throughout the simulator.
pub mod constants;

/// Error types for queue admission and scheduling.
pub mod error;

/// Sequence numbers and the physical register space.
pub mod reg;

pub use constants::{MAX_DEST_REGS, MAX_SRC_REGS, MAX_THREADS};
pub use error::IqError;
pub use reg::{PhysRegId, RegSpace, SeqNum, ThreadId};
