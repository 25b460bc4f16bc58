//! Simulation driver and event infrastructure.
//!
//! This module hosts the discrete-event side of the simulator:
//! 1. **Events:** The calendar of functional unit completions.
//! 2. **Simulator:** The per-cycle driver that connects commit signals,
//!    squash walks, scheduling, and event delivery.

/// Discrete-event calendar.
pub mod events;

/// Per-cycle simulation driver.
pub mod simulator;

pub use events::{Event, EventQueue, Tick};
pub use simulator::Simulator;
