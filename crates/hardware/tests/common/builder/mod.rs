//! Builders for test instructions.
