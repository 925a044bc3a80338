//! Subsystem modules.

pub mod comms;
pub mod memory;
pub mod notes;
