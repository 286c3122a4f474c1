//! Deterministic analysis of a move sequence and a position

pub mod features;
pub mod simulator;
pub mod structure;
mod types;

pub use simulator::simulate;
pub use types::*;
