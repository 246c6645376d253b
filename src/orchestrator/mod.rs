//! Strategy orchestration: tier selection, escalation, and the public
//! acquisition entry point.

pub mod mincer;
pub mod strategy;

pub use mincer::{Mincer, ProbeResult};
pub use strategy::{StrategyCounters, Tier};

#[cfg(test)]
#[path = "mincer_tests.rs"]
mod tests;
