//! AI components

pub mod animation;
pub mod fsm;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod fsm_tests;

// Re-export all components
pub use animation::*;
pub use fsm::*;
