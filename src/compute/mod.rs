//! Evaluates and differentiates symbolic expressions in-process.
pub mod derivative;
pub mod engine;
pub mod kernel;
pub mod ledger;

pub use engine::Engine;
pub use ledger::ComputationError;
