//! Structural analysis of the expression arena.
pub mod topology;
pub mod validation;
