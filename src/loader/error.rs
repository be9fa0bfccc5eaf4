//! Defines the error types for the loader module.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("Shared object path {0:?} cannot be passed to the loader")]
    InvalidPath(PathBuf),
    #[error("Failed to map '{}': {reason}", path.display())]
    Open { path: PathBuf, reason: String },
    #[error("Symbol '{symbol}' not found: {reason}")]
    MissingSymbol { symbol: String, reason: String },
    #[error("Module reports {what} = {found}, expected {expected}")]
    DimensionMismatch { what: &'static str, expected: usize, found: i64 },
}
