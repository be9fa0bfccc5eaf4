//! Native build stage: configuration, scoped artifacts and the compiler call.
pub mod config;
pub mod toolchain;
pub mod workspace;

pub use config::CompilerConfig;
pub use toolchain::CompilationError;
pub use workspace::{ArtifactPaths, BuildDir};
