//! Maps compiled problem modules into the process.
mod dl_ffi;
pub mod error;
pub mod table;

pub use dl_ffi::SharedLibrary;
pub use error::LoadError;
pub use table::FunctionTable;
