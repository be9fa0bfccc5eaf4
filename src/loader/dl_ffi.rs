//! Owned handle over `dlopen`/`dlsym`/`dlclose`.
//!
//! The handle keeps its own mapping of the module, so the file backing it
//! may be deleted as soon as `open` returns.

use super::error::LoadError;
use libc::{c_char, c_void};
use std::ffi::{CStr, CString};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

pub struct SharedLibrary {
    handle: *mut c_void,
    path: PathBuf,
}

// SAFETY: the handle is only used through `dlsym` and `dlclose`, which are
// thread-safe, and the modules we load hold no mutable global state.
unsafe impl Send for SharedLibrary {}
unsafe impl Sync for SharedLibrary {}

impl SharedLibrary {
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| LoadError::InvalidPath(path.to_path_buf()))?;

        let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
        if handle.is_null() {
            return Err(LoadError::Open { path: path.to_path_buf(), reason: last_error() });
        }
        Ok(Self { handle, path: path.to_path_buf() })
    }

    /// Path the module was mapped from. The file may no longer exist.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Looks up an exported symbol. The caller decides the pointee type.
    pub fn symbol(&self, name: &str) -> Result<*mut c_void, LoadError> {
        let c_name = CString::new(name).map_err(|_| LoadError::MissingSymbol {
            symbol: name.to_string(),
            reason: "name contains a NUL byte".to_string(),
        })?;

        unsafe {
            // Clear any stale error so a NULL result can be attributed.
            libc::dlerror();
            let ptr = libc::dlsym(self.handle, c_name.as_ptr());
            if ptr.is_null() {
                return Err(LoadError::MissingSymbol { symbol: name.to_string(), reason: last_error() });
            }
            Ok(ptr)
        }
    }
}

impl Drop for SharedLibrary {
    fn drop(&mut self) {
        unsafe {
            libc::dlclose(self.handle);
        }
    }
}

impl std::fmt::Debug for SharedLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedLibrary").field("path", &self.path).finish()
    }
}

fn last_error() -> String {
    let msg: *const c_char = unsafe { libc::dlerror() };
    if msg.is_null() {
        "unknown loader error".to_string()
    } else {
        unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_reported() {
        let err = SharedLibrary::open(Path::new("/nonexistent/libnothing.so")).unwrap_err();
        match err {
            LoadError::Open { path, reason } => {
                assert_eq!(path, PathBuf::from("/nonexistent/libnothing.so"));
                assert!(!reason.is_empty());
            }
            other => panic!("Wrong error type: {:?}", other),
        }
    }

    #[test]
    fn test_non_library_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.so");
        std::fs::write(&path, b"definitely not ELF").unwrap();
        assert!(matches!(SharedLibrary::open(&path), Err(LoadError::Open { .. })));
    }
}
