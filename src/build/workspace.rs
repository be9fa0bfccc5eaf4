//! Scoped work directory holding the transient artifacts of one compile call.
use super::config::CompilerConfig;
use super::toolchain::CompilationError;
use crate::codegen::GeneratedCode;
use serde::{Serialize, Deserialize};
use std::path::PathBuf;
use tempfile::TempDir;

/// Where one compile call placed its artifacts. Kept after the directory
/// is gone so callers can confirm the cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    pub workdir: PathBuf,
    pub source: PathBuf,
    pub shared_object: PathBuf,
}

/// Owns the temporary directory. Dropping it (on any path, including
/// errors) deletes the directory and everything in it.
pub struct BuildDir {
    dir: TempDir,
    paths: ArtifactPaths,
}

impl BuildDir {
    pub fn create(config: &CompilerConfig, code: &GeneratedCode) -> Result<Self, CompilationError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&config.temp_prefix);
        let dir = match &config.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| CompilationError::Workspace(e.to_string()))?;

        let workdir = dir.path().to_path_buf();
        let paths = ArtifactPaths {
            source: workdir.join(code.source_file_name()),
            shared_object: workdir.join(code.shared_object_file_name()),
            workdir,
        };
        Ok(Self { dir, paths })
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    pub fn write_source(&self, code: &GeneratedCode) -> Result<(), CompilationError> {
        std::fs::write(&self.paths.source, &code.source).map_err(|e| CompilationError::WriteSource {
            path: self.paths.source.clone(),
            reason: e.to_string(),
        })
    }

    /// Deletes the directory now, reporting (but not failing on) cleanup errors.
    pub fn close(self) -> ArtifactPaths {
        let paths = self.paths;
        if let Err(e) = self.dir.close() {
            log::warn!("failed to remove work directory {}: {}", paths.workdir.display(), e);
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Dimensions;

    fn code() -> GeneratedCode {
        GeneratedCode {
            name: "demo".into(),
            source: "int demo;\n".into(),
            dims: Dimensions { n: 0, m: 0, num_p: 0 },
            jacobian_nonzeros: 0,
        }
    }

    #[test]
    fn test_layout_and_cleanup() {
        let root = tempfile::tempdir().unwrap();
        let config = CompilerConfig { temp_root: Some(root.path().to_path_buf()), ..Default::default() };

        let dir = BuildDir::create(&config, &code()).unwrap();
        dir.write_source(&code()).unwrap();
        let paths = dir.paths().clone();

        assert!(paths.workdir.starts_with(root.path()));
        assert!(paths.workdir.file_name().unwrap().to_string_lossy().starts_with("panoc_"));
        assert_eq!(paths.source, paths.workdir.join("demo.c"));
        assert_eq!(paths.shared_object, paths.workdir.join("demo.so"));
        assert_eq!(std::fs::read_to_string(&paths.source).unwrap(), "int demo;\n");

        let closed = dir.close();
        assert_eq!(closed, paths);
        assert!(!paths.workdir.exists());
    }

    #[test]
    fn test_drop_removes_directory() {
        let dir = BuildDir::create(&CompilerConfig::default(), &code()).unwrap();
        dir.write_source(&code()).unwrap();
        let workdir = dir.paths().workdir.clone();
        drop(dir);
        assert!(!workdir.exists());
    }

    #[test]
    fn test_missing_root_is_a_workspace_error() {
        let config = CompilerConfig {
            temp_root: Some(PathBuf::from("/nonexistent/root/for/tests")),
            ..Default::default()
        };
        assert!(matches!(BuildDir::create(&config, &code()), Err(CompilationError::Workspace(_))));
    }
}
