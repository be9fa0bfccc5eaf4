//! Invokes the external C compiler as a checked, blocking subprocess.
use super::config::CompilerConfig;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompilationError {
    #[error("Failed to create work directory: {0}")]
    Workspace(String),
    #[error("Failed to write generated source '{}': {reason}", path.display())]
    WriteSource { path: PathBuf, reason: String },
    #[error("Failed to run compiler '{compiler}': {reason}")]
    Spawn { compiler: String, reason: String },
    #[error("Compiler exited with status {} building '{}':\n{stderr}", describe_status(status), source_path.display())]
    Failed { status: Option<i32>, stderr: String, source_path: PathBuf },
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "<killed by signal>".to_string(),
    }
}

/// Compiles `source` into the shared object `output`.
///
/// A non-zero exit status is an error carrying the compiler's stderr. There
/// is no timeout; a hung compiler blocks the caller.
pub fn compile_shared(config: &CompilerConfig, source: &Path, output: &Path) -> Result<(), CompilationError> {
    let args = config.command_args(source, output);
    log::debug!("running {} {}", config.compiler, args.join(" "));

    let result = Command::new(&config.compiler)
        .args(&args)
        .output()
        .map_err(|e| CompilationError::Spawn { compiler: config.compiler.clone(), reason: e.to_string() })?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr).into_owned();
        log::warn!("compiler failed on {}: {}", source.display(), stderr.trim_end());
        return Err(CompilationError::Failed {
            status: result.status.code(),
            stderr,
            source_path: source.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_compiler_is_a_spawn_error() {
        let config = CompilerConfig { compiler: "definitely-not-a-cc-xyz".into(), ..Default::default() };
        let err = compile_shared(&config, Path::new("a.c"), Path::new("a.so")).unwrap_err();
        assert!(matches!(err, CompilationError::Spawn { ref compiler, .. } if compiler == "definitely-not-a-cc-xyz"));
    }

    #[test]
    fn test_non_zero_exit_is_reported() {
        // `false` ignores its arguments and exits with status 1.
        let config = CompilerConfig { compiler: "false".into(), ..Default::default() };
        let err = compile_shared(&config, Path::new("a.c"), Path::new("a.so")).unwrap_err();
        match err {
            CompilationError::Failed { status, source_path, .. } => {
                assert_eq!(status, Some(1));
                assert_eq!(source_path, PathBuf::from("a.c"));
            }
            other => panic!("Wrong error type: {:?}", other),
        }
    }

    #[test]
    fn test_failed_message_includes_stderr() {
        let err = CompilationError::Failed {
            status: Some(1),
            stderr: "a.c:1: error: expected ';'".into(),
            source_path: PathBuf::from("a.c"),
        };
        let msg = err.to_string();
        assert!(msg.contains("status 1"));
        assert!(msg.contains("expected ';'"));
    }
}
