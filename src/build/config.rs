use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PROBLEM_NAME: &str = "mpcproblem";
pub const DEFAULT_TEMP_PREFIX: &str = "panoc_";

/// How generated problems are named, built and where their artifacts live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Prefix of every exported symbol and of the artifact file names.
    pub problem_name: String,
    /// C compiler executable.
    pub compiler: String,
    /// Flags placed before the input file.
    pub flags: Vec<String>,
    /// Adds `-march=native`.
    pub native_tuning: bool,
    /// Link arguments placed after the output file.
    pub libraries: Vec<String>,
    pub temp_prefix: String,
    /// Parent of the per-call work directories; the system temp dir if unset.
    pub temp_root: Option<PathBuf>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            problem_name: DEFAULT_PROBLEM_NAME.to_string(),
            compiler: "cc".to_string(),
            flags: vec!["-fPIC".into(), "-shared".into(), "-O3".into()],
            native_tuning: true,
            libraries: vec!["-lm".into()],
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
            temp_root: None,
        }
    }
}

impl CompilerConfig {
    /// Defaults, with the compiler taken from `$CC` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(cc) = std::env::var("CC") {
            if !cc.trim().is_empty() {
                config.compiler = cc.trim().to_string();
            }
        }
        config
    }

    /// Full argument list for building `source` into the shared object `output`.
    pub fn command_args(&self, source: &Path, output: &Path) -> Vec<String> {
        let mut args = self.flags.clone();
        if self.native_tuning {
            args.push("-march=native".into());
        }
        args.push(source.display().to_string());
        args.push("-o".into());
        args.push(output.display().to_string());
        args.extend(self.libraries.iter().cloned());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_line() {
        let args = CompilerConfig::default().command_args(Path::new("/t/p.c"), Path::new("/t/p.so"));
        assert_eq!(
            args,
            vec!["-fPIC", "-shared", "-O3", "-march=native", "/t/p.c", "-o", "/t/p.so", "-lm"]
        );
    }

    #[test]
    fn test_native_tuning_can_be_disabled() {
        let config = CompilerConfig { native_tuning: false, ..Default::default() };
        let args = config.command_args(Path::new("a.c"), Path::new("a.so"));
        assert!(!args.iter().any(|a| a == "-march=native"));
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: CompilerConfig =
            serde_json::from_str(r#"{"compiler": "clang", "native_tuning": false}"#).unwrap();
        assert_eq!(config.compiler, "clang");
        assert!(!config.native_tuning);
        assert_eq!(config.problem_name, DEFAULT_PROBLEM_NAME);
        assert_eq!(config.temp_prefix, DEFAULT_TEMP_PREFIX);
    }
}
