//! The compile pipeline: generate -> compile -> load -> configure.
use crate::build::{self, BuildDir, CompilationError, CompilerConfig};
use crate::codegen::{self, GeneratedCode, GenerationError};
use crate::loader::{FunctionTable, LoadError, SharedLibrary};
use crate::problem::{BoundsConfig, ConfigError, LoadedProblem, ProblemSpec};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Code generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("Native compilation failed: {0}")]
    Compilation(#[from] CompilationError),
    #[error("Loading the compiled module failed: {0}")]
    Load(#[from] LoadError),
    #[error("Invalid bounds: {0}")]
    Config(#[from] ConfigError),
}

/// Turns a `ProblemSpec` into a `LoadedProblem` backed by native code.
///
/// Every call works in its own temporary directory, so one compiler can be
/// shared across threads.
#[derive(Debug, Clone, Default)]
pub struct ProblemCompiler {
    config: CompilerConfig,
}

impl ProblemCompiler {
    /// Default configuration, compiler taken from `$CC` when set.
    pub fn new() -> Self {
        Self { config: CompilerConfig::from_env() }
    }

    pub fn with_config(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Emits the C source of the function table for `spec`.
    pub fn generate(&self, spec: &ProblemSpec) -> Result<GeneratedCode, CompileError> {
        let code = codegen::generate(spec, &self.config.problem_name)?;
        log::debug!(
            "generated '{}' (n = {}, m = {}, num_p = {}, {} Jacobian non-zeros)",
            code.name, code.dims.n, code.dims.m, code.dims.num_p, code.jacobian_nonzeros
        );
        Ok(code)
    }

    /// Compiles and loads previously generated code, then applies `bounds`.
    ///
    /// Bounds are checked before the compiler runs. The work directory is
    /// removed before this returns, on success and on every error path.
    pub fn build(&self, code: &GeneratedCode, bounds: &BoundsConfig) -> Result<LoadedProblem, CompileError> {
        bounds.validate(code.dims.n, code.dims.m)?;

        let dir = BuildDir::create(&self.config, code)?;
        let paths = dir.paths().clone();
        log::info!("compiling problem '{}' in {}", code.name, paths.workdir.display());
        log::debug!("source: {}", paths.source.display());
        log::debug!("shared object: {}", paths.shared_object.display());

        dir.write_source(code)?;
        build::toolchain::compile_shared(&self.config, &paths.source, &paths.shared_object)?;

        let library = SharedLibrary::open(&paths.shared_object)?;
        let table = FunctionTable::bind(library, &code.name, code.dims)?;

        // The loader keeps its own mapping; the files are no longer needed.
        let artifacts = dir.close();

        let mut problem = LoadedProblem::new(table, artifacts);
        problem.set_bounds(bounds)?;
        Ok(problem)
    }

    /// `generate` followed by `build`.
    pub fn compile(&self, spec: &ProblemSpec, bounds: &BoundsConfig) -> Result<LoadedProblem, CompileError> {
        let code = self.generate(spec)?;
        self.build(&code, bounds)
    }
}

/// Compiles `spec` with the default configuration.
pub fn compile_ocp(spec: &ProblemSpec, bounds: &BoundsConfig) -> Result<LoadedProblem, CompileError> {
    ProblemCompiler::new().compile(spec, bounds)
}
