//! Driver gluing the pipeline together: parse → codegen → verify → hand the
//! module to the external backend for optimization and linking.
use std::fmt::Display;
use std::io;
use std::path::Path;
use std::process::Command;

use log::{debug, error, info};

use crate::ast::{ParseError, Program};
use crate::codegen::CodeGenerator;
use crate::ir::{verify_module, Builder, VerifyError};

/// Fixed name of the bitcode file handed to `opt`.
pub const BITCODE_FILE: &str = "output.bc";

/// Default name of the linked executable.
pub const DEFAULT_EXECUTABLE: &str = "a.out";

const OPTIMIZED_BITCODE_FILE: &str = "output_opt.bc";
const OBJECT_FILE: &str = "output.o";

/// Error of the front-end half of a compilation.
#[derive(Debug)]
pub enum CompileError {
    Parse(ParseError),
    Verify(VerifyError),
    Io(io::Error),
}

impl Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Parse(error) => write!(f, "{error}"),
            CompileError::Verify(error) => write!(f, "failed to generate IR: {error}"),
            CompileError::Io(error) => write!(f, "failed to write bitcode: {error}"),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<ParseError> for CompileError {
    fn from(error: ParseError) -> Self {
        CompileError::Parse(error)
    }
}

impl From<VerifyError> for CompileError {
    fn from(error: VerifyError) -> Self {
        CompileError::Verify(error)
    }
}

impl From<io::Error> for CompileError {
    fn from(error: io::Error) -> Self {
        CompileError::Io(error)
    }
}

/// Error of the external optimize/link half of a compilation.
#[derive(Debug)]
pub struct BackendError {
    pub message: String,
}

impl Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for BackendError {}

/// Parse and code-generate `source`, verify the resulting module, and write
/// it to `bitcode_path` for the external backend.
pub fn generate_output(source: &str, bitcode_path: &Path) -> Result<(), CompileError> {
    let program = Program::parse(source)?;

    info!("Generating code...");
    let mut builder = Builder::new("");
    let mut generator = CodeGenerator::new(&mut builder);
    generator.gen_program(&program);

    let module = builder.finish();

    if let Err(error) = verify_module(&module) {
        debug!("Module:\n{module}");
        return Err(error.into());
    }

    module.write_to_file(bitcode_path)?;

    Ok(())
}

/// Run the external backend over the bitcode file: optimize with `opt`,
/// lower to an object file with `llc`, link with `gcc`.
pub fn optimize_and_link(bitcode_path: &Path, exe_path: &Path) -> Result<(), BackendError> {
    info!("Optimizing...");
    run_tool(
        Command::new("opt")
            .args([
                "-filetype=obj",
                "-o",
                OPTIMIZED_BITCODE_FILE,
                "-O3",
                "-loop-unroll",
                "-loop-vectorize",
                "-slp-vectorizer",
            ])
            .arg(bitcode_path),
    )?;

    info!("Compiling object file...");
    run_tool(Command::new("llc").args(["-filetype=obj", "-o", OBJECT_FILE, OPTIMIZED_BITCODE_FILE]))?;

    info!("Linking...");
    run_tool(Command::new("gcc").arg("-o").arg(exe_path).arg(OBJECT_FILE))?;

    Ok(())
}

fn run_tool(command: &mut Command) -> Result<(), BackendError> {
    let program = command.get_program().to_string_lossy().into_owned();

    let output = command.output().map_err(|error| BackendError {
        message: format!("failed to run '{program}': {error}"),
    })?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
        error!("{stderr}");
    }

    if !output.status.success() {
        return Err(BackendError {
            message: format!("'{program}' failed with {}", output.status),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{generate_output, CompileError};

    #[test]
    fn generate_output_writes_rendered_module() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.bc");

        generate_output("marklar main(){ return 3; }", &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("define i64 @main()"));
        assert!(contents.contains("br label %return"));
    }

    #[test]
    fn parse_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.bc");

        let error = generate_output("marklar main(){", &path).unwrap_err();
        assert!(matches!(error, CompileError::Parse(_)));
        assert!(!path.exists());
    }

    #[test]
    fn invalid_module_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.bc");

        let error = generate_output("marklar main(){ return nope; }", &path).unwrap_err();
        assert!(matches!(error, CompileError::Verify(_)));
        assert!(!path.exists());
    }
}
