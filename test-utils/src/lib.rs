use std::{
    error::Error,
    fs, io,
    process::{Command, Output},
};

const MARKLARC_PATH: &str = "./target/debug/marklarc";
const OUTPUT_PATH: &str = "./output";

/// Whether a usable external backend (`opt`, `llc`, `gcc`) is installed.
/// Probes by compiling a trivial program end to end; end-to-end tests skip
/// themselves when the probe fails.
pub fn toolchain_available() -> bool {
    compile("marklar main(){ return 0; }", "toolchain_probe")
        .map(|exit| exit == 0)
        .unwrap_or(false)
}

/// Compile `source` with the built compiler binary and run the produced
/// executable, returning the executable's exit code.
pub fn compile_and_run(source: &str, name: &str) -> Result<i32, Box<dyn Error>> {
    let output = compile_source(source, name)?;
    assert!(
        output.status.success(),
        "marklarc exited with status {:?}: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );

    let run = Command::new(format!("{OUTPUT_PATH}/{name}")).output()?;
    Ok(run.status.code().unwrap_or(-1))
}

/// Run the compiler on `source` and return the compiler's exit code without
/// executing anything.
pub fn compile(source: &str, name: &str) -> Result<i32, Box<dyn Error>> {
    let output = compile_source(source, name)?;
    Ok(output.status.code().unwrap_or(-1))
}

fn compile_source(source: &str, name: &str) -> Result<Output, Box<dyn Error>> {
    fs::create_dir_all(OUTPUT_PATH)?;

    let src_path = format!("{OUTPUT_PATH}/{name}.marklar");
    fs::write(&src_path, source)?;

    Ok(run_compiler(&src_path, &format!("{OUTPUT_PATH}/{name}"))?)
}

fn run_compiler(src_path: &str, exe_path: &str) -> io::Result<Output> {
    Command::new(MARKLARC_PATH)
        .args(["--input-file", src_path, "--output-file", exe_path])
        .output()
}
