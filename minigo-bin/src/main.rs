use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;

/// Compiles a minigo source file to a native executable.
///
/// The front end emits textual LLVM IR; clang handles optimization and
/// linking from there.
#[derive(Parser)]
#[command(name = "minigoc", version)]
struct Cli {
    /// Source file to compile.
    input: PathBuf,

    /// Output path. Defaults to the input file name without its extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Optimization level passed through to clang.
    #[arg(short = 'O', default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    opt_level: u8,

    /// Write the textual IR and stop before invoking clang.
    #[arg(long)]
    emit_ir: bool,
}

fn main() -> Result<()> {
    run(&Cli::parse())
}

fn run(cli: &Cli) -> Result<()> {
    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;

    let ir = minigo::compile(&source)
        .map_err(|error| anyhow!("{}: {error}", cli.input.display()))?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.input));
    let ir_path = output.with_extension("ll");
    fs::write(&ir_path, &ir).with_context(|| format!("writing {}", ir_path.display()))?;

    if cli.emit_ir {
        println!("Wrote {}", ir_path.display());
        return Ok(());
    }

    let out = Command::new("clang")
        .arg(format!("-O{}", cli.opt_level))
        .arg(&ir_path)
        .arg("-o")
        .arg(&output)
        .output()
        .context("failed to run clang")?;
    if !out.status.success() {
        bail!("clang failed:\n{}", String::from_utf8_lossy(&out.stderr));
    }

    println!("Built {}", output.display());
    Ok(())
}

fn default_output(input: &Path) -> PathBuf {
    let mut out = input.to_path_buf();
    out.set_extension("");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_strips_the_source_extension() {
        assert_eq!(default_output(Path::new("demo/hello.go")), Path::new("demo/hello"));
        assert_eq!(default_output(Path::new("hello")), Path::new("hello"));
    }
}
