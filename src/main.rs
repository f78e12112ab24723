//! Binary entry point for the `pkdcl` command-line tool.
//!
//! Control flow: parse the argument vector, resolve the input/output
//! pair (files, stdin/stdout, or derived names), then dispatch to the
//! streaming compress/decompress helpers.  Exit codes: 0 success, 1 bad
//! usage, 2 I/O or stream errors.

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pkdcl::cli::args::{parse_args, print_usage, OpMode, ParsedArgs};
use pkdcl::cli::constants::{COMPRESSOR_NAME, PKD_EXTENSION, STDIO_MARK};
use pkdcl::file::{compress_stream, decompress_stream};
use pkdcl::{display, displaylevel};

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            display!("{COMPRESSOR_NAME}: {e}\n");
            print_usage();
            return ExitCode::from(1);
        }
    };
    if args.exit_early {
        return ExitCode::SUCCESS;
    }
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display!("{COMPRESSOR_NAME}: {e:#}\n");
            ExitCode::from(2)
        }
    }
}

/// Derive the output filename: append `.pkd` when compressing, strip it
/// when decompressing.
fn derive_output(input: &Path, mode: OpMode) -> anyhow::Result<PathBuf> {
    match mode {
        OpMode::Compress => {
            let mut name = input.as_os_str().to_owned();
            name.push(PKD_EXTENSION);
            Ok(PathBuf::from(name))
        }
        OpMode::Decompress => {
            let name = input.to_string_lossy();
            match name.strip_suffix(PKD_EXTENSION) {
                Some(stem) if !stem.is_empty() => Ok(PathBuf::from(stem)),
                _ => anyhow::bail!(
                    "cannot derive output name from {} (no {PKD_EXTENSION} suffix); use -o",
                    input.display()
                ),
            }
        }
    }
}

fn run(args: &ParsedArgs) -> anyhow::Result<()> {
    let stdin_input = match args.input.as_deref() {
        None | Some(STDIO_MARK) => true,
        Some(_) => false,
    };
    let stdout_output = args.to_stdout || (stdin_input && args.output.is_none());

    // Refuse to write a binary stream at an interactive terminal, same as
    // any sane compressor.
    if stdout_output && args.op_mode == OpMode::Compress && io::stdout().is_terminal() {
        anyhow::bail!("refusing to write compressed data to a terminal; use -o or redirect");
    }

    let output_path: Option<PathBuf> = if stdout_output {
        None
    } else {
        match (&args.output, &args.input) {
            (Some(out), _) => Some(PathBuf::from(out)),
            (None, Some(input)) => Some(derive_output(Path::new(input), args.op_mode)?),
            (None, None) => None,
        }
    };

    if let Some(out) = &output_path {
        if out.exists() && !args.force_overwrite {
            anyhow::bail!("{} already exists; use -f to overwrite", out.display());
        }
    }

    let (bytes_in, bytes_out) = dispatch(args, stdin_input, output_path.as_deref())?;

    let ratio = if bytes_in > 0 {
        100.0 * bytes_out as f64 / bytes_in as f64
    } else {
        0.0
    };
    match args.op_mode {
        OpMode::Compress => {
            displaylevel!(2, "{bytes_in} bytes in, {bytes_out} bytes out ({ratio:.2}%)\n");
        }
        OpMode::Decompress => {
            displaylevel!(2, "{bytes_in} bytes in, {bytes_out} bytes out\n");
        }
    }
    Ok(())
}

fn dispatch(
    args: &ParsedArgs,
    stdin_input: bool,
    output: Option<&Path>,
) -> anyhow::Result<(u64, u64)> {
    use std::fs::File;
    use std::io::{BufReader, BufWriter};

    // Box the endpoints so every (stdin|file) × (stdout|file) pairing runs
    // through one code path.
    let mut reader: Box<dyn io::Read> = if stdin_input {
        Box::new(io::stdin().lock())
    } else {
        let path = args.input.as_deref().map(Path::new).unwrap_or(Path::new(""));
        displaylevel!(3, "reading {}\n", path.display());
        Box::new(BufReader::new(File::open(path).map_err(|e| {
            anyhow::anyhow!("opening {}: {e}", path.display())
        })?))
    };
    let writer: Box<dyn io::Write> = match output {
        None => Box::new(io::stdout().lock()),
        Some(path) => {
            displaylevel!(3, "writing {}\n", path.display());
            Box::new(BufWriter::new(File::create(path).map_err(|e| {
                anyhow::anyhow!("creating {}: {e}", path.display())
            })?))
        }
    };

    match args.op_mode {
        OpMode::Compress => compress_stream(&mut reader, writer, args.dict_size),
        OpMode::Decompress => {
            let mut writer = writer;
            decompress_stream(reader, &mut writer)
        }
    }
}
