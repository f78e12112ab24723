//! Command-line argument parsing for the `pkdcl` tool.
//!
//! A hand-rolled option loop: short options may be aggregated (`-dfc`),
//! `--` ends option processing, and `-` names stdin/stdout.  Bad usage
//! returns an `Err` whose message starts with `"bad usage: "`; the caller
//! prints it alongside the usage text and exits 1.

use anyhow::{bail, Result};

use crate::cli::constants::{display_level, set_display_level, COMPRESSOR_NAME, STDIO_MARK};
use crate::codec::types::DictSize;
use crate::display;

/// Selected top-level operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpMode {
    #[default]
    Compress,
    Decompress,
}

/// Everything the dispatch phase needs, produced by [`parse_args_from`].
#[derive(Debug, Default)]
pub struct ParsedArgs {
    /// Compress (default) or decompress (`-d`).
    pub op_mode: OpMode,
    /// Dictionary size for compression (`-1`/`-2`/`-4`, default 4 KiB).
    pub dict_size: DictSize,
    /// Input path, `None` or `-` meaning stdin.
    pub input: Option<String>,
    /// Output path (`-o`), `None` meaning derive from input or stdout.
    pub output: Option<String>,
    /// Overwrite existing output files without prompting (`-f`).
    pub force_overwrite: bool,
    /// Write to stdout regardless of the input name (`-c`).
    pub to_stdout: bool,
    /// `--help`/`--version` was handled; exit 0 without doing I/O.
    pub exit_early: bool,
}

/// Usage text printed on `-h` and on bad usage.
pub fn print_usage() {
    display!(
        "\
usage: {name} [options] [FILE]

Compress or decompress FILE (or stdin) in the PKWare DCL stream format.

options:
  -d          decompress instead of compress
  -1 -2 -4    dictionary size 1/2/4 KiB (compression; default 4)
  -o FILE     write output to FILE
  -c          write to stdout
  -f          overwrite existing output files
  -k          keep input file (always on; present for familiarity)
  -q          decrease verbosity
  -v          increase verbosity
  -h, --help  show this help
  --version   show version
",
        name = COMPRESSOR_NAME
    );
}

/// Parse from `std::env::args()`.
pub fn parse_args() -> Result<ParsedArgs> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    parse_args_from(&argv)
}

/// Parse an explicit argument slice (unit-testable).
pub fn parse_args_from(argv: &[String]) -> Result<ParsedArgs> {
    let mut args = ParsedArgs {
        dict_size: DictSize::Size4K,
        ..ParsedArgs::default()
    };
    let mut positional: Vec<&str> = Vec::new();
    let mut options_done = false;

    let mut iter = argv.iter().peekable();
    while let Some(arg) = iter.next() {
        let arg = arg.as_str();
        if options_done || arg == STDIO_MARK || !arg.starts_with('-') {
            positional.push(arg);
            continue;
        }
        match arg {
            "--" => options_done = true,
            "--help" => {
                print_usage();
                args.exit_early = true;
            }
            "--version" => {
                println!("{} {}", COMPRESSOR_NAME, crate::PKDCL_VERSION_STRING);
                args.exit_early = true;
            }
            _ if arg.starts_with("--") => bail!("bad usage: unknown option {arg}"),
            _ => {
                // Aggregated short options: -dfc
                let mut chars = arg[1..].chars();
                while let Some(ch) = chars.next() {
                    match ch {
                        'd' => args.op_mode = OpMode::Decompress,
                        '1' => args.dict_size = DictSize::Size1K,
                        '2' => args.dict_size = DictSize::Size2K,
                        '4' => args.dict_size = DictSize::Size4K,
                        'c' => args.to_stdout = true,
                        'f' => args.force_overwrite = true,
                        'k' => {} // inputs are never deleted
                        'q' => set_display_level(display_level() - 1),
                        'v' => set_display_level(display_level() + 1),
                        'h' => {
                            print_usage();
                            args.exit_early = true;
                        }
                        'o' => {
                            // Value is the rest of this token or the next one.
                            let rest: String = chars.by_ref().collect();
                            if rest.is_empty() {
                                match iter.next() {
                                    Some(v) if !v.is_empty() => args.output = Some(v.clone()),
                                    _ => bail!("bad usage: -o requires a filename"),
                                }
                            } else {
                                args.output = Some(rest);
                            }
                        }
                        _ => bail!("bad usage: unknown option -{ch}"),
                    }
                }
            }
        }
    }

    match positional.len() {
        0 => {}
        1 => args.input = Some(positional[0].to_string()),
        _ => bail!("bad usage: at most one input file, got {}", positional.len()),
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ParsedArgs> {
        let v: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        parse_args_from(&v)
    }

    #[test]
    fn defaults() {
        let a = parse(&[]).unwrap();
        assert_eq!(a.op_mode, OpMode::Compress);
        assert_eq!(a.dict_size, DictSize::Size4K);
        assert!(a.input.is_none() && a.output.is_none());
        assert!(!a.force_overwrite && !a.to_stdout);
    }

    #[test]
    fn aggregated_short_options() {
        let a = parse(&["-dfc", "in.pkd"]).unwrap();
        assert_eq!(a.op_mode, OpMode::Decompress);
        assert!(a.force_overwrite && a.to_stdout);
        assert_eq!(a.input.as_deref(), Some("in.pkd"));
    }

    #[test]
    fn dict_size_flags() {
        assert_eq!(parse(&["-1"]).unwrap().dict_size, DictSize::Size1K);
        assert_eq!(parse(&["-2"]).unwrap().dict_size, DictSize::Size2K);
        assert_eq!(parse(&["-4"]).unwrap().dict_size, DictSize::Size4K);
    }

    #[test]
    fn output_attached_and_detached() {
        assert_eq!(parse(&["-oout.pkd"]).unwrap().output.as_deref(), Some("out.pkd"));
        assert_eq!(parse(&["-o", "out.pkd"]).unwrap().output.as_deref(), Some("out.pkd"));
        assert!(parse(&["-o"]).is_err());
    }

    #[test]
    fn dashes_and_stdin() {
        let a = parse(&["--", "-starts-with-dash"]).unwrap();
        assert_eq!(a.input.as_deref(), Some("-starts-with-dash"));
        let a = parse(&["-"]).unwrap();
        assert_eq!(a.input.as_deref(), Some("-"));
    }

    #[test]
    fn rejects_unknown_and_extra() {
        assert!(parse(&["-x"]).is_err());
        assert!(parse(&["--frobnicate"]).is_err());
        assert!(parse(&["a", "b"]).is_err());
    }
}
