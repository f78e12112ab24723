//! E2E Test Suite 06: CLI integration
//!
//! Spawns the built `pkdcl` binary and exercises the file and stdio
//! paths, overwrite protection, and exit codes.

use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::tempdir;

fn pkdcl() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pkdcl"))
}

#[test]
fn compress_then_decompress_files() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("hamlet.txt");
    let data = b"Though this be madness, yet there is method in 't.".repeat(50);
    fs::write(&src, &data).unwrap();

    let status = pkdcl().arg("-q").arg(&src).status().unwrap();
    assert!(status.success());
    let packed = dir.path().join("hamlet.txt.pkd");
    assert!(packed.exists());
    assert!(fs::metadata(&packed).unwrap().len() < data.len() as u64);

    fs::remove_file(&src).unwrap();
    let status = pkdcl().arg("-dq").arg(&packed).status().unwrap();
    assert!(status.success());
    assert_eq!(fs::read(&src).unwrap(), data);
}

#[test]
fn stdio_pipeline() {
    let data = b"pipe me through, one process at a time".repeat(20);

    let mut comp = pkdcl()
        .args(["-q", "-c"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    comp.stdin.as_mut().unwrap().write_all(&data).unwrap();
    let compressed = comp.wait_with_output().unwrap();
    assert!(compressed.status.success());
    assert!(!compressed.stdout.is_empty());

    let mut decomp = pkdcl()
        .args(["-q", "-d"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    decomp
        .stdin
        .as_mut()
        .unwrap()
        .write_all(&compressed.stdout)
        .unwrap();
    let restored = decomp.wait_with_output().unwrap();
    assert!(restored.status.success());
    assert_eq!(restored.stdout, data);
}

#[test]
fn refuses_overwrite_without_force() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("a.txt");
    let dst = dir.path().join("a.txt.pkd");
    fs::write(&src, b"fresh").unwrap();
    fs::write(&dst, b"precious").unwrap();

    let status = pkdcl().arg("-q").arg(&src).status().unwrap();
    assert_eq!(status.code(), Some(2));
    assert_eq!(fs::read(&dst).unwrap(), b"precious");

    let status = pkdcl().arg("-qf").arg(&src).status().unwrap();
    assert!(status.success());
    assert_ne!(fs::read(&dst).unwrap(), b"precious");
}

#[test]
fn dictionary_size_flags_change_header() {
    for (flag, selector) in [("-1", 4u8), ("-2", 5), ("-4", 6)] {
        let mut comp = pkdcl()
            .args(["-q", "-c", flag])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();
        comp.stdin.as_mut().unwrap().write_all(b"header probe").unwrap();
        let out = comp.wait_with_output().unwrap();
        assert!(out.status.success());
        assert_eq!(out.stdout[0], 0x00);
        assert_eq!(out.stdout[1], selector, "flag {flag}");
    }
}

#[test]
fn bad_usage_exits_one() {
    let out = pkdcl().arg("--no-such-flag").output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("bad usage"));
}

#[test]
fn corrupt_stdin_exits_two() {
    let mut decomp = pkdcl()
        .args(["-q", "-d", "-c"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    decomp.stdin.as_mut().unwrap().write_all(&[9, 9, 9, 9]).unwrap();
    let out = decomp.wait_with_output().unwrap();
    assert_eq!(out.status.code(), Some(2));
}
