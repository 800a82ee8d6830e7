// Tests for the minicc command: backends, listings and exit codes

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn minicc(args: &[&str], file: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_minicc"))
        .args(args)
        .arg(file)
        .output()
        .expect("failed to start minicc")
}

fn sample() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/samp1.c")
}

/// Write `source` to a scratch file unique to this test
fn scratch(name: &str, source: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("minicc-{}-{}.c", std::process::id(), name));
    fs::write(&path, source).expect("failed to write scratch file");
    path
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_both_backends_print_the_sample() {
    let tree = minicc(&[], &sample());
    let vm = minicc(&["--run-ir"], &sample());

    assert!(tree.status.success());
    assert!(vm.status.success());
    assert_eq!(stdout_lines(&tree).len(), 16);
    assert_eq!(tree.stdout, vm.stdout);
    assert_eq!(
        stdout_lines(&vm).last().map(String::as_str),
        Some("121 is a palindrome.")
    );
}

#[test]
fn test_emit_ir_listing() {
    let output = minicc(&["--emit-ir"], &sample());
    assert!(output.status.success());

    let listing = String::from_utf8_lossy(&output.stdout);
    assert!(listing.starts_with("locals:\n"));
    assert!(listing.contains("\ncode:\n"));
}

#[test]
fn test_runtime_error_exit_code() {
    let path = scratch(
        "divide",
        "void main() {\n  int z;\n  printf(\"start\\n\");\n  z = 8 / z;\n}\n",
    );

    for args in [&[][..], &["--run-ir"][..]] {
        let output = minicc(args, &path);
        assert_eq!(output.status.code(), Some(1));
        assert_eq!(stdout_lines(&output), vec!["start"]);

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("error[runtime/division-by-zero]"), "{}", stderr);
    }

    let _ = fs::remove_file(path);
}

#[test]
fn test_missing_file_exit_code() {
    let path = std::env::temp_dir().join("minicc-no-such-file.c");
    let output = minicc(&[], &path);
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}
