//! Integration tests exercising the full parse → analyze → interpret →
//! emit pipeline (spec.md §8 testable properties), plus the CLI boundary.

use std::io::Write;
use std::process::Command;

#[test]
fn bundled_demo_runs_through_the_full_pipeline() {
    let mut cmd = cargo_bin();
    let output_path = tempfile::NamedTempFile::new().unwrap().path().to_path_buf();

    let status = cmd
        .arg("--output")
        .arg(&output_path)
        .status()
        .expect("failed to run binary");
    assert!(status.success());

    let document = std::fs::read_to_string(&output_path).unwrap();
    assert!(document.contains("viewbox=\"0 0 500 500\""));
    assert!(document.contains("id=\"objects\""));
    assert!(document.contains("Canvas_1"));
    assert!(document.contains("Canvas_2"));
}

#[test]
fn print_type_reports_each_object_once() {
    let mut cmd = cargo_bin();
    let output = cmd
        .arg("--print-type")
        .arg("--output")
        .arg(tempfile::NamedTempFile::new().unwrap().path())
        .output()
        .expect("failed to run binary");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().filter(|l| l.starts_with("Canvas_1")).count(), 1);
    assert_eq!(stdout.lines().filter(|l| l.starts_with("Canvas_2")).count(), 1);
}

#[test]
fn program_with_already_moving_violation_exits_nonzero() {
    let mut input_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        input_file,
        r#"A = Array(1, Rect); A[1] := Rect(0, 0, 10, 10); appear A[1];
           duration 1 {{ move A[1] by 5, 0; move A[1] by 1, 0 }}"#
    )
    .unwrap();

    let mut cmd = cargo_bin();
    let output = cmd
        .arg("--input")
        .arg(input_file.path())
        .arg("--output")
        .arg(tempfile::NamedTempFile::new().unwrap().path())
        .output()
        .expect("failed to run binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("Line "));
    assert!(stderr.contains("already moving"));
}

fn cargo_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_motion-dsl"))
}
