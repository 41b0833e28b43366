//! Integration tests that run the CLI binary.

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_chatdoc"));
    for var in [
        "CHATDOC_ANIMATED",
        "CHATDOC_CHECK_LINK_CREDIBILITY",
        "CHATDOC_ENABLE_COPY",
        "CHATDOC_COPY_ACK_MS",
        "CHATDOC_COPY_COMMAND",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn run_with_stdin(mut cmd: Command, input: &str) -> Output {
    // Run from temp dir so dotenv() won't load .env from project root
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let mut child = cmd
        .current_dir(tmp.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("binary not found - run cargo build first");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(input.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait")
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn cli_help_succeeds_and_outputs_usage() {
    let output = bin()
        .arg("--help")
        .output()
        .expect("binary not found - run cargo build first");
    let stdout = stdout_of(&output);
    assert!(stdout.contains("chatdoc"));
    assert!(stdout.contains("--animated"));
}

#[test]
fn cli_version_succeeds() {
    let output = bin()
        .arg("--version")
        .output()
        .expect("binary not found - run cargo build first");
    assert!(stdout_of(&output).contains("chatdoc"));
}

#[test]
fn cli_renders_file_with_math() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let input = tmp.path().join("answer.md");
    std::fs::write(&input, "# Result\n\n\\[x^2\\]\n").expect("write input");

    let output = bin()
        .arg(&input)
        .current_dir(tmp.path())
        .output()
        .expect("binary not found - run cargo build first");
    let stdout = stdout_of(&output);
    assert!(stdout.contains("<h1>Result</h1>"), "{stdout}");
    assert!(stdout.contains("<math"), "{stdout}");
}

#[test]
fn cli_normalized_format_strips_wrapper_fence() {
    let mut cmd = bin();
    cmd.args(["-f", "normalized", "-"]);
    let output = run_with_stdin(cmd, "```text\nHello \\(x\\)\n```");
    assert_eq!(stdout_of(&output), "Hello $$x$$\n");
}

#[test]
fn cli_animated_flag_wraps_words() {
    let mut cmd = bin();
    cmd.arg("-a");
    let output = run_with_stdin(cmd, "two words");
    let stdout = stdout_of(&output);
    assert!(stdout.contains(r#"data-word-index="1""#), "{stdout}");
}

#[test]
fn cli_json_format_outputs_tree() {
    let mut cmd = bin();
    cmd.args(["--format", "json"]);
    let output = run_with_stdin(cmd, "hi");
    let value: serde_json::Value = serde_json::from_str(&stdout_of(&output)).expect("json");
    assert_eq!(value["children"][0]["type"], "element");
    assert_eq!(value["children"][0]["value"]["tag"], "p");
}

#[test]
fn cli_writes_output_file() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let out = tmp.path().join("out.txt");
    let mut cmd = bin();
    cmd.args(["-f", "text", "-o"]).arg(&out);
    let output = run_with_stdin(cmd, "**bold** text");
    stdout_of(&output);
    assert_eq!(std::fs::read_to_string(&out).expect("output file"), "bold text");
}

#[test]
fn cli_empty_input_exits_with_error() {
    let output = run_with_stdin(bin(), "  \n");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("empty input"));
}

#[test]
fn cli_invalid_env_exits_with_error() {
    let mut cmd = bin();
    cmd.env("CHATDOC_COPY_ACK_MS", "soon");
    let output = run_with_stdin(cmd, "hi");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("CHATDOC_COPY_ACK_MS"),
        "expected config error message, got: {}",
        stderr
    );
}

#[cfg(unix)]
#[test]
fn cli_copy_reports_success_through_fallback_command() {
    let mut cmd = bin();
    cmd.arg("--copy").env("CHATDOC_COPY_COMMAND", "cat");
    let output = run_with_stdin(cmd, "copy me");
    let stdout = stdout_of(&output);
    assert!(stdout.contains(r#"class="copy-button""#), "{stdout}");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Copied!"));
}
