use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    if let Some(path) = env::var_os("CARGO_BIN_EXE_threadmark") {
        return PathBuf::from(path);
    }
    let exe = env::current_exe().expect("current exe");
    let mut debug_dir = exe.as_path();
    while let Some(parent) = debug_dir.parent() {
        if parent.file_name().and_then(|name| name.to_str()) == Some("debug") {
            let candidate = parent.join("threadmark");
            if candidate.exists() {
                return candidate;
            }
        }
        debug_dir = parent;
    }
    panic!("binary path missing");
}

fn temp_file(name: &str, extension: &str, contents: &str) -> PathBuf {
    let mut path = env::temp_dir();
    let now = SystemTime::now().duration_since(UNIX_EPOCH).expect("time");
    let file_name = format!(
        "threadmark_cli_{}_{}_{}.{}",
        name,
        now.as_secs(),
        now.subsec_nanos(),
        extension
    );
    path.push(file_name);
    fs::write(&path, contents).expect("write temp file");
    path
}

fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(bin_path())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("run")
}

#[test]
fn formats_file_with_user_directory() {
    let users = temp_file("users", "json", r#"{"U1": "Alice"}"#);
    let input = temp_file("message", "txt", "> hi <@U1>\n*done*\n");
    let output = Command::new(bin_path())
        .args([
            "--users",
            users.to_str().expect("path"),
            input.to_str().expect("path"),
        ])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim_end(),
        "<blockquote class=\"slack-quote\">hi <span class=\"slack-mention\">@Alice</span></blockquote>\n<p><strong>done</strong></p>"
    );
}

#[test]
fn reads_stdin_when_no_input_is_given() {
    let output = run_with_stdin(&[], "_soft_ &amp; plain\n");
    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim_end(), "<p><em>soft</em> &amp; plain</p>");
}

#[test]
fn inline_json_lists_segments() {
    let output = run_with_stdin(&["--inline", "--format", "json"], "see <https://a.b|docs>");
    assert!(output.status.success(), "expected success exit code");
    let segments: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON on stdout");
    assert_eq!(segments[0]["type"], "text");
    assert_eq!(segments[0]["text"], "see ");
    assert_eq!(segments[1]["type"], "link");
    assert_eq!(segments[1]["url"], "https://a.b");
    assert_eq!(segments[1]["text"], "docs");
    assert_eq!(segments[1]["plain"], false);
}

#[test]
fn message_json_marks_code_blocks() {
    let output = run_with_stdin(&["--format", "json"], "```\nx\n```");
    assert!(output.status.success(), "expected success exit code");
    let blocks: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON on stdout");
    assert_eq!(blocks[0]["type"], "codeBlock");
    assert_eq!(blocks[0]["text"], "\nx\n");
}

#[test]
fn link_options_change_markup() {
    let output = run_with_stdin(
        &["--no-new-tab", "--mention-prefix", "", "--inline"],
        "<@U9> https://a.b",
    );
    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<span class=\"slack-mention\">U9</span>"));
    assert!(stdout.contains("<a href=\"https://a.b\" class=\"slack-link\">"));
    assert!(!stdout.contains("target="));
}

#[test]
fn sanitized_output_keeps_allowed_markup() {
    let output = run_with_stdin(&["--sanitized"], "*hi* <https://a.b|x>");
    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<strong>hi</strong>"));
    assert!(stdout.contains("class=\"slack-link\""));
}

#[test]
fn invalid_directory_fails() {
    let users = temp_file("bad_users", "json", r#"{"lower": "x"}"#);
    let output = run_with_stdin(&["--users", users.to_str().expect("path")], "hi");
    assert!(!output.status.success(), "expected error exit code");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid user directory"), "stderr: {}", stderr);
}

#[test]
fn missing_input_file_fails() {
    let output = Command::new(bin_path())
        .arg("/nonexistent/threadmark/input.txt")
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
}
