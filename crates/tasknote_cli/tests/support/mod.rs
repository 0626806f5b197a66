#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

/// Nothing listens on the discard port, so every request fails to connect.
pub const DEAD_BACKEND: &str = "http://127.0.0.1:9";

pub fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tasknote-{nanos}-{file_name}"))
}

pub fn tasknote(session_path: &PathBuf) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_tasknote"));
    command
        .env("TASKNOTE_CONFIG_PATH", temp_path("missing-config.json"))
        .env("TASKNOTE_SESSION_PATH", session_path)
        .env("TASKNOTE_API_URL", DEAD_BACKEND)
        .env_remove("TASKNOTE_LOG");
    command
}

pub fn run(args: &[&str]) -> Output {
    let session_path = temp_path("session.json");
    let output = tasknote(&session_path)
        .args(args)
        .output()
        .expect("failed to run tasknote");
    std::fs::remove_file(&session_path).ok();
    output
}

pub fn run_interactive(input: &str) -> Output {
    let session_path = temp_path("interactive-session.json");
    let mut child = tasknote(&session_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn interactive session");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        stdin
            .write_all(input.as_bytes())
            .expect("failed to write to stdin");
    }

    let output = child
        .wait_with_output()
        .expect("failed to read interactive output");
    std::fs::remove_file(&session_path).ok();
    output
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}
