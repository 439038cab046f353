// tests/common/mod.rs
// Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::{NamedTempFile, TempDir};

/// An isolated home and working directory, so that config files and `.env`
/// on the developer's machine cannot influence a test.
pub struct Sandbox {
    dir: TempDir,
    envs: Vec<(String, String)>,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create sandbox dir"),
            envs: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the sandbox root and return its path.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write sandbox file");
        path
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_linesift"));
        cmd.args(args)
            .current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join(".config"))
            .env_remove("LINESIFT_INPUT")
            .env_remove("LINESIFT_PATTERN")
            .env_remove("LINESIFT_INVERT")
            .env_remove("LINESIFT_OUTPUT_FORMAT")
            .env_remove("LINESIFT_THREADS")
            .env_remove("LINESIFT_BUFFER_SIZE")
            .env_remove("LINESIFT_LOG");
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    /// Run linesift inside the sandbox, feeding `input` on stdin.
    pub fn run(&self, args: &[&str], input: &str) -> (String, String, i32) {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to start linesift");

        if let Some(mut stdin) = child.stdin.take() {
            // A closed pipe just means linesift did not need stdin.
            let _ = stdin.write_all(input.as_bytes());
        }

        let output = child.wait_with_output().expect("Failed to read output");
        (
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
            output.status.code().unwrap_or(-1),
        )
    }
}

/// Run linesift with the given arguments and input via stdin
pub fn run_linesift_with_input(args: &[&str], input: &str) -> (String, String, i32) {
    Sandbox::new().run(args, input)
}

/// Run linesift with a temporary file appended as the input path
pub fn run_linesift_with_file(args: &[&str], file_content: &str) -> (String, String, i32) {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file
        .write_all(file_content.as_bytes())
        .expect("Failed to write to temp file");
    temp_file.flush().expect("Failed to flush temp file");

    let path = temp_file.path().to_str().expect("temp path is not UTF-8");
    let mut full_args = args.to_vec();
    full_args.push(path);

    Sandbox::new().run(&full_args, "")
}

/// `n` distinct lines, every third one containing ERROR.
pub fn numbered_log(n: usize) -> String {
    (0..n)
        .map(|i| {
            let level = if i % 3 == 0 { "ERROR" } else { "INFO" };
            format!("{} request {} handled\n", level, i)
        })
        .collect()
}

/// Extract a numeric value from the `--stats` block on stderr.
pub fn stat_value(stderr: &str, label: &str) -> Option<u64> {
    stderr
        .lines()
        .find_map(|line| line.trim().strip_prefix(label))
        .and_then(|rest| rest.trim().split_whitespace().next())
        .and_then(|value| value.parse().ok())
}
