//! Common test utilities for AgriPulse integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't pollute
//! the user's `~/.local/share/agripulse/` directory.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A PNG signature followed by the start of an IHDR chunk.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

/// A test environment with isolated data storage.
///
/// The `ap()` method returns a `Command` that sets `AGRIPULSE_DATA_DIR`
/// per-invocation, making tests parallel-safe. Simulated delays are
/// switched off with `AGRIPULSE_LATENCY_MS=0`.
pub struct TestEnv {
    pub data_dir: TempDir,
    /// Scratch directory for files handed to the CLI (e.g. images)
    pub work_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
            work_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a test environment with a signed-in session.
    pub fn logged_in() -> Self {
        let env = Self::new();
        env.ap()
            .args([
                "login",
                "--email",
                "john@agrifarm.com",
                "--password",
                "secret-pass",
                "--name",
                "John Farmer",
            ])
            .assert()
            .success();
        env
    }

    /// Get a Command for the ap binary with isolated data directory.
    pub fn ap(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_ap"));
        cmd.current_dir(self.work_dir.path());
        cmd.env("AGRIPULSE_DATA_DIR", self.data_dir.path());
        cmd.env("AGRIPULSE_LATENCY_MS", "0");
        cmd.env_remove("AGRIPULSE_LOG");
        cmd
    }

    /// Run `ap` with `args`, expect success and parse stdout as JSON.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.ap().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "ap {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    /// Write a file into the scratch directory and return its path.
    pub fn write_file(&self, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = self.work_dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn data_path(&self) -> &std::path::Path {
        self.data_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
