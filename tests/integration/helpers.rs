//! Shared helpers for integration tests.

use std::fs;
use std::path::PathBuf;
use assert_cmd::Command;
use tempfile::TempDir;

/// Directory holding the CSV fixtures.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Contents of a fixture file.
pub fn load_fixture(name: &str) -> String {
    fs::read_to_string(fixtures_dir().join(name))
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", name, e))
}

/// Copy a fixture into a fresh temp dir; returns the dir and the copy's path.
pub fn temp_fixture(name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join(name);
    fs::copy(fixtures_dir().join(name), &path).expect("Failed to copy fixture");
    (dir, path)
}

/// A `markwav` command isolated from the user's config and log settings.
pub fn markwav(config_dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_markwav"));
    cmd.env("MARKWAV_CONFIG", config_dir.path().join("config.toml"))
        .env_remove("MARKWAV_LOG");
    cmd
}

/// Read a little-endian u32 at `offset`.
pub fn le_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
