//! Integration tests for the markwav binary.

use std::fs;

use predicates::prelude::*;
use tempfile::TempDir;

use crate::helpers::{fixtures_dir, markwav, temp_fixture};

/// Size of the WAV produced from `song.csv`.
const SONG_WAV_LEN: u64 = 18_875_652;

// ============================================================================
// Help
// ============================================================================

#[test]
fn help_describes_the_tool() {
    let config = TempDir::new().unwrap();
    markwav(&config)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Broadcast Wave"));
}

#[test]
fn convert_without_input_is_a_usage_error() {
    let config = TempDir::new().unwrap();
    markwav(&config)
        .arg("convert")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<INPUTS>"));
}

// ============================================================================
// Convert
// ============================================================================

#[test]
fn convert_writes_templated_file_next_to_input() {
    let (dir, input) = temp_fixture("song.csv");
    markwav(&dir)
        .arg("convert")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("song_markers.wav"))
        .stdout(predicate::str::contains("4 of 4 rows"));

    let output = dir.path().join("song_markers.wav");
    assert_eq!(fs::metadata(output).unwrap().len(), SONG_WAV_LEN);
}

#[test]
fn convert_honors_explicit_output_file() {
    let (dir, input) = temp_fixture("song.csv");
    let output = dir.path().join("custom.wav");
    markwav(&dir)
        .arg("convert")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();
    assert_eq!(fs::metadata(&output).unwrap().len(), SONG_WAV_LEN);
}

#[test]
fn convert_to_stdout_streams_the_file() {
    let config = TempDir::new().unwrap();
    let assert = markwav(&config)
        .args(["convert", "-o", "-"])
        .arg(fixtures_dir().join("song.csv"))
        .assert()
        .success();
    let stdout = &assert.get_output().stdout;
    assert_eq!(stdout.len() as u64, SONG_WAV_LEN);
    assert_eq!(&stdout[0..4], b"RIFF");
}

#[test]
fn convert_several_inputs_into_directory() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("exports");
    markwav(&dir)
        .arg("convert")
        .arg(fixtures_dir().join("song.csv"))
        .arg(fixtures_dir().join("unicode.csv"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success();
    assert!(out.join("song_markers.wav").is_file());
    assert!(out.join("unicode_markers.wav").is_file());
}

#[test]
fn one_failing_input_fails_the_batch_but_not_the_others() {
    let dir = TempDir::new().unwrap();
    markwav(&dir)
        .arg("convert")
        .arg(fixtures_dir().join("song.csv"))
        .arg(fixtures_dir().join("bad_rows.csv"))
        .arg("-o")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No valid markers"))
        .stderr(predicate::str::contains("1 of 2 conversions failed"));
    assert!(dir.path().join("song_markers.wav").is_file());
    assert!(!dir.path().join("bad_rows_markers.wav").exists());
}

#[test]
fn allow_empty_writes_ten_second_file() {
    let (dir, input) = temp_fixture("bad_rows.csv");
    markwav(&dir)
        .arg("convert")
        .arg(&input)
        .arg("--allow-empty")
        .assert()
        .success();
    let len = fs::metadata(dir.path().join("bad_rows_markers.wav"))
        .unwrap()
        .len();
    // header + fmt + bext + 10 s of audio + empty cue + empty LIST
    assert_eq!(len, 12 + 24 + 610 + 8 + 1_764_000 + 12 + 12);
}

#[test]
fn missing_input_reports_path() {
    let dir = TempDir::new().unwrap();
    markwav(&dir)
        .args(["convert", "does-not-exist.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"))
        .stderr(predicate::str::contains("does-not-exist.csv"));
}

#[test]
fn unknown_label_column_is_reported() {
    let (dir, input) = temp_fixture("song.csv");
    markwav(&dir)
        .arg("convert")
        .arg(&input)
        .args(["-l", "Missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Column not found"));
}

#[test]
fn max_duration_refuses_before_creating_file() {
    let (dir, input) = temp_fixture("song.csv");
    markwav(&dir)
        .arg("convert")
        .arg(&input)
        .args(["--max-duration", "60"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds the configured maximum"));
    assert!(!dir.path().join("song_markers.wav").exists());
}

#[test]
fn unplaceable_marker_fails_without_leaving_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("far.csv");
    fs::write(&input, "time,name\n0,start\n1e20,far\n").unwrap();

    markwav(&dir)
        .arg("convert")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Encoding overflow"));
    assert!(!dir.path().join("far_markers.wav").exists());
}

#[cfg(unix)]
#[test]
fn import_hook_runs_after_write_unless_disabled() {
    let (dir, input) = temp_fixture("song.csv");
    fs::write(
        dir.path().join("config.toml"),
        "[hook]\ncommand = [\"touch\", \"{path}.imported\"]\n",
    )
    .unwrap();

    markwav(&dir)
        .arg("convert")
        .arg(&input)
        .arg("--no-hook")
        .assert()
        .success();
    assert!(!dir.path().join("song_markers.wav.imported").exists());

    markwav(&dir).arg("convert").arg(&input).assert().success();
    assert!(dir.path().join("song_markers.wav.imported").exists());
}

// ============================================================================
// Columns, config, completions
// ============================================================================

#[test]
fn columns_shows_detected_time_column_and_rate() {
    let config = TempDir::new().unwrap();
    markwav(&config)
        .arg("columns")
        .arg(fixtures_dir().join("smpte.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Timecode"))
        .stdout(predicate::str::contains("(5 rows)"))
        .stdout(predicate::str::contains("Detected frame rate: 24 fps"));
}

#[test]
fn config_path_follows_environment() {
    let config = TempDir::new().unwrap();
    markwav(&config)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn config_init_refuses_to_overwrite_without_force() {
    let config = TempDir::new().unwrap();
    markwav(&config).args(["config", "init"]).assert().success();
    assert!(config.path().join("config.toml").is_file());

    markwav(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    markwav(&config)
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn config_show_prints_sections() {
    let config = TempDir::new().unwrap();
    markwav(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[encoder]"))
        .stdout(predicate::str::contains("filename_template"));
}

#[test]
fn completions_are_generated() {
    let config = TempDir::new().unwrap();
    markwav(&config)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("markwav"));
}
