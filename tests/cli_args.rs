//! Integration tests for CLI argument handling
//!
//! These run the binary for paths that fail or exit before any network access.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_trophyhunter"))
        .args(args)
        .env_remove("TROPHYHUNTER_CACHE_DIR")
        .output()
        .expect("Failed to execute trophyhunter")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("trophyhunter"), "Help should mention trophyhunter");
    assert!(stdout.contains("--refresh"), "Help should mention --refresh flag");
    assert!(stdout.contains("--csv"), "Help should mention --csv flag");
}

#[test]
fn test_missing_username_fails() {
    let output = run_cli(&[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("USERNAME"), "Should name the missing argument: {}", stderr);
}

#[test]
fn test_invalid_username_prints_error_and_exits() {
    let output = run_cli(&["not a user!"]);
    assert!(!output.status.success(), "Expected invalid username to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid username"),
        "Should print error message about the username: {}",
        stderr
    );
}

#[test]
fn test_overlong_username_is_rejected() {
    let output = run_cli(&["abcdefghijklmnopq"]);
    assert!(!output.status.success());
}

#[test]
fn test_bad_env_override_is_reported() {
    let output = Command::new(env!("CARGO_BIN_EXE_trophyhunter"))
        .arg("Hakoom")
        .env("TROPHYHUNTER_MAX_PAGES", "lots")
        .output()
        .expect("Failed to execute trophyhunter");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TROPHYHUNTER_MAX_PAGES"), "stderr: {}", stderr);
}

#[test]
fn test_zero_max_pages_exits_with_config_status() {
    let output = Command::new(env!("CARGO_BIN_EXE_trophyhunter"))
        .arg("Hakoom")
        .env("TROPHYHUNTER_MAX_PAGES", "0")
        .output()
        .expect("Failed to execute trophyhunter");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_invalid_selector_file_exits_with_config_status() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("selectors.json");
    std::fs::write(&path, r#"{"row":"tr["}"#).unwrap();

    let output = run_cli(&["Hakoom", "--selectors", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid selector configuration"), "stderr: {}", stderr);
    assert!(!stderr.contains("Please report it"), "stderr: {}", stderr);
}

#[test]
fn test_export_filter_without_csv_is_rejected() {
    let output = run_cli(&["Hakoom", "--grade", "gold"]);
    assert!(!output.status.success());
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use trophyhunter::cli::{CacheChoice, Cli, StartupConfig};

    #[test]
    fn test_startup_config_from_flags() {
        let cli = Cli::parse_from(["trophyhunter", "Hakoom", "--refresh", "--no-cache", "--top", "3"]);
        let config = StartupConfig::from_cli_with(&cli, |_| None).unwrap();
        assert_eq!(config.profile.cache_key(), "hakoom");
        assert!(config.refresh);
        assert_eq!(config.cache, CacheChoice::Disabled);
        assert_eq!(config.top, 3);
    }

    #[test]
    fn test_username_is_trimmed() {
        let cli = Cli::parse_from(["trophyhunter", "  Hakoom  "]);
        let config = StartupConfig::from_cli_with(&cli, |_| None).unwrap();
        assert_eq!(config.profile.as_str(), "Hakoom");
    }
}
