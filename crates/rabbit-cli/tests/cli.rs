//! Runs the `rabbit` binary against a throwaway home directory.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::{tempdir, TempDir};

fn home() -> TempDir {
    let dir = tempdir().unwrap();
    for rel in ["docs/old", "music", "src/app"] {
        fs::create_dir_all(dir.path().join(rel)).unwrap();
    }
    dir
}

fn rabbit(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rabbit"))
        .args(args)
        .env("HOME", home)
        .env_remove("RUST_LOG")
        .current_dir(home.join("docs"))
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_no_command_prints_usage_and_saves_nothing() {
    let home = home();

    let output = rabbit(home.path(), &[]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("Usage"));
    assert!(!home.path().join(".rabbit").exists());
}

#[test]
fn test_unknown_command_saves_nothing() {
    let home = home();

    let output = rabbit(home.path(), &["shoot"]);

    assert!(!output.status.success());
    assert!(!home.path().join(".rabbit").exists());
}

#[test]
fn test_fresh_stats() {
    let home = home();

    let output = rabbit(home.path(), &["stats"]);

    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "Rabbits\n...spotted:    0\n...caught:     0\n...killed:     0\n"
    );
    assert!(!home.path().join(".rabbit").exists());
}

#[test]
fn test_check_saves_forest() {
    let home = home();

    let output = rabbit(home.path(), &["check"]);
    assert!(output.status.success());

    let saved = fs::read_to_string(home.path().join(".rabbit")).unwrap();
    let record: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert!(!record["rabbits"].as_object().unwrap().is_empty());

    let output = rabbit(home.path(), &["stats"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("Rabbits\n"));
}

#[test]
fn test_catch_in_empty_forest() {
    let home = home();

    let output = rabbit(home.path(), &["catch"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "There are no rabbits here.\n");
}

#[test]
fn test_explicit_save_path() {
    let home = home();
    let save = home.path().join("music").join("hunt.json");

    let output = rabbit(home.path(), &["--save", save.to_str().unwrap(), "check"]);

    assert!(output.status.success());
    assert!(save.exists());
    assert!(!home.path().join(".rabbit").exists());
}

#[test]
fn test_corrupt_save_is_fatal() {
    let home = home();
    fs::write(home.path().join(".rabbit"), "definitely not json").unwrap();

    let output = rabbit(home.path(), &["check"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("corrupt save data"), "{}", stderr);
    // Left alone for the player to inspect.
    assert_eq!(
        fs::read_to_string(home.path().join(".rabbit")).unwrap(),
        "definitely not json"
    );
}

#[test]
fn test_broken_explicit_config_is_fatal() {
    let home = home();
    let config = home.path().join("tuning.toml");
    fs::write(&config, "[population]\nmin_rabbits = \"many\"\n").unwrap();

    let output = rabbit(home.path(), &["--config", config.to_str().unwrap(), "check"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!home.path().join(".rabbit").exists());
}
