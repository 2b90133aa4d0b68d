use assert_cmd::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_logging_to_file() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let log_file = root.join("oql.log");

    let config_path = root.join("config.toml");
    let config_content = format!(
        r#"
version = 1
[profiles.default]
vault_root = "{}"

[logging]
level = "debug"
file = "{}"
"#,
        root.display(),
        log_file.display()
    );
    fs::write(&config_path, &config_content).unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("oql"));
    cmd.arg("--config").arg(&config_path).arg("doctor").assert().success();

    assert!(log_file.exists(), "Log file should be created");
}

#[test]
fn test_log_file_under_vault_root_placeholder() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("note.md"), "hello\n").unwrap();

    let config_path = root.join("config.toml");
    let config_content = format!(
        r#"
version = 1
[profiles.default]
vault_root = "{}"

[logging]
level = "info"
file_level = "debug"
file = "{{{{vault_root}}}}/.oql/oql.log"
"#,
        root.display()
    );
    fs::write(&config_path, &config_content).unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("oql"));
    cmd.arg("--config").arg(&config_path).arg("reindex").assert().success();

    assert!(root.join(".oql/oql.log").exists());
}

#[test]
fn test_logging_level_parsing() {
    let dir = tempdir().unwrap();
    let root = dir.path();

    let config_path = root.join("config.toml");
    let config_content = format!(
        r#"
version = 1
[profiles.default]
vault_root = "{}"

[logging]
level = "trace"
"#,
        root.display()
    );
    fs::write(&config_path, &config_content).unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("oql"));
    cmd.arg("--config").arg(&config_path).arg("doctor").assert().success();
}
