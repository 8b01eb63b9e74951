// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the `bulwark` binary.
//!
//! Each test lays out a settings file, plugin directories and a config file
//! in a temp dir, and uses `sh` as the generator so the handed-over
//! environment can be inspected.

#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const SETTINGS: &str = r#"{
    "SERVER_NAME": {"context": "multisite", "default": "www.example.com", "regex": "\\S+( \\S+)*"},
    "WORKER_PROCESSES": {"context": "global", "default": "auto", "regex": "auto|\\d+"},
    "USE_GZIP": {"context": "multisite", "default": "no", "regex": "yes|no"}
}"#;

struct Install {
    dir: tempfile::TempDir,
    config: PathBuf,
}

impl Install {
    /// Generator copies the variables file to `generated.env` and exits
    /// with `exit_code`.
    fn new(exit_code: i32) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("settings.json"), SETTINGS).unwrap();
        fs::create_dir_all(root.join("core/antibot")).unwrap();
        fs::write(
            root.join("core/antibot/plugin.json"),
            r#"{"id": "antibot", "name": "Antibot", "version": "1.0",
                "settings": {"USE_ANTIBOT": {"context": "multisite", "regex": "no|cookie|captcha"}}}"#,
        )
        .unwrap();
        fs::create_dir_all(root.join("plugins")).unwrap();

        let script = format!(r#"cp "$2" "$0"; exit {exit_code}"#);
        let config = root.join("bulwark.toml");
        fs::write(
            &config,
            format!(
                r#"
[paths]
settings_file = "{root}/settings.json"
core_plugins_dir = "{root}/core"
external_plugins_dir = "{root}/plugins"
variables_file = "{root}/variables.env"
temp_dir = "{root}"

[generator]
program = "sh"
args = ["-c", '{script}', "{root}/generated.env"]
"#,
                root = root.display(),
            ),
        )
        .unwrap();

        Self { dir, config }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_bulwark"))
            .arg("--config")
            .arg(&self.config)
            .args(args)
            .env_remove("RUST_LOG")
            .current_dir(self.root())
            .output()
            .unwrap()
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.root().join(name)).unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn create_service_writes_environment() {
    let install = Install::new(0);
    let output = install.run(&["service", "create", "SERVER_NAME=a.com", "USE_GZIP=yes"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "Configuration for a.com has been generated.");

    let expected = "SERVER_NAME=a.com\na.com_SERVER_NAME=a.com\na.com_USE_GZIP=yes";
    assert_eq!(install.read("generated.env"), expected);
    assert_eq!(install.read("variables.env"), expected);
}

#[test]
fn duplicate_service_exits_with_one() {
    let install = Install::new(0);
    install.run(&["service", "create", "SERVER_NAME=a.com"]);
    let output = install.run(&["service", "create", "SERVER_NAME=a.com"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Service a.com already exists."));
}

#[test]
fn edit_delete_and_show() {
    let install = Install::new(0);
    install.run(&["service", "create", "SERVER_NAME=a.com"]);
    install.run(&["service", "create", "SERVER_NAME=b.com"]);

    let edited = install.run(&["service", "edit", "a.com", "SERVER_NAME=c.com", "USE_ANTIBOT=cookie"]);
    assert_eq!(edited.status.code(), Some(0), "stderr: {}", stderr(&edited));
    assert_eq!(stdout(&edited).trim(), "Configuration for a.com has been edited.");

    let deleted = install.run(&["service", "delete", "b.com"]);
    assert_eq!(deleted.status.code(), Some(0));

    let shown = install.run(&["env", "show"]);
    assert_eq!(
        stdout(&shown).trim(),
        "SERVER_NAME=c.com\nc.com_SERVER_NAME=c.com\nc.com_USE_ANTIBOT=cookie"
    );
}

#[test]
fn global_edit_and_validation() {
    let install = Install::new(0);
    let edited = install.run(&["global", "edit", "WORKER_PROCESSES=4"]);
    assert_eq!(edited.status.code(), Some(0), "stderr: {}", stderr(&edited));
    assert!(install.read("variables.env").contains("WORKER_PROCESSES=4"));

    let rejected = install.run(&["validate", "--global", "USE_GZIP=yes", "WORKER_PROCESSES=many"]);
    assert_eq!(rejected.status.code(), Some(1));
    let messages = stderr(&rejected);
    assert!(messages.contains("Variable USE_GZIP is not valid."));
    assert!(messages.contains("Variable WORKER_PROCESSES is not valid."));

    let accepted = install.run(&["validate", "USE_GZIP=no"]);
    assert_eq!(accepted.status.code(), Some(0));
}

#[test]
fn generator_failure_is_fatal_and_keeps_store() {
    let install = Install::new(4);
    let output = install.run(&["service", "create", "SERVER_NAME=a.com"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error from generator (return code = 4)"));
    assert!(!install.root().join("variables.env").exists());

    let leftovers: Vec<_> = fs::read_dir(install.root())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("bulwark-"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn plugins_list_puts_general_first() {
    let install = Install::new(0);
    let output = install.run(&["plugins", "list", "--json"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let plugins: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(plugins[0]["id"], "general");
    assert_eq!(plugins[1]["id"], "antibot");
}

#[test]
fn plugins_pack_writes_archive() {
    let install = Install::new(0);
    let archive = install.root().join("antibot.tar.gz");
    let output = install.run(&["plugins", "pack", "core/antibot", "--output", archive.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let checksum = stdout(&output).split_whitespace().next().unwrap().to_string();
    assert_eq!(checksum.len(), 64);
    assert!(archive.exists());
}

#[test]
fn unknown_config_key_is_reported() {
    let install = Install::new(0);
    fs::write(&install.config, "[generator]\nprogam = \"sh\"\n").unwrap();
    let output = install.run(&["reload"]);
    assert_eq!(output.status.code(), Some(1));
}
