// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog integration tests over an on-disk install layout.

use std::fs;
use std::path::Path;

use bulwark_core::SettingContext;
use bulwark_plugin::{GENERAL_PLUGIN_ID, PluginCatalog};

const SETTINGS: &str = r#"{
    "SERVER_NAME": {"context": "multisite", "default": "www.example.com", "regex": "^\\S+( \\S+)*$"},
    "WORKER_PROCESSES": {"context": "global", "default": "auto", "regex": "^(auto|\\d+)$"}
}"#;

fn plugin(root: &Path, id: &str, name: &str, settings: &str) {
    let dir = root.join(id);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("plugin.json"),
        format!(
            r#"{{"id": "{id}", "name": "{name}", "description": "{name} plugin",
                "version": "1.0", "stream": "partial", "settings": {settings}}}"#
        ),
    )
    .unwrap();
}

#[test]
fn catalog_from_install_layout() {
    let tmp = tempfile::tempdir().unwrap();
    let settings_file = tmp.path().join("settings.json");
    let core = tmp.path().join("core");
    let external = tmp.path().join("plugins");
    fs::write(&settings_file, SETTINGS).unwrap();

    plugin(
        &core,
        "blacklist",
        "Blacklist",
        r#"{"BLACKLIST_IP": {"context": "multisite", "regex": "^.*$", "multiple": "blacklist"}}"#,
    );
    plugin(&external, "discord", "Discord", r#"{"USE_DISCORD": {"context": "global", "regex": "^(yes|no)$"}}"#);

    let catalog = PluginCatalog::from_paths(&settings_file, Some(core), external).unwrap();

    let general = catalog.general_plugin();
    assert_eq!(general.id, GENERAL_PLUGIN_ID);
    assert_eq!(general.description, "The general settings for the server");
    assert_eq!(general.version, "0.1");
    assert_eq!(general.method, "manual");

    let all = catalog.list_plugins(true, false).unwrap();
    let ids: Vec<&str> = all.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["general", "blacklist", "discord"]);

    let schema = catalog.merged_settings().unwrap();
    assert_eq!(schema.len(), 4);
    assert!(schema.get("BLACKLIST_IP").unwrap().multiple);
    assert_eq!(schema.get("USE_DISCORD").unwrap().context, SettingContext::Global);
    assert!(schema.resolve("BLACKLIST_IP_2").is_some());
}

#[test]
fn malformed_settings_file_fails_catalog_construction() {
    let tmp = tempfile::tempdir().unwrap();
    let settings_file = tmp.path().join("settings.json");
    fs::write(&settings_file, "[1, 2, 3]").unwrap();

    let result = PluginCatalog::from_paths(&settings_file, None, tmp.path().join("plugins"));
    assert!(result.is_err());
}

#[test]
fn bundles_of_external_plugins_are_stable() {
    let tmp = tempfile::tempdir().unwrap();
    let external = tmp.path().join("plugins");
    plugin(&external, "discord", "Discord", "{}");
    fs::write(external.join("discord").join("discord.lua"), "local M = {}\nreturn M\n").unwrap();

    let catalog = PluginCatalog::new(Default::default(), None, external.clone());
    let first = catalog.external_plugins(true).unwrap();
    let second = catalog.external_plugins(true).unwrap();
    assert_eq!(
        first[0].bundle.as_ref().unwrap().checksum,
        second[0].bundle.as_ref().unwrap().checksum
    );

    fs::write(external.join("discord").join("discord.lua"), "local M = {}\nreturn N\n").unwrap();
    let third = catalog.external_plugins(true).unwrap();
    assert_ne!(
        first[0].bundle.as_ref().unwrap().checksum,
        third[0].bundle.as_ref().unwrap().checksum
    );
}
