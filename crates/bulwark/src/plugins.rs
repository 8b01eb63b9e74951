// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `bulwark plugins` command implementation.

use std::path::{Path, PathBuf};

use bulwark_config::BulwarkConfig;
use bulwark_core::{BulwarkError, PluginDescriptor};
use bulwark_plugin::package_plugin;
use clap::Subcommand;
use serde_json::Value;

use crate::app::build_catalog;

#[derive(Subcommand, Debug)]
pub enum PluginsCommand {
    /// List plugins, General first.
    List {
        /// Only externally installed plugins (what peers receive).
        #[arg(long, conflicts_with = "all")]
        external_only: bool,
        /// Include externally installed plugins.
        #[arg(long)]
        all: bool,
        /// Package each plugin and show its checksum.
        #[arg(long)]
        bundle: bool,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Package one plugin directory as a gzip'd tar and print its checksum.
    Pack {
        dir: PathBuf,
        /// Archive destination. Defaults to `<dir name>.tar.gz` in the
        /// current directory.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

pub fn run(command: PluginsCommand, config: &BulwarkConfig) -> Result<i32, BulwarkError> {
    match command {
        PluginsCommand::List {
            external_only,
            all,
            bundle,
            json,
        } => {
            let catalog = build_catalog(config)?;
            let plugins = if external_only {
                catalog.external_plugins(bundle)?
            } else {
                catalog.list_plugins(all, bundle)?
            };
            if json {
                let rendered = to_json(&plugins)
                    .map_err(|e| BulwarkError::Internal(format!("failed to render plugins: {e}")))?;
                println!("{rendered}");
            } else {
                for plugin in &plugins {
                    println!("{}", table_row(plugin));
                }
            }
            Ok(0)
        }
        PluginsCommand::Pack { dir, output } => {
            let bundle = package_plugin(&dir)?;
            let output = output.unwrap_or_else(|| default_archive_name(&dir));
            std::fs::write(&output, &bundle.data).map_err(|e| {
                BulwarkError::plugin(format!("failed to write `{}`: {e}", output.display()), e)
            })?;
            println!("{}  {}", bundle.checksum, output.display());
            Ok(0)
        }
    }
}

fn default_archive_name(dir: &Path) -> PathBuf {
    let name = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "plugin".to_string());
    PathBuf::from(format!("{name}.tar.gz"))
}

fn table_row(plugin: &PluginDescriptor) -> String {
    let origin = if plugin.external { "external" } else { "builtin" };
    let mut row = format!(
        "{:<20} {:<24} {:<8} {:<8} {:>3} settings",
        plugin.id,
        plugin.name,
        plugin.version,
        origin,
        plugin.settings.len()
    );
    if let Some(bundle) = &plugin.bundle {
        row.push_str("  ");
        row.push_str(&bundle.checksum);
    }
    row
}

fn to_json(plugins: &[PluginDescriptor]) -> Result<String, serde_json::Error> {
    let mut entries = Vec::with_capacity(plugins.len());
    for plugin in plugins {
        let mut value = serde_json::to_value(plugin)?;
        if let (Some(bundle), Some(object)) = (&plugin.bundle, value.as_object_mut()) {
            object.insert("checksum".to_string(), Value::String(bundle.checksum.clone()));
        }
        entries.push(value);
    }
    serde_json::to_string_pretty(&entries)
}
