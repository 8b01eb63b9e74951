// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bulwark - configuration reconciliation for reverse-proxy/WAF deployments.
//!
//! This is the binary entry point.

mod app;
mod plugins;

use std::path::PathBuf;

use bulwark_core::ConfigMap;
use clap::{Args, Parser, Subcommand};

/// Bulwark - manage global and per-service proxy configuration.
#[derive(Parser, Debug)]
#[command(name = "bulwark", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Regenerate the current configuration without changes.
    Reload,
    /// Create, edit, or delete a service.
    #[command(subcommand)]
    Service(ServiceCommand),
    /// Change global settings.
    #[command(subcommand)]
    Global(GlobalCommand),
    /// Check variables against the plugin settings without applying them.
    Validate {
        /// Validate as global settings instead of service settings.
        #[arg(long)]
        global: bool,
        #[command(flatten)]
        variables: Variables,
    },
    /// Inspect and package plugins.
    #[command(subcommand)]
    Plugins(plugins::PluginsCommand),
    /// Inspect the stored environment.
    #[command(subcommand)]
    Env(EnvCommand),
}

#[derive(Subcommand, Debug)]
enum ServiceCommand {
    /// Add a service; SERVER_NAME is required.
    Create(Variables),
    /// Replace the service OLD with the given variables.
    Edit {
        /// Primary identifier of the service to replace.
        old: String,
        #[command(flatten)]
        variables: Variables,
    },
    /// Delete a service by primary identifier.
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum GlobalCommand {
    /// Overlay variables onto the global configuration.
    Edit(Variables),
}

#[derive(Subcommand, Debug)]
enum EnvCommand {
    /// Print the merged environment without regenerating.
    Show,
}

/// `KEY=VALUE` arguments.
#[derive(Args, Debug)]
struct Variables {
    #[arg(value_name = "KEY=VALUE", value_parser = parse_key_value, required = true)]
    pairs: Vec<(String, String)>,
}

impl Variables {
    fn into_map(self) -> ConfigMap {
        self.pairs.into_iter().collect()
    }
}

fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{arg}`")),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => bulwark_config::load_and_validate_path(path),
        None => bulwark_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            bulwark_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);

    let code = match app::run(cli.command, &config).await {
        Ok(code) => code,
        Err(err) => {
            app::report_error(&err);
            1
        }
    };
    std::process::exit(code);
}

/// Initializes the tracing subscriber on stderr with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bulwark={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
