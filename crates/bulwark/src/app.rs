// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring from configuration to the reconciler, and command dispatch.

use std::path::PathBuf;
use std::sync::Arc;

use bulwark_config::BulwarkConfig;
use bulwark_core::BulwarkError;
use bulwark_plugin::PluginCatalog;
use bulwark_reconcile::{FileStore, Outcome, ProcessGenerator, Reconciler};
use tracing::debug;

use crate::{Commands, EnvCommand, GlobalCommand, ServiceCommand, plugins};

/// Plugin catalog over the configured settings file and plugin directories.
pub fn build_catalog(config: &BulwarkConfig) -> Result<PluginCatalog, BulwarkError> {
    PluginCatalog::from_paths(
        &PathBuf::from(&config.paths.settings_file),
        Some(PathBuf::from(&config.paths.core_plugins_dir)),
        PathBuf::from(&config.paths.external_plugins_dir),
    )
}

/// Reconciler backed by the file store and the configured generator program.
pub fn build_reconciler(config: &BulwarkConfig) -> Result<Reconciler, BulwarkError> {
    let catalog = Arc::new(build_catalog(config)?);
    let store = Arc::new(FileStore::new(&config.paths.variables_file, catalog.clone()));
    let generator = Arc::new(ProcessGenerator::new(
        &config.generator.program,
        config.generator.args.clone(),
    ));

    debug!(
        variables_file = %config.paths.variables_file,
        generator = %config.generator.program,
        method = %config.generator.method,
        "reconciler configured"
    );
    let reconciler =
        Reconciler::new(store, generator, catalog).with_method(&config.generator.method);
    Ok(match &config.paths.temp_dir {
        Some(dir) => reconciler.with_temp_dir(dir),
        None => reconciler,
    })
}

/// Run one command and return the process exit code.
pub async fn run(command: Commands, config: &BulwarkConfig) -> Result<i32, BulwarkError> {
    let outcome = match command {
        Commands::Plugins(command) => return plugins::run(command, config),
        Commands::Reload => build_reconciler(config)?.reload().await?,
        Commands::Service(ServiceCommand::Create(variables)) => {
            build_reconciler(config)?
                .create_service(variables.into_map())
                .await?
        }
        Commands::Service(ServiceCommand::Edit { old, variables }) => {
            build_reconciler(config)?
                .edit_service(&old, variables.into_map())
                .await?
        }
        Commands::Service(ServiceCommand::Delete { id }) => {
            build_reconciler(config)?.delete_service(&id).await?
        }
        Commands::Global(GlobalCommand::Edit(variables)) => {
            build_reconciler(config)?
                .edit_global(variables.into_map())
                .await?
        }
        Commands::Validate { global, variables } => {
            let result = build_reconciler(config)?.validate(&variables.into_map(), global)?;
            if result.ok {
                println!("All variables are valid.");
                return Ok(0);
            }
            for message in &result.messages {
                eprintln!("{message}");
            }
            return Ok(1);
        }
        Commands::Env(EnvCommand::Show) => {
            println!("{}", build_reconciler(config)?.render_environment().await?);
            return Ok(0);
        }
    };

    Ok(print_outcome(&outcome))
}

fn print_outcome(outcome: &Outcome) -> i32 {
    if outcome.is_success() {
        println!("{outcome}");
    } else {
        eprintln!("{outcome}");
    }
    outcome.status_code()
}

/// Print a fatal error, including generator output when there is any.
pub fn report_error(err: &BulwarkError) {
    eprintln!("bulwark: {err}");
    if let BulwarkError::Generation { output, .. } = err {
        let output = output.trim_end();
        if !output.is_empty() {
            eprintln!("{output}");
        }
    }
}
