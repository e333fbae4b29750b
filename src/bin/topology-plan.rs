// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Plan
//!
//! Loads the configuration document for the selected environment, composes
//! the plan, hands it to a dry-run provisioner and prints the plan as JSON.
//!
//! Run with: cargo run --bin topology-plan
//!
//! Environment:
//! - `ENVIRONMENT` (falls back to `NODE_ENV`, then `dev`)
//! - `CONFIG_DIR` directory holding the documents (default: `config`)
//! - `USER_DATA_PATH` optional boot script passed to every instance

use anyhow::{Context, Result};
use cim_topology::{
    config::{config_file_for_environment, StackConfig},
    planner::Planner,
    provider::{submit_plan, DryRunProvisioner},
};
use std::path::PathBuf;
use tracing::info;

/// Process settings read from the environment
#[derive(Debug, Clone)]
struct CliConfig {
    environment: String,
    config_path: PathBuf,
    user_data_path: Option<PathBuf>,
}

impl CliConfig {
    fn from_env() -> Self {
        let environment = std::env::var("ENVIRONMENT")
            .or_else(|_| std::env::var("NODE_ENV"))
            .unwrap_or_else(|_| "dev".to_string());

        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
        let config_path =
            PathBuf::from(config_dir).join(config_file_for_environment(&environment));

        Self {
            environment,
            config_path,
            user_data_path: std::env::var("USER_DATA_PATH").ok().map(PathBuf::from),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = CliConfig::from_env();
    info!(
        "Environment {} using {}",
        cli.environment,
        cli.config_path.display()
    );

    let config = StackConfig::from_path(&cli.config_path).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            cli.config_path.display()
        )
    })?;

    let mut planner = Planner::new(config);
    if let Some(path) = &cli.user_data_path {
        let user_data = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read user data from {}", path.display()))?;
        planner = planner.with_user_data(user_data);
    }

    let plan = planner.plan().context("Failed to compose plan")?;

    let mut provisioner = DryRunProvisioner::new();
    let report = submit_plan(&plan, &mut provisioner)
        .await
        .context("Dry-run submission failed")?;
    info!(
        "{} accepted {} resources",
        report.provisioner, report.provisioned
    );

    println!("{}", plan.to_json_pretty().context("Failed to render plan")?);
    Ok(())
}
