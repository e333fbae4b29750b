// Copyright (c) 2025 - Cowboy AI, Inc.
//! Managed Data Store
//!
//! A credential secret, a subnet group over the isolated tier and the
//! database instance. The instance depends on the secret, so the secret
//! always precedes it in the plan.
//!
//! The environment overlay decides deletion protection when the document
//! leaves it unset; a `SNAPSHOT` removal policy on an unprotected instance
//! becomes `DESTROY`.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::config::{DatabaseConfig, InstanceType, ResourceNames};
use crate::domain::{DestructionPolicy, EnvironmentClass, RetentionClass, SubnetTier};
use crate::errors::{PlanError, PlanResult};
use crate::plan::{LogicalId, PlanBuilder, ResourceSpec};
use crate::topology::Topology;

/// Engine names accepted in configuration
pub const SUPPORTED_ENGINES: [&str; 4] = ["mariadb", "mysql", "postgres", "postgresql"];

/// Supported database engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseEngine {
    MariaDb,
    MySql,
    Postgres,
}

impl DatabaseEngine {
    /// Match an engine name case-insensitively
    ///
    /// # Errors
    /// `UnsupportedEngine` listing the accepted names.
    pub fn parse(engine: &str) -> PlanResult<Self> {
        match engine.to_ascii_lowercase().as_str() {
            "mariadb" => Ok(Self::MariaDb),
            "mysql" => Ok(Self::MySql),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            _ => Err(PlanError::UnsupportedEngine {
                engine: engine.to_string(),
                supported: SUPPORTED_ENGINES.to_vec(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MariaDb => "mariadb",
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
        }
    }

    /// Log types exported when the document names none
    pub fn default_log_exports(&self) -> &'static [&'static str] {
        match self {
            Self::MariaDb | Self::MySql => &["error", "general", "slowquery"],
            Self::Postgres => &["postgresql"],
        }
    }

    pub fn supported_log_exports(&self) -> &'static [&'static str] {
        match self {
            Self::MariaDb | Self::MySql => &["audit", "error", "general", "slowquery"],
            Self::Postgres => &["postgresql", "upgrade"],
        }
    }

    /// Longest master password the engine accepts
    pub fn max_password_length(&self) -> u32 {
        match self {
            Self::MariaDb | Self::MySql => 41,
            Self::Postgres => 128,
        }
    }
}

impl fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generated master credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretSpec {
    pub name: String,
    pub username: String,
    pub password_length: u32,
    pub exclude_punctuation: bool,
    pub include_space: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbSubnetGroupSpec {
    pub vpc: LogicalId,
    pub subnets: Vec<LogicalId>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbInstanceSpec {
    pub engine: DatabaseEngine,
    pub engine_version: String,
    pub instance_type: InstanceType,
    pub subnet_group: LogicalId,
    pub security_group: LogicalId,
    pub credentials: LogicalId,
    pub database_name: String,
    pub port: u16,
    /// GiB
    pub allocated_storage: u32,
    /// GiB
    pub max_allocated_storage: u32,
    pub multi_az: bool,
    pub storage_encrypted: bool,
    pub auto_minor_version_upgrade: bool,
    /// Days
    pub backup_retention: u32,
    pub preferred_backup_window: String,
    pub preferred_maintenance_window: String,
    pub destruction: DestructionPolicy,
    pub log_exports: Vec<String>,
    pub log_retention: RetentionClass,
}

/// Planned data store resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataStore {
    pub secret: LogicalId,
    pub subnet_group: LogicalId,
    pub instance: LogicalId,
    pub engine: DatabaseEngine,
    pub port: u16,
    pub destruction: DestructionPolicy,
}

/// Build the credential secret, subnet group and database instance
///
/// `port` is the policy database port; both boundaries open exactly it.
pub fn build_data_store(
    topology: &Topology,
    data_boundary: &LogicalId,
    config: &DatabaseConfig,
    port: u16,
    names: &ResourceNames,
    environment: EnvironmentClass,
    plan: &mut PlanBuilder,
) -> PlanResult<DataStore> {
    let engine = config.engine()?;
    let instance_type = config.instance_type()?;

    let credentials = &config.credentials;
    let secret = plan.add(
        names.database_credentials.as_str(),
        ResourceSpec::Secret(SecretSpec {
            name: format!("{}-db-credentials", names.database_credentials),
            username: credentials.username.clone(),
            password_length: credentials.password_length,
            exclude_punctuation: credentials.exclude_punctuation,
            include_space: credentials.include_space,
        }),
        vec![],
    )?;

    let subnets = topology.subnet_ids(SubnetTier::PrivateIsolated);
    let mut depends_on = vec![topology.vpc.clone()];
    depends_on.extend(subnets.iter().cloned());
    let subnet_group = plan.add(
        names.database_subnet_group.as_str(),
        ResourceSpec::DbSubnetGroup(DbSubnetGroupSpec {
            vpc: topology.vpc.clone(),
            subnets,
            description: "Subnet group for the database".to_string(),
        }),
        depends_on,
    )?;

    let destruction = environment.destruction_policy(config.deletion_protection, config.removal_policy);
    if destruction.was_overridden() {
        warn!(
            "Database removal policy {} replaced by {} without deletion protection",
            destruction.configured_removal_policy, destruction.removal_policy
        );
    }

    let log_retention = RetentionClass::resolve(config.cloud_watch_logs.retention);

    let instance = plan.add(
        names.database.as_str(),
        ResourceSpec::DbInstance(DbInstanceSpec {
            engine,
            engine_version: config.engine_version.clone(),
            instance_type,
            subnet_group: subnet_group.clone(),
            security_group: data_boundary.clone(),
            credentials: secret.clone(),
            database_name: config.database_name.clone(),
            port,
            allocated_storage: config.allocated_storage,
            max_allocated_storage: config.max_allocated_storage,
            multi_az: config.multi_az,
            storage_encrypted: config.storage_encrypted,
            auto_minor_version_upgrade: config.auto_minor_version_upgrade,
            backup_retention: config.backup_retention,
            preferred_backup_window: config.preferred_backup_window.clone(),
            preferred_maintenance_window: config.preferred_maintenance_window.clone(),
            destruction,
            log_exports: config.log_exports(engine),
            log_retention,
        }),
        vec![secret.clone(), subnet_group.clone(), data_boundary.clone()],
    )?;

    info!(
        "Database {} ({} {}, multi-AZ: {}, deletion protection: {}, removal: {})",
        instance,
        engine,
        config.engine_version,
        config.multi_az,
        destruction.deletion_protection,
        destruction.removal_policy
    );

    Ok(DataStore {
        secret,
        subnet_group,
        instance,
        engine,
        port,
        destruction,
    })
}
