// Copyright (c) 2025 - Cowboy AI, Inc.
//! Database section

use serde::{Deserialize, Serialize};

use super::network::SecurityConfig;
use super::options::InstanceType;
use crate::database::DatabaseEngine;
use crate::domain::invariants::{validate_not_empty, validate_ports_agree, validate_range};
use crate::domain::RemovalPolicy;
use crate::errors::{PlanError, PlanResult};

/// Managed relational database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DatabaseConfig {
    /// Engine name, matched case-insensitively
    pub engine: String,
    pub engine_version: String,
    pub instance_class: String,
    pub instance_size: String,
    /// GiB
    pub allocated_storage: u32,
    /// GiB ceiling for storage autoscaling
    pub max_allocated_storage: u32,
    pub multi_az: bool,
    /// Must equal `network.security.dbPort` when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub database_name: String,
    /// Days
    pub backup_retention: u32,
    pub preferred_backup_window: String,
    pub preferred_maintenance_window: String,
    /// Unset means the environment default
    pub deletion_protection: Option<bool>,
    pub removal_policy: RemovalPolicy,
    pub storage_encrypted: bool,
    pub auto_minor_version_upgrade: bool,
    pub credentials: CredentialsConfig,
    pub cloud_watch_logs: DatabaseLogsConfig,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            engine: "mysql".to_string(),
            engine_version: "8.0".to_string(),
            instance_class: "T3".to_string(),
            instance_size: "MICRO".to_string(),
            allocated_storage: 20,
            max_allocated_storage: 100,
            multi_az: true,
            port: None,
            database_name: "webappdb".to_string(),
            backup_retention: 7,
            preferred_backup_window: "03:00-04:00".to_string(),
            preferred_maintenance_window: "sun:04:00-sun:05:00".to_string(),
            deletion_protection: None,
            removal_policy: RemovalPolicy::Snapshot,
            storage_encrypted: true,
            auto_minor_version_upgrade: true,
            credentials: CredentialsConfig::default(),
            cloud_watch_logs: DatabaseLogsConfig::default(),
        }
    }
}

impl DatabaseConfig {
    pub fn engine(&self) -> PlanResult<DatabaseEngine> {
        DatabaseEngine::parse(&self.engine)
    }

    pub fn instance_type(&self) -> PlanResult<InstanceType> {
        InstanceType::new(&self.instance_class, &self.instance_size)
            .map_err(|e| PlanError::config(format!("database: {}", e)))
    }

    /// Log types to export, falling back to the engine defaults
    pub fn log_exports(&self, engine: DatabaseEngine) -> Vec<String> {
        match &self.cloud_watch_logs.exports {
            Some(exports) => exports.clone(),
            None => engine
                .default_log_exports()
                .iter()
                .map(|export| export.to_string())
                .collect(),
        }
    }

    pub(crate) fn validate(&self, security: &SecurityConfig) -> PlanResult<()> {
        let engine = self.engine()?;
        validate_not_empty("database.engineVersion", &self.engine_version)?;
        self.instance_type()?;
        validate_not_empty("database.databaseName", &self.database_name)?;

        validate_range(
            "database.allocatedStorage",
            i64::from(self.allocated_storage),
            20,
            65536,
        )?;
        if self.max_allocated_storage < self.allocated_storage {
            return Err(PlanError::config(format!(
                "database.maxAllocatedStorage ({}) must be at least allocatedStorage ({})",
                self.max_allocated_storage, self.allocated_storage
            )));
        }
        validate_range("database.backupRetention", i64::from(self.backup_retention), 0, 35)?;

        if let Some(port) = self.port {
            validate_ports_agree(
                "database.port",
                port,
                "network.security.dbPort",
                security.db_port,
            )?;
        }

        self.credentials.validate(engine)?;

        validate_range(
            "database.cloudWatchLogs.retention",
            i64::from(self.cloud_watch_logs.retention),
            1,
            i64::from(u32::MAX),
        )?;
        for export in self.log_exports(engine) {
            if !engine.supported_log_exports().contains(&export.as_str()) {
                return Err(PlanError::config(format!(
                    "log export '{}' is not available for {} (expected one of: {})",
                    export,
                    engine,
                    engine.supported_log_exports().join(", ")
                )));
            }
        }
        Ok(())
    }
}

/// Master credential and its password generation policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CredentialsConfig {
    pub username: String,
    pub password_length: u32,
    pub exclude_punctuation: bool,
    pub include_space: bool,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password_length: 32,
            exclude_punctuation: true,
            include_space: false,
        }
    }
}

impl CredentialsConfig {
    fn validate(&self, engine: DatabaseEngine) -> PlanResult<()> {
        validate_not_empty("database.credentials.username", &self.username)?;
        let starts_with_letter = self
            .username
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic());
        if !starts_with_letter
            || !self
                .username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(PlanError::config(format!(
                "database.credentials.username '{}' must start with a letter and contain only letters, digits or '_'",
                self.username
            )));
        }
        validate_range(
            "database.credentials.passwordLength",
            i64::from(self.password_length),
            8,
            i64::from(engine.max_password_length()),
        )?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseLogsConfig {
    /// Unset means the engine defaults
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exports: Option<Vec<String>>,
    /// Days, resolved to a supported retention class
    pub retention: u32,
}

impl Default for DatabaseLogsConfig {
    fn default() -> Self {
        Self {
            exports: None,
            retention: 7,
        }
    }
}
