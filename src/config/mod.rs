// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack Configuration
//!
//! The declarative document every plan is composed from. Documents use
//! camelCase keys; every field has a default, so a document only needs to
//! state what it changes:
//!
//! ```rust
//! use cim_topology::config::StackConfig;
//!
//! let config = StackConfig::from_json_str(r#"{
//!     "environment": { "name": "staging", "region": "eu-west-1" },
//!     "network": { "vpc": { "maxAzs": 3, "natGatewaysCount": 1 } }
//! }"#).unwrap();
//!
//! assert_eq!(config.network.vpc.max_azs, 3);
//! assert_eq!(config.network.security.http_port, 80);
//! assert!(config.environment_class().is_production_like());
//! ```
//!
//! Validation runs once, at this boundary. Composition steps downstream may
//! assume a validated document.

pub mod compute;
pub mod database;
pub mod network;
pub mod options;

pub use compute::{AlbConfig, AsgConfig, ComputeConfig, HealthCheckConfig, StorageConfig};
pub use database::{CredentialsConfig, DatabaseConfig, DatabaseLogsConfig};
pub use network::{
    AclRuleConfig, EphemeralPorts, FlowLogsConfig, NetworkAclConfig, NetworkConfig,
    SecurityConfig, SubnetNames, VpcConfig,
};
pub use options::{
    ApplicationProtocol, FleetHealthCheckType, FlowLogTrafficType, HealthCheckPort,
    InstanceType, MachineImage, TargetType, VolumeType,
};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

use crate::access::{PolicyConfig, PolicyNames};
use crate::domain::invariants::validate_not_empty;
use crate::domain::{EnvironmentClass, NetworkBlock};
use crate::errors::{PlanError, PlanResult};

/// Complete stack configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StackConfig {
    pub stack_name: String,
    pub environment: EnvironmentConfig,
    /// Applied to every planned resource
    pub tags: BTreeMap<String, String>,
    pub resource_names: ResourceNames,
    pub network: NetworkConfig,
    pub compute: ComputeConfig,
    pub monitoring: MonitoringConfig,
    pub outputs: OutputsConfig,
    pub database: DatabaseConfig,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            stack_name: "WebApp-Dev-MultiAZ-2TierInfra".to_string(),
            environment: EnvironmentConfig::default(),
            tags: BTreeMap::new(),
            resource_names: ResourceNames::default(),
            network: NetworkConfig::default(),
            compute: ComputeConfig::default(),
            monitoring: MonitoringConfig::default(),
            outputs: OutputsConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl StackConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(document: &str) -> PlanResult<Self> {
        let config: StackConfig = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON document from disk
    pub fn from_path(path: impl AsRef<Path>) -> PlanResult<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());

        let document = std::fs::read_to_string(path).map_err(|e| {
            PlanError::config(format!(
                "configuration file {} unreadable: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&document)
    }

    /// Check every invariant of the document
    pub fn validate(&self) -> PlanResult<()> {
        validate_not_empty("stackName", &self.stack_name)?;
        validate_not_empty("environment.name", &self.environment.name)?;
        validate_not_empty("environment.region", &self.environment.region)?;
        for key in self.tags.keys() {
            validate_not_empty("tags key", key)?;
        }

        self.resource_names.validate()?;
        self.network.validate()?;
        self.compute.validate(&self.network.security)?;
        self.database.validate(&self.network.security)?;
        Ok(())
    }

    pub fn environment_class(&self) -> EnvironmentClass {
        EnvironmentClass::classify(&self.environment.name)
    }

    pub fn network_block(&self) -> PlanResult<NetworkBlock> {
        self.network.vpc.network_block()
    }

    /// The single policy both security layers derive from
    pub fn policy(&self) -> PolicyConfig {
        let names = &self.resource_names;
        PolicyConfig {
            security: self.network.security.clone(),
            acls: self.network.network_acls.clone(),
            compute_tier: self.compute.asg.subnet_type,
            edge_internet_facing: self.compute.alb.internet_facing,
            names: PolicyNames {
                public_acl: names.public_network_acl.clone(),
                private_acl: names.private_network_acl.clone(),
                edge: names.alb_security_group.clone(),
                compute: names.asg_security_group.clone(),
                data: names.database_security_group.clone(),
            },
        }
    }

    /// Configured tags plus the `Environment` tag
    pub fn resource_tags(&self) -> BTreeMap<String, String> {
        let mut tags = self.tags.clone();
        tags.insert("Environment".to_string(), self.environment.name.clone());
        tags
    }
}

/// Document file for an environment name
///
/// `production`/`prod` → `production.json`, `staging`/`stag` →
/// `staging.json`, anything else → `development.json`.
pub fn config_file_for_environment(environment_name: &str) -> &'static str {
    match environment_name {
        "production" | "prod" => "production.json",
        "staging" | "stag" => "staging.json",
        _ => "development.json",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub name: String,
    pub region: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            name: "dev".to_string(),
            region: "us-west-2".to_string(),
        }
    }
}

/// Logical names of the planned resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceNames {
    pub vpc: String,
    pub alb_security_group: String,
    pub asg_security_group: String,
    pub database_security_group: String,
    pub public_network_acl: String,
    pub private_network_acl: String,
    pub application_load_balancer: String,
    pub target_group: String,
    pub http_listener: String,
    pub auto_scaling_group: String,
    pub launch_template: String,
    pub cpu_scaling_policy: String,
    pub database: String,
    pub database_subnet_group: String,
    pub database_credentials: String,
    pub vpc_flow_logs_group: String,
    pub vpc_flow_log: String,
}

impl Default for ResourceNames {
    fn default() -> Self {
        Self {
            vpc: "HighlyAvailableVpc".to_string(),
            alb_security_group: "AlbSecurityGroup".to_string(),
            asg_security_group: "AsgSecurityGroup".to_string(),
            database_security_group: "DatabaseSecurityGroup".to_string(),
            public_network_acl: "PublicNetworkAcl".to_string(),
            private_network_acl: "PrivateNetworkAcl".to_string(),
            application_load_balancer: "ApplicationLoadBalancer".to_string(),
            target_group: "WebAppTargetGroup".to_string(),
            http_listener: "HttpListener".to_string(),
            auto_scaling_group: "WebAppAutoScalingGroup".to_string(),
            launch_template: "WebAppLaunchTemplate".to_string(),
            cpu_scaling_policy: "CpuScaling".to_string(),
            database: "Database".to_string(),
            database_subnet_group: "DatabaseSubnetGroup".to_string(),
            database_credentials: "DatabaseCredentials".to_string(),
            vpc_flow_logs_group: "VpcFlowLogsGroup".to_string(),
            vpc_flow_log: "VpcFlowLog".to_string(),
        }
    }
}

impl ResourceNames {
    fn entries(&self) -> [(&'static str, &str); 17] {
        [
            ("vpc", self.vpc.as_str()),
            ("albSecurityGroup", self.alb_security_group.as_str()),
            ("asgSecurityGroup", self.asg_security_group.as_str()),
            ("databaseSecurityGroup", self.database_security_group.as_str()),
            ("publicNetworkAcl", self.public_network_acl.as_str()),
            ("privateNetworkAcl", self.private_network_acl.as_str()),
            ("applicationLoadBalancer", self.application_load_balancer.as_str()),
            ("targetGroup", self.target_group.as_str()),
            ("httpListener", self.http_listener.as_str()),
            ("autoScalingGroup", self.auto_scaling_group.as_str()),
            ("launchTemplate", self.launch_template.as_str()),
            ("cpuScalingPolicy", self.cpu_scaling_policy.as_str()),
            ("database", self.database.as_str()),
            ("databaseSubnetGroup", self.database_subnet_group.as_str()),
            ("databaseCredentials", self.database_credentials.as_str()),
            ("vpcFlowLogsGroup", self.vpc_flow_logs_group.as_str()),
            ("vpcFlowLog", self.vpc_flow_log.as_str()),
        ]
    }

    fn validate(&self) -> PlanResult<()> {
        let mut seen = BTreeSet::new();
        for (field, name) in self.entries() {
            validate_not_empty(&format!("resourceNames.{}", field), name)?;
            if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(PlanError::config(format!(
                    "resourceNames.{} '{}' may only contain letters, digits or '-'",
                    field, name
                )));
            }
            if !seen.insert(name) {
                return Err(PlanError::config(format!(
                    "resourceNames.{} '{}' is already used by another resource",
                    field, name
                )));
            }
        }
        Ok(())
    }
}

/// Fleet monitoring switches
///
/// Log retention is configured per log source (`network.vpc` and
/// `database.cloudWatchLogs`); a document-level `cloudWatchLogsRetention`
/// key here is ignored like any other unknown field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonitoringConfig {
    pub enable_detailed_monitoring: bool,
    pub metric_collection_granularity: String,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enable_detailed_monitoring: false,
            metric_collection_granularity: "1Minute".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputsConfig {
    /// Empty means `<environment>-HighlyAvailable2Tier`
    pub export_prefix: String,
    pub enabled: OutputToggles,
}

/// Per-entry switches of the export table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputToggles {
    pub vpc_id: bool,
    pub vpc_cidr: bool,
    pub load_balancer_dns: bool,
    pub load_balancer_arn: bool,
    pub application_url: bool,
    pub auto_scaling_group_name: bool,
    pub auto_scaling_group_arn: bool,
    pub database_endpoint: bool,
    pub database_port: bool,
    pub database_secret_arn: bool,
}

impl Default for OutputToggles {
    fn default() -> Self {
        Self {
            vpc_id: true,
            vpc_cidr: true,
            load_balancer_dns: true,
            load_balancer_arn: true,
            application_url: true,
            auto_scaling_group_name: true,
            auto_scaling_group_arn: true,
            database_endpoint: true,
            database_port: true,
            database_secret_arn: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn test_monitoring_log_retention_key_is_ignored() {
        let config = StackConfig::from_json_str(
            r#"{ "monitoring": { "enableDetailedMonitoring": true, "cloudWatchLogsRetention": 90 } }"#,
        )
        .unwrap();
        assert!(config.monitoring.enable_detailed_monitoring);
        assert_eq!(config.database.cloud_watch_logs.retention, 7);

        let rendered = serde_json::to_value(&config.monitoring).unwrap();
        assert!(rendered.get("cloudWatchLogsRetention").is_none());
    }

    #[test]
    fn test_empty_document_is_all_defaults() {
        let config = StackConfig::from_json_str("{}").unwrap();
        assert_eq!(config, StackConfig::default());
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config = StackConfig::from_json_str(
            r#"{ "network": { "security": { "dbPort": 5432 } },
                 "database": { "engine": "postgres" } }"#,
        )
        .unwrap();
        assert_eq!(config.network.security.db_port, 5432);
        assert_eq!(config.network.security.http_port, 80);
        assert_eq!(config.database.engine, "postgres");
    }

    #[test]
    fn test_invalid_json_is_configuration_error() {
        assert!(matches!(
            StackConfig::from_json_str("{ not json"),
            Err(PlanError::Configuration(_))
        ));
    }

    #[test]
    fn test_unknown_enum_value_rejected() {
        let result = StackConfig::from_json_str(
            r#"{ "compute": { "alb": { "targetType": "container" } } }"#,
        );
        assert!(matches!(result, Err(PlanError::Configuration(_))));
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        assert!(matches!(
            StackConfig::from_path("/nonexistent/development.json"),
            Err(PlanError::Configuration(_))
        ));
    }

    #[test]
    fn test_duplicate_resource_names_rejected() {
        let mut config = StackConfig::default();
        config.resource_names.database = "AlbSecurityGroup".to_string();
        assert!(matches!(
            config.validate(),
            Err(PlanError::Configuration(_))
        ));
    }

    #[test_case("production", "production.json")]
    #[test_case("prod", "production.json")]
    #[test_case("staging", "staging.json")]
    #[test_case("stag", "staging.json")]
    #[test_case("dev", "development.json")]
    #[test_case("Production", "development.json")]
    fn test_config_file_for_environment(name: &str, expected: &str) {
        assert_eq!(config_file_for_environment(name), expected);
    }

    #[test]
    fn test_resource_tags_include_environment() {
        let mut config = StackConfig::default();
        config
            .tags
            .insert("Project".to_string(), "WebApp".to_string());
        let tags = config.resource_tags();
        assert_eq!(tags.get("Environment").map(String::as_str), Some("dev"));
        assert_eq!(tags.get("Project").map(String::as_str), Some("WebApp"));
    }
}
