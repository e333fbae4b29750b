// Copyright (c) 2025 - Cowboy AI, Inc.
//! Export Table
//!
//! A read-only projection of the identifiers a finished stack exposes. Values
//! are references to provider attributes of planned resources; the provider
//! resolves them after provisioning.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{OutputToggles, OutputsConfig};
use crate::plan::LogicalId;

/// Provider attribute of a planned resource, optionally prefixed (`http://`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportValue {
    pub resource: LogicalId,
    pub attribute: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl ExportValue {
    pub fn attribute(resource: &LogicalId, attribute: &str) -> Self {
        Self {
            resource: resource.clone(),
            attribute: attribute.to_string(),
            prefix: None,
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }
}

impl fmt::Display for ExportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}${{{}.{}}}",
            self.prefix.as_deref().unwrap_or(""),
            self.resource,
            self.attribute
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEntry {
    pub key: String,
    pub value: ExportValue,
    pub description: String,
    /// Cross-stack export name; `None` keeps the entry stack-local
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_name: Option<String>,
}

/// Flat key → value export table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExportTable {
    pub entries: Vec<ExportEntry>,
}

impl ExportTable {
    pub fn get(&self, key: &str) -> Option<&ExportEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Planned resources the exports point at
#[derive(Debug, Clone, Copy)]
pub struct ExportSources<'a> {
    pub vpc: &'a LogicalId,
    pub load_balancer: &'a LogicalId,
    pub auto_scaling_group: &'a LogicalId,
    pub database: &'a LogicalId,
    pub secret: &'a LogicalId,
}

/// Export name prefix: the configured one, or `<environment>-HighlyAvailable2Tier`
pub fn export_prefix(config: &OutputsConfig, environment_name: &str) -> String {
    if config.export_prefix.is_empty() {
        format!("{}-HighlyAvailable2Tier", environment_name)
    } else {
        config.export_prefix.clone()
    }
}

/// Build the export table, skipping toggled-off entries
pub fn build_exports(
    sources: ExportSources<'_>,
    config: &OutputsConfig,
    environment_name: &str,
) -> ExportTable {
    let prefix = export_prefix(config, environment_name);
    let toggles: OutputToggles = config.enabled;

    // (enabled, key, value, description, exported)
    let candidates = [
        (
            toggles.vpc_id,
            "VpcId",
            ExportValue::attribute(sources.vpc, "VpcId"),
            "VPC ID",
            true,
        ),
        (
            toggles.vpc_cidr,
            "VpcCidr",
            ExportValue::attribute(sources.vpc, "CidrBlock"),
            "VPC CIDR Block",
            true,
        ),
        (
            toggles.load_balancer_dns,
            "LoadBalancerDNS",
            ExportValue::attribute(sources.load_balancer, "DNSName"),
            "Application Load Balancer DNS Name",
            true,
        ),
        (
            toggles.load_balancer_arn,
            "LoadBalancerARN",
            ExportValue::attribute(sources.load_balancer, "Arn"),
            "Application Load Balancer ARN",
            true,
        ),
        (
            toggles.application_url,
            "ApplicationURL",
            ExportValue::attribute(sources.load_balancer, "DNSName").with_prefix("http://"),
            "Full Application URL",
            false,
        ),
        (
            toggles.auto_scaling_group_name,
            "AutoScalingGroupName",
            ExportValue::attribute(sources.auto_scaling_group, "Name"),
            "Auto Scaling Group Name",
            true,
        ),
        (
            toggles.auto_scaling_group_arn,
            "AutoScalingGroupARN",
            ExportValue::attribute(sources.auto_scaling_group, "Arn"),
            "Auto Scaling Group ARN",
            true,
        ),
        (
            toggles.database_endpoint,
            "DatabaseEndpoint",
            ExportValue::attribute(sources.database, "Endpoint.Address"),
            "Database Endpoint Address",
            true,
        ),
        (
            toggles.database_port,
            "DatabasePort",
            ExportValue::attribute(sources.database, "Endpoint.Port"),
            "Database Port",
            true,
        ),
        (
            toggles.database_secret_arn,
            "DatabaseSecretArn",
            ExportValue::attribute(sources.secret, "Arn"),
            "ARN of the secret containing database credentials",
            false,
        ),
    ];

    let entries = candidates
        .into_iter()
        .filter(|(enabled, ..)| *enabled)
        .map(|(_, key, value, description, exported)| ExportEntry {
            key: key.to_string(),
            value,
            description: description.to_string(),
            export_name: exported.then(|| format!("{}-{}", prefix, key)),
        })
        .collect();

    ExportTable { entries }
}
