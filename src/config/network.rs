// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network section: VPC layout, security ports and subnet ACL rules

use serde::{Deserialize, Serialize};

use super::options::FlowLogTrafficType;
use crate::domain::invariants::{
    validate_not_empty, validate_not_widened, validate_port, validate_range,
    validate_rule_number,
};
use crate::domain::{Ipv4Cidr, NetworkBlock, PortRange, RemovalPolicy};
use crate::errors::{PlanError, PlanResult};
use crate::topology::MAX_AVAILABILITY_ZONES;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkConfig {
    pub vpc: VpcConfig,
    pub security: SecurityConfig,
    pub network_acls: NetworkAclConfig,
}

impl NetworkConfig {
    pub(crate) fn validate(&self) -> PlanResult<()> {
        self.vpc.validate()?;
        self.security.validate()?;
        self.network_acls.validate()?;
        Ok(())
    }
}

/// VPC layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VpcConfig {
    pub cidr: Ipv4Cidr,
    /// Number of availability zones to spread subnets across
    pub max_azs: u8,
    /// Requested NAT gateways; clamped to `max_azs`
    pub nat_gateways_count: u8,
    /// Prefix length shared by every subnet
    pub subnet_cidr_mask: u8,
    pub enable_flow_logs: bool,
    pub flow_logs_retention_days: u32,
    pub subnets: SubnetNames,
    pub flow_logs: FlowLogsConfig,
}

impl Default for VpcConfig {
    fn default() -> Self {
        Self {
            cidr: Ipv4Cidr::default_vpc(),
            max_azs: 2,
            nat_gateways_count: 2,
            subnet_cidr_mask: 24,
            enable_flow_logs: true,
            flow_logs_retention_days: 7,
            subnets: SubnetNames::default(),
            flow_logs: FlowLogsConfig::default(),
        }
    }
}

impl VpcConfig {
    /// Validated address plan for this VPC
    pub fn network_block(&self) -> PlanResult<NetworkBlock> {
        NetworkBlock::new(self.cidr, self.max_azs, self.subnet_cidr_mask)
    }

    fn validate(&self) -> PlanResult<()> {
        validate_range(
            "network.vpc.maxAzs",
            i64::from(self.max_azs),
            1,
            i64::from(MAX_AVAILABILITY_ZONES),
        )?;
        self.network_block()?;
        validate_not_empty(
            "network.vpc.subnets.publicSubnetName",
            &self.subnets.public_subnet_name,
        )?;
        validate_not_empty(
            "network.vpc.subnets.privateSubnetName",
            &self.subnets.private_subnet_name,
        )?;
        validate_not_empty(
            "network.vpc.subnets.isolatedSubnetName",
            &self.subnets.isolated_subnet_name,
        )?;
        if self.enable_flow_logs {
            validate_range(
                "network.vpc.flowLogsRetentionDays",
                i64::from(self.flow_logs_retention_days),
                1,
                i64::from(u32::MAX),
            )?;
        }
        Ok(())
    }
}

/// Subnet group names per tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubnetNames {
    pub public_subnet_name: String,
    pub private_subnet_name: String,
    pub isolated_subnet_name: String,
}

impl Default for SubnetNames {
    fn default() -> Self {
        Self {
            public_subnet_name: "Public".to_string(),
            private_subnet_name: "Private".to_string(),
            isolated_subnet_name: "Isolated".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlowLogsConfig {
    pub traffic_type: FlowLogTrafficType,
    /// Unset means the environment default
    pub log_group_removal_policy: Option<RemovalPolicy>,
}

impl Default for FlowLogsConfig {
    fn default() -> Self {
        Self {
            traffic_type: FlowLogTrafficType::All,
            log_group_removal_policy: None,
        }
    }
}

/// Ports and widening switches shared by both security layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SecurityConfig {
    /// Sources allowed to reach the load balancer
    pub allow_http_from: Ipv4Cidr,
    pub http_port: u16,
    pub https_port: u16,
    pub db_port: u16,
    pub alb_allow_all_outbound: bool,
    pub asg_allow_all_outbound: bool,
    pub db_allow_all_outbound: bool,
    /// Lets the compute tier reach HTTP/HTTPS anywhere
    pub allow_package_downloads: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allow_http_from: Ipv4Cidr::any(),
            http_port: 80,
            https_port: 443,
            db_port: 3306,
            alb_allow_all_outbound: false,
            asg_allow_all_outbound: false,
            db_allow_all_outbound: false,
            allow_package_downloads: false,
        }
    }
}

impl SecurityConfig {
    fn validate(&self) -> PlanResult<()> {
        validate_port("network.security.httpPort", self.http_port)?;
        validate_port("network.security.httpsPort", self.https_port)?;
        validate_port("network.security.dbPort", self.db_port)?;
        validate_not_widened(
            "network.security.albAllowAllOutbound",
            self.alb_allow_all_outbound,
        )?;
        validate_not_widened(
            "network.security.asgAllowAllOutbound",
            self.asg_allow_all_outbound,
        )?;
        validate_not_widened("network.security.dbAllowAllOutbound", self.db_allow_all_outbound)?;
        Ok(())
    }
}

/// Custom subnet ACLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkAclConfig {
    /// When off, every tier keeps the provider default ACL
    pub enabled: bool,
    pub rules: AclRuleConfig,
    pub ephemeral_ports: EphemeralPorts,
}

impl Default for NetworkAclConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rules: AclRuleConfig::default(),
            ephemeral_ports: EphemeralPorts::default(),
        }
    }
}

impl NetworkAclConfig {
    /// Ephemeral return-traffic range
    pub fn ephemeral_range(&self) -> PlanResult<PortRange> {
        let EphemeralPorts { start, end } = self.ephemeral_ports;
        if start == 0 {
            return Err(PlanError::config(
                "network.networkAcls.ephemeralPorts.start must be at least 1",
            ));
        }
        Ok(PortRange::new(start, end)?)
    }

    fn validate(&self) -> PlanResult<()> {
        self.ephemeral_range()?;
        if !self.enabled {
            return Ok(());
        }

        let rules = &self.rules;
        let numbered = [
            (
                "httpInboundRuleNumber",
                rules.enable_http_inbound,
                rules.http_inbound_rule_number,
            ),
            (
                "httpsInboundRuleNumber",
                rules.enable_https_inbound,
                rules.https_inbound_rule_number,
            ),
            (
                "ephemeralInboundRuleNumber",
                rules.enable_ephemeral_inbound,
                rules.ephemeral_inbound_rule_number,
            ),
            (
                "allOutboundRuleNumber",
                rules.enable_all_outbound,
                rules.all_outbound_rule_number,
            ),
            (
                "privateHttpRuleNumber",
                rules.enable_private_http_inbound,
                rules.private_http_rule_number,
            ),
            (
                "privateDatabaseRuleNumber",
                rules.enable_private_database_inbound,
                rules.private_database_rule_number,
            ),
            (
                "privateEphemeralRuleNumber",
                rules.enable_private_ephemeral_inbound,
                rules.private_ephemeral_rule_number,
            ),
            (
                "privateAllOutboundRuleNumber",
                rules.enable_private_all_outbound,
                rules.private_all_outbound_rule_number(),
            ),
        ];
        for (field, enabled, number) in numbered {
            if enabled {
                validate_rule_number(&format!("network.networkAcls.rules.{}", field), number)?;
            }
        }
        Ok(())
    }
}

/// Per-rule toggles and numbers of the public and private ACLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AclRuleConfig {
    pub http_inbound_rule_number: u16,
    pub enable_http_inbound: bool,
    pub https_inbound_rule_number: u16,
    pub enable_https_inbound: bool,
    pub ephemeral_inbound_rule_number: u16,
    pub enable_ephemeral_inbound: bool,
    pub all_outbound_rule_number: u16,
    pub enable_all_outbound: bool,
    pub private_http_rule_number: u16,
    pub enable_private_http_inbound: bool,
    pub private_database_rule_number: u16,
    pub enable_private_database_inbound: bool,
    pub private_ephemeral_rule_number: u16,
    pub enable_private_ephemeral_inbound: bool,
    /// Falls back to `all_outbound_rule_number` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_all_outbound_rule_number: Option<u16>,
    pub enable_private_all_outbound: bool,
}

impl Default for AclRuleConfig {
    fn default() -> Self {
        Self {
            http_inbound_rule_number: 100,
            enable_http_inbound: true,
            https_inbound_rule_number: 105,
            enable_https_inbound: true,
            ephemeral_inbound_rule_number: 110,
            enable_ephemeral_inbound: true,
            all_outbound_rule_number: 100,
            enable_all_outbound: true,
            private_http_rule_number: 100,
            enable_private_http_inbound: true,
            private_database_rule_number: 110,
            enable_private_database_inbound: true,
            private_ephemeral_rule_number: 120,
            enable_private_ephemeral_inbound: true,
            private_all_outbound_rule_number: None,
            enable_private_all_outbound: true,
        }
    }
}

impl AclRuleConfig {
    pub fn private_all_outbound_rule_number(&self) -> u16 {
        self.private_all_outbound_rule_number
            .unwrap_or(self.all_outbound_rule_number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EphemeralPorts {
    pub start: u16,
    pub end: u16,
}

impl Default for EphemeralPorts {
    fn default() -> Self {
        Self {
            start: 1024,
            end: 65535,
        }
    }
}
