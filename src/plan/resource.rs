// Copyright (c) 2025 - Cowboy AI, Inc.
//! Planned resource descriptions

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::access::acl::{NetworkAclEntrySpec, NetworkAclSpec};
use crate::access::boundary::{SecurityGroupRuleSpec, SecurityGroupSpec};
use crate::compute::{
    AutoScalingGroupSpec, LaunchTemplateSpec, ScalingPolicySpec, SecretReadGrantSpec,
};
use crate::database::{DbInstanceSpec, DbSubnetGroupSpec, SecretSpec};
use crate::domain::ResourceKind;
use crate::load_balancer::{ListenerSpec, LoadBalancerSpec, TargetGroupSpec};
use crate::topology::{
    FlowLogSpec, InternetGatewaySpec, LogGroupSpec, NatGatewaySpec, RouteTableSpec, SubnetSpec,
    VpcSpec,
};

/// Stable identifier of a planned resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier of a resource nested under this one
    pub fn child(&self, suffix: impl fmt::Display) -> Self {
        Self(format!("{}{}", self.0, suffix))
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LogicalId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for LogicalId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&String> for LogicalId {
    fn from(id: &String) -> Self {
        Self(id.clone())
    }
}

/// Provider-facing properties of one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceSpec {
    Vpc(VpcSpec),
    InternetGateway(InternetGatewaySpec),
    Subnet(SubnetSpec),
    RouteTable(RouteTableSpec),
    NatGateway(NatGatewaySpec),
    LogGroup(LogGroupSpec),
    FlowLog(FlowLogSpec),
    NetworkAcl(NetworkAclSpec),
    NetworkAclEntry(NetworkAclEntrySpec),
    SecurityGroup(SecurityGroupSpec),
    SecurityGroupIngress(SecurityGroupRuleSpec),
    SecurityGroupEgress(SecurityGroupRuleSpec),
    Secret(SecretSpec),
    SecretReadGrant(SecretReadGrantSpec),
    LoadBalancer(LoadBalancerSpec),
    TargetGroup(TargetGroupSpec),
    Listener(ListenerSpec),
    LaunchTemplate(LaunchTemplateSpec),
    AutoScalingGroup(AutoScalingGroupSpec),
    ScalingPolicy(ScalingPolicySpec),
    DbSubnetGroup(DbSubnetGroupSpec),
    DbInstance(DbInstanceSpec),
}

impl ResourceSpec {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Vpc(_) => ResourceKind::Vpc,
            Self::InternetGateway(_) => ResourceKind::InternetGateway,
            Self::Subnet(_) => ResourceKind::Subnet,
            Self::RouteTable(_) => ResourceKind::RouteTable,
            Self::NatGateway(_) => ResourceKind::NatGateway,
            Self::LogGroup(_) => ResourceKind::LogGroup,
            Self::FlowLog(_) => ResourceKind::FlowLog,
            Self::NetworkAcl(_) => ResourceKind::NetworkAcl,
            Self::NetworkAclEntry(_) => ResourceKind::NetworkAclEntry,
            Self::SecurityGroup(_) => ResourceKind::SecurityGroup,
            Self::SecurityGroupIngress(_) => ResourceKind::SecurityGroupIngress,
            Self::SecurityGroupEgress(_) => ResourceKind::SecurityGroupEgress,
            Self::Secret(_) => ResourceKind::Secret,
            Self::SecretReadGrant(_) => ResourceKind::SecretReadGrant,
            Self::LoadBalancer(_) => ResourceKind::LoadBalancer,
            Self::TargetGroup(_) => ResourceKind::TargetGroup,
            Self::Listener(_) => ResourceKind::Listener,
            Self::LaunchTemplate(_) => ResourceKind::LaunchTemplate,
            Self::AutoScalingGroup(_) => ResourceKind::AutoScalingGroup,
            Self::ScalingPolicy(_) => ResourceKind::ScalingPolicy,
            Self::DbSubnetGroup(_) => ResourceKind::DbSubnetGroup,
            Self::DbInstance(_) => ResourceKind::DbInstance,
        }
    }
}

/// One entry of a plan: what to request and what must exist first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescription {
    pub logical_id: LogicalId,
    pub kind: ResourceKind,
    pub depends_on: Vec<LogicalId>,
    pub properties: ResourceSpec,
}

impl ResourceDescription {
    pub fn new(logical_id: LogicalId, properties: ResourceSpec, depends_on: Vec<LogicalId>) -> Self {
        Self {
            logical_id,
            kind: properties.kind(),
            depends_on,
            properties,
        }
    }
}
