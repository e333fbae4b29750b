// Copyright (c) 2025 - Cowboy AI, Inc.
//! Planned Resource Taxonomy
//!
//! Defines the set of provider resource kinds a topology plan can request.
//! This is the vocabulary shared between the composition engine and the
//! provider collaborator that fulfills the plan.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of provider resource described by a plan entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    // Network
    /// Virtual private network block
    Vpc,
    /// Internet gateway attached to the VPC
    InternetGateway,
    /// Subnet in one availability zone and tier
    Subnet,
    /// Route table bound to one subnet
    RouteTable,
    /// NAT gateway with its elastic address
    NatGateway,

    // Observability
    /// Log destination
    LogGroup,
    /// VPC traffic log
    FlowLog,

    // Security
    /// Stateless subnet ACL
    NetworkAcl,
    /// Numbered entry of a subnet ACL
    NetworkAclEntry,
    /// Stateful instance-level boundary
    SecurityGroup,
    /// Ingress rule attached to a security group
    SecurityGroupIngress,
    /// Egress rule attached to a security group
    SecurityGroupEgress,
    /// Generated credential secret
    Secret,
    /// Read-only grant on a secret
    SecretReadGrant,

    // Load balancing
    /// Application load balancer
    LoadBalancer,
    /// Target group behind a listener
    TargetGroup,
    /// Listener forwarding to a target group
    Listener,

    // Compute
    /// Instance launch template
    LaunchTemplate,
    /// Auto scaling group
    AutoScalingGroup,
    /// Target-tracking scaling policy
    ScalingPolicy,

    // Data
    /// Database subnet group
    DbSubnetGroup,
    /// Managed database instance
    DbInstance,
}

impl ResourceKind {
    /// Provider type name of this kind
    pub fn provider_type(&self) -> &'static str {
        match self {
            Self::Vpc => "AWS::EC2::VPC",
            Self::InternetGateway => "AWS::EC2::InternetGateway",
            Self::Subnet => "AWS::EC2::Subnet",
            Self::RouteTable => "AWS::EC2::RouteTable",
            Self::NatGateway => "AWS::EC2::NatGateway",
            Self::LogGroup => "AWS::Logs::LogGroup",
            Self::FlowLog => "AWS::EC2::FlowLog",
            Self::NetworkAcl => "AWS::EC2::NetworkAcl",
            Self::NetworkAclEntry => "AWS::EC2::NetworkAclEntry",
            Self::SecurityGroup => "AWS::EC2::SecurityGroup",
            Self::SecurityGroupIngress => "AWS::EC2::SecurityGroupIngress",
            Self::SecurityGroupEgress => "AWS::EC2::SecurityGroupEgress",
            Self::Secret => "AWS::SecretsManager::Secret",
            Self::SecretReadGrant => "AWS::IAM::Policy",
            Self::LoadBalancer => "AWS::ElasticLoadBalancingV2::LoadBalancer",
            Self::TargetGroup => "AWS::ElasticLoadBalancingV2::TargetGroup",
            Self::Listener => "AWS::ElasticLoadBalancingV2::Listener",
            Self::LaunchTemplate => "AWS::EC2::LaunchTemplate",
            Self::AutoScalingGroup => "AWS::AutoScaling::AutoScalingGroup",
            Self::ScalingPolicy => "AWS::AutoScaling::ScalingPolicy",
            Self::DbSubnetGroup => "AWS::RDS::DBSubnetGroup",
            Self::DbInstance => "AWS::RDS::DBInstance",
        }
    }

    /// Get human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Vpc => "VPC",
            Self::InternetGateway => "Internet Gateway",
            Self::Subnet => "Subnet",
            Self::RouteTable => "Route Table",
            Self::NatGateway => "NAT Gateway",
            Self::LogGroup => "Log Group",
            Self::FlowLog => "Flow Log",
            Self::NetworkAcl => "Network ACL",
            Self::NetworkAclEntry => "Network ACL Entry",
            Self::SecurityGroup => "Security Group",
            Self::SecurityGroupIngress => "Security Group Ingress Rule",
            Self::SecurityGroupEgress => "Security Group Egress Rule",
            Self::Secret => "Secret",
            Self::SecretReadGrant => "Secret Read Grant",
            Self::LoadBalancer => "Load Balancer",
            Self::TargetGroup => "Target Group",
            Self::Listener => "Listener",
            Self::LaunchTemplate => "Launch Template",
            Self::AutoScalingGroup => "Auto Scaling Group",
            Self::ScalingPolicy => "Scaling Policy",
            Self::DbSubnetGroup => "DB Subnet Group",
            Self::DbInstance => "DB Instance",
        }
    }

    /// Get the primary category for this kind
    pub fn category(&self) -> ResourceCategory {
        match self {
            Self::Vpc
            | Self::InternetGateway
            | Self::Subnet
            | Self::RouteTable
            | Self::NatGateway => ResourceCategory::Network,

            Self::LogGroup | Self::FlowLog => ResourceCategory::Observability,

            Self::NetworkAcl
            | Self::NetworkAclEntry
            | Self::SecurityGroup
            | Self::SecurityGroupIngress
            | Self::SecurityGroupEgress
            | Self::Secret
            | Self::SecretReadGrant => ResourceCategory::Security,

            Self::LoadBalancer | Self::TargetGroup | Self::Listener => {
                ResourceCategory::LoadBalancing
            }

            Self::LaunchTemplate | Self::AutoScalingGroup | Self::ScalingPolicy => {
                ResourceCategory::Compute
            }

            Self::DbSubnetGroup | Self::DbInstance => ResourceCategory::Data,
        }
    }

    /// Whether teardown of this kind can destroy data
    pub fn is_stateful(&self) -> bool {
        matches!(self, Self::DbInstance | Self::LogGroup | Self::Secret)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Resource category (high-level grouping)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceCategory {
    /// Addressing and routing
    Network,
    /// Traffic and audit logging
    Observability,
    /// Access control and credentials
    Security,
    /// Load balancing
    LoadBalancing,
    /// Instances and scaling
    Compute,
    /// Managed data stores
    Data,
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "Network"),
            Self::Observability => write!(f, "Observability"),
            Self::Security => write!(f, "Security"),
            Self::LoadBalancing => write!(f, "Load Balancing"),
            Self::Compute => write!(f, "Compute"),
            Self::Data => write!(f, "Data"),
        }
    }
}
