// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Topology Builder
//!
//! Lays out the VPC: one subnet per (availability zone, tier), an internet
//! gateway, NAT gateways for the private-with-egress tier, one route table
//! per subnet and optional flow logging.
//!
//! # Allocation
//!
//! Subnets are carved sequentially from the start of the VPC block, tier by
//! tier and AZ by AZ:
//!
//! ```text
//! 10.0.0.0/16, 2 AZs, /24
//!   Public   AZ a  10.0.0.0/24     Public   AZ b  10.0.1.0/24
//!   Private  AZ a  10.0.2.0/24     Private  AZ b  10.0.3.0/24
//!   Isolated AZ a  10.0.4.0/24     Isolated AZ b  10.0.5.0/24
//! ```
//!
//! NAT gateways sit in the public subnets of the first AZs; when there are
//! fewer NATs than AZs, private subnets share them round-robin.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{FlowLogTrafficType, StackConfig};
use crate::domain::{
    EnvironmentClass, Ipv4Cidr, NetworkBlock, RemovalPolicy, RetentionClass, SubnetTier,
};
use crate::errors::{PlanError, PlanResult};
use crate::plan::{LogicalId, PlanBuilder, ResourceSpec};

/// Most availability zones a region offers
pub const MAX_AVAILABILITY_ZONES: u8 = 6;

/// Options shaping the topology beyond the address plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyOptions {
    pub region: String,
    pub vpc_name: String,
    pub public_subnet_name: String,
    pub private_subnet_name: String,
    pub isolated_subnet_name: String,
    /// Requested NAT gateways; clamped to the AZ count
    pub nat_gateways: u8,
    pub flow_logs: Option<FlowLogOptions>,
}

impl TopologyOptions {
    /// Options from a validated configuration
    pub fn from_config(config: &StackConfig, environment: EnvironmentClass) -> Self {
        let vpc = &config.network.vpc;
        let flow_logs = vpc.enable_flow_logs.then(|| FlowLogOptions {
            log_group_name: config.resource_names.vpc_flow_logs_group.clone(),
            flow_log_name: config.resource_names.vpc_flow_log.clone(),
            retention_days: vpc.flow_logs_retention_days,
            removal_policy: vpc
                .flow_logs
                .log_group_removal_policy
                .unwrap_or_else(|| environment.default_log_removal_policy()),
            traffic_type: vpc.flow_logs.traffic_type,
        });

        Self {
            region: config.environment.region.clone(),
            vpc_name: config.resource_names.vpc.clone(),
            public_subnet_name: vpc.subnets.public_subnet_name.clone(),
            private_subnet_name: vpc.subnets.private_subnet_name.clone(),
            isolated_subnet_name: vpc.subnets.isolated_subnet_name.clone(),
            nat_gateways: vpc.nat_gateways_count,
            flow_logs,
        }
    }

    fn subnet_name(&self, tier: SubnetTier) -> &str {
        match tier {
            SubnetTier::Public => &self.public_subnet_name,
            SubnetTier::PrivateEgress => &self.private_subnet_name,
            SubnetTier::PrivateIsolated => &self.isolated_subnet_name,
        }
    }
}

impl Default for TopologyOptions {
    fn default() -> Self {
        Self {
            region: "us-west-2".to_string(),
            vpc_name: "HighlyAvailableVpc".to_string(),
            public_subnet_name: SubnetTier::Public.default_name().to_string(),
            private_subnet_name: SubnetTier::PrivateEgress.default_name().to_string(),
            isolated_subnet_name: SubnetTier::PrivateIsolated.default_name().to_string(),
            nat_gateways: 1,
            flow_logs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowLogOptions {
    pub log_group_name: String,
    pub flow_log_name: String,
    /// Requested days, resolved to a retention class
    pub retention_days: u32,
    pub removal_policy: RemovalPolicy,
    pub traffic_type: FlowLogTrafficType,
}

/// The built network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    pub vpc: LogicalId,
    pub cidr: Ipv4Cidr,
    pub availability_zones: Vec<String>,
    /// Allocation order: tier-major, then AZ
    pub subnets: Vec<PlannedSubnet>,
    pub internet_gateway: LogicalId,
    pub nat_gateways: Vec<LogicalId>,
    pub flow_log: Option<FlowLogConfig>,
}

impl Topology {
    pub fn subnets_in(&self, tier: SubnetTier) -> impl Iterator<Item = &PlannedSubnet> + '_ {
        self.subnets.iter().filter(move |s| s.tier == tier)
    }

    pub fn subnet_ids(&self, tier: SubnetTier) -> Vec<LogicalId> {
        self.subnets_in(tier).map(|s| s.logical_id.clone()).collect()
    }

    pub fn subnet_cidrs(&self, tier: SubnetTier) -> Vec<Ipv4Cidr> {
        self.subnets_in(tier).map(|s| s.cidr).collect()
    }

    /// Whether hosts in `subnet` can open connections to the internet
    pub fn has_internet_egress(&self, subnet: &PlannedSubnet) -> bool {
        match subnet.tier {
            SubnetTier::Public => true,
            SubnetTier::PrivateEgress => subnet.nat_gateway.is_some(),
            SubnetTier::PrivateIsolated => false,
        }
    }
}

/// One planned subnet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSubnet {
    pub logical_id: LogicalId,
    pub tier: SubnetTier,
    pub az_index: u8,
    pub availability_zone: String,
    pub cidr: Ipv4Cidr,
    pub route_table: LogicalId,
    /// NAT carrying this subnet's default route
    pub nat_gateway: Option<LogicalId>,
}

/// Resolved flow logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowLogConfig {
    pub log_group: LogicalId,
    pub flow_log: LogicalId,
    pub retention: RetentionClass,
    pub removal_policy: RemovalPolicy,
    pub traffic_type: FlowLogTrafficType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VpcSpec {
    pub cidr: Ipv4Cidr,
    pub availability_zones: Vec<String>,
    pub enable_dns_hostnames: bool,
    pub enable_dns_support: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternetGatewaySpec {
    pub vpc: LogicalId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetSpec {
    pub vpc: LogicalId,
    pub tier: SubnetTier,
    pub group_name: String,
    pub availability_zone: String,
    pub cidr: Ipv4Cidr,
    pub map_public_ip_on_launch: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTableSpec {
    pub vpc: LogicalId,
    pub subnet: LogicalId,
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub destination: Ipv4Cidr,
    pub target: RouteTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteTarget {
    InternetGateway(LogicalId),
    NatGateway(LogicalId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NatGatewaySpec {
    pub subnet: LogicalId,
    pub availability_zone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogGroupSpec {
    pub retention: RetentionClass,
    pub removal_policy: RemovalPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowLogSpec {
    pub vpc: LogicalId,
    pub log_group: LogicalId,
    pub traffic_type: FlowLogTrafficType,
}

/// Availability zone name: region plus a letter suffix
pub fn availability_zone_name(region: &str, az_index: u8) -> PlanResult<String> {
    if az_index >= MAX_AVAILABILITY_ZONES {
        return Err(PlanError::config(format!(
            "availability zone index {} exceeds the {} zones a region offers",
            az_index, MAX_AVAILABILITY_ZONES
        )));
    }
    Ok(format!("{}{}", region, char::from(b'a' + az_index)))
}

/// Build the network topology and register its resources
///
/// # Errors
/// `Configuration` when the block holds more AZs than a region offers.
pub fn build_topology(
    block: &NetworkBlock,
    options: &TopologyOptions,
    plan: &mut PlanBuilder,
) -> PlanResult<Topology> {
    let az_count = block.az_count();
    let availability_zones = (0..az_count)
        .map(|az| availability_zone_name(&options.region, az))
        .collect::<PlanResult<Vec<_>>>()?;

    let nat_count = if options.nat_gateways > az_count {
        warn!(
            "Requested {} NAT gateways but only {} AZs; clamping to {}",
            options.nat_gateways, az_count, az_count
        );
        az_count
    } else {
        options.nat_gateways
    };

    info!(
        "Building topology {} across {} AZs with {} NAT gateways",
        block.cidr(),
        az_count,
        nat_count
    );

    let vpc = plan.add(
        options.vpc_name.as_str(),
        ResourceSpec::Vpc(VpcSpec {
            cidr: block.cidr(),
            availability_zones: availability_zones.clone(),
            enable_dns_hostnames: true,
            enable_dns_support: true,
        }),
        vec![],
    )?;

    let internet_gateway = plan.add(
        vpc.child("InternetGateway"),
        ResourceSpec::InternetGateway(InternetGatewaySpec { vpc: vpc.clone() }),
        vec![vpc.clone()],
    )?;

    let mut subnets = Vec::with_capacity(block.subnet_count());
    for tier in SubnetTier::ALL {
        for az in 0..az_count {
            let cidr = block.subnet_cidr(tier, az)?;
            let name = options.subnet_name(tier);
            let logical_id = plan.add(
                vpc.child(format!("{}Subnet{}", name, az + 1)),
                ResourceSpec::Subnet(SubnetSpec {
                    vpc: vpc.clone(),
                    tier,
                    group_name: name.to_string(),
                    availability_zone: availability_zones[usize::from(az)].clone(),
                    cidr,
                    map_public_ip_on_launch: tier == SubnetTier::Public,
                }),
                vec![vpc.clone()],
            )?;
            debug!("Subnet {} {} in {}", logical_id, cidr, availability_zones[usize::from(az)]);

            subnets.push(PlannedSubnet {
                route_table: logical_id.child("RouteTable"),
                logical_id,
                tier,
                az_index: az,
                availability_zone: availability_zones[usize::from(az)].clone(),
                cidr,
                nat_gateway: None,
            });
        }
    }

    // NATs live in the public subnets of the first `nat_count` AZs
    let mut nat_gateways = Vec::with_capacity(usize::from(nat_count));
    for subnet in subnets
        .iter()
        .filter(|s| s.tier == SubnetTier::Public)
        .take(usize::from(nat_count))
    {
        let nat = plan.add(
            subnet.logical_id.child("NatGateway"),
            ResourceSpec::NatGateway(NatGatewaySpec {
                subnet: subnet.logical_id.clone(),
                availability_zone: subnet.availability_zone.clone(),
            }),
            vec![subnet.logical_id.clone(), internet_gateway.clone()],
        )?;
        nat_gateways.push(nat);
    }

    if nat_gateways.is_empty() {
        warn!("No NAT gateways: private subnets have no egress path");
    }

    for subnet in &mut subnets {
        let mut depends_on = vec![vpc.clone(), subnet.logical_id.clone()];
        let target = match subnet.tier {
            SubnetTier::Public => Some(RouteTarget::InternetGateway(internet_gateway.clone())),
            SubnetTier::PrivateEgress if !nat_gateways.is_empty() => {
                let nat = nat_gateways[usize::from(subnet.az_index) % nat_gateways.len()].clone();
                subnet.nat_gateway = Some(nat.clone());
                Some(RouteTarget::NatGateway(nat))
            }
            _ => None,
        };

        let routes = match target {
            Some(target) => {
                depends_on.push(match &target {
                    RouteTarget::InternetGateway(id) | RouteTarget::NatGateway(id) => id.clone(),
                });
                vec![Route {
                    destination: Ipv4Cidr::any(),
                    target,
                }]
            }
            None => vec![],
        };

        plan.add(
            subnet.route_table.clone(),
            ResourceSpec::RouteTable(RouteTableSpec {
                vpc: vpc.clone(),
                subnet: subnet.logical_id.clone(),
                routes,
            }),
            depends_on,
        )?;
    }

    let flow_log = match &options.flow_logs {
        Some(flow_logs) => Some(build_flow_log(&vpc, flow_logs, plan)?),
        None => None,
    };

    Ok(Topology {
        vpc,
        cidr: block.cidr(),
        availability_zones,
        subnets,
        internet_gateway,
        nat_gateways,
        flow_log,
    })
}

fn build_flow_log(
    vpc: &LogicalId,
    options: &FlowLogOptions,
    plan: &mut PlanBuilder,
) -> PlanResult<FlowLogConfig> {
    let retention = RetentionClass::resolve(options.retention_days);
    if retention.days() != options.retention_days {
        debug!(
            "Flow log retention of {} days resolved to {}",
            options.retention_days, retention
        );
    }

    let log_group = plan.add(
        options.log_group_name.as_str(),
        ResourceSpec::LogGroup(LogGroupSpec {
            retention,
            removal_policy: options.removal_policy,
        }),
        vec![],
    )?;

    let flow_log = plan.add(
        options.flow_log_name.as_str(),
        ResourceSpec::FlowLog(FlowLogSpec {
            vpc: vpc.clone(),
            log_group: log_group.clone(),
            traffic_type: options.traffic_type,
        }),
        vec![vpc.clone(), log_group.clone()],
    )?;

    Ok(FlowLogConfig {
        log_group,
        flow_log,
        retention,
        removal_policy: options.removal_policy,
        traffic_type: options.traffic_type,
    })
}
