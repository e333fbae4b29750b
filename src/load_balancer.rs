// Copyright (c) 2025 - Cowboy AI, Inc.
//! Load-Balancing Layer
//!
//! An application load balancer in the public subnets behind the edge
//! boundary, one target group the fleet registers with and one listener
//! forwarding to it.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{AlbConfig, ApplicationProtocol, HealthCheckConfig, ResourceNames, TargetType};
use crate::domain::{EnvironmentClass, SubnetTier};
use crate::errors::PlanResult;
use crate::plan::{LogicalId, PlanBuilder, ResourceSpec};
use crate::topology::Topology;

/// Load balancer placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scheme {
    InternetFacing,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerSpec {
    pub scheme: Scheme,
    pub subnets: Vec<LogicalId>,
    pub security_groups: Vec<LogicalId>,
    pub deletion_protection: bool,
    /// Seconds
    pub idle_timeout: u32,
    pub http2_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetGroupSpec {
    pub vpc: LogicalId,
    pub port: u16,
    pub protocol: ApplicationProtocol,
    pub target_type: TargetType,
    /// Seconds
    pub deregistration_delay: u32,
    pub health_check: HealthCheckConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerSpec {
    pub load_balancer: LogicalId,
    pub port: u16,
    pub protocol: ApplicationProtocol,
    /// Forward target of the default action
    pub default_target_group: LogicalId,
}

/// Planned load-balancing resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadBalancer {
    pub load_balancer: LogicalId,
    pub target_group: LogicalId,
    pub listener: LogicalId,
    pub listener_protocol: ApplicationProtocol,
    pub target_type: TargetType,
    pub deletion_protection: bool,
}

/// Build the load balancer, target group and listener
///
/// Deletion protection falls back to the environment default when the
/// configuration leaves it unset.
pub fn build_load_balancer(
    topology: &Topology,
    edge_boundary: &LogicalId,
    config: &AlbConfig,
    names: &ResourceNames,
    environment: EnvironmentClass,
    plan: &mut PlanBuilder,
) -> PlanResult<LoadBalancer> {
    let deletion_protection = config
        .deletion_protection
        .unwrap_or_else(|| environment.default_deletion_protection());

    // Both schemes sit in the public tier; only internet-facing ones get
    // public addresses.
    let scheme = if config.internet_facing {
        Scheme::InternetFacing
    } else {
        Scheme::Internal
    };
    let subnets = topology.subnet_ids(SubnetTier::Public);

    let mut depends_on = vec![edge_boundary.clone(), topology.internet_gateway.clone()];
    depends_on.extend(subnets.iter().cloned());

    let load_balancer = plan.add(
        names.application_load_balancer.as_str(),
        ResourceSpec::LoadBalancer(LoadBalancerSpec {
            scheme,
            subnets,
            security_groups: vec![edge_boundary.clone()],
            deletion_protection,
            idle_timeout: config.idle_timeout,
            http2_enabled: config.http2_enabled,
        }),
        depends_on,
    )?;

    let target_group = plan.add(
        names.target_group.as_str(),
        ResourceSpec::TargetGroup(TargetGroupSpec {
            vpc: topology.vpc.clone(),
            port: config.target_group_port,
            protocol: config.target_group_protocol,
            target_type: config.target_type,
            deregistration_delay: config.deregistration_delay,
            health_check: config.health_check.clone(),
        }),
        vec![topology.vpc.clone()],
    )?;

    let listener = plan.add(
        names.http_listener.as_str(),
        ResourceSpec::Listener(ListenerSpec {
            load_balancer: load_balancer.clone(),
            port: config.listener_port,
            protocol: config.listener_protocol,
            default_target_group: target_group.clone(),
        }),
        vec![load_balancer.clone(), target_group.clone()],
    )?;

    info!(
        "Load balancer {} listening on {} {} (deletion protection: {})",
        load_balancer, config.listener_protocol, config.listener_port, deletion_protection
    );

    Ok(LoadBalancer {
        load_balancer,
        target_group,
        listener,
        listener_protocol: config.listener_protocol,
        target_type: config.target_type,
        deletion_protection,
    })
}
