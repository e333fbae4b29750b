// Copyright (c) 2025 - Cowboy AI, Inc.
//! Elastic Compute Fleet
//!
//! Launch template, auto scaling group and one CPU target-tracking policy.
//! Instances sit in the configured tier behind the compute boundary and
//! register with the load balancer's target group.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{
    AsgConfig, FleetHealthCheckType, InstanceType, MonitoringConfig, ResourceNames, StorageConfig,
    VolumeType,
};
use crate::domain::{EnvironmentClass, SubnetTier};
use crate::errors::{PlanError, PlanResult};
use crate::plan::{LogicalId, PlanBuilder, ResourceSpec};
use crate::topology::Topology;

/// Root volume of every fleet instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDevice {
    pub device_name: String,
    /// GiB
    pub volume_size: u32,
    pub volume_type: VolumeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iops: Option<u32>,
    pub encrypted: bool,
    pub delete_on_termination: bool,
}

impl BlockDevice {
    /// Resolve the root volume; delete-on-termination defaults per environment
    pub fn from_config(storage: &StorageConfig, environment: EnvironmentClass) -> Self {
        Self {
            device_name: storage.device_name.clone(),
            volume_size: storage.volume_size,
            volume_type: storage.volume_type,
            iops: storage.iops,
            encrypted: storage.encrypted,
            delete_on_termination: storage
                .delete_on_termination
                .unwrap_or_else(|| environment.default_delete_on_termination()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchTemplateSpec {
    pub instance_type: InstanceType,
    /// Parameter path resolving to the image id
    pub image_parameter: String,
    pub security_group: LogicalId,
    pub require_imdsv2: bool,
    pub detailed_monitoring: bool,
    pub block_device: BlockDevice,
    /// Passed through verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoScalingGroupSpec {
    pub launch_template: LogicalId,
    pub subnets: Vec<LogicalId>,
    pub target_groups: Vec<LogicalId>,
    pub min_capacity: u32,
    pub max_capacity: u32,
    pub desired_capacity: u32,
    pub health_check_type: FleetHealthCheckType,
    /// Seconds
    pub health_check_grace_period: u32,
    /// Seconds
    pub cooldown: u32,
    pub metrics_granularity: String,
}

/// CPU target tracking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingPolicySpec {
    pub auto_scaling_group: LogicalId,
    pub target_cpu_utilization: f64,
    /// Seconds
    pub cooldown: u32,
}

/// Read-only access to a secret for the fleet's instance role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretReadGrantSpec {
    pub secret: LogicalId,
    pub grantee: LogicalId,
}

/// Settings the fleet binds to beyond its own section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FleetOptions {
    pub detailed_monitoring: bool,
    pub metrics_granularity: String,
    pub user_data: Option<String>,
}

impl FleetOptions {
    pub fn from_monitoring(monitoring: &MonitoringConfig, user_data: Option<String>) -> Self {
        Self {
            detailed_monitoring: monitoring.enable_detailed_monitoring,
            metrics_granularity: monitoring.metric_collection_granularity.clone(),
            user_data,
        }
    }
}

/// Planned fleet resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fleet {
    pub launch_template: LogicalId,
    pub auto_scaling_group: LogicalId,
    pub scaling_policy: LogicalId,
    pub tier: SubnetTier,
    pub instance_type: InstanceType,
    pub block_device: BlockDevice,
}

/// Build the compute fleet and bind it to the target group
#[allow(clippy::too_many_arguments)]
pub fn build_fleet(
    topology: &Topology,
    compute_boundary: &LogicalId,
    target_group: &LogicalId,
    asg: &AsgConfig,
    storage: &StorageConfig,
    options: &FleetOptions,
    names: &ResourceNames,
    environment: EnvironmentClass,
    plan: &mut PlanBuilder,
) -> PlanResult<Fleet> {
    let subnets = topology.subnet_ids(asg.subnet_type);
    if subnets.is_empty() {
        return Err(PlanError::config(format!(
            "compute.asg.subnetType {:?} has no subnets",
            asg.subnet_type
        )));
    }

    let instance_type = asg.instance_type()?;
    let block_device = BlockDevice::from_config(storage, environment);
    debug!(
        "Fleet root volume {} {} GiB (delete on termination: {})",
        block_device.volume_type.as_str(),
        block_device.volume_size,
        block_device.delete_on_termination
    );

    let launch_template = plan.add(
        names.launch_template.as_str(),
        ResourceSpec::LaunchTemplate(LaunchTemplateSpec {
            instance_type: instance_type.clone(),
            image_parameter: asg.machine_image_type.image_parameter().to_string(),
            security_group: compute_boundary.clone(),
            require_imdsv2: asg.require_imdsv2,
            detailed_monitoring: options.detailed_monitoring,
            block_device: block_device.clone(),
            user_data: options.user_data.clone(),
        }),
        vec![compute_boundary.clone()],
    )?;

    let mut depends_on = vec![launch_template.clone(), target_group.clone()];
    depends_on.extend(subnets.iter().cloned());
    // Private fleets need their egress path before instances boot
    if asg.subnet_type == SubnetTier::PrivateEgress {
        depends_on.extend(topology.nat_gateways.iter().cloned());
    }

    let auto_scaling_group = plan.add(
        names.auto_scaling_group.as_str(),
        ResourceSpec::AutoScalingGroup(AutoScalingGroupSpec {
            launch_template: launch_template.clone(),
            subnets,
            target_groups: vec![target_group.clone()],
            min_capacity: asg.min_capacity,
            max_capacity: asg.max_capacity,
            desired_capacity: asg.desired_capacity,
            health_check_type: asg.health_check_type,
            health_check_grace_period: asg.health_check_grace_period,
            cooldown: asg.cooldown,
            metrics_granularity: options.metrics_granularity.clone(),
        }),
        depends_on,
    )?;

    let scaling_policy = plan.add(
        auto_scaling_group.child(&names.cpu_scaling_policy),
        ResourceSpec::ScalingPolicy(ScalingPolicySpec {
            auto_scaling_group: auto_scaling_group.clone(),
            target_cpu_utilization: asg.target_cpu_utilization,
            cooldown: asg.cooldown,
        }),
        vec![auto_scaling_group.clone()],
    )?;

    info!(
        "Fleet {} of {} ({}-{}, desired {}) targeting {}% CPU",
        auto_scaling_group,
        instance_type,
        asg.min_capacity,
        asg.max_capacity,
        asg.desired_capacity,
        asg.target_cpu_utilization
    );

    Ok(Fleet {
        launch_template,
        auto_scaling_group,
        scaling_policy,
        tier: asg.subnet_type,
        instance_type,
        block_device,
    })
}

/// Grant the fleet read access to a secret
pub fn grant_secret_read(
    fleet: &Fleet,
    secret: &LogicalId,
    plan: &mut PlanBuilder,
) -> PlanResult<LogicalId> {
    plan.add(
        secret.child("ReadGrant"),
        ResourceSpec::SecretReadGrant(SecretReadGrantSpec {
            secret: secret.clone(),
            grantee: fleet.auto_scaling_group.clone(),
        }),
        vec![secret.clone(), fleet.auto_scaling_group.clone()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Ipv4Cidr, NetworkBlock};
    use crate::topology::{build_topology, TopologyOptions};
    use pretty_assertions::assert_eq;

    fn setup() -> (PlanBuilder, Topology) {
        let mut plan = PlanBuilder::new();
        let block = NetworkBlock::new(Ipv4Cidr::new("10.0.0.0/16").unwrap(), 2, 24).unwrap();
        let topology = build_topology(&block, &TopologyOptions::default(), &mut plan).unwrap();
        plan.add(
            "AsgSecurityGroup",
            ResourceSpec::SecurityGroup(crate::access::boundary::SecurityGroupSpec {
                vpc: topology.vpc.clone(),
                group_name: "AsgSecurityGroup".to_string(),
                description: "compute".to_string(),
                allow_all_outbound: false,
            }),
            vec![topology.vpc.clone()],
        )
        .unwrap();
        plan.add(
            "WebAppTargetGroup",
            ResourceSpec::TargetGroup(crate::load_balancer::TargetGroupSpec {
                vpc: topology.vpc.clone(),
                port: 80,
                protocol: crate::config::ApplicationProtocol::Http,
                target_type: crate::config::TargetType::Instance,
                deregistration_delay: 30,
                health_check: crate::config::HealthCheckConfig::default(),
            }),
            vec![topology.vpc.clone()],
        )
        .unwrap();
        (plan, topology)
    }

    fn fleet_with(asg: &AsgConfig, storage: &StorageConfig) -> (Fleet, PlanBuilder, Topology) {
        let (mut plan, topology) = setup();
        let fleet = build_fleet(
            &topology,
            &LogicalId::from("AsgSecurityGroup"),
            &LogicalId::from("WebAppTargetGroup"),
            asg,
            storage,
            &FleetOptions {
                user_data: Some("#!/bin/bash\necho ready\n".to_string()),
                ..FleetOptions::default()
            },
            &ResourceNames::default(),
            EnvironmentClass::Development,
            &mut plan,
        )
        .unwrap();
        (fleet, plan, topology)
    }

    #[test]
    fn test_fleet_in_private_egress_by_default() {
        let (fleet, plan, topology) = fleet_with(&AsgConfig::default(), &StorageConfig::default());
        assert_eq!(fleet.tier, SubnetTier::PrivateEgress);

        match &plan.get(&fleet.auto_scaling_group).unwrap().properties {
            ResourceSpec::AutoScalingGroup(spec) => {
                assert_eq!(spec.subnets, topology.subnet_ids(SubnetTier::PrivateEgress));
                assert_eq!(spec.target_groups, vec![LogicalId::from("WebAppTargetGroup")]);
                assert_eq!(spec.health_check_type, FleetHealthCheckType::Elb);
            }
            other => panic!("unexpected spec {:?}", other),
        }
    }

    #[test]
    fn test_subnet_type_moves_fleet() {
        let asg = AsgConfig {
            subnet_type: SubnetTier::Public,
            ..AsgConfig::default()
        };
        let (fleet, plan, topology) = fleet_with(&asg, &StorageConfig::default());
        let description = plan.get(&fleet.auto_scaling_group).unwrap();
        match &description.properties {
            ResourceSpec::AutoScalingGroup(spec) => {
                assert_eq!(spec.subnets, topology.subnet_ids(SubnetTier::Public));
            }
            other => panic!("unexpected spec {:?}", other),
        }
        assert!(!description
            .depends_on
            .iter()
            .any(|id| topology.nat_gateways.contains(id)));
    }

    #[test]
    fn test_user_data_passed_verbatim() {
        let (fleet, plan, _) = fleet_with(&AsgConfig::default(), &StorageConfig::default());
        match &plan.get(&fleet.launch_template).unwrap().properties {
            ResourceSpec::LaunchTemplate(spec) => {
                assert_eq!(spec.user_data.as_deref(), Some("#!/bin/bash\necho ready\n"));
                assert!(spec.require_imdsv2);
                assert_eq!(spec.instance_type.to_string(), "t3.micro");
            }
            other => panic!("unexpected spec {:?}", other),
        }
    }

    #[test]
    fn test_delete_on_termination_explicit_wins() {
        let storage = StorageConfig {
            delete_on_termination: Some(false),
            ..StorageConfig::default()
        };
        let (fleet, _, _) = fleet_with(&AsgConfig::default(), &storage);
        assert!(!fleet.block_device.delete_on_termination);

        let (fleet, _, _) = fleet_with(&AsgConfig::default(), &StorageConfig::default());
        assert!(fleet.block_device.delete_on_termination);
    }

    #[test]
    fn test_scaling_policy_follows_group() {
        let (fleet, plan, _) = fleet_with(&AsgConfig::default(), &StorageConfig::default());
        assert_eq!(
            fleet.scaling_policy.as_str(),
            "WebAppAutoScalingGroupCpuScaling"
        );
        let ordered = plan.finalize().unwrap();
        let position = |id: &LogicalId| ordered.iter().position(|r| &r.logical_id == id).unwrap();
        assert!(position(&fleet.launch_template) < position(&fleet.auto_scaling_group));
        assert!(position(&fleet.auto_scaling_group) < position(&fleet.scaling_policy));
    }

    #[test]
    fn test_grant_depends_on_secret_and_fleet() {
        let (fleet, mut plan, _) = fleet_with(&AsgConfig::default(), &StorageConfig::default());
        let secret = plan
            .add(
                "DatabaseCredentials",
                ResourceSpec::Secret(crate::database::SecretSpec {
                    name: "webappdb-db-credentials".to_string(),
                    username: "admin".to_string(),
                    password_length: 32,
                    exclude_punctuation: true,
                    include_space: false,
                }),
                vec![],
            )
            .unwrap();
        let grant = grant_secret_read(&fleet, &secret, &mut plan).unwrap();
        let description = plan.get(&grant).unwrap();
        assert_eq!(
            description.depends_on,
            vec![secret, fleet.auto_scaling_group.clone()]
        );
    }
}
