// Copyright (c) 2025 - Cowboy AI, Inc.
//! Compute section: load balancer, scaling group and root volume

use serde::{Deserialize, Serialize};

use super::network::SecurityConfig;
use super::options::{
    ApplicationProtocol, FleetHealthCheckType, HealthCheckPort, InstanceType, MachineImage,
    TargetType, VolumeType,
};
use crate::domain::invariants::{
    validate_capacity, validate_not_empty, validate_percentage, validate_port,
    validate_ports_agree, validate_range, validate_timeout_below_interval,
};
use crate::domain::SubnetTier;
use crate::errors::{PlanError, PlanResult};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComputeConfig {
    pub alb: AlbConfig,
    pub asg: AsgConfig,
    pub storage: StorageConfig,
}

impl ComputeConfig {
    pub(crate) fn validate(&self, security: &SecurityConfig) -> PlanResult<()> {
        self.alb.validate(security)?;
        self.asg.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}

/// Application load balancer, its target group and listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlbConfig {
    pub internet_facing: bool,
    /// Unset means the environment default
    pub deletion_protection: Option<bool>,
    /// Seconds
    pub idle_timeout: u32,
    pub http2_enabled: bool,
    /// Seconds
    pub deregistration_delay: u32,
    pub target_group_port: u16,
    pub target_group_protocol: ApplicationProtocol,
    pub target_type: TargetType,
    pub listener_port: u16,
    pub listener_protocol: ApplicationProtocol,
    pub health_check: HealthCheckConfig,
}

impl Default for AlbConfig {
    fn default() -> Self {
        Self {
            internet_facing: true,
            deletion_protection: None,
            idle_timeout: 60,
            http2_enabled: true,
            deregistration_delay: 30,
            target_group_port: 80,
            target_group_protocol: ApplicationProtocol::Http,
            target_type: TargetType::Instance,
            listener_port: 80,
            listener_protocol: ApplicationProtocol::Http,
            health_check: HealthCheckConfig::default(),
        }
    }
}

impl AlbConfig {
    fn validate(&self, security: &SecurityConfig) -> PlanResult<()> {
        validate_range("compute.alb.idleTimeout", i64::from(self.idle_timeout), 1, 4000)?;
        validate_range(
            "compute.alb.deregistrationDelay",
            i64::from(self.deregistration_delay),
            0,
            3600,
        )?;
        validate_port("compute.alb.targetGroupPort", self.target_group_port)?;
        validate_port("compute.alb.listenerPort", self.listener_port)?;

        // The edge and compute boundaries only open the HTTP port
        validate_ports_agree(
            "compute.alb.listenerPort",
            self.listener_port,
            "network.security.httpPort",
            security.http_port,
        )?;
        validate_ports_agree(
            "compute.alb.targetGroupPort",
            self.target_group_port,
            "network.security.httpPort",
            security.http_port,
        )?;

        // The fleet registers instances, not addresses or functions
        if self.target_type != TargetType::Instance {
            return Err(PlanError::config(format!(
                "compute.alb.targetType '{}' cannot receive the scaling group; use 'instance'",
                self.target_type.as_str()
            )));
        }

        self.health_check.validate()
    }
}

/// Target group health check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HealthCheckConfig {
    pub enabled: bool,
    pub path: String,
    pub protocol: ApplicationProtocol,
    /// Seconds between checks
    pub interval: u32,
    /// Seconds before a check fails
    pub timeout: u32,
    pub healthy_threshold_count: u32,
    pub unhealthy_threshold_count: u32,
    pub port: HealthCheckPort,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/".to_string(),
            protocol: ApplicationProtocol::Http,
            interval: 30,
            timeout: 5,
            healthy_threshold_count: 2,
            unhealthy_threshold_count: 3,
            port: HealthCheckPort::TrafficPort,
        }
    }
}

impl HealthCheckConfig {
    fn validate(&self) -> PlanResult<()> {
        if !self.path.starts_with('/') {
            return Err(PlanError::config(format!(
                "compute.alb.healthCheck.path '{}' must start with '/'",
                self.path
            )));
        }
        validate_range("compute.alb.healthCheck.interval", i64::from(self.interval), 5, 300)?;
        validate_range("compute.alb.healthCheck.timeout", i64::from(self.timeout), 2, 120)?;
        validate_timeout_below_interval(self.timeout, self.interval)?;
        validate_range(
            "compute.alb.healthCheck.healthyThresholdCount",
            i64::from(self.healthy_threshold_count),
            2,
            10,
        )?;
        validate_range(
            "compute.alb.healthCheck.unhealthyThresholdCount",
            i64::from(self.unhealthy_threshold_count),
            2,
            10,
        )?;
        Ok(())
    }
}

/// Auto scaling group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AsgConfig {
    pub min_capacity: u32,
    pub max_capacity: u32,
    pub desired_capacity: u32,
    pub instance_class: String,
    pub instance_size: String,
    pub machine_image_type: MachineImage,
    pub health_check_type: FleetHealthCheckType,
    /// Seconds
    pub health_check_grace_period: u32,
    /// Seconds between scaling activities
    pub cooldown: u32,
    /// Percent
    pub target_cpu_utilization: f64,
    pub require_imdsv2: bool,
    pub subnet_type: SubnetTier,
}

impl Default for AsgConfig {
    fn default() -> Self {
        Self {
            min_capacity: 2,
            max_capacity: 6,
            desired_capacity: 2,
            instance_class: "T3".to_string(),
            instance_size: "MICRO".to_string(),
            machine_image_type: MachineImage::AmazonLinux2023,
            health_check_type: FleetHealthCheckType::Elb,
            health_check_grace_period: 300,
            cooldown: 300,
            target_cpu_utilization: 70.0,
            require_imdsv2: true,
            subnet_type: SubnetTier::PrivateEgress,
        }
    }
}

impl AsgConfig {
    pub fn instance_type(&self) -> PlanResult<InstanceType> {
        InstanceType::new(&self.instance_class, &self.instance_size)
            .map_err(|e| PlanError::config(format!("compute.asg: {}", e)))
    }

    fn validate(&self) -> PlanResult<()> {
        validate_capacity(self.min_capacity, self.desired_capacity, self.max_capacity)?;
        validate_percentage("compute.asg.targetCpuUtilization", self.target_cpu_utilization)?;
        validate_range(
            "compute.asg.healthCheckGracePeriod",
            i64::from(self.health_check_grace_period),
            0,
            7200,
        )?;
        self.instance_type()?;
        Ok(())
    }
}

/// Root block device of every fleet instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageConfig {
    /// GiB
    pub volume_size: u32,
    pub volume_type: VolumeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iops: Option<u32>,
    pub encrypted: bool,
    /// Unset means the environment default
    pub delete_on_termination: Option<bool>,
    pub device_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            volume_size: 20,
            volume_type: VolumeType::Gp3,
            iops: None,
            encrypted: true,
            delete_on_termination: None,
            device_name: "/dev/xvda".to_string(),
        }
    }
}

impl StorageConfig {
    fn validate(&self) -> PlanResult<()> {
        validate_range("compute.storage.volumeSize", i64::from(self.volume_size), 1, 16384)?;
        validate_not_empty("compute.storage.deviceName", &self.device_name)?;

        match self.iops {
            Some(iops) if !self.volume_type.accepts_iops() => Err(PlanError::config(format!(
                "compute.storage.iops ({}) is not supported by {} volumes",
                iops,
                self.volume_type.as_str()
            ))),
            None if self.volume_type.requires_iops() => Err(PlanError::config(format!(
                "compute.storage.iops is required for {} volumes",
                self.volume_type.as_str()
            ))),
            Some(iops) => {
                validate_range("compute.storage.iops", i64::from(iops), 100, 256_000)?;
                Ok(())
            }
            None => Ok(()),
        }
    }
}
