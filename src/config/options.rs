// Copyright (c) 2025 - Cowboy AI, Inc.
//! Enumerated Configuration Options
//!
//! Every option that the document spells as a string is parsed once, here,
//! into a closed enum. Parsing is case-insensitive; unknown values are
//! rejected while the document is deserialized.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Load balancer listener / target protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ApplicationProtocol {
    Http,
    Https,
}

impl ApplicationProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "HTTP",
            Self::Https => "HTTPS",
        }
    }

    /// URL scheme for this protocol
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl TryFrom<String> for ApplicationProtocol {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_uppercase().as_str() {
            "HTTP" => Ok(Self::Http),
            "HTTPS" => Ok(Self::Https),
            _ => Err(format!("unknown protocol '{}' (expected HTTP or HTTPS)", value)),
        }
    }
}

impl From<ApplicationProtocol> for String {
    fn from(value: ApplicationProtocol) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ApplicationProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target addressing mode of a target group
///
/// All three modes parse, but a plan always binds the scaling group to its
/// target group, so [`crate::config::AlbConfig`] validation accepts only
/// `Instance`. `Ip` and `Lambda` fail with a configuration error naming the
/// field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TargetType {
    Instance,
    Ip,
    /// Serverless function target
    Lambda,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instance => "instance",
            Self::Ip => "ip",
            Self::Lambda => "lambda",
        }
    }
}

impl TryFrom<String> for TargetType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "instance" => Ok(Self::Instance),
            "ip" => Ok(Self::Ip),
            "lambda" | "function" => Ok(Self::Lambda),
            _ => Err(format!(
                "unknown target type '{}' (expected instance, ip or lambda)",
                value
            )),
        }
    }
}

impl From<TargetType> for String {
    fn from(value: TargetType) -> Self {
        value.as_str().to_string()
    }
}

/// Port a health check probes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HealthCheckPort {
    /// Same port the target receives traffic on
    TrafficPort,
    Port(u16),
}

impl TryFrom<String> for HealthCheckPort {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.eq_ignore_ascii_case("traffic-port") {
            return Ok(Self::TrafficPort);
        }
        match value.parse::<u16>() {
            Ok(port) if port > 0 => Ok(Self::Port(port)),
            _ => Err(format!(
                "invalid health check port '{}' (expected traffic-port or 1-65535)",
                value
            )),
        }
    }
}

impl From<HealthCheckPort> for String {
    fn from(value: HealthCheckPort) -> Self {
        match value {
            HealthCheckPort::TrafficPort => "traffic-port".to_string(),
            HealthCheckPort::Port(port) => port.to_string(),
        }
    }
}

/// Health signal a scaling group replaces instances on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FleetHealthCheckType {
    Ec2,
    Elb,
}

impl FleetHealthCheckType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ec2 => "EC2",
            Self::Elb => "ELB",
        }
    }
}

impl TryFrom<String> for FleetHealthCheckType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_uppercase().as_str() {
            "EC2" => Ok(Self::Ec2),
            "ELB" => Ok(Self::Elb),
            _ => Err(format!("unknown health check type '{}' (expected EC2 or ELB)", value)),
        }
    }
}

impl From<FleetHealthCheckType> for String {
    fn from(value: FleetHealthCheckType) -> Self {
        value.as_str().to_string()
    }
}

/// Block storage volume type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VolumeType {
    Standard,
    Gp2,
    Gp3,
    Io1,
    Io2,
    St1,
    Sc1,
}

impl VolumeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Gp2 => "gp2",
            Self::Gp3 => "gp3",
            Self::Io1 => "io1",
            Self::Io2 => "io2",
            Self::St1 => "st1",
            Self::Sc1 => "sc1",
        }
    }

    /// Whether provisioned IOPS may be set
    pub fn accepts_iops(&self) -> bool {
        matches!(self, Self::Gp3 | Self::Io1 | Self::Io2)
    }

    /// Whether provisioned IOPS must be set
    pub fn requires_iops(&self) -> bool {
        matches!(self, Self::Io1 | Self::Io2)
    }
}

impl TryFrom<String> for VolumeType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_uppercase().as_str() {
            "STANDARD" | "MAGNETIC" => Ok(Self::Standard),
            "GP2" | "GENERAL_PURPOSE_SSD" => Ok(Self::Gp2),
            "GP3" | "GENERAL_PURPOSE_SSD_GP3" => Ok(Self::Gp3),
            "IO1" | "PROVISIONED_IOPS_SSD" => Ok(Self::Io1),
            "IO2" | "PROVISIONED_IOPS_SSD_IO2" => Ok(Self::Io2),
            "ST1" | "THROUGHPUT_OPTIMIZED_HDD" => Ok(Self::St1),
            "SC1" | "COLD_HDD" => Ok(Self::Sc1),
            _ => Err(format!("unknown volume type '{}'", value)),
        }
    }
}

impl From<VolumeType> for String {
    fn from(value: VolumeType) -> Self {
        value.as_str().to_string()
    }
}

/// Machine image family for fleet instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MachineImage {
    AmazonLinux2023,
    AmazonLinux2,
}

impl MachineImage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AmazonLinux2023 => "AMAZON_LINUX_2023",
            Self::AmazonLinux2 => "AMAZON_LINUX_2",
        }
    }

    /// Public parameter path resolving to the latest image id
    pub fn image_parameter(&self) -> &'static str {
        match self {
            Self::AmazonLinux2023 => {
                "/aws/service/ami-amazon-linux-latest/al2023-ami-kernel-default-x86_64"
            }
            Self::AmazonLinux2 => "/aws/service/ami-amazon-linux-latest/amzn2-ami-hvm-x86_64-gp2",
        }
    }
}

impl TryFrom<String> for MachineImage {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_uppercase().as_str() {
            "AMAZON_LINUX_2023" | "AL2023" => Ok(Self::AmazonLinux2023),
            "AMAZON_LINUX_2" | "AL2" => Ok(Self::AmazonLinux2),
            _ => Err(format!(
                "unknown machine image '{}' (expected AMAZON_LINUX_2023 or AMAZON_LINUX_2)",
                value
            )),
        }
    }
}

impl From<MachineImage> for String {
    fn from(value: MachineImage) -> Self {
        value.as_str().to_string()
    }
}

/// Traffic captured by a flow log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FlowLogTrafficType {
    All,
    Accept,
    Reject,
}

impl FlowLogTrafficType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Accept => "ACCEPT",
            Self::Reject => "REJECT",
        }
    }
}

impl TryFrom<String> for FlowLogTrafficType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_uppercase().as_str() {
            "ALL" => Ok(Self::All),
            "ACCEPT" => Ok(Self::Accept),
            "REJECT" => Ok(Self::Reject),
            _ => Err(format!(
                "unknown flow log traffic type '{}' (expected ALL, ACCEPT or REJECT)",
                value
            )),
        }
    }
}

impl From<FlowLogTrafficType> for String {
    fn from(value: FlowLogTrafficType) -> Self {
        value.as_str().to_string()
    }
}

/// Instance type assembled from a class (`T3`) and a size (`MICRO`, `XLARGE2`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String")]
pub struct InstanceType {
    class: String,
    size: String,
}

impl InstanceType {
    /// Build from class and size names, e.g. (`T3`, `MICRO`) → `t3.micro`
    pub fn new(class: &str, size: &str) -> Result<Self, String> {
        let class = class.trim().to_ascii_lowercase();
        if class.is_empty() || !class.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(format!("invalid instance class '{}'", class));
        }

        let size = size.trim().to_ascii_lowercase();
        let size = match size.strip_prefix("xlarge") {
            // XLARGE2 → 2xlarge
            Some(multiplier) if !multiplier.is_empty() => format!("{}xlarge", multiplier),
            _ => size,
        };
        if size.is_empty() || !size.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(format!("invalid instance size '{}'", size));
        }

        Ok(Self { class, size })
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn size(&self) -> &str {
        &self.size
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class, self.size)
    }
}

impl From<InstanceType> for String {
    fn from(value: InstanceType) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_case_insensitive() {
        assert_eq!(
            ApplicationProtocol::try_from("https".to_string()),
            Ok(ApplicationProtocol::Https)
        );
        assert!(ApplicationProtocol::try_from("tcp".to_string()).is_err());
    }

    #[test]
    fn test_target_type_aliases() {
        assert_eq!(TargetType::try_from("IP".to_string()), Ok(TargetType::Ip));
        assert_eq!(
            TargetType::try_from("function".to_string()),
            Ok(TargetType::Lambda)
        );
    }

    #[test]
    fn test_health_check_port() {
        assert_eq!(
            HealthCheckPort::try_from("traffic-port".to_string()),
            Ok(HealthCheckPort::TrafficPort)
        );
        assert_eq!(
            HealthCheckPort::try_from("8080".to_string()),
            Ok(HealthCheckPort::Port(8080))
        );
        assert!(HealthCheckPort::try_from("0".to_string()).is_err());
    }

    #[test]
    fn test_volume_type_aliases() {
        assert_eq!(VolumeType::try_from("GP3".to_string()), Ok(VolumeType::Gp3));
        assert_eq!(
            VolumeType::try_from("GENERAL_PURPOSE_SSD".to_string()),
            Ok(VolumeType::Gp2)
        );
        assert!(VolumeType::Io1.requires_iops());
        assert!(!VolumeType::Gp2.accepts_iops());
    }

    #[test]
    fn test_instance_type() {
        assert_eq!(InstanceType::new("T3", "MICRO").unwrap().to_string(), "t3.micro");
        assert_eq!(
            InstanceType::new("M5", "XLARGE2").unwrap().to_string(),
            "m5.2xlarge"
        );
        assert_eq!(InstanceType::new("R6G", "XLARGE").unwrap().to_string(), "r6g.xlarge");
        assert!(InstanceType::new("", "MICRO").is_err());
        assert!(InstanceType::new("t3", "micro.big").is_err());
    }
}
