// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Block and Subnet Tiers
//!
//! A [`NetworkBlock`] is the validated address plan of the VPC: the base
//! CIDR, the number of availability zones and the mask width shared by every
//! subnet tier. Construction enforces that one non-overlapping subnet per
//! (AZ, tier) fits inside the block.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::network::Ipv4Cidr;
use crate::errors::{PlanError, PlanResult};

/// Subnet tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SubnetTier {
    /// Routed to the internet gateway
    Public,
    /// Outbound-only through NAT
    PrivateEgress,
    /// No route outside the VPC
    PrivateIsolated,
}

impl SubnetTier {
    /// Tiers in allocation order
    pub const ALL: [SubnetTier; 3] = [
        SubnetTier::Public,
        SubnetTier::PrivateEgress,
        SubnetTier::PrivateIsolated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::PrivateEgress => "PRIVATE_WITH_EGRESS",
            Self::PrivateIsolated => "PRIVATE_ISOLATED",
        }
    }

    /// Position in allocation order
    pub fn index(&self) -> u32 {
        match self {
            Self::Public => 0,
            Self::PrivateEgress => 1,
            Self::PrivateIsolated => 2,
        }
    }

    /// Default subnet group name
    pub fn default_name(&self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::PrivateEgress => "Private",
            Self::PrivateIsolated => "Isolated",
        }
    }

    /// Whether hosts in this tier can be reached from the internet
    pub fn is_internet_routable(&self) -> bool {
        matches!(self, Self::Public)
    }
}

impl fmt::Display for SubnetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for SubnetTier {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_uppercase().as_str() {
            "PUBLIC" => Ok(Self::Public),
            "PRIVATE_WITH_EGRESS" | "PRIVATE_EGRESS" | "PRIVATE" => Ok(Self::PrivateEgress),
            "PRIVATE_ISOLATED" | "ISOLATED" => Ok(Self::PrivateIsolated),
            _ => Err(format!(
                "unknown subnet type '{}' (expected PUBLIC, PRIVATE_WITH_EGRESS or PRIVATE_ISOLATED)",
                value
            )),
        }
    }
}

impl From<SubnetTier> for String {
    fn from(tier: SubnetTier) -> Self {
        tier.as_str().to_string()
    }
}

/// Validated VPC address plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "NetworkBlockFields")]
pub struct NetworkBlock {
    cidr: Ipv4Cidr,
    az_count: u8,
    subnet_mask: u8,
}

/// Unchecked wire form; deserialization goes through [`NetworkBlock::new`]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkBlockFields {
    cidr: Ipv4Cidr,
    az_count: u8,
    subnet_mask: u8,
}

impl TryFrom<NetworkBlockFields> for NetworkBlock {
    type Error = PlanError;

    fn try_from(fields: NetworkBlockFields) -> PlanResult<Self> {
        NetworkBlock::new(fields.cidr, fields.az_count, fields.subnet_mask)
    }
}

impl NetworkBlock {
    /// Largest VPC block the provider accepts
    pub const MIN_VPC_PREFIX: u8 = 16;

    /// Smallest block (VPC or subnet) the provider accepts
    pub const MAX_PREFIX: u8 = 28;

    /// Create a network block
    ///
    /// # Invariants
    /// - At least one availability zone
    /// - VPC prefix within /16../28
    /// - Subnet mask longer than the VPC prefix and at most /28
    /// - Room for `az_count × 3` subnets
    pub fn new(cidr: Ipv4Cidr, az_count: u8, subnet_mask: u8) -> PlanResult<Self> {
        if az_count < 1 {
            return Err(PlanError::config("availability zone count must be at least 1"));
        }

        if cidr.prefix_len() < Self::MIN_VPC_PREFIX || cidr.prefix_len() > Self::MAX_PREFIX {
            return Err(PlanError::config(format!(
                "VPC CIDR {} must have a prefix between /{} and /{}",
                cidr,
                Self::MIN_VPC_PREFIX,
                Self::MAX_PREFIX
            )));
        }

        if subnet_mask <= cidr.prefix_len() || subnet_mask > Self::MAX_PREFIX {
            return Err(PlanError::config(format!(
                "subnet mask /{} must be longer than /{} and at most /{}",
                subnet_mask,
                cidr.prefix_len(),
                Self::MAX_PREFIX
            )));
        }

        let required = u64::from(az_count) * SubnetTier::ALL.len() as u64;
        let capacity = cidr.subnet_capacity(subnet_mask);
        if capacity < required {
            return Err(PlanError::config(format!(
                "{} holds {} /{} subnets but {} AZs x {} tiers need {}",
                cidr,
                capacity,
                subnet_mask,
                az_count,
                SubnetTier::ALL.len(),
                required
            )));
        }

        Ok(Self {
            cidr,
            az_count,
            subnet_mask,
        })
    }

    pub fn cidr(&self) -> Ipv4Cidr {
        self.cidr
    }

    pub fn az_count(&self) -> u8 {
        self.az_count
    }

    pub fn subnet_mask(&self) -> u8 {
        self.subnet_mask
    }

    /// Total number of subnets across all tiers
    pub fn subnet_count(&self) -> usize {
        usize::from(self.az_count) * SubnetTier::ALL.len()
    }

    /// CIDR of the subnet for `tier` in AZ `az_index`
    ///
    /// Subnets are allocated tier by tier, AZ by AZ, from the start of the block.
    pub fn subnet_cidr(&self, tier: SubnetTier, az_index: u8) -> PlanResult<Ipv4Cidr> {
        if az_index >= self.az_count {
            return Err(PlanError::config(format!(
                "AZ index {} out of range for {} AZs",
                az_index, self.az_count
            )));
        }
        let index = tier.index() * u32::from(self.az_count) + u32::from(az_index);
        Ok(self.cidr.nth_subnet(self.subnet_mask, index)?)
    }
}
