// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Domain Models
//!
//! Core domain concepts shared by every composition step: address blocks,
//! subnet tiers, retention classes, environment classification and the
//! planned resource taxonomy.
//!
//! # Value Objects with Invariants
//!
//! - [`Ipv4Cidr`] - canonical IPv4 block in CIDR notation
//! - [`PortRange`] - inclusive TCP port range
//! - [`NetworkBlock`] - VPC address plan with room for every (AZ, tier) subnet
//! - [`RetentionClass`] - supported log retention period
//! - [`EnvironmentClass`] - development vs. production-like policy class
//! - [`ResourceKind`] - provider resource taxonomy

pub mod block;
pub mod environment;
pub mod invariants;
pub mod network;
pub mod resource_type;
pub mod retention;

pub use block::{NetworkBlock, SubnetTier};
pub use environment::{
    effective_removal_policy, DestructionPolicy, EnvironmentClass, RemovalPolicy,
    PRODUCTION_LIKE_NAMES,
};
pub use invariants::{ValidationError, ValidationResult};
pub use network::{Ipv4Cidr, NetworkError, PortRange};
pub use resource_type::{ResourceCategory, ResourceKind};
pub use retention::RetentionClass;
