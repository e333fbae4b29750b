// Copyright (c) 2025 - Cowboy AI, Inc.
//! Two-tier topology and access-policy plan composition
//!
//! Turns a declarative [`config::StackConfig`] into an ordered construction
//! [`plan::Plan`]: a multi-AZ network with public, private and isolated
//! tiers, a load balancer, a scaled compute fleet and a managed database,
//! secured by two coordinated access layers (stateless subnet ACLs and
//! stateful security boundaries).
//!
//! The engine only describes what to request and in what order. Resource
//! creation belongs to a [`provider::ResourceProvisioner`].
//!
//! ```rust
//! use cim_topology::{config::StackConfig, planner::Planner};
//!
//! let plan = Planner::new(StackConfig::default()).plan().unwrap();
//! assert!(plan.consistency.is_consistent());
//! ```

pub mod access;
pub mod compute;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod load_balancer;
pub mod outputs;
pub mod plan;
pub mod planner;
pub mod provider;
pub mod topology;

// Re-export commonly used types
pub use config::StackConfig;
pub use errors::{PlanError, PlanResult};
pub use plan::{LogicalId, Plan, ResourceDescription};
pub use planner::Planner;
pub use provider::{submit_plan, DryRunProvisioner, ResourceProvisioner};
