// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-topology
//!
//! Deterministic configuration documents and helpers shared by the
//! integration tests. Plans carry a fresh id and timestamp; tests compare
//! everything else.

#![allow(dead_code)]

use std::path::PathBuf;

use cim_topology::config::StackConfig;
use cim_topology::domain::{Ipv4Cidr, NetworkBlock};
use cim_topology::plan::{LogicalId, Plan};
use cim_topology::planner::Planner;

/// Minimal document: everything defaulted except the environment
pub const DEV_DOCUMENT: &str = r#"{
    "environment": { "name": "dev", "region": "us-west-2" }
}"#;

/// Production-like document with three AZs and a PostgreSQL database
pub const PRODUCTION_POSTGRES_DOCUMENT: &str = r#"{
    "stackName": "WebApp-Prod",
    "environment": { "name": "production", "region": "eu-central-1" },
    "tags": { "Project": "WebApp" },
    "network": {
        "vpc": { "cidr": "10.20.0.0/16", "maxAzs": 3, "natGatewaysCount": 3 },
        "security": { "dbPort": 5432 }
    },
    "database": { "engine": "POSTGRES", "engineVersion": "16.3" }
}"#;

/// Directory holding the bundled configuration documents
pub fn config_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config")
}

pub fn dev_config() -> StackConfig {
    StackConfig::from_json_str(DEV_DOCUMENT).expect("Invalid dev fixture")
}

pub fn production_postgres_config() -> StackConfig {
    StackConfig::from_json_str(PRODUCTION_POSTGRES_DOCUMENT).expect("Invalid production fixture")
}

pub fn plan_for(config: StackConfig) -> Plan {
    Planner::new(config).plan().expect("Fixture config failed to plan")
}

pub fn block(cidr: &str, az_count: u8, subnet_mask: u8) -> NetworkBlock {
    NetworkBlock::new(Ipv4Cidr::new(cidr).expect("Invalid CIDR"), az_count, subnet_mask)
        .expect("Invalid network block")
}

pub fn id(value: &str) -> LogicalId {
    LogicalId::from(value)
}
