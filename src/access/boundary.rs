// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stateful Security Boundaries
//!
//! Three connection-tracked boundaries guard the tiers: the edge (load
//! balancer), compute (fleet) and data (database). Outbound traffic is
//! denied unless a rule allows it; return traffic is implicit.
//!
//! Inter-tier rules always reference the peer boundary, never its CIDR:
//!
//! ```text
//! allowHttpFrom ──http──▶ Edge ──http──▶ Compute ──db──▶ Data
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::PolicyConfig;
use crate::domain::{Ipv4Cidr, PortRange};
use crate::plan::LogicalId;

/// Identifier of one of the three boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryId {
    Edge,
    Compute,
    Data,
}

impl fmt::Display for BoundaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Edge => write!(f, "edge"),
            Self::Compute => write!(f, "compute"),
            Self::Data => write!(f, "data"),
        }
    }
}

/// The other side of a stateful rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Peer {
    Cidr(Ipv4Cidr),
    Boundary(BoundaryId),
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cidr(cidr) => write!(f, "{}", cidr),
            Self::Boundary(id) => write!(f, "{} boundary", id),
        }
    }
}

/// One TCP allow rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryRule {
    pub peer: Peer,
    pub ports: PortRange,
    pub description: String,
}

impl BoundaryRule {
    fn tcp(peer: Peer, port: u16, description: &str) -> Self {
        Self {
            peer,
            ports: PortRange::single(port),
            description: description.to_string(),
        }
    }
}

/// Named stateful rule container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityBoundary {
    pub id: BoundaryId,
    pub name: String,
    pub description: String,
    pub ingress: Vec<BoundaryRule>,
    pub egress: Vec<BoundaryRule>,
}

impl SecurityBoundary {
    fn new(id: BoundaryId, name: &str, description: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
            ingress: Vec::new(),
            egress: Vec::new(),
        }
    }

    /// Boundaries this one references
    pub fn referenced_boundaries(&self) -> Vec<BoundaryId> {
        let mut referenced: Vec<BoundaryId> = self
            .ingress
            .iter()
            .chain(self.egress.iter())
            .filter_map(|rule| match rule.peer {
                Peer::Boundary(id) => Some(id),
                Peer::Cidr(_) => None,
            })
            .collect();
        referenced.sort();
        referenced.dedup();
        referenced
    }
}

/// The edge, compute and data boundaries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityBoundaries {
    pub edge: SecurityBoundary,
    pub compute: SecurityBoundary,
    pub data: SecurityBoundary,
}

impl SecurityBoundaries {
    pub fn get(&self, id: BoundaryId) -> &SecurityBoundary {
        match id {
            BoundaryId::Edge => &self.edge,
            BoundaryId::Compute => &self.compute,
            BoundaryId::Data => &self.data,
        }
    }

    /// Boundaries in creation order
    pub fn iter(&self) -> impl Iterator<Item = &SecurityBoundary> {
        [&self.edge, &self.compute, &self.data].into_iter()
    }
}

/// Derive the stateful boundaries
pub fn compose_boundaries(policy: &PolicyConfig) -> SecurityBoundaries {
    let security = &policy.security;
    let names = &policy.names;

    let mut edge = SecurityBoundary::new(
        BoundaryId::Edge,
        &names.edge,
        "Security group for the application load balancer",
    );
    edge.ingress.push(BoundaryRule::tcp(
        Peer::Cidr(security.allow_http_from),
        security.http_port,
        "Allow HTTP traffic from allowed sources",
    ));
    edge.egress.push(BoundaryRule::tcp(
        Peer::Boundary(BoundaryId::Compute),
        security.http_port,
        "Allow HTTP to the application instances",
    ));

    let mut compute = SecurityBoundary::new(
        BoundaryId::Compute,
        &names.compute,
        "Security group for the application instances",
    );
    compute.ingress.push(BoundaryRule::tcp(
        Peer::Boundary(BoundaryId::Edge),
        security.http_port,
        "Allow HTTP from the load balancer",
    ));
    compute.egress.push(BoundaryRule::tcp(
        Peer::Boundary(BoundaryId::Data),
        security.db_port,
        "Allow database access",
    ));
    if security.allow_package_downloads {
        compute.egress.push(BoundaryRule::tcp(
            Peer::Cidr(Ipv4Cidr::any()),
            security.http_port,
            "Allow HTTP for package downloads",
        ));
        compute.egress.push(BoundaryRule::tcp(
            Peer::Cidr(Ipv4Cidr::any()),
            security.https_port,
            "Allow HTTPS for package downloads",
        ));
    }

    let mut data = SecurityBoundary::new(
        BoundaryId::Data,
        &names.data,
        "Security group for the database",
    );
    data.ingress.push(BoundaryRule::tcp(
        Peer::Boundary(BoundaryId::Compute),
        security.db_port,
        "Allow database access from the application instances",
    ));

    SecurityBoundaries {
        edge,
        compute,
        data,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroupSpec {
    pub vpc: LogicalId,
    pub group_name: String,
    pub description: String,
    /// Always false: outbound is default-deny
    pub allow_all_outbound: bool,
}

/// Peer of a planned security group rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulePeer {
    Cidr(Ipv4Cidr),
    SecurityGroup(LogicalId),
}

/// One ingress or egress rule attached to an existing group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupRuleSpec {
    pub group: LogicalId,
    pub peer: RulePeer,
    pub protocol: String,
    pub ports: PortRange,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reference_chain() {
        let boundaries = compose_boundaries(&PolicyConfig::default());

        assert_eq!(boundaries.edge.ingress[0].peer, Peer::Cidr(Ipv4Cidr::any()));
        assert_eq!(
            boundaries.compute.ingress,
            vec![BoundaryRule::tcp(
                Peer::Boundary(BoundaryId::Edge),
                80,
                "Allow HTTP from the load balancer"
            )]
        );
        assert_eq!(
            boundaries.data.ingress[0].peer,
            Peer::Boundary(BoundaryId::Compute)
        );
        assert_eq!(boundaries.data.ingress[0].ports, PortRange::single(3306));
        assert!(boundaries.data.egress.is_empty());
    }

    #[test]
    fn test_inter_tier_rules_reference_boundaries() {
        let policy = PolicyConfig::default();
        let boundaries = compose_boundaries(&policy);
        for boundary in [&boundaries.compute, &boundaries.data] {
            for rule in &boundary.ingress {
                assert!(matches!(rule.peer, Peer::Boundary(_)));
            }
        }
        assert_eq!(
            boundaries.edge.referenced_boundaries(),
            vec![BoundaryId::Compute]
        );
        assert_eq!(
            boundaries.compute.referenced_boundaries(),
            vec![BoundaryId::Edge, BoundaryId::Data]
        );
    }

    #[test]
    fn test_package_downloads_widen_compute_egress_only() {
        let mut policy = PolicyConfig::default();
        let narrow = compose_boundaries(&policy);
        assert_eq!(narrow.compute.egress.len(), 1);

        policy.security.allow_package_downloads = true;
        let wide = compose_boundaries(&policy);
        assert_eq!(wide.compute.egress.len(), 3);
        assert_eq!(wide.edge, narrow.edge);
        assert_eq!(wide.data, narrow.data);
    }

    #[test]
    fn test_db_port_flows_into_both_sides() {
        let mut policy = PolicyConfig::default();
        policy.security.db_port = 5432;
        let boundaries = compose_boundaries(&policy);
        assert_eq!(boundaries.compute.egress[0].ports, PortRange::single(5432));
        assert_eq!(boundaries.data.ingress[0].ports, PortRange::single(5432));
    }
}
