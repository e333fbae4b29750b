// Copyright (c) 2025 - Cowboy AI, Inc.
//! Access Control Composer
//!
//! Derives both security layers from one [`PolicyConfig`]:
//!
//! - **stateless** subnet ACLs ([`acl`]), evaluated per packet
//! - **stateful** security boundaries ([`boundary`]), connection-tracked
//!
//! Intent: the edge takes HTTP/HTTPS from the internet, compute takes traffic
//! only from the edge, data only from compute; everything else inbound is
//! denied. [`consistency`] checks the two layers agree.
//!
//! Composition is pure ([`compose`]); [`register`] turns the model into plan
//! resources. Security groups are planned bare and every rule is its own
//! resource depending on the groups it names, so the reference graph
//! stays acyclic.

pub mod acl;
pub mod boundary;
pub mod consistency;

pub use acl::{AclAction, AclDecision, AclRule, Direction, NetworkAcl, TrafficSelector};
pub use boundary::{BoundaryId, BoundaryRule, Peer, SecurityBoundaries, SecurityBoundary};
pub use consistency::{verify, ConsistencyReport, Endpoint, Finding, ProbeFlow};

use tracing::{debug, info};

use crate::config::{NetworkAclConfig, SecurityConfig};
use crate::domain::{NetworkBlock, PortRange, SubnetTier};
use crate::errors::PlanResult;
use crate::plan::{LogicalId, PlanBuilder, ResourceSpec};
use crate::topology::Topology;
use acl::{NetworkAclEntrySpec, NetworkAclSpec};
use boundary::{RulePeer, SecurityGroupRuleSpec, SecurityGroupSpec};

/// The single source both security layers are derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    pub security: SecurityConfig,
    pub acls: NetworkAclConfig,
    /// Tier hosting the compute boundary
    pub compute_tier: SubnetTier,
    /// Whether the edge (load balancer) accepts connections from the internet
    pub edge_internet_facing: bool,
    pub names: PolicyNames,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            security: SecurityConfig::default(),
            acls: NetworkAclConfig::default(),
            compute_tier: SubnetTier::PrivateEgress,
            edge_internet_facing: true,
            names: PolicyNames::default(),
        }
    }
}

impl PolicyConfig {
    pub fn ephemeral_range(&self) -> PlanResult<PortRange> {
        self.acls.ephemeral_range()
    }
}

/// Resource names of the ACLs and boundaries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyNames {
    pub public_acl: String,
    pub private_acl: String,
    pub edge: String,
    pub compute: String,
    pub data: String,
}

impl Default for PolicyNames {
    fn default() -> Self {
        Self {
            public_acl: "PublicNetworkAcl".to_string(),
            private_acl: "PrivateNetworkAcl".to_string(),
            edge: "AlbSecurityGroup".to_string(),
            compute: "AsgSecurityGroup".to_string(),
            data: "DatabaseSecurityGroup".to_string(),
        }
    }
}

/// Both security layers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessModel {
    /// Custom ACLs; tiers without one keep the provider default
    pub acls: Vec<NetworkAcl>,
    pub boundaries: SecurityBoundaries,
}

impl AccessModel {
    pub fn acl_for(&self, tier: SubnetTier) -> Option<&NetworkAcl> {
        self.acls.iter().find(|acl| acl.tier == tier)
    }
}

/// Derive both layers from one policy
///
/// # Errors
/// `PolicyConflict` on a duplicate ACL rule number; `Configuration` on an
/// invalid ephemeral range.
pub fn compose(block: &NetworkBlock, policy: &PolicyConfig) -> PlanResult<AccessModel> {
    let acls = acl::compose_acls(block.cidr(), policy)?;
    let boundaries = boundary::compose_boundaries(policy);
    debug!(
        "Composed {} custom ACLs and {} boundaries",
        acls.len(),
        boundaries.iter().count()
    );
    Ok(AccessModel { acls, boundaries })
}

/// Plan identifiers of the security groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroupIds {
    pub edge: LogicalId,
    pub compute: LogicalId,
    pub data: LogicalId,
}

impl SecurityGroupIds {
    pub fn get(&self, id: BoundaryId) -> &LogicalId {
        match id {
            BoundaryId::Edge => &self.edge,
            BoundaryId::Compute => &self.compute,
            BoundaryId::Data => &self.data,
        }
    }
}

/// Register ACLs, security groups and their rules with the plan
pub fn register(
    model: &AccessModel,
    topology: &Topology,
    plan: &mut PlanBuilder,
) -> PlanResult<SecurityGroupIds> {
    for network_acl in &model.acls {
        let subnets = topology.subnet_ids(network_acl.tier);
        let mut depends_on = vec![topology.vpc.clone()];
        depends_on.extend(subnets.iter().cloned());

        let acl_id = plan.add(
            network_acl.name.as_str(),
            ResourceSpec::NetworkAcl(NetworkAclSpec {
                vpc: topology.vpc.clone(),
                tier: network_acl.tier,
                subnets,
            }),
            depends_on,
        )?;

        for rule in network_acl.entries() {
            plan.add(
                acl_id.child(&rule.name),
                ResourceSpec::NetworkAclEntry(NetworkAclEntrySpec {
                    network_acl: acl_id.clone(),
                    rule: rule.clone(),
                }),
                vec![acl_id.clone()],
            )?;
        }
    }

    let boundaries = &model.boundaries;
    let ids = SecurityGroupIds {
        edge: add_group(&boundaries.edge, topology, plan)?,
        compute: add_group(&boundaries.compute, topology, plan)?,
        data: add_group(&boundaries.data, topology, plan)?,
    };

    let mut rule_count = 0;
    for boundary in model.boundaries.iter() {
        let group = ids.get(boundary.id);
        for (direction, rules) in [
            (Direction::Ingress, &boundary.ingress),
            (Direction::Egress, &boundary.egress),
        ] {
            for (i, rule) in rules.iter().enumerate() {
                let mut depends_on = vec![group.clone()];
                let peer = match rule.peer {
                    Peer::Cidr(cidr) => RulePeer::Cidr(cidr),
                    Peer::Boundary(other) => {
                        depends_on.push(ids.get(other).clone());
                        RulePeer::SecurityGroup(ids.get(other).clone())
                    }
                };
                let spec = SecurityGroupRuleSpec {
                    group: group.clone(),
                    peer,
                    protocol: "tcp".to_string(),
                    ports: rule.ports,
                    description: rule.description.clone(),
                };
                let (suffix, spec) = match direction {
                    Direction::Ingress => ("Ingress", ResourceSpec::SecurityGroupIngress(spec)),
                    Direction::Egress => ("Egress", ResourceSpec::SecurityGroupEgress(spec)),
                };
                plan.add(group.child(format!("{}{}", suffix, i + 1)), spec, depends_on)?;
                rule_count += 1;
            }
        }
    }

    info!(
        "Registered {} ACLs, 3 security groups and {} security group rules",
        model.acls.len(),
        rule_count
    );
    Ok(ids)
}

fn add_group(
    boundary: &SecurityBoundary,
    topology: &Topology,
    plan: &mut PlanBuilder,
) -> PlanResult<LogicalId> {
    plan.add(
        boundary.name.as_str(),
        ResourceSpec::SecurityGroup(SecurityGroupSpec {
            vpc: topology.vpc.clone(),
            group_name: boundary.name.clone(),
            description: boundary.description.clone(),
            allow_all_outbound: false,
        }),
        vec![topology.vpc.clone()],
    )
}
