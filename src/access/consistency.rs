// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cross-Layer Consistency Check
//!
//! Replays a fixed set of probe flows against the stateful boundaries, the
//! stateless ACLs and routing, subnet pair by subnet pair.
//!
//! - A *contradiction* is a flow the boundaries allow but an ACL or the
//!   route tables block; the intended traffic would silently fail.
//! - A *gap* is a flow the boundaries deny but ACLs and routing would carry;
//!   only one layer stands in its way.
//!
//! The internet is modelled as `0.0.0.0/0`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::acl::{Direction, NetworkAcl};
use super::boundary::{BoundaryId, Peer, SecurityBoundaries};
use super::{AccessModel, PolicyConfig};
use crate::domain::{Ipv4Cidr, PortRange, SubnetTier};
use crate::errors::PlanResult;
use crate::topology::{PlannedSubnet, Topology};

/// Where a probe flow starts or ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Internet,
    Edge,
    Compute,
    Data,
}

impl Endpoint {
    fn boundary(&self) -> Option<BoundaryId> {
        match self {
            Self::Internet => None,
            Self::Edge => Some(BoundaryId::Edge),
            Self::Compute => Some(BoundaryId::Compute),
            Self::Data => Some(BoundaryId::Data),
        }
    }

    fn tier(&self, policy: &PolicyConfig) -> Option<SubnetTier> {
        match self {
            Self::Internet => None,
            Self::Edge => Some(SubnetTier::Public),
            Self::Compute => Some(policy.compute_tier),
            Self::Data => Some(SubnetTier::PrivateIsolated),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internet => write!(f, "internet"),
            Self::Edge => write!(f, "edge"),
            Self::Compute => write!(f, "compute"),
            Self::Data => write!(f, "data"),
        }
    }
}

/// A TCP connection attempt from `source` to `destination`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProbeFlow {
    pub source: Endpoint,
    pub destination: Endpoint,
    pub port: u16,
}

impl ProbeFlow {
    pub fn new(source: Endpoint, destination: Endpoint, port: u16) -> Self {
        Self {
            source,
            destination,
            port,
        }
    }
}

impl fmt::Display for ProbeFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {} on {}", self.source, self.destination, self.port)
    }
}

/// The flows every plan is checked against
pub fn probe_flows(policy: &PolicyConfig) -> Vec<ProbeFlow> {
    use Endpoint::*;
    let http = policy.security.http_port;
    let https = policy.security.https_port;
    let db = policy.security.db_port;

    vec![
        ProbeFlow::new(Internet, Edge, http),
        ProbeFlow::new(Internet, Edge, https),
        ProbeFlow::new(Edge, Compute, http),
        ProbeFlow::new(Compute, Data, db),
        ProbeFlow::new(Internet, Compute, http),
        ProbeFlow::new(Internet, Data, db),
        ProbeFlow::new(Edge, Data, db),
        ProbeFlow::new(Data, Compute, http),
        ProbeFlow::new(Compute, Internet, http),
        ProbeFlow::new(Compute, Internet, https),
        ProbeFlow::new(Edge, Internet, http),
        ProbeFlow::new(Data, Internet, https),
    ]
}

/// One disagreement between the layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub flow: ProbeFlow,
    pub reason: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.flow, self.reason)
    }
}

/// Result of the consistency check, attached to every plan
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyReport {
    pub flows_checked: usize,
    pub contradictions: Vec<Finding>,
    pub gaps: Vec<Finding>,
}

impl ConsistencyReport {
    /// No flow the boundaries allow is blocked elsewhere
    pub fn is_consistent(&self) -> bool {
        self.contradictions.is_empty()
    }

    pub fn has_gap(&self, flow: &ProbeFlow) -> bool {
        self.gaps.iter().any(|g| &g.flow == flow)
    }

    pub fn has_contradiction(&self, flow: &ProbeFlow) -> bool {
        self.contradictions.iter().any(|c| &c.flow == flow)
    }
}

/// A resolved flow end: the internet or one concrete subnet
#[derive(Clone, Copy)]
enum Location<'a> {
    Internet,
    Subnet(&'a PlannedSubnet),
}

impl Location<'_> {
    fn cidr(&self) -> Ipv4Cidr {
        match self {
            Self::Internet => Ipv4Cidr::any(),
            Self::Subnet(subnet) => subnet.cidr,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Internet => "internet".to_string(),
            Self::Subnet(subnet) => format!("{} ({})", subnet.logical_id, subnet.cidr),
        }
    }
}

/// Check every probe flow against both layers and routing
pub fn verify(
    model: &AccessModel,
    topology: &Topology,
    policy: &PolicyConfig,
) -> PlanResult<ConsistencyReport> {
    let ephemeral = policy.acls.ephemeral_range()?;
    let checker = Checker {
        model,
        topology,
        policy,
        ephemeral,
    };

    let flows = probe_flows(policy);
    let mut report = ConsistencyReport {
        flows_checked: flows.len(),
        ..ConsistencyReport::default()
    };

    for flow in flows {
        let mut contradiction = None;
        let mut gap = None;

        for source in checker.locations(flow.source) {
            for destination in checker.locations(flow.destination) {
                let stateful = checker.stateful_allows(&flow, source, destination);
                let transit = checker.transit(&flow, source, destination);

                match (stateful, transit) {
                    (true, Err(reason)) if contradiction.is_none() => {
                        contradiction = Some(reason);
                    }
                    (false, Ok(())) if gap.is_none() => {
                        gap = Some(format!(
                            "boundaries deny {} → {} but subnet ACLs and routing allow it",
                            source.describe(),
                            destination.describe()
                        ));
                    }
                    _ => {}
                }
            }
        }

        if let Some(reason) = contradiction {
            report.contradictions.push(Finding { flow, reason });
        }
        if let Some(reason) = gap {
            report.gaps.push(Finding { flow, reason });
        }
    }

    Ok(report)
}

struct Checker<'a> {
    model: &'a AccessModel,
    topology: &'a Topology,
    policy: &'a PolicyConfig,
    ephemeral: PortRange,
}

impl<'a> Checker<'a> {
    fn locations(&self, endpoint: Endpoint) -> Vec<Location<'a>> {
        match endpoint.tier(self.policy) {
            None => vec![Location::Internet],
            Some(tier) => self.topology.subnets_in(tier).map(Location::Subnet).collect(),
        }
    }

    fn acl_for(&self, location: Location<'_>) -> Option<&'a NetworkAcl> {
        match location {
            Location::Internet => None,
            Location::Subnet(subnet) => self.model.acls.iter().find(|acl| acl.tier == subnet.tier),
        }
    }

    fn peer_matches(&self, peer: &Peer, endpoint: Endpoint, location: Location<'_>) -> bool {
        match peer {
            Peer::Boundary(id) => endpoint.boundary() == Some(*id),
            Peer::Cidr(cidr) => cidr.contains(&location.cidr()),
        }
    }

    /// Source egress and destination ingress of the stateful layer
    fn stateful_allows(
        &self,
        flow: &ProbeFlow,
        source: Location<'_>,
        destination: Location<'_>,
    ) -> bool {
        let port = PortRange::single(flow.port);
        let boundaries: &SecurityBoundaries = &self.model.boundaries;

        let egress_ok = match flow.source.boundary() {
            None => true,
            Some(id) => boundaries.get(id).egress.iter().any(|rule| {
                rule.ports.covers(&port)
                    && self.peer_matches(&rule.peer, flow.destination, destination)
            }),
        };
        let ingress_ok = match flow.destination.boundary() {
            None => true,
            Some(id) => boundaries.get(id).ingress.iter().any(|rule| {
                rule.ports.covers(&port) && self.peer_matches(&rule.peer, flow.source, source)
            }),
        };
        egress_ok && ingress_ok
    }

    /// Routing and the four stateless checks of a request and its reply
    fn transit(
        &self,
        flow: &ProbeFlow,
        source: Location<'_>,
        destination: Location<'_>,
    ) -> Result<(), String> {
        self.routable(flow, source, destination)?;

        let port = PortRange::single(flow.port);
        self.acl_allows(source, Direction::Egress, &port, destination)?;
        self.acl_allows(destination, Direction::Ingress, &port, source)?;
        self.acl_allows(destination, Direction::Egress, &self.ephemeral, source)?;
        self.acl_allows(source, Direction::Ingress, &self.ephemeral, destination)?;
        Ok(())
    }

    fn routable(
        &self,
        flow: &ProbeFlow,
        source: Location<'_>,
        destination: Location<'_>,
    ) -> Result<(), String> {
        if flow.source == Endpoint::Internet
            && flow.destination == Endpoint::Edge
            && !self.policy.edge_internet_facing
        {
            return Err(format!(
                "internal load balancer in {} has no public address",
                destination.describe()
            ));
        }

        match (source, destination) {
            (Location::Internet, Location::Subnet(subnet)) if !subnet.tier.is_internet_routable() => {
                Err(format!("{} is not reachable from the internet", subnet.logical_id))
            }
            (Location::Subnet(subnet), Location::Internet)
                if !self.topology.has_internet_egress(subnet) =>
            {
                Err(format!("{} has no route to the internet", subnet.logical_id))
            }
            _ => Ok(()),
        }
    }

    fn acl_allows(
        &self,
        at: Location<'_>,
        direction: Direction,
        ports: &PortRange,
        peer: Location<'_>,
    ) -> Result<(), String> {
        let Some(acl) = self.acl_for(at) else {
            return Ok(());
        };
        let decision = acl.evaluate(direction, ports, &peer.cidr());
        if decision.is_allowed() {
            Ok(())
        } else {
            let relation = match direction {
                Direction::Ingress => "from",
                Direction::Egress => "to",
            };
            Err(format!(
                "{} {} of {} {} {} at {}: {}",
                acl.name,
                direction,
                ports,
                relation,
                peer.describe(),
                at.describe(),
                decision
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::compose;
    use crate::domain::NetworkBlock;
    use crate::plan::PlanBuilder;
    use crate::topology::{build_topology, TopologyOptions};
    use Endpoint::*;

    fn check(policy: &PolicyConfig, nat_gateways: u8) -> ConsistencyReport {
        let block = NetworkBlock::new(Ipv4Cidr::new("10.0.0.0/16").unwrap(), 2, 24).unwrap();
        let options = TopologyOptions {
            nat_gateways,
            ..TopologyOptions::default()
        };
        let topology = build_topology(&block, &options, &mut PlanBuilder::new()).unwrap();
        let model = compose(&block, policy).unwrap();
        verify(&model, &topology, policy).unwrap()
    }

    #[test]
    fn test_default_policy_has_no_contradictions() {
        let report = check(&PolicyConfig::default(), 2);
        assert_eq!(report.flows_checked, 12);
        assert!(report.is_consistent(), "{:?}", report.contradictions);
    }

    #[test]
    fn test_default_policy_gaps() {
        let report = check(&PolicyConfig::default(), 2);
        let mut gaps: Vec<ProbeFlow> = report.gaps.iter().map(|g| g.flow).collect();
        gaps.sort_by_key(|f| (f.source as u8, f.destination as u8, f.port));

        let mut expected = vec![
            ProbeFlow::new(Internet, Edge, 443),
            ProbeFlow::new(Edge, Data, 3306),
            ProbeFlow::new(Data, Compute, 80),
            ProbeFlow::new(Compute, Internet, 80),
            ProbeFlow::new(Compute, Internet, 443),
            ProbeFlow::new(Edge, Internet, 80),
        ];
        expected.sort_by_key(|f| (f.source as u8, f.destination as u8, f.port));
        assert_eq!(gaps, expected);
    }

    #[test]
    fn test_unroutable_flows_are_neither_gap_nor_contradiction() {
        let report = check(&PolicyConfig::default(), 2);
        for flow in [
            ProbeFlow::new(Internet, Compute, 80),
            ProbeFlow::new(Internet, Data, 3306),
            ProbeFlow::new(Data, Internet, 443),
        ] {
            assert!(!report.has_gap(&flow), "{}", flow);
            assert!(!report.has_contradiction(&flow), "{}", flow);
        }
    }

    #[test]
    fn test_internal_edge_open_to_internet_is_contradiction() {
        let policy = PolicyConfig {
            edge_internet_facing: false,
            ..PolicyConfig::default()
        };
        let report = check(&policy, 2);

        assert!(!report.is_consistent());
        assert!(report.has_contradiction(&ProbeFlow::new(Internet, Edge, 80)));
        assert!(!report.has_gap(&ProbeFlow::new(Internet, Edge, 443)));
        assert!(!report.has_contradiction(&ProbeFlow::new(Edge, Compute, 80)));
    }

    #[test]
    fn test_package_downloads_close_egress_gaps() {
        let mut policy = PolicyConfig::default();
        policy.security.allow_package_downloads = true;
        let report = check(&policy, 2);

        assert!(report.is_consistent());
        assert!(!report.has_gap(&ProbeFlow::new(Compute, Internet, 80)));
        assert!(!report.has_gap(&ProbeFlow::new(Compute, Internet, 443)));
        assert_eq!(report.gaps.len(), 4);
    }

    #[test]
    fn test_disabled_private_http_rule_is_contradiction() {
        let mut policy = PolicyConfig::default();
        policy.acls.rules.enable_private_http_inbound = false;
        let report = check(&policy, 2);

        let flow = ProbeFlow::new(Edge, Compute, 80);
        assert!(report.has_contradiction(&flow));
        assert!(!report.is_consistent());
    }

    #[test]
    fn test_missing_nat_contradicts_package_downloads() {
        let mut policy = PolicyConfig::default();
        policy.security.allow_package_downloads = true;
        let report = check(&policy, 0);

        assert!(report.has_contradiction(&ProbeFlow::new(Compute, Internet, 443)));
        let finding = report
            .contradictions
            .iter()
            .find(|c| c.flow == ProbeFlow::new(Compute, Internet, 443))
            .unwrap();
        assert!(finding.reason.contains("no route to the internet"));
    }

    #[test]
    fn test_restricted_http_source_reports_gap() {
        let mut policy = PolicyConfig::default();
        policy.security.allow_http_from = Ipv4Cidr::new("203.0.113.0/24").unwrap();
        let report = check(&policy, 2);
        assert!(report.has_gap(&ProbeFlow::new(Internet, Edge, 80)));
        assert!(report.is_consistent());
    }

    #[test]
    fn test_without_custom_acls_only_routing_blocks() {
        let mut policy = PolicyConfig::default();
        policy.acls.enabled = false;
        let report = check(&policy, 2);
        assert!(report.is_consistent());
        assert!(report.has_gap(&ProbeFlow::new(Edge, Data, 3306)));
    }
}
