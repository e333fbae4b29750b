// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stateless Subnet ACLs
//!
//! Entries are evaluated per packet in ascending rule-number order; the first
//! entry matching direction, port and peer decides. When nothing matches the
//! packet is denied. Return traffic therefore needs its own entries, which
//! is what the ephemeral-range rules are for.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::PolicyConfig;
use crate::domain::{Ipv4Cidr, PortRange, SubnetTier};
use crate::errors::{PlanError, PlanResult};
use crate::plan::LogicalId;

/// Traffic direction relative to the subnet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ingress,
    Egress,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingress => write!(f, "ingress"),
            Self::Egress => write!(f, "egress"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclAction {
    Allow,
    Deny,
}

/// Traffic an entry applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "lowercase")]
pub enum TrafficSelector {
    /// Every protocol and port
    All,
    Tcp(PortRange),
}

impl TrafficSelector {
    pub fn tcp_port(port: u16) -> Self {
        Self::Tcp(PortRange::single(port))
    }

    /// Whether every port of `ports` is selected
    pub fn covers(&self, ports: &PortRange) -> bool {
        match self {
            Self::All => true,
            Self::Tcp(range) => range.covers(ports),
        }
    }
}

impl fmt::Display for TrafficSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Tcp(range) => write!(f, "tcp/{}", range),
        }
    }
}

/// One numbered ACL entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclRule {
    pub name: String,
    pub rule_number: u16,
    pub direction: Direction,
    pub action: AclAction,
    pub traffic: TrafficSelector,
    pub cidr: Ipv4Cidr,
}

impl AclRule {
    pub fn allow(
        name: &str,
        rule_number: u16,
        direction: Direction,
        traffic: TrafficSelector,
        cidr: Ipv4Cidr,
    ) -> Self {
        Self {
            name: name.to_string(),
            rule_number,
            direction,
            action: AclAction::Allow,
            traffic,
            cidr,
        }
    }

    fn matches(&self, direction: Direction, ports: &PortRange, peer: &Ipv4Cidr) -> bool {
        self.direction == direction && self.traffic.covers(ports) && self.cidr.contains(peer)
    }
}

/// Outcome of evaluating one packet against an ACL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AclDecision {
    Allow(u16),
    Deny(u16),
    /// No entry matched
    ImplicitDeny,
}

impl AclDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

impl fmt::Display for AclDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow(n) => write!(f, "allowed by rule {}", n),
            Self::Deny(n) => write!(f, "denied by rule {}", n),
            Self::ImplicitDeny => write!(f, "denied by the implicit rule"),
        }
    }
}

/// A custom ACL attached to every subnet of one tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkAcl {
    pub name: String,
    pub tier: SubnetTier,
    entries: Vec<AclRule>,
}

impl NetworkAcl {
    pub fn new(name: impl Into<String>, tier: SubnetTier) -> Self {
        Self {
            name: name.into(),
            tier,
            entries: Vec::new(),
        }
    }

    /// Add an entry
    ///
    /// # Errors
    /// `PolicyConflict` when the rule number is already taken in the same
    /// direction. Numbers are never reassigned.
    pub fn add(&mut self, rule: AclRule) -> PlanResult<()> {
        if let Some(existing) = self
            .entries
            .iter()
            .find(|e| e.direction == rule.direction && e.rule_number == rule.rule_number)
        {
            return Err(PlanError::PolicyConflict {
                acl: self.name.clone(),
                direction: rule.direction,
                rule_number: rule.rule_number,
                existing: existing.name.clone(),
                conflicting: rule.name,
            });
        }
        self.entries.push(rule);
        Ok(())
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[AclRule] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&AclRule> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Entries of one direction in evaluation order
    pub fn evaluation_order(&self, direction: Direction) -> Vec<&AclRule> {
        let mut rules: Vec<&AclRule> = self
            .entries
            .iter()
            .filter(|e| e.direction == direction)
            .collect();
        rules.sort_by_key(|e| e.rule_number);
        rules
    }

    /// First-match evaluation of traffic on `ports` to/from `peer`
    pub fn evaluate(
        &self,
        direction: Direction,
        ports: &PortRange,
        peer: &Ipv4Cidr,
    ) -> AclDecision {
        self.evaluation_order(direction)
            .into_iter()
            .find(|rule| rule.matches(direction, ports, peer))
            .map(|rule| match rule.action {
                AclAction::Allow => AclDecision::Allow(rule.rule_number),
                AclAction::Deny => AclDecision::Deny(rule.rule_number),
            })
            .unwrap_or(AclDecision::ImplicitDeny)
    }
}

/// Derive the custom ACLs
///
/// Public tier: HTTP and HTTPS from anywhere, ephemeral return traffic,
/// all outbound. Private-with-egress tier: HTTP and the DB port from the
/// VPC block, ephemeral return traffic, all outbound. The isolated tier keeps
/// the provider default ACL. Disabled entries are left out without
/// renumbering the others.
pub fn compose_acls(vpc_cidr: Ipv4Cidr, policy: &PolicyConfig) -> PlanResult<Vec<NetworkAcl>> {
    let acls = &policy.acls;
    if !acls.enabled {
        return Ok(Vec::new());
    }

    let rules = &acls.rules;
    let security = &policy.security;
    let ephemeral = TrafficSelector::Tcp(acls.ephemeral_range()?);
    let any = Ipv4Cidr::any();

    let mut public = NetworkAcl::new(policy.names.public_acl.as_str(), SubnetTier::Public);
    let public_entries = [
        (
            rules.enable_http_inbound,
            AclRule::allow(
                "AllowHttpInbound",
                rules.http_inbound_rule_number,
                Direction::Ingress,
                TrafficSelector::tcp_port(security.http_port),
                any,
            ),
        ),
        (
            rules.enable_https_inbound,
            AclRule::allow(
                "AllowHttpsInbound",
                rules.https_inbound_rule_number,
                Direction::Ingress,
                TrafficSelector::tcp_port(security.https_port),
                any,
            ),
        ),
        (
            rules.enable_ephemeral_inbound,
            AclRule::allow(
                "AllowEphemeralInbound",
                rules.ephemeral_inbound_rule_number,
                Direction::Ingress,
                ephemeral,
                any,
            ),
        ),
        (
            rules.enable_all_outbound,
            AclRule::allow(
                "AllowAllOutbound",
                rules.all_outbound_rule_number,
                Direction::Egress,
                TrafficSelector::All,
                any,
            ),
        ),
    ];
    for (enabled, rule) in public_entries {
        if enabled {
            public.add(rule)?;
        }
    }

    let mut private = NetworkAcl::new(
        policy.names.private_acl.as_str(),
        SubnetTier::PrivateEgress,
    );
    let private_entries = [
        (
            rules.enable_private_http_inbound,
            AclRule::allow(
                "AllowHttpFromVpc",
                rules.private_http_rule_number,
                Direction::Ingress,
                TrafficSelector::tcp_port(security.http_port),
                vpc_cidr,
            ),
        ),
        (
            rules.enable_private_database_inbound,
            AclRule::allow(
                "AllowDatabaseFromVpc",
                rules.private_database_rule_number,
                Direction::Ingress,
                TrafficSelector::tcp_port(security.db_port),
                vpc_cidr,
            ),
        ),
        (
            rules.enable_private_ephemeral_inbound,
            AclRule::allow(
                "AllowEphemeralInboundPrivate",
                rules.private_ephemeral_rule_number,
                Direction::Ingress,
                ephemeral,
                any,
            ),
        ),
        (
            rules.enable_private_all_outbound,
            AclRule::allow(
                "AllowAllOutboundPrivate",
                rules.private_all_outbound_rule_number(),
                Direction::Egress,
                TrafficSelector::All,
                any,
            ),
        ),
    ];
    for (enabled, rule) in private_entries {
        if enabled {
            private.add(rule)?;
        }
    }

    Ok(vec![public, private])
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkAclSpec {
    pub vpc: LogicalId,
    pub tier: SubnetTier,
    /// Subnets associated with this ACL
    pub subnets: Vec<LogicalId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkAclEntrySpec {
    pub network_acl: LogicalId,
    pub rule: AclRule,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vpc() -> Ipv4Cidr {
        Ipv4Cidr::new("10.0.0.0/16").unwrap()
    }

    fn numbers(acl: &NetworkAcl, direction: Direction) -> Vec<(String, u16)> {
        acl.evaluation_order(direction)
            .into_iter()
            .map(|r| (r.name.clone(), r.rule_number))
            .collect()
    }

    #[test]
    fn test_default_acls() {
        let acls = compose_acls(vpc(), &PolicyConfig::default()).unwrap();
        assert_eq!(acls.len(), 2);

        let public = &acls[0];
        assert_eq!(
            numbers(public, Direction::Ingress),
            vec![
                ("AllowHttpInbound".to_string(), 100),
                ("AllowHttpsInbound".to_string(), 105),
                ("AllowEphemeralInbound".to_string(), 110),
            ]
        );
        assert_eq!(
            numbers(public, Direction::Egress),
            vec![("AllowAllOutbound".to_string(), 100)]
        );

        let private = &acls[1];
        assert_eq!(private.tier, SubnetTier::PrivateEgress);
        assert_eq!(
            numbers(private, Direction::Ingress),
            vec![
                ("AllowHttpFromVpc".to_string(), 100),
                ("AllowDatabaseFromVpc".to_string(), 110),
                ("AllowEphemeralInboundPrivate".to_string(), 120),
            ]
        );
        assert_eq!(
            private.entry("AllowDatabaseFromVpc").unwrap().traffic,
            TrafficSelector::tcp_port(3306)
        );
    }

    #[test]
    fn test_disabling_rule_keeps_other_numbers() {
        let mut policy = PolicyConfig::default();
        policy.acls.rules.enable_https_inbound = false;
        let acls = compose_acls(vpc(), &policy).unwrap();
        assert_eq!(
            numbers(&acls[0], Direction::Ingress),
            vec![
                ("AllowHttpInbound".to_string(), 100),
                ("AllowEphemeralInbound".to_string(), 110),
            ]
        );
    }

    #[test]
    fn test_duplicate_number_is_policy_conflict() {
        let mut policy = PolicyConfig::default();
        policy.acls.rules.https_inbound_rule_number = 100;
        match compose_acls(vpc(), &policy) {
            Err(PlanError::PolicyConflict {
                acl,
                direction,
                rule_number,
                existing,
                conflicting,
            }) => {
                assert_eq!(acl, "PublicNetworkAcl");
                assert_eq!(direction, Direction::Ingress);
                assert_eq!(rule_number, 100);
                assert_eq!(existing, "AllowHttpInbound");
                assert_eq!(conflicting, "AllowHttpsInbound");
            }
            other => panic!("expected a policy conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_same_number_in_other_direction_is_fine() {
        // Egress 100 and ingress 100 coexist in the default public ACL
        let acls = compose_acls(vpc(), &PolicyConfig::default()).unwrap();
        assert!(acls[0].entry("AllowAllOutbound").is_some());
        assert!(acls[0].entry("AllowHttpInbound").is_some());
    }

    #[test]
    fn test_disabled_acls() {
        let mut policy = PolicyConfig::default();
        policy.acls.enabled = false;
        assert!(compose_acls(vpc(), &policy).unwrap().is_empty());
    }

    #[test]
    fn test_first_match_wins() {
        let mut acl = NetworkAcl::new("Test", SubnetTier::Public);
        acl.add(AclRule {
            name: "DenyHttp".to_string(),
            rule_number: 90,
            direction: Direction::Ingress,
            action: AclAction::Deny,
            traffic: TrafficSelector::tcp_port(80),
            cidr: Ipv4Cidr::any(),
        })
        .unwrap();
        acl.add(AclRule::allow(
            "AllowAll",
            100,
            Direction::Ingress,
            TrafficSelector::All,
            Ipv4Cidr::any(),
        ))
        .unwrap();

        let any = Ipv4Cidr::any();
        assert_eq!(
            acl.evaluate(Direction::Ingress, &PortRange::single(80), &any),
            AclDecision::Deny(90)
        );
        assert_eq!(
            acl.evaluate(Direction::Ingress, &PortRange::single(443), &any),
            AclDecision::Allow(100)
        );
        assert_eq!(
            acl.evaluate(Direction::Egress, &PortRange::single(443), &any),
            AclDecision::ImplicitDeny
        );
    }

    #[test]
    fn test_vpc_scoped_rule_ignores_internet() {
        let acls = compose_acls(vpc(), &PolicyConfig::default()).unwrap();
        let private = &acls[1];
        let http = PortRange::single(80);

        assert!(private
            .evaluate(Direction::Ingress, &http, &Ipv4Cidr::new("10.0.0.0/24").unwrap())
            .is_allowed());
        assert!(!private
            .evaluate(Direction::Ingress, &http, &Ipv4Cidr::any())
            .is_allowed());
    }
}
