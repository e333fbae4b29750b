// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for ACL Composition

use std::collections::BTreeSet;

use cim_topology::access::acl::compose_acls;
use cim_topology::access::{AclDecision, Direction, NetworkAcl, PolicyConfig};
use cim_topology::config::AclRuleConfig;
use cim_topology::domain::{Ipv4Cidr, PortRange};
use cim_topology::PlanError;
use proptest::prelude::*;

const RULE_NAMES: [&str; 8] = [
    "AllowHttpInbound",
    "AllowHttpsInbound",
    "AllowEphemeralInbound",
    "AllowAllOutbound",
    "AllowHttpFromVpc",
    "AllowDatabaseFromVpc",
    "AllowEphemeralInboundPrivate",
    "AllowAllOutboundPrivate",
];

fn apply_toggles(rules: &mut AclRuleConfig, toggles: [bool; 8]) {
    rules.enable_http_inbound = toggles[0];
    rules.enable_https_inbound = toggles[1];
    rules.enable_ephemeral_inbound = toggles[2];
    rules.enable_all_outbound = toggles[3];
    rules.enable_private_http_inbound = toggles[4];
    rules.enable_private_database_inbound = toggles[5];
    rules.enable_private_ephemeral_inbound = toggles[6];
    rules.enable_private_all_outbound = toggles[7];
}

fn entries(acls: &[NetworkAcl]) -> BTreeSet<(String, u16)> {
    acls.iter()
        .flat_map(|acl| acl.entries().iter())
        .map(|rule| (rule.name.clone(), rule.rule_number))
        .collect()
}

fn vpc() -> Ipv4Cidr {
    Ipv4Cidr::new("10.0.0.0/16").unwrap()
}

proptest! {
    /// Toggling rules off removes exactly those rules and renumbers nothing
    #[test]
    fn prop_toggles_remove_only_their_rule(toggles in prop::array::uniform8(any::<bool>())) {
        let full = entries(&compose_acls(vpc(), &PolicyConfig::default()).unwrap());

        let mut policy = PolicyConfig::default();
        apply_toggles(&mut policy.acls.rules, toggles);
        let partial = entries(&compose_acls(vpc(), &policy).unwrap());

        let expected: BTreeSet<(String, u16)> = full
            .into_iter()
            .filter(|(name, _)| {
                let index = RULE_NAMES.iter().position(|n| n == name).unwrap();
                toggles[index]
            })
            .collect();
        prop_assert_eq!(partial, expected);
    }

    /// Distinct inbound numbers always compose; a shared one is a conflict
    #[test]
    fn prop_public_inbound_numbers(
        http in 1u16..=32766,
        https in 1u16..=32766,
        ephemeral in 1u16..=32766,
    ) {
        let mut policy = PolicyConfig::default();
        policy.acls.rules.http_inbound_rule_number = http;
        policy.acls.rules.https_inbound_rule_number = https;
        policy.acls.rules.ephemeral_inbound_rule_number = ephemeral;

        let distinct = http != https && http != ephemeral && https != ephemeral;
        match compose_acls(vpc(), &policy) {
            Ok(acls) => prop_assert!(distinct, "duplicate numbers accepted: {:?}", acls),
            Err(PlanError::PolicyConflict { direction, .. }) => {
                prop_assert!(!distinct);
                prop_assert_eq!(direction, Direction::Ingress);
            }
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }

    /// Evaluation is first-match by rule number
    #[test]
    fn prop_http_inbound_decided_by_http_rule(port in 1u16..1024) {
        let policy = PolicyConfig::default();
        let acls = compose_acls(vpc(), &policy).unwrap();
        let decision = acls[0].evaluate(Direction::Ingress, &PortRange::single(port), &Ipv4Cidr::any());

        let expected = match port {
            80 => AclDecision::Allow(100),
            443 => AclDecision::Allow(105),
            _ => AclDecision::ImplicitDeny,
        };
        prop_assert_eq!(decision, expected);
    }
}
