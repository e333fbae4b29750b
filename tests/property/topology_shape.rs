// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Topology Shape

use cim_topology::domain::{Ipv4Cidr, NetworkBlock, ResourceKind, SubnetTier};
use cim_topology::plan::PlanBuilder;
use cim_topology::topology::{build_topology, TopologyOptions};
use proptest::prelude::*;

/// (second octet, AZ count, subnet mask, NAT count)
fn layout() -> impl Strategy<Value = (u8, u8, u8, u8)> {
    (0u8..=255, 1u8..=6, 21u8..=28, 0u8..=8)
}

proptest! {
    /// n AZs yield 3n subnets and min(requested, n) NAT gateways
    #[test]
    fn prop_subnet_and_nat_counts((octet, azs, mask, nats) in layout()) {
        let cidr = Ipv4Cidr::new(format!("10.{}.0.0/16", octet)).unwrap();
        let block = NetworkBlock::new(cidr, azs, mask).unwrap();
        let options = TopologyOptions { nat_gateways: nats, ..TopologyOptions::default() };

        let mut plan = PlanBuilder::new();
        let topology = build_topology(&block, &options, &mut plan).unwrap();

        prop_assert_eq!(topology.subnets.len(), 3 * usize::from(azs));
        prop_assert_eq!(topology.nat_gateways.len(), usize::from(nats.min(azs)));

        let resources = plan.finalize().unwrap();
        let count = |kind: ResourceKind| resources.iter().filter(|r| r.kind == kind).count();
        prop_assert_eq!(count(ResourceKind::InternetGateway), 1);
        prop_assert_eq!(count(ResourceKind::RouteTable), 3 * usize::from(azs));
    }

    /// Subnets stay inside the VPC and never overlap each other
    #[test]
    fn prop_subnets_disjoint_and_contained((octet, azs, mask, _) in layout()) {
        let cidr = Ipv4Cidr::new(format!("10.{}.0.0/16", octet)).unwrap();
        let block = NetworkBlock::new(cidr, azs, mask).unwrap();
        let topology = build_topology(&block, &TopologyOptions::default(), &mut PlanBuilder::new()).unwrap();

        for (i, a) in topology.subnets.iter().enumerate() {
            prop_assert!(cidr.contains(&a.cidr));
            prop_assert_eq!(a.cidr.prefix_len(), mask);
            for b in topology.subnets.iter().skip(i + 1) {
                prop_assert!(!a.cidr.overlaps(&b.cidr), "{} overlaps {}", a.cidr, b.cidr);
            }
        }
    }

    /// Every private-with-egress subnet routes through a NAT whenever one exists
    #[test]
    fn prop_private_egress_routes((_, azs, _, nats) in layout()) {
        let block = NetworkBlock::new(Ipv4Cidr::new("10.0.0.0/16").unwrap(), azs, 24).unwrap();
        let options = TopologyOptions { nat_gateways: nats, ..TopologyOptions::default() };
        let topology = build_topology(&block, &options, &mut PlanBuilder::new()).unwrap();

        for subnet in topology.subnets_in(SubnetTier::PrivateEgress) {
            prop_assert_eq!(subnet.nat_gateway.is_some(), nats > 0);
        }
        for subnet in topology.subnets_in(SubnetTier::PrivateIsolated) {
            prop_assert!(!topology.has_internet_egress(subnet));
        }
    }
}

#[test]
fn test_block_too_small_is_rejected() {
    // /26 holds four /28 subnets; two AZs need six
    let cidr = Ipv4Cidr::new("10.0.0.0/26").unwrap();
    assert!(NetworkBlock::new(cidr, 2, 28).is_err());
    assert!(NetworkBlock::new(cidr, 1, 28).is_ok());
}
