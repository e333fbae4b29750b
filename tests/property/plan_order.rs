// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Plan Ordering

use std::collections::HashMap;

use cim_topology::config::StackConfig;
use cim_topology::domain::ResourceKind;
use cim_topology::plan::ResourceSpec;
use cim_topology::planner::Planner;
use proptest::prelude::*;

fn environment_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("dev".to_string()),
        Just("test".to_string()),
        Just("staging".to_string()),
        Just("production".to_string()),
        Just("prod".to_string()),
    ]
}

fn engine() -> impl Strategy<Value = (String, u16)> {
    prop_oneof![
        Just(("mysql".to_string(), 3306)),
        Just(("MariaDB".to_string(), 3306)),
        Just(("postgres".to_string(), 5432)),
        Just(("PostgreSQL".to_string(), 5432)),
    ]
}

prop_compose! {
    fn stack_config()(
        environment in environment_name(),
        (engine, db_port) in engine(),
        max_azs in 1u8..=4,
        nat_gateways in 0u8..=4,
        flow_logs in any::<bool>(),
        acls in any::<bool>(),
        package_downloads in any::<bool>(),
    ) -> StackConfig {
        let mut config = StackConfig::default();
        config.environment.name = environment;
        config.database.engine = engine;
        config.network.security.db_port = db_port;
        config.network.vpc.max_azs = max_azs;
        config.network.vpc.nat_gateways_count = nat_gateways;
        config.network.vpc.enable_flow_logs = flow_logs;
        config.network.network_acls.enabled = acls;
        config.network.security.allow_package_downloads = package_downloads;
        config
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every resource follows all of its dependencies
    #[test]
    fn prop_dependencies_precede_dependents(config in stack_config()) {
        let plan = Planner::new(config).plan().unwrap();
        let positions: HashMap<_, _> = plan
            .resources
            .iter()
            .enumerate()
            .map(|(i, r)| (r.logical_id.clone(), i))
            .collect();

        prop_assert_eq!(positions.len(), plan.len(), "duplicate logical ids");
        for (i, resource) in plan.resources.iter().enumerate() {
            for dependency in &resource.depends_on {
                let position = positions.get(dependency);
                prop_assert!(position.is_some(), "{} depends on unknown {}", resource.logical_id, dependency);
                prop_assert!(position.copied().unwrap_or(usize::MAX) < i);
            }
        }
    }

    /// The credential secret precedes the database instance
    #[test]
    fn prop_secret_precedes_instance(config in stack_config()) {
        let plan = Planner::new(config).plan().unwrap();
        let secret = plan.resources_of_kind(ResourceKind::Secret).next().unwrap();
        let instance = plan.resources_of_kind(ResourceKind::DbInstance).next().unwrap();
        prop_assert!(plan.position(&secret.logical_id) < plan.position(&instance.logical_id));
        prop_assert!(instance.depends_on.contains(&secret.logical_id));
    }

    /// Security groups precede every rule that names them
    #[test]
    fn prop_groups_precede_cross_references(config in stack_config()) {
        let plan = Planner::new(config).plan().unwrap();
        for resource in &plan.resources {
            let rule = match &resource.properties {
                ResourceSpec::SecurityGroupIngress(rule) | ResourceSpec::SecurityGroupEgress(rule) => rule,
                _ => continue,
            };
            let own = plan.position(&resource.logical_id);
            prop_assert!(plan.position(&rule.group) < own);
            if let cim_topology::access::boundary::RulePeer::SecurityGroup(peer) = &rule.peer {
                prop_assert!(plan.position(peer) < own);
            }
        }
    }

    /// The two layers never contradict each other when NATs exist
    #[test]
    fn prop_no_contradictions_with_nat(mut config in stack_config()) {
        config.network.vpc.nat_gateways_count = config.network.vpc.nat_gateways_count.max(1);
        let plan = Planner::new(config).plan().unwrap();
        prop_assert!(plan.consistency.is_consistent(), "{:?}", plan.consistency.contradictions);
    }
}
