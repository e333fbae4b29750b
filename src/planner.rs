// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology & Policy Composition Engine
//!
//! One pass over a validated [`StackConfig`]:
//!
//! ```text
//! config ─▶ network block ─▶ topology ─▶ access model ─▶ consistency check
//!                                              │
//!        exports ◀─ grant ◀─ data store ◀─ fleet ◀─ load balancer
//! ```
//!
//! Every step registers its resources with a [`PlanBuilder`]; the builder
//! orders them by dependency when the plan is finalized. Any error aborts
//! composition and no plan is returned.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::access;
use crate::compute::{build_fleet, grant_secret_read, FleetOptions};
use crate::config::StackConfig;
use crate::database::build_data_store;
use crate::errors::PlanResult;
use crate::load_balancer::build_load_balancer;
use crate::outputs::{build_exports, ExportSources};
use crate::plan::{Plan, PlanBuilder};
use crate::topology::{build_topology, TopologyOptions};

/// Composes a [`Plan`] from a configuration document
#[derive(Debug, Clone)]
pub struct Planner {
    config: StackConfig,
    user_data: Option<String>,
}

impl Planner {
    pub fn new(config: StackConfig) -> Self {
        Self {
            config,
            user_data: None,
        }
    }

    /// Opaque boot script handed to every fleet instance verbatim
    pub fn with_user_data(mut self, user_data: impl Into<String>) -> Self {
        self.user_data = Some(user_data.into());
        self
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Compose the plan
    ///
    /// # Errors
    /// Any [`crate::errors::PlanError`]; composition fails fast.
    pub fn plan(&self) -> PlanResult<Plan> {
        let config = &self.config;
        config.validate()?;

        let environment = config.environment_class();
        let names = &config.resource_names;
        info!(
            "Planning {} for environment {} ({})",
            config.stack_name, config.environment.name, environment
        );

        let mut builder = PlanBuilder::new();

        let block = config.network_block()?;
        let topology = build_topology(
            &block,
            &TopologyOptions::from_config(config, environment),
            &mut builder,
        )?;

        let policy = config.policy();
        let model = access::compose(&block, &policy)?;
        let groups = access::register(&model, &topology, &mut builder)?;

        let consistency = access::verify(&model, &topology, &policy)?;
        for finding in &consistency.contradictions {
            warn!("Access layers contradict: {}", finding);
        }
        for finding in &consistency.gaps {
            warn!("Access gap (stateful layer only): {}", finding);
        }

        let load_balancer = build_load_balancer(
            &topology,
            &groups.edge,
            &config.compute.alb,
            names,
            environment,
            &mut builder,
        )?;

        let fleet = build_fleet(
            &topology,
            &groups.compute,
            &load_balancer.target_group,
            &config.compute.asg,
            &config.compute.storage,
            &FleetOptions::from_monitoring(&config.monitoring, self.user_data.clone()),
            names,
            environment,
            &mut builder,
        )?;

        let data_store = build_data_store(
            &topology,
            &groups.data,
            &config.database,
            config.network.security.db_port,
            names,
            environment,
            &mut builder,
        )?;

        grant_secret_read(&fleet, &data_store.secret, &mut builder)?;

        let exports = build_exports(
            ExportSources {
                vpc: &topology.vpc,
                load_balancer: &load_balancer.load_balancer,
                auto_scaling_group: &fleet.auto_scaling_group,
                database: &data_store.instance,
                secret: &data_store.secret,
            },
            &config.outputs,
            &config.environment.name,
        );

        let resources = builder.finalize()?;
        let plan = Plan {
            id: Uuid::now_v7(),
            stack_name: config.stack_name.clone(),
            environment: config.environment.name.clone(),
            environment_class: environment,
            region: config.environment.region.clone(),
            generated_at: Utc::now(),
            tags: config.resource_tags(),
            resources,
            exports,
            consistency,
        };

        info!(
            "Plan {} ready: {} resources, {} exports, {} contradictions, {} gaps",
            plan.id,
            plan.len(),
            plan.exports.len(),
            plan.consistency.contradictions.len(),
            plan.consistency.gaps.len()
        );
        Ok(plan)
    }
}
