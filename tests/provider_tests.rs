// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provider Hand-off Tests
//!
//! Full plans submitted to provisioners: arrival order, early stop and
//! resubmission.

mod fixtures;

use async_trait::async_trait;
use cim_topology::domain::ResourceKind;
use cim_topology::plan::{LogicalId, ResourceDescription};
use cim_topology::provider::{submit_plan, DryRunProvisioner, ProvisionError, ResourceProvisioner};
use fixtures::*;
use pretty_assertions::assert_eq;
use std::collections::HashSet;

/// Rejects every resource of one kind
struct KindRejectingProvisioner {
    rejected: ResourceKind,
    accepted: Vec<LogicalId>,
}

#[async_trait]
impl ResourceProvisioner for KindRejectingProvisioner {
    fn name(&self) -> &str {
        "kind-rejecting"
    }

    async fn provision(&mut self, resource: &ResourceDescription) -> Result<(), ProvisionError> {
        if resource.kind == self.rejected {
            return Err(ProvisionError::UnsupportedKind(resource.kind));
        }
        self.accepted.push(resource.logical_id.clone());
        Ok(())
    }
}

#[tokio::test]
async fn test_dry_run_accepts_full_plan() {
    let plan = plan_for(dev_config());
    let mut provisioner = DryRunProvisioner::new();

    let report = submit_plan(&plan, &mut provisioner).await.unwrap();

    assert_eq!(report.provisioned, plan.len());
    assert_eq!(provisioner.received().len(), plan.len());
    let received: Vec<&LogicalId> = provisioner.received_ids();
    let planned: Vec<&LogicalId> = plan.resources.iter().map(|r| &r.logical_id).collect();
    assert_eq!(received, planned);
}

#[tokio::test]
async fn test_every_dependency_arrives_first() {
    let plan = plan_for(production_postgres_config());
    let mut provisioner = DryRunProvisioner::new();
    submit_plan(&plan, &mut provisioner).await.unwrap();

    let mut seen = HashSet::new();
    for resource in provisioner.received() {
        for dependency in &resource.depends_on {
            assert!(
                seen.contains(dependency),
                "{} arrived before {}",
                resource.logical_id,
                dependency
            );
        }
        seen.insert(resource.logical_id.clone());
    }
}

#[tokio::test]
async fn test_stops_at_first_unsupported_kind() {
    let plan = plan_for(dev_config());
    let first_secret = plan
        .resources
        .iter()
        .position(|r| r.kind == ResourceKind::Secret)
        .unwrap();

    let mut provisioner = KindRejectingProvisioner {
        rejected: ResourceKind::Secret,
        accepted: Vec::new(),
    };
    let err = submit_plan(&plan, &mut provisioner).await.unwrap_err();

    assert_eq!(err, ProvisionError::UnsupportedKind(ResourceKind::Secret));
    assert_eq!(provisioner.accepted.len(), first_secret);
}

#[tokio::test]
async fn test_dry_run_reusable_after_clear() {
    let plan = plan_for(dev_config());
    let mut provisioner = DryRunProvisioner::new();

    submit_plan(&plan, &mut provisioner).await.unwrap();
    // Resubmitting without clearing is still valid: dependencies are present
    submit_plan(&plan, &mut provisioner).await.unwrap();
    assert_eq!(provisioner.received().len(), plan.len() * 2);

    provisioner.clear();
    assert!(provisioner.received().is_empty());
    submit_plan(&plan, &mut provisioner).await.unwrap();
    assert_eq!(provisioner.received().len(), plan.len());
}

#[test]
fn test_submission_from_sync_context() {
    let plan = plan_for(dev_config());
    let mut provisioner = DryRunProvisioner::new();

    let report = tokio_test::block_on(submit_plan(&plan, &mut provisioner)).unwrap();
    assert_eq!(report.provisioner, "dry-run");
}
