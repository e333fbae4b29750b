// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provider Hand-off
//!
//! Composition is pure; provisioning is not. A [`ResourceProvisioner`]
//! receives resource descriptions one at a time, in plan order, and performs
//! whatever requests its provider needs.
//!
//! ```text
//! Planner              submit_plan               Provisioner
//! ───────              ───────────               ───────────
//!  Plan ──────────▶  for each resource  ──────▶  provision()
//!                    stop at first error           (async I/O)
//! ```
//!
//! [`DryRunProvisioner`] records what it receives and performs nothing.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::ResourceKind;
use crate::plan::{LogicalId, Plan, ResourceDescription};

/// Errors raised by a provisioner
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProvisionError {
    /// The provider refused or failed the request
    #[error("Provisioning {logical_id} failed: {reason}")]
    Rejected { logical_id: LogicalId, reason: String },

    /// A dependency was not provisioned before its dependent
    #[error("{logical_id} submitted before its dependency {dependency}")]
    DependencyNotReady {
        logical_id: LogicalId,
        dependency: LogicalId,
    },

    /// The provisioner has no mapping for this kind of resource
    #[error("Unsupported resource kind: {0}")]
    UnsupportedKind(ResourceKind),
}

/// Consumer of resource descriptions in dependency order
#[async_trait]
pub trait ResourceProvisioner: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Provision one resource whose dependencies already exist
    async fn provision(&mut self, resource: &ResourceDescription) -> Result<(), ProvisionError>;
}

/// Outcome of a completed submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReport {
    pub provisioner: String,
    pub provisioned: usize,
}

/// Hand every resource of `plan` to `provisioner`, sequentially
///
/// Stops at the first error; resources after it are never submitted.
pub async fn submit_plan<P>(
    plan: &Plan,
    provisioner: &mut P,
) -> Result<SubmissionReport, ProvisionError>
where
    P: ResourceProvisioner + ?Sized,
{
    info!(
        "Submitting plan {} ({} resources) to {}",
        plan.id,
        plan.len(),
        provisioner.name()
    );

    for (position, resource) in plan.resources.iter().enumerate() {
        debug!("[{}/{}] {}", position + 1, plan.len(), resource.logical_id);
        if let Err(err) = provisioner.provision(resource).await {
            warn!(
                "Submission stopped at {} after {} resources: {}",
                resource.logical_id, position, err
            );
            return Err(err);
        }
    }

    Ok(SubmissionReport {
        provisioner: provisioner.name().to_string(),
        provisioned: plan.len(),
    })
}

/// Records every description and logs it; performs no requests
///
/// Checks that each resource arrives after all of its dependencies.
#[derive(Debug, Clone, Default)]
pub struct DryRunProvisioner {
    received: Vec<ResourceDescription>,
}

impl DryRunProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptions received so far, in arrival order
    pub fn received(&self) -> &[ResourceDescription] {
        &self.received
    }

    pub fn received_ids(&self) -> Vec<&LogicalId> {
        self.received.iter().map(|r| &r.logical_id).collect()
    }

    pub fn clear(&mut self) {
        self.received.clear();
    }
}

#[async_trait]
impl ResourceProvisioner for DryRunProvisioner {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn provision(&mut self, resource: &ResourceDescription) -> Result<(), ProvisionError> {
        if let Some(missing) = resource
            .depends_on
            .iter()
            .find(|dep| !self.received.iter().any(|r| &r.logical_id == *dep))
        {
            return Err(ProvisionError::DependencyNotReady {
                logical_id: resource.logical_id.clone(),
                dependency: missing.clone(),
            });
        }

        info!(
            "[dry-run] {} {} ({})",
            resource.kind.provider_type(),
            resource.logical_id,
            resource.kind
        );
        self.received.push(resource.clone());
        Ok(())
    }
}
