// Copyright (c) 2025 - Cowboy AI, Inc.
//! Construction Plan
//!
//! A [`Plan`] is the finalized, ordered set of resource descriptions handed
//! to a provider, together with the export table and the access-layer
//! consistency report. Plans are immutable once built.

pub mod builder;
pub mod resource;

pub use builder::PlanBuilder;
pub use resource::{LogicalId, ResourceDescription, ResourceSpec};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::access::ConsistencyReport;
use crate::domain::{EnvironmentClass, ResourceKind};
use crate::errors::PlanResult;
use crate::outputs::ExportTable;

/// Finalized construction plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: Uuid,
    pub stack_name: String,
    pub environment: String,
    pub environment_class: EnvironmentClass,
    pub region: String,
    pub generated_at: DateTime<Utc>,
    pub tags: BTreeMap<String, String>,
    /// Dependency order: every resource follows all of its dependencies
    pub resources: Vec<ResourceDescription>,
    pub exports: ExportTable,
    pub consistency: ConsistencyReport,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn resource(&self, logical_id: &LogicalId) -> Option<&ResourceDescription> {
        self.resources.iter().find(|r| &r.logical_id == logical_id)
    }

    /// Position of a resource in plan order
    pub fn position(&self, logical_id: &LogicalId) -> Option<usize> {
        self.resources.iter().position(|r| &r.logical_id == logical_id)
    }

    pub fn resources_of_kind(
        &self,
        kind: ResourceKind,
    ) -> impl Iterator<Item = &ResourceDescription> + '_ {
        self.resources.iter().filter(move |r| r.kind == kind)
    }

    pub fn count_of_kind(&self, kind: ResourceKind) -> usize {
        self.resources_of_kind(kind).count()
    }

    /// Resource counts per kind
    pub fn summary(&self) -> BTreeMap<ResourceKind, usize> {
        let mut summary = BTreeMap::new();
        for resource in &self.resources {
            *summary.entry(resource.kind).or_insert(0) += 1;
        }
        summary
    }

    pub fn to_json_pretty(&self) -> PlanResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
