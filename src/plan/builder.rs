// Copyright (c) 2025 - Cowboy AI, Inc.
//! Plan Builder - dependency-ordered resource collection
//!
//! Composition steps register resources with their dependencies; `finalize`
//! orders them so every resource follows everything it depends on. Ties
//! are broken by registration order, so the same configuration always
//! yields the same sequence.

use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use super::resource::{LogicalId, ResourceDescription, ResourceSpec};
use crate::errors::{PlanError, PlanResult};

/// Collects resource descriptions until the plan is finalized
#[derive(Debug, Default)]
pub struct PlanBuilder {
    resources: Vec<ResourceDescription>,
    index: HashMap<LogicalId, usize>,
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource
    ///
    /// Duplicate identifiers are a configuration error: two resources were
    /// given the same name.
    pub fn add(
        &mut self,
        logical_id: impl Into<LogicalId>,
        spec: ResourceSpec,
        depends_on: Vec<LogicalId>,
    ) -> PlanResult<LogicalId> {
        let logical_id = logical_id.into();
        if self.index.contains_key(&logical_id) {
            return Err(PlanError::config(format!(
                "resource name '{}' is used more than once",
                logical_id
            )));
        }

        let mut unique = Vec::with_capacity(depends_on.len());
        for dependency in depends_on {
            if !unique.contains(&dependency) {
                unique.push(dependency);
            }
        }

        debug!("Planned {} {}", spec.kind(), logical_id);
        self.index.insert(logical_id.clone(), self.resources.len());
        self.resources
            .push(ResourceDescription::new(logical_id.clone(), spec, unique));
        Ok(logical_id)
    }

    pub fn contains(&self, logical_id: &LogicalId) -> bool {
        self.index.contains_key(logical_id)
    }

    pub fn get(&self, logical_id: &LogicalId) -> Option<&ResourceDescription> {
        self.index.get(logical_id).map(|&i| &self.resources[i])
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Order resources so each follows all of its dependencies
    ///
    /// # Errors
    /// `DependencyGraph` on a dependency that was never registered or on a
    /// cycle.
    pub fn finalize(self) -> PlanResult<Vec<ResourceDescription>> {
        let count = self.resources.len();
        let mut in_degree = vec![0usize; count];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];

        for (i, resource) in self.resources.iter().enumerate() {
            for dependency in &resource.depends_on {
                let &d = self.index.get(dependency).ok_or_else(|| {
                    PlanError::DependencyGraph(format!(
                        "{} depends on unknown resource {}",
                        resource.logical_id, dependency
                    ))
                })?;
                in_degree[i] += 1;
                dependents[d].push(i);
            }
        }

        let mut ready: BTreeSet<usize> = (0..count).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(count);

        while let Some(next) = ready.pop_first() {
            order.push(next);
            for &dependent in &dependents[next] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() != count {
            let stuck: Vec<String> = (0..count)
                .filter(|&i| in_degree[i] > 0)
                .map(|i| self.resources[i].logical_id.to_string())
                .collect();
            return Err(PlanError::DependencyGraph(format!(
                "dependency cycle among: {}",
                stuck.join(", ")
            )));
        }

        let mut slots: Vec<Option<ResourceDescription>> =
            self.resources.into_iter().map(Some).collect();
        Ok(order
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RetentionClass;
    use crate::domain::RemovalPolicy;
    use crate::topology::LogGroupSpec;

    fn log_group() -> ResourceSpec {
        ResourceSpec::LogGroup(LogGroupSpec {
            retention: RetentionClass::OneWeek,
            removal_policy: RemovalPolicy::Destroy,
        })
    }

    fn ids(resources: &[ResourceDescription]) -> Vec<&str> {
        resources.iter().map(|r| r.logical_id.as_str()).collect()
    }

    #[test]
    fn test_dependencies_come_first() {
        let mut builder = PlanBuilder::new();
        builder.add("C", log_group(), vec!["B".into()]).unwrap();
        builder.add("B", log_group(), vec!["A".into()]).unwrap();
        builder.add("A", log_group(), vec![]).unwrap();

        let ordered = builder.finalize().unwrap();
        assert_eq!(ids(&ordered), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_ties_keep_registration_order() {
        let mut builder = PlanBuilder::new();
        builder.add("Root", log_group(), vec![]).unwrap();
        builder.add("Second", log_group(), vec!["Root".into()]).unwrap();
        builder.add("First", log_group(), vec!["Root".into()]).unwrap();
        builder.add("Independent", log_group(), vec![]).unwrap();

        let ordered = builder.finalize().unwrap();
        assert_eq!(ids(&ordered), vec!["Root", "Second", "First", "Independent"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut builder = PlanBuilder::new();
        builder.add("A", log_group(), vec![]).unwrap();
        assert!(matches!(
            builder.add("A", log_group(), vec![]),
            Err(PlanError::Configuration(_))
        ));
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let mut builder = PlanBuilder::new();
        builder.add("A", log_group(), vec!["Missing".into()]).unwrap();
        assert!(matches!(
            builder.finalize(),
            Err(PlanError::DependencyGraph(_))
        ));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut builder = PlanBuilder::new();
        builder.add("A", log_group(), vec!["B".into()]).unwrap();
        builder.add("B", log_group(), vec!["A".into()]).unwrap();
        builder.add("C", log_group(), vec![]).unwrap();

        match builder.finalize() {
            Err(PlanError::DependencyGraph(message)) => {
                assert!(message.contains("A"));
                assert!(message.contains("B"));
                assert!(!message.contains("C"));
            }
            other => panic!("expected a dependency cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_dependencies_collapsed() {
        let mut builder = PlanBuilder::new();
        builder.add("A", log_group(), vec![]).unwrap();
        builder
            .add("B", log_group(), vec!["A".into(), "A".into()])
            .unwrap();
        assert_eq!(builder.get(&"B".into()).unwrap().depends_on.len(), 1);
        assert_eq!(builder.finalize().unwrap().len(), 2);
    }
}
