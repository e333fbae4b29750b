// Copyright (c) 2025 - Cowboy AI, Inc.
//! Environment Policy Overlay
//!
//! Classifies the declared environment name once per plan and derives the
//! destructive-action defaults (deletion protection, removal policies) that
//! the data store, compute fleet, load balancer and flow logs consult.
//! Explicit configuration always wins over an environment default.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment names that classify as production-like (exact, case-sensitive)
pub const PRODUCTION_LIKE_NAMES: [&str; 3] = ["production", "prod", "staging"];

/// Environment class driving destructive-action policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnvironmentClass {
    Development,
    ProductionLike,
}

impl EnvironmentClass {
    /// Classify an environment name
    pub fn classify(environment_name: &str) -> Self {
        if PRODUCTION_LIKE_NAMES.contains(&environment_name) {
            Self::ProductionLike
        } else {
            Self::Development
        }
    }

    pub fn is_production_like(&self) -> bool {
        matches!(self, Self::ProductionLike)
    }

    /// Deletion protection to use when the configuration leaves it unset
    pub fn default_deletion_protection(&self) -> bool {
        self.is_production_like()
    }

    /// Log group removal policy to use when the configuration leaves it unset
    pub fn default_log_removal_policy(&self) -> RemovalPolicy {
        match self {
            Self::Development => RemovalPolicy::Destroy,
            Self::ProductionLike => RemovalPolicy::Retain,
        }
    }

    /// Root volume delete-on-termination to use when the configuration leaves it unset
    ///
    /// Root volumes hold no durable state, so both classes delete them.
    pub fn default_delete_on_termination(&self) -> bool {
        match self {
            Self::Development | Self::ProductionLike => true,
        }
    }

    /// Resolve the destruction policy of a stateful resource
    pub fn destruction_policy(
        &self,
        deletion_protection: Option<bool>,
        removal_policy: RemovalPolicy,
    ) -> DestructionPolicy {
        let deletion_protection =
            deletion_protection.unwrap_or_else(|| self.default_deletion_protection());
        DestructionPolicy {
            deletion_protection,
            configured_removal_policy: removal_policy,
            removal_policy: effective_removal_policy(deletion_protection, removal_policy),
        }
    }
}

impl fmt::Display for EnvironmentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::ProductionLike => write!(f, "production-like"),
        }
    }
}

/// Disposition of a stateful resource at teardown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RemovalPolicy {
    Retain,
    Snapshot,
    Destroy,
}

impl RemovalPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retain => "RETAIN",
            Self::Snapshot => "SNAPSHOT",
            Self::Destroy => "DESTROY",
        }
    }
}

impl fmt::Display for RemovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for RemovalPolicy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_uppercase().as_str() {
            "RETAIN" => Ok(Self::Retain),
            "SNAPSHOT" => Ok(Self::Snapshot),
            "DESTROY" => Ok(Self::Destroy),
            _ => Err(format!(
                "unknown removal policy '{}' (expected RETAIN, SNAPSHOT or DESTROY)",
                value
            )),
        }
    }
}

impl From<RemovalPolicy> for String {
    fn from(policy: RemovalPolicy) -> Self {
        policy.as_str().to_string()
    }
}

/// Snapshot-on-teardown only makes sense for protected resources.
///
/// With deletion protection off a configured `Snapshot` becomes `Destroy`;
/// every other combination keeps the configured policy.
pub fn effective_removal_policy(
    deletion_protection: bool,
    configured: RemovalPolicy,
) -> RemovalPolicy {
    if !deletion_protection && configured == RemovalPolicy::Snapshot {
        RemovalPolicy::Destroy
    } else {
        configured
    }
}

/// Resolved destructive-action policy for one stateful resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestructionPolicy {
    pub deletion_protection: bool,
    pub configured_removal_policy: RemovalPolicy,
    pub removal_policy: RemovalPolicy,
}

impl DestructionPolicy {
    /// Whether the environment overlay changed the configured removal policy
    pub fn was_overridden(&self) -> bool {
        self.configured_removal_policy != self.removal_policy
    }
}
