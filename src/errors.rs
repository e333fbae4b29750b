// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for plan composition

use thiserror::Error;

use crate::access::acl::Direction;
use crate::domain::{NetworkError, ValidationError};

/// Errors that can occur while composing a topology plan
///
/// Every variant is a deterministic function of the input configuration.
/// Composition fails fast on the first error and never yields a partial plan.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Malformed, missing or out-of-range configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Database engine name outside the supported set
    #[error("Unsupported database engine: {engine}. Supported engines: {}", supported.join(", "))]
    UnsupportedEngine {
        engine: String,
        supported: Vec<&'static str>,
    },

    /// Two ACL entries share a rule number within one ACL and direction
    #[error(
        "Rule number {rule_number} is used by both {existing} and {conflicting} in {direction} of {acl}"
    )]
    PolicyConflict {
        acl: String,
        direction: Direction,
        rule_number: u16,
        existing: String,
        conflicting: String,
    },

    /// Unknown dependency or dependency cycle detected while finalizing the plan
    #[error("Dependency graph error: {0}")]
    DependencyGraph(String),
}

/// Result type for plan composition
pub type PlanResult<T> = Result<T, PlanError>;

impl PlanError {
    /// Shorthand for a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        PlanError::Configuration(message.into())
    }
}

impl From<NetworkError> for PlanError {
    fn from(err: NetworkError) -> Self {
        PlanError::Configuration(err.to_string())
    }
}

impl From<ValidationError> for PlanError {
    fn from(err: ValidationError) -> Self {
        PlanError::Configuration(err.to_string())
    }
}

impl From<serde_json::Error> for PlanError {
    fn from(err: serde_json::Error) -> Self {
        PlanError::Configuration(format!("invalid configuration document: {}", err))
    }
}

impl From<std::io::Error> for PlanError {
    fn from(err: std::io::Error) -> Self {
        PlanError::Configuration(format!("configuration document unreadable: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_engine_lists_supported() {
        let err = PlanError::UnsupportedEngine {
            engine: "oracle".to_string(),
            supported: vec!["mariadb", "mysql", "postgres"],
        };
        assert_eq!(
            err.to_string(),
            "Unsupported database engine: oracle. Supported engines: mariadb, mysql, postgres"
        );
    }

    #[test]
    fn test_policy_conflict_message() {
        let err = PlanError::PolicyConflict {
            acl: "PublicNetworkAcl".to_string(),
            direction: Direction::Ingress,
            rule_number: 100,
            existing: "AllowHttpInbound".to_string(),
            conflicting: "AllowHttpsInbound".to_string(),
        };
        assert!(err.to_string().contains("Rule number 100"));
        assert!(err.to_string().contains("ingress"));
    }

    #[test]
    fn test_network_error_is_configuration_error() {
        let err: PlanError = NetworkError::InvalidCidr("10.0.0.0".to_string()).into();
        assert!(matches!(err, PlanError::Configuration(_)));
    }
}
