// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Configuration Invariants
//!
//! This module contains the business rule checks applied to a configuration
//! document before any composition starts. All functions are pure (no side
//! effects) and return detailed validation results.
//!
//! # Invariant Categories
//!
//! 1. **Structural Invariants**: non-empty names, ports in range
//! 2. **Numeric Invariants**: bounded thresholds and rule numbers
//! 3. **Relational Invariants**: `min ≤ desired ≤ max` and similar pairings

/// Validation result with detailed error information
pub type ValidationResult = Result<(), ValidationError>;

/// Validation error with context
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Required value is empty
    #[error("{field} must not be empty")]
    Empty { field: String },

    /// Numeric value outside its allowed range
    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Scaling capacities out of order
    #[error("capacity must satisfy min ({min}) <= desired ({desired}) <= max ({max})")]
    InvalidCapacity { min: u32, desired: u32, max: u32 },

    /// Policy constraint violation
    #[error("Policy constraint violated: {0}")]
    PolicyViolation(String),

    /// Business rule violation
    #[error("Business rule violated: {0}")]
    BusinessRule(String),
}

/// Lowest assignable ACL rule number
pub const MIN_ACL_RULE_NUMBER: u16 = 1;

/// Highest assignable ACL rule number (32767 is the provider's default rule)
pub const MAX_ACL_RULE_NUMBER: u16 = 32766;

/// Validate a value is not empty
pub fn validate_not_empty(field: &str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validate a numeric value lies within `min..=max`
pub fn validate_range(field: &str, value: i64, min: i64, max: i64) -> ValidationResult {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Validate a TCP port
///
/// # Rules
/// - Port 0 is not addressable
pub fn validate_port(field: &str, port: u16) -> ValidationResult {
    validate_range(field, i64::from(port), 1, i64::from(u16::MAX))
}

/// Validate an ACL rule number
///
/// # Rules
/// - Must be 1-32766
pub fn validate_rule_number(field: &str, rule_number: u16) -> ValidationResult {
    validate_range(
        field,
        i64::from(rule_number),
        i64::from(MIN_ACL_RULE_NUMBER),
        i64::from(MAX_ACL_RULE_NUMBER),
    )
}

/// Validate scaling capacities
///
/// # Rules
/// - `min ≤ desired ≤ max`
/// - `max ≥ 1`
pub fn validate_capacity(min: u32, desired: u32, max: u32) -> ValidationResult {
    if max == 0 || min > desired || desired > max {
        return Err(ValidationError::InvalidCapacity { min, desired, max });
    }
    Ok(())
}

/// Validate a utilization target percentage
///
/// # Rules
/// - Must be 1-100
pub fn validate_percentage(field: &str, value: f64) -> ValidationResult {
    if !(value > 0.0 && value <= 100.0) {
        return Err(ValidationError::BusinessRule(format!(
            "{} must be within (0, 100], got {}",
            field, value
        )));
    }
    Ok(())
}

/// Validate a health check timeout is shorter than its interval
pub fn validate_timeout_below_interval(timeout: u32, interval: u32) -> ValidationResult {
    if timeout >= interval {
        return Err(ValidationError::BusinessRule(format!(
            "health check timeout ({}s) must be shorter than its interval ({}s)",
            timeout, interval
        )));
    }
    Ok(())
}

/// Validate a widening toggle stays off
///
/// # Rules
/// - Only explicitly permitted widenings may be enabled
pub fn validate_not_widened(field: &str, enabled: bool) -> ValidationResult {
    if enabled {
        return Err(ValidationError::PolicyViolation(format!(
            "{} widens outbound access; only allowPackageDownloads may widen the compute boundary",
            field
        )));
    }
    Ok(())
}

/// Validate two ports that must agree
pub fn validate_ports_agree(
    field: &str,
    value: u16,
    expected_field: &str,
    expected: u16,
) -> ValidationResult {
    if value != expected {
        return Err(ValidationError::PolicyViolation(format!(
            "{} ({}) must equal {} ({})",
            field, value, expected_field, expected
        )));
    }
    Ok(())
}
