//! Error types for rollout selection and domain mutation.

use std::fmt;

use thiserror::Error;

/// Result type alias for rollout operations.
pub type RolloutResult<T> = Result<T, RolloutError>;

/// Errors raised by the rollout core.
///
/// Both kinds are input errors to be fixed by the caller; none of them is
/// transient.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RolloutError {
    /// Rollout selection was handed zero candidate records.
    #[error("empty rollouts: at least one record is required")]
    EmptyInput,

    /// A patch argument failed validation. The domain was not touched.
    #[error("patchRollouts: invalid {field}: {reason}")]
    Validation {
        field: ValidationField,
        reason: String,
    },
}

impl RolloutError {
    fn validation(field: ValidationField, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Reject a rollout name.
    pub fn invalid_rollout_name(name: &str) -> Self {
        Self::validation(
            ValidationField::RolloutName,
            format!("expected a non-empty string, got {name:?}"),
        )
    }

    /// Reject a version string.
    pub fn invalid_version(version: &str) -> Self {
        Self::validation(
            ValidationField::Version,
            format!("expected a non-empty semantic version, got {version:?}"),
        )
    }

    /// Reject a percentage.
    pub fn invalid_percentage(percentage: f64) -> Self {
        Self::validation(
            ValidationField::Percentage,
            format!("expected a number in [0, 100], got {percentage}"),
        )
    }

    /// Reject a timestamp.
    pub fn invalid_timestamp(timestamp: i64) -> Self {
        Self::validation(
            ValidationField::Timestamp,
            format!("expected a positive timestamp, got {timestamp}"),
        )
    }

    /// Field that failed validation, if this is a validation error.
    pub fn field(&self) -> Option<ValidationField> {
        match self {
            Self::Validation { field, .. } => Some(*field),
            Self::EmptyInput => None,
        }
    }
}

/// Patch argument checked by domain mutation, in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationField {
    RolloutName,
    Version,
    Percentage,
    Timestamp,
}

impl fmt::Display for ValidationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RolloutName => "rolloutName",
            Self::Version => "version",
            Self::Percentage => "percentage",
            Self::Timestamp => "timestamp",
        })
    }
}
