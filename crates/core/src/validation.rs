//! Input validation
//!
//! Fluent checks for inbound request parameters. Every failed check is
//! collected, so callers can report all problems at once.
//!
//! # Example
//!
//! ```rust
//! use cinefeed_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("genre", "")
//!     .range("min_rating", 11.0, 0.0, 10.0)
//!     .validate();
//!
//! assert_eq!(result.errors().len(), 2);
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Validation error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
    /// Expected value (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Actual value (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Consume the result, yielding its errors
    #[must_use]
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Convert to Result type
    pub fn to_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
            Err(Error::validation(format!(
                "Validation failed: {}",
                messages.join("; ")
            )))
        }
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    #[must_use]
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    /// Validate that a field is not blank
    #[must_use]
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "Field is required".to_string(),
                code: "REQUIRED".to_string(),
                expected: Some("non-empty value".to_string()),
                actual: Some("empty".to_string()),
            });
        }
        self
    }

    /// Validate an inclusive numeric range
    ///
    /// `NaN` never satisfies a range.
    #[must_use]
    pub fn range<T: PartialOrd + std::fmt::Display>(
        mut self,
        field: &str,
        value: T,
        min: T,
        max: T,
    ) -> Self {
        if !(value >= min && value <= max) {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Must be between {min} and {max}"),
                code: "RANGE".to_string(),
                expected: Some(format!("{min} - {max}")),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Validate an inclusive lower bound
    #[must_use]
    pub fn min<T: PartialOrd + std::fmt::Display>(mut self, field: &str, value: T, min: T) -> Self {
        if !(value >= min) {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Must be at least {min}"),
                code: "MIN".to_string(),
                expected: Some(format!(">= {min}")),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Complete validation and return result
    #[must_use]
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_validation() {
        let result = Validator::new().required("genre", "   ").validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].code, "REQUIRED");
    }

    #[test]
    fn test_range_validation() {
        let result = Validator::new().range("limit", 51, 1, 50).validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].code, "RANGE");
        assert_eq!(result.errors()[0].actual.as_deref(), Some("51"));
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let result = Validator::new()
            .range("min_rating", 0.0, 0.0, 10.0)
            .range("min_rating", 10.0, 0.0, 10.0)
            .validate();
        assert!(result.is_valid());
    }

    #[test]
    fn test_range_rejects_nan() {
        let result = Validator::new()
            .range("min_rating", f64::NAN, 0.0, 10.0)
            .validate();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_min_validation() {
        let result = Validator::new().min("page", 0, 1).validate();
        assert_eq!(result.errors()[0].code, "MIN");
    }

    #[test]
    fn test_chained_validation_collects_all() {
        let result = Validator::new()
            .required("genre", "")
            .min("page", 0, 1)
            .range("limit", 0, 1, 50)
            .validate();
        assert_eq!(result.errors().len(), 3);

        let err = result.to_result().unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::ValidationError);
        assert!(err.message.contains("genre"));
        assert!(err.message.contains("limit"));
    }
}
