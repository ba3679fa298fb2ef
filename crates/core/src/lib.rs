//! Core utilities for the Cinefeed movie catalog service
//!
//! This crate provides functionality shared by the catalog client and the
//! HTTP surface:
//!
//! - **Error handling**: Coded errors with context and recovery suggestions
//! - **Backoff policy**: Exponential retry delays with a fixed attempt budget
//! - **Validation**: Fluent checks for inbound query parameters
//!
//! # Example
//!
//! ```rust
//! use cinefeed_core::retry::RetryConfig;
//! use cinefeed_core::validation::Validator;
//! use std::time::Duration;
//!
//! let retry = RetryConfig::default();
//! assert_eq!(retry.delay_for_attempt(1), Duration::from_millis(600));
//!
//! let result = Validator::new()
//!     .required("genre", "комедия")
//!     .range("limit", 20, 1, 50)
//!     .validate();
//! assert!(result.is_valid());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod retry;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Error, ErrorCode, ErrorReport, Result, ResultExt};
    pub use crate::retry::{Backoff, RetryConfig};
    pub use crate::validation::{ValidationError, ValidationResult, Validator};
}
