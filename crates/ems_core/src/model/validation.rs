//! Field-level input validation.
//!
//! Services trust their inputs; callers at the API boundary run
//! `validate()` before invoking the core.

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Wire name of the field (`camelCase`).
    pub field: &'static str,
    pub message: &'static str,
}

/// Aggregated field violations for one input value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation failed")?;
        for (index, error) in self.errors.iter().enumerate() {
            let separator = if index == 0 { ": " } else { ", " };
            write!(f, "{separator}{} {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl Error for ValidationError {}

/// Collects field errors and turns them into a `ValidationError`.
#[derive(Debug, Default)]
pub(crate) struct Violations {
    errors: Vec<FieldError>,
}

impl Violations {
    pub(crate) fn require_text(
        &mut self,
        field: &'static str,
        value: &str,
        message: &'static str,
    ) {
        if value.trim().is_empty() {
            self.push(field, message);
        }
    }

    pub(crate) fn require_positive(
        &mut self,
        field: &'static str,
        value: f64,
        message: &'static str,
    ) {
        // NaN fails this comparison too.
        if !(value.is_finite() && value > 0.0) {
            self.push(field, message);
        }
    }

    pub(crate) fn push(&mut self, field: &'static str, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }

    pub(crate) fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}
