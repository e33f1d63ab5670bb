//! API boundary error and its status mapping.

use ems_core::{FieldError, ServiceError, ValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const VALIDATION_FAILED_MESSAGE: &str = "Validation failed";
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Failure raised while handling one request.
#[derive(Debug)]
pub enum ApiError {
    /// Field-level input violations.
    Validation(Vec<FieldError>),
    /// Request body that could not be decoded.
    Malformed(String),
    /// Failure reported by a core service.
    Service(ServiceError),
    /// Response payload could not be encoded.
    Encode(serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Malformed(_) => 400,
            Self::Service(err) if err.is_not_found() => 404,
            Self::Service(err) if err.is_client_error() => 400,
            Self::Service(_) | Self::Encode(_) => 500,
        }
    }

    /// Message safe to return to the caller. Server-side failures never
    /// leak their cause.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(_) => VALIDATION_FAILED_MESSAGE.to_string(),
            Self::Malformed(reason) => format!("Malformed request body: {reason}"),
            Self::Service(err) if err.is_client_error() => err.to_string(),
            Self::Service(_) | Self::Encode(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status() >= 500
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "validation failed ({} field(s))", errors.len()),
            Self::Malformed(reason) => write!(f, "malformed request body: {reason}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "response encoding failed: {err}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Validation(_) | Self::Malformed(_) => None,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value.errors)
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}
