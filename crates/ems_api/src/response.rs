//! Response envelope returned by every handler.

use crate::error::ApiError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Status code plus optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body: Some(body),
        }
    }

    pub fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Builds the error envelope for `err`.
    pub fn from_error(err: &ApiError) -> Self {
        let body = ErrorBody::from_error(err, Utc::now());
        // An ErrorBody always encodes; the fallback keeps the status intact.
        let encoded = serde_json::to_value(&body).unwrap_or(Value::Null);
        Self {
            status: err.status(),
            body: Some(encoded),
        }
    }

    /// Body field lookup, `None` when absent or when there is no body.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.body.as_ref().and_then(|body| body.get(key))
    }
}

/// Error payload: `{timestamp, message[, errors]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    /// Field name to message; the first violation per field wins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

impl ErrorBody {
    pub fn from_error(err: &ApiError, timestamp: DateTime<Utc>) -> Self {
        let errors = match err {
            ApiError::Validation(fields) => {
                let mut by_field = BTreeMap::new();
                for field in fields {
                    by_field
                        .entry(field.field.to_string())
                        .or_insert_with(|| field.message.to_string());
                }
                Some(by_field)
            }
            _ => None,
        };
        Self {
            timestamp,
            message: err.public_message(),
            errors,
        }
    }
}
