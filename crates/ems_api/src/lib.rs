//! Request boundary for the employee management core.
//!
//! # Responsibility
//! - Deserialize request bodies and run field-level validation.
//! - Invoke core services and map their failures to stable status codes.
//!
//! # Invariants
//! - Handlers never panic; every outcome is an [`ApiResponse`].
//! - Core services only see inputs that passed `validate()`.

pub mod api;
pub mod error;
pub mod response;

pub use api::{core_version, init_logging, ping, EmployeeListParams, EmsApi};
pub use error::ApiError;
pub use response::{ApiResponse, ErrorBody};
