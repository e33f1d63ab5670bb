//! Service-level error contract.

use crate::model::EntityKind;
use crate::repo::RepoError;
use log::{error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by core services.
///
/// `NotFound` and `InvalidDuration` are caller-facing; `Repo` carries
/// storage failures that callers should report as internal errors.
#[derive(Debug)]
pub enum ServiceError {
    /// Referenced entity does not exist.
    NotFound { kind: EntityKind, id: i64 },
    /// Supplied project duration is not positive.
    InvalidDuration(i32),
    /// Page size of zero was requested.
    InvalidPageSize,
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl ServiceError {
    pub fn not_found(kind: EntityKind, id: i64) -> Self {
        Self::NotFound { kind, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for failures caused by caller input rather than by the store.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Repo(_))
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found with id: {id}"),
            Self::InvalidDuration(_) => write!(f, "Project duration must be greater than zero"),
            Self::InvalidPageSize => write!(f, "page size must be greater than zero"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            other => Self::Repo(other),
        }
    }
}

/// Logs a failed operation at `warn` for caller errors, `error` otherwise.
pub(crate) fn log_failure(event: &str, err: &ServiceError) {
    match err {
        ServiceError::NotFound { kind, id } => warn!(
            "event={event} module=service status=not_found kind={kind} id={id}"
        ),
        ServiceError::InvalidDuration(duration) => warn!(
            "event={event} module=service status=rejected reason=invalid_duration duration={duration}"
        ),
        ServiceError::InvalidPageSize => {
            warn!("event={event} module=service status=rejected reason=invalid_page_size")
        }
        ServiceError::Repo(repo_err) => {
            error!("event={event} module=service status=error error={repo_err}")
        }
    }
}
