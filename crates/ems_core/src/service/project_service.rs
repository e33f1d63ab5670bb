//! Project use-case service.
//!
//! # Invariants
//! - Stored durations are always > 0; a non-positive duration is rejected
//!   with `InvalidDuration` before any lookup or write.
//! - Project update is partial: absent fields keep their stored value.
//! - Listing is in storage (id) order.

use super::error::{log_failure, ServiceError, ServiceResult};
use crate::model::project::{Project, ProjectId, ProjectInput, ProjectPatch, ProjectView};
use crate::model::EntityKind;
use crate::repo::project_repo::ProjectRepository;
use log::{debug, info};

/// Project service facade over a repository implementation.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_project(&self, input: &ProjectInput) -> ServiceResult<ProjectView> {
        const EVENT: &str = "project_create";
        debug!("event={EVENT} module=service status=start");

        let result = ensure_positive_duration(input.duration).and_then(|duration| {
            self.repo
                .create_project(input.name.as_str(), duration)
                .map(ProjectView::from)
                .map_err(ServiceError::from)
        });

        match &result {
            Ok(view) => info!("event={EVENT} module=service status=ok project_id={}", view.id),
            Err(err) => log_failure(EVENT, err),
        }
        result
    }

    pub fn get_project(&self, id: ProjectId) -> ServiceResult<ProjectView> {
        const EVENT: &str = "project_get";
        debug!("event={EVENT} module=service status=start project_id={id}");

        let result = self.find_project(id).map(ProjectView::from);

        match &result {
            Ok(_) => info!("event={EVENT} module=service status=ok project_id={id}"),
            Err(err) => log_failure(EVENT, err),
        }
        result
    }

    pub fn list_projects(&self) -> ServiceResult<Vec<ProjectView>> {
        const EVENT: &str = "project_list";
        debug!("event={EVENT} module=service status=start");

        let result = self
            .repo
            .list_projects()
            .map(|projects| projects.into_iter().map(ProjectView::from).collect::<Vec<_>>())
            .map_err(ServiceError::from);

        match &result {
            Ok(views) => info!("event={EVENT} module=service status=ok total={}", views.len()),
            Err(err) => log_failure(EVENT, err),
        }
        result
    }

    /// Applies a partial update.
    ///
    /// # Errors
    /// - `InvalidDuration` when the patch carries a duration <= 0; checked
    ///   first, so it wins over `NotFound`.
    /// - `NotFound(Project)` when `id` is absent.
    pub fn update_project(
        &self,
        id: ProjectId,
        patch: &ProjectPatch,
    ) -> ServiceResult<ProjectView> {
        const EVENT: &str = "project_update";
        debug!("event={EVENT} module=service status=start project_id={id}");

        let result = patch
            .duration
            .map(ensure_positive_duration)
            .transpose()
            .and_then(|duration| {
                let mut project = self.find_project(id)?;
                if let Some(name) = patch.name.as_ref() {
                    project.name = name.clone();
                }
                if let Some(duration) = duration {
                    project.duration = duration;
                }
                self.repo.update_project(&project)?;
                Ok(ProjectView::from(project))
            });

        match &result {
            Ok(_) => info!("event={EVENT} module=service status=ok project_id={id}"),
            Err(err) => log_failure(EVENT, err),
        }
        result
    }

    pub fn delete_project(&self, id: ProjectId) -> ServiceResult<()> {
        const EVENT: &str = "project_delete";
        debug!("event={EVENT} module=service status=start project_id={id}");

        let result = self.repo.delete_project(id).map_err(ServiceError::from);

        match &result {
            Ok(()) => info!("event={EVENT} module=service status=ok project_id={id}"),
            Err(err) => log_failure(EVENT, err),
        }
        result
    }

    fn find_project(&self, id: ProjectId) -> ServiceResult<Project> {
        self.repo
            .get_project(id)?
            .ok_or(ServiceError::not_found(EntityKind::Project, id))
    }
}

fn ensure_positive_duration(duration: i32) -> ServiceResult<i32> {
    if duration <= 0 {
        return Err(ServiceError::InvalidDuration(duration));
    }
    Ok(duration)
}
