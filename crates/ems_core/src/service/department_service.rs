//! Department use-case service.
//!
//! # Invariants
//! - `list_departments` orders by name ascending (byte-wise), ties by id.
//! - Deleting a department does not touch employees that reference it.

use super::error::{log_failure, ServiceError, ServiceResult};
use crate::model::department::{Department, DepartmentId, DepartmentInput, DepartmentView};
use crate::model::EntityKind;
use crate::repo::department_repo::DepartmentRepository;
use log::{debug, info};

/// Department service facade over a repository implementation.
pub struct DepartmentService<R: DepartmentRepository> {
    repo: R,
}

impl<R: DepartmentRepository> DepartmentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one department. Names need not be unique.
    pub fn create_department(&self, input: &DepartmentInput) -> ServiceResult<DepartmentView> {
        const EVENT: &str = "department_create";
        debug!("event={EVENT} module=service status=start");

        let result = self
            .repo
            .create_department(input.name.as_str())
            .map(DepartmentView::from)
            .map_err(ServiceError::from);

        match &result {
            Ok(view) => info!("event={EVENT} module=service status=ok department_id={}", view.id),
            Err(err) => log_failure(EVENT, err),
        }
        result
    }

    pub fn get_department(&self, id: DepartmentId) -> ServiceResult<DepartmentView> {
        const EVENT: &str = "department_get";
        debug!("event={EVENT} module=service status=start department_id={id}");

        let result = self.find_department(id).map(DepartmentView::from);

        match &result {
            Ok(_) => info!("event={EVENT} module=service status=ok department_id={id}"),
            Err(err) => log_failure(EVENT, err),
        }
        result
    }

    /// Lists every department by name, then id.
    pub fn list_departments(&self) -> ServiceResult<Vec<DepartmentView>> {
        const EVENT: &str = "department_list";
        debug!("event={EVENT} module=service status=start");

        let result = self
            .repo
            .list_departments()
            .map(|mut departments| {
                departments.sort_by(|left, right| {
                    left.name.cmp(&right.name).then(left.id.cmp(&right.id))
                });
                departments.into_iter().map(DepartmentView::from).collect::<Vec<_>>()
            })
            .map_err(ServiceError::from);

        match &result {
            Ok(views) => info!("event={EVENT} module=service status=ok total={}", views.len()),
            Err(err) => log_failure(EVENT, err),
        }
        result
    }

    /// Renames one department.
    pub fn update_department(
        &self,
        id: DepartmentId,
        input: &DepartmentInput,
    ) -> ServiceResult<DepartmentView> {
        const EVENT: &str = "department_update";
        debug!("event={EVENT} module=service status=start department_id={id}");

        let result = self.find_department(id).and_then(|mut department| {
            department.name = input.name.clone();
            self.repo.update_department(&department)?;
            Ok(DepartmentView::from(department))
        });

        match &result {
            Ok(_) => info!("event={EVENT} module=service status=ok department_id={id}"),
            Err(err) => log_failure(EVENT, err),
        }
        result
    }

    pub fn delete_department(&self, id: DepartmentId) -> ServiceResult<()> {
        const EVENT: &str = "department_delete";
        debug!("event={EVENT} module=service status=start department_id={id}");

        let result = self.repo.delete_department(id).map_err(ServiceError::from);

        match &result {
            Ok(()) => info!("event={EVENT} module=service status=ok department_id={id}"),
            Err(err) => log_failure(EVENT, err),
        }
        result
    }

    fn find_department(&self, id: DepartmentId) -> ServiceResult<Department> {
        self.repo
            .get_department(id)?
            .ok_or(ServiceError::not_found(EntityKind::Department, id))
    }
}
