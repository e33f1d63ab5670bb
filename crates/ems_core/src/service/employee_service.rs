//! Employee query engine.
//!
//! # Responsibility
//! - Create, read, update and delete employees with referential checks.
//! - Filtered pagination and the two named sort orders.
//! - Derived member listings for departments and projects.
//!
//! # Invariants
//! - References are resolved before any write and re-checked by the store
//!   inside the write transaction; a failed resolution leaves the store
//!   untouched.
//! - `Page::total_elements` always counts the filtered set.
//! - Storage order (`id ASC`) is the tie-breaker for every sort.

use super::error::{log_failure, ServiceError, ServiceResult};
use super::ordering::EmployeeOrdering;
use super::resolver::ReferenceResolver;
use crate::model::department::DepartmentId;
use crate::model::employee::{
    Employee, EmployeeId, EmployeeInput, EmployeePatch, EmployeeUpdate, EmployeeView, NewEmployee,
};
use crate::model::page::{Page, PageRequest};
use crate::model::project::ProjectId;
use crate::model::EntityKind;
use crate::repo::department_repo::DepartmentRepository;
use crate::repo::employee_repo::{EmployeeListQuery, EmployeeRepository};
use crate::repo::project_repo::ProjectRepository;
use log::{debug, info};
use std::collections::BTreeSet;

/// Employee use-case service.
pub struct EmployeeService<E, D, P>
where
    E: EmployeeRepository,
    D: DepartmentRepository,
    P: ProjectRepository,
{
    repo: E,
    resolver: ReferenceResolver<D, P>,
}

impl<E, D, P> EmployeeService<E, D, P>
where
    E: EmployeeRepository,
    D: DepartmentRepository,
    P: ProjectRepository,
{
    pub fn new(repo: E, resolver: ReferenceResolver<D, P>) -> Self {
        Self { repo, resolver }
    }

    pub fn resolver(&self) -> &ReferenceResolver<D, P> {
        &self.resolver
    }

    /// Creates one employee after resolving its department and projects.
    ///
    /// # Errors
    /// - `NotFound(Department | Project)` when a reference does not exist,
    ///   including one deleted concurrently before the insert commits;
    ///   nothing is persisted in that case.
    pub fn create_employee(&self, input: &EmployeeInput) -> ServiceResult<EmployeeView> {
        const EVENT: &str = "employee_create";
        debug!(
            "event={EVENT} module=service status=start department_id={:?} project_count={}",
            input.department_id,
            input.project_ids.len()
        );

        let result = self
            .resolver
            .resolve_references(input.department_id, &input.project_ids)
            .and_then(|references| {
                let created = self.repo.create_employee(&NewEmployee {
                    name: input.name.clone(),
                    role: input.role.clone(),
                    salary: input.salary,
                    joining_date: input.joining_date,
                    department_id: input.department_id,
                    project_ids: input.project_ids.clone(),
                })?;
                Ok(self.resolver.view_with(created, &references))
            });

        match &result {
            Ok(view) => info!("event={EVENT} module=service status=ok employee_id={}", view.id),
            Err(err) => log_failure(EVENT, err),
        }
        result
    }

    /// Gets one employee view by id.
    pub fn get_employee(&self, id: EmployeeId) -> ServiceResult<EmployeeView> {
        const EVENT: &str = "employee_get";
        debug!("event={EVENT} module=service status=start employee_id={id}");

        let result = self
            .find_employee(id)
            .and_then(|employee| self.resolver.view(employee));

        match &result {
            Ok(_) => info!("event={EVENT} module=service status=ok employee_id={id}"),
            Err(err) => log_failure(EVENT, err),
        }
        result
    }

    /// Lists one page of employees, optionally restricted to one department
    /// name (exact match). An empty filter means no filter.
    ///
    /// A page past the end yields no items and the correct total.
    pub fn list_employees(
        &self,
        department_name: Option<&str>,
        page: PageRequest,
    ) -> ServiceResult<Page<EmployeeView>> {
        const EVENT: &str = "employee_list";
        let filter = department_name.filter(|name| !name.is_empty());
        debug!(
            "event={EVENT} module=service status=start filtered={} page={} size={}",
            filter.is_some(),
            page.page,
            page.size
        );

        let result = self.list_page(filter, page);

        match &result {
            Ok(listed) => info!(
                "event={EVENT} module=service status=ok filtered={} returned={} total={}",
                filter.is_some(),
                listed.items.len(),
                listed.total_elements
            ),
            Err(err) => log_failure(EVENT, err),
        }
        result
    }

    /// Every employee by name (code point order), then joining date.
    pub fn list_sorted_by_name_then_date(&self) -> ServiceResult<Vec<EmployeeView>> {
        self.list_sorted(EmployeeOrdering::NameThenJoiningDate)
    }

    /// Every employee by salary ascending.
    pub fn list_sorted_by_salary(&self) -> ServiceResult<Vec<EmployeeView>> {
        self.list_sorted(EmployeeOrdering::Salary)
    }

    /// Every employee under the given sort strategy.
    pub fn list_sorted(&self, ordering: EmployeeOrdering) -> ServiceResult<Vec<EmployeeView>> {
        const EVENT: &str = "employee_list_sorted";
        debug!(
            "event={EVENT} module=service status=start ordering={}",
            ordering.as_str()
        );

        let result = self
            .repo
            .list_employees(&EmployeeListQuery::default())
            .map_err(ServiceError::from)
            .and_then(|mut employees| {
                ordering.sort(&mut employees);
                self.resolver.views(employees)
            });

        match &result {
            Ok(views) => info!(
                "event={EVENT} module=service status=ok ordering={} total={}",
                ordering.as_str(),
                views.len()
            ),
            Err(err) => log_failure(EVENT, err),
        }
        result
    }

    /// Every employee in storage order.
    pub fn list_all(&self) -> ServiceResult<Vec<EmployeeView>> {
        const EVENT: &str = "employee_list_all";
        debug!("event={EVENT} module=service status=start");

        let result = self
            .repo
            .list_employees(&EmployeeListQuery::default())
            .map_err(ServiceError::from)
            .and_then(|employees| self.resolver.views(employees));

        match &result {
            Ok(views) => info!("event={EVENT} module=service status=ok total={}", views.len()),
            Err(err) => log_failure(EVENT, err),
        }
        result
    }

    /// Members of one department, computed by query.
    pub fn list_department_employees(
        &self,
        department_id: DepartmentId,
    ) -> ServiceResult<Vec<EmployeeView>> {
        const EVENT: &str = "department_members";
        let result = self
            .resolver
            .resolve_department(department_id)
            .and_then(|_| {
                let employees = self.repo.list_employees(&EmployeeListQuery {
                    department_id: Some(department_id),
                    ..EmployeeListQuery::default()
                })?;
                self.resolver.views(employees)
            });

        match &result {
            Ok(views) => info!(
                "event={EVENT} module=service status=ok department_id={department_id} total={}",
                views.len()
            ),
            Err(err) => log_failure(EVENT, err),
        }
        result
    }

    /// Employees assigned to one project, computed by query.
    pub fn list_project_employees(
        &self,
        project_id: ProjectId,
    ) -> ServiceResult<Vec<EmployeeView>> {
        const EVENT: &str = "project_members";
        let result = self
            .resolver
            .resolve_projects(&BTreeSet::from([project_id]))
            .and_then(|_| {
                let employees = self.repo.list_employees(&EmployeeListQuery {
                    project_id: Some(project_id),
                    ..EmployeeListQuery::default()
                })?;
                self.resolver.views(employees)
            });

        match &result {
            Ok(views) => info!(
                "event={EVENT} module=service status=ok project_id={project_id} total={}",
                views.len()
            ),
            Err(err) => log_failure(EVENT, err),
        }
        result
    }

    /// Updates one employee with either call shape.
    ///
    /// All references named by the update are resolved before the record
    /// is touched. The store re-checks newly written references inside its
    /// write transaction, so a concurrent delete still yields `NotFound`.
    ///
    /// # Errors
    /// - `NotFound(Employee)` when `id` is absent.
    /// - `NotFound(Department | Project)` when a supplied reference is
    ///   absent; the stored record is unchanged.
    pub fn update_employee(
        &self,
        id: EmployeeId,
        update: &EmployeeUpdate,
    ) -> ServiceResult<EmployeeView> {
        const EVENT: &str = "employee_update";
        debug!(
            "event={EVENT} module=service status=start employee_id={id} shape={}",
            match update {
                EmployeeUpdate::Replace(_) => "replace",
                EmployeeUpdate::Patch(_) => "patch",
            }
        );

        let result = self.find_employee(id).and_then(|current| {
            let updated = match update {
                EmployeeUpdate::Replace(input) => self.apply_replace(current, input)?,
                EmployeeUpdate::Patch(patch) => self.apply_patch(current, patch)?,
            };
            self.repo.update_employee(&updated)?;
            self.resolver.view(updated)
        });

        match &result {
            Ok(_) => info!("event={EVENT} module=service status=ok employee_id={id}"),
            Err(err) => log_failure(EVENT, err),
        }
        result
    }

    /// Deletes one employee and its project assignments.
    pub fn delete_employee(&self, id: EmployeeId) -> ServiceResult<()> {
        const EVENT: &str = "employee_delete";
        debug!("event={EVENT} module=service status=start employee_id={id}");

        let result = self
            .find_employee(id)
            .and_then(|_| self.repo.delete_employee(id).map_err(ServiceError::from));

        match &result {
            Ok(()) => info!("event={EVENT} module=service status=ok employee_id={id}"),
            Err(err) => log_failure(EVENT, err),
        }
        result
    }

    fn find_employee(&self, id: EmployeeId) -> ServiceResult<Employee> {
        self.repo
            .get_employee(id)?
            .ok_or(ServiceError::not_found(EntityKind::Employee, id))
    }

    fn list_page(
        &self,
        department_name: Option<&str>,
        page: PageRequest,
    ) -> ServiceResult<Page<EmployeeView>> {
        if page.size == 0 {
            return Err(ServiceError::InvalidPageSize);
        }

        let mut query = EmployeeListQuery {
            department_name: department_name.map(str::to_string),
            ..EmployeeListQuery::default()
        };
        let total_elements = self.repo.count_employees(&query)?;

        query.limit = Some(u64::from(page.size));
        query.offset = page.offset();
        let items = if query.offset >= total_elements {
            Vec::new()
        } else {
            self.resolver.views(self.repo.list_employees(&query)?)?
        };

        Ok(Page::new(items, page, total_elements))
    }

    fn apply_replace(&self, current: Employee, input: &EmployeeInput) -> ServiceResult<Employee> {
        self.resolver
            .resolve_references(input.department_id, &input.project_ids)?;
        Ok(Employee {
            id: current.id,
            name: input.name.clone(),
            role: input.role.clone(),
            salary: input.salary,
            joining_date: input.joining_date,
            department_id: input.department_id,
            project_ids: input.project_ids.clone(),
        })
    }

    fn apply_patch(&self, current: Employee, patch: &EmployeePatch) -> ServiceResult<Employee> {
        // Only supplied references are checked; retained ones may dangle.
        if let Some(id) = patch.department_id {
            self.resolver.resolve_department(id)?;
        }
        if let Some(ids) = patch.project_ids.as_ref() {
            self.resolver.resolve_projects(ids)?;
        }

        Ok(Employee {
            id: current.id,
            name: patch.name.clone().unwrap_or(current.name),
            role: patch.role.clone().unwrap_or(current.role),
            salary: patch.salary.unwrap_or(current.salary),
            joining_date: patch.joining_date.unwrap_or(current.joining_date),
            department_id: patch.department_id.or(current.department_id),
            project_ids: patch.project_ids.clone().unwrap_or(current.project_ids),
        })
    }
}
