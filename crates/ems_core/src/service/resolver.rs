//! Reference resolution and employee view materialization.
//!
//! # Responsibility
//! - Validate department/project references before a write.
//! - Join stored ids to display names when building employee views.
//!
//! # Invariants
//! - Strict resolution (`resolve_*`) fails on the first missing id and
//!   returns no partial result.
//! - View building is lenient: a dangling department id yields no
//!   department name, dangling project ids are omitted.
//! - Read-only; never mutates the store.

use super::error::{ServiceError, ServiceResult};
use crate::model::department::{Department, DepartmentId};
use crate::model::employee::{Employee, EmployeeView};
use crate::model::project::{Project, ProjectId};
use crate::model::EntityKind;
use crate::repo::department_repo::DepartmentRepository;
use crate::repo::project_repo::ProjectRepository;
use std::collections::{BTreeMap, BTreeSet};

/// Relations resolved for one employee write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedReferences {
    pub department: Option<Department>,
    pub projects: Vec<Project>,
}

/// Resolves employee relations against department and project stores.
pub struct ReferenceResolver<D: DepartmentRepository, P: ProjectRepository> {
    departments: D,
    projects: P,
}

impl<D: DepartmentRepository, P: ProjectRepository> ReferenceResolver<D, P> {
    pub fn new(departments: D, projects: P) -> Self {
        Self {
            departments,
            projects,
        }
    }

    /// Fetches one department or fails with `NotFound(Department, id)`.
    pub fn resolve_department(&self, id: DepartmentId) -> ServiceResult<Department> {
        self.departments
            .get_department(id)?
            .ok_or(ServiceError::not_found(EntityKind::Department, id))
    }

    /// Fetches every project in ascending id order, or fails with
    /// `NotFound(Project, id)` for the first id that does not resolve.
    pub fn resolve_projects(&self, ids: &BTreeSet<ProjectId>) -> ServiceResult<Vec<Project>> {
        ids.iter()
            .map(|&id| {
                self.projects
                    .get_project(id)?
                    .ok_or(ServiceError::not_found(EntityKind::Project, id))
            })
            .collect()
    }

    /// Strictly resolves the relations an employee write is about to store.
    pub fn resolve_references(
        &self,
        department_id: Option<DepartmentId>,
        project_ids: &BTreeSet<ProjectId>,
    ) -> ServiceResult<ResolvedReferences> {
        let department = department_id
            .map(|id| self.resolve_department(id))
            .transpose()?;
        let projects = self.resolve_projects(project_ids)?;
        Ok(ResolvedReferences {
            department,
            projects,
        })
    }

    /// Builds a view from references that were resolved for this write.
    pub fn view_with(&self, employee: Employee, references: &ResolvedReferences) -> EmployeeView {
        EmployeeView {
            id: employee.id,
            name: employee.name,
            role: employee.role,
            salary: employee.salary,
            joining_date: employee.joining_date,
            department_name: references
                .department
                .as_ref()
                .map(|department| department.name.clone()),
            project_names: references
                .projects
                .iter()
                .map(|project| project.name.clone())
                .collect(),
        }
    }

    /// Builds a view for one stored employee.
    pub fn view(&self, employee: Employee) -> ServiceResult<EmployeeView> {
        self.view_cached(employee, &mut NameCache::default())
    }

    /// Builds views for stored employees, keeping input order.
    ///
    /// Lookups are cached for the duration of this call only.
    pub fn views(&self, employees: Vec<Employee>) -> ServiceResult<Vec<EmployeeView>> {
        let mut cache = NameCache::default();
        employees
            .into_iter()
            .map(|employee| self.view_cached(employee, &mut cache))
            .collect()
    }

    fn view_cached(
        &self,
        employee: Employee,
        cache: &mut NameCache,
    ) -> ServiceResult<EmployeeView> {
        let department_name = match employee.department_id {
            Some(id) => self.department_name(cache, id)?,
            None => None,
        };

        let mut project_names = BTreeSet::new();
        for &project_id in &employee.project_ids {
            if let Some(name) = self.project_name(cache, project_id)? {
                project_names.insert(name);
            }
        }

        Ok(EmployeeView {
            id: employee.id,
            name: employee.name,
            role: employee.role,
            salary: employee.salary,
            joining_date: employee.joining_date,
            department_name,
            project_names,
        })
    }

    fn department_name(
        &self,
        cache: &mut NameCache,
        id: DepartmentId,
    ) -> ServiceResult<Option<String>> {
        if let Some(name) = cache.departments.get(&id) {
            return Ok(name.clone());
        }
        let name = self
            .departments
            .get_department(id)?
            .map(|department| department.name);
        cache.departments.insert(id, name.clone());
        Ok(name)
    }

    fn project_name(&self, cache: &mut NameCache, id: ProjectId) -> ServiceResult<Option<String>> {
        if let Some(name) = cache.projects.get(&id) {
            return Ok(name.clone());
        }
        let name = self.projects.get_project(id)?.map(|project| project.name);
        cache.projects.insert(id, name.clone());
        Ok(name)
    }
}

/// Per-call name lookups; `None` marks an id known to be dangling.
#[derive(Default)]
struct NameCache {
    departments: BTreeMap<DepartmentId, Option<String>>,
    projects: BTreeMap<ProjectId, Option<String>>,
}
