//! Use-case handlers for employees, departments and projects.
//!
//! # Contract
//! - Sync calls over one owned SQLite connection.
//! - Never panics; every handler returns an [`ApiResponse`].
//! - Create/get/list/update answer 200, delete answers 204.
//! - `NotFound` maps to 404, caller input errors to 400, anything else to
//!   500 with a generic message.

use crate::error::ApiError;
use crate::response::ApiResponse;
use ems_core::db::{open_db, open_db_in_memory, DbResult};
use ems_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    sqlite_employee_service, sqlite_report_service, DepartmentId, DepartmentInput,
    DepartmentService, EmployeeId, EmployeeInput, EmployeePatch, EmployeeUpdate, PageRequest,
    ProjectId, ProjectInput, ProjectPatch, ProjectService, SqliteDepartmentRepository,
    SqliteProjectRepository,
};
use log::{error, warn};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Health check.
pub fn ping() -> String {
    ping_inner().to_owned()
}

pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
/// Safe to repeat with the same `level + log_dir`.
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Query parameters of the employee listing.
///
/// Absent `page` and `size` default to `0` and `10`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmployeeListParams {
    pub department: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl EmployeeListParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(0),
            self.size.unwrap_or(PageRequest::DEFAULT_SIZE),
        )
    }
}

/// Request handlers bound to one entity store.
pub struct EmsApi {
    conn: Connection,
}

impl EmsApi {
    /// Opens (and migrates) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        open_db(path).map(Self::from_connection)
    }

    pub fn open_in_memory() -> DbResult<Self> {
        open_db_in_memory().map(Self::from_connection)
    }

    /// Wraps a connection that already has migrations applied.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // Employees

    pub fn create_employee(&self, body: &str) -> ApiResponse {
        respond("employee_create", || {
            let input: EmployeeInput = parse_body(body)?;
            input.validate()?;
            Ok(sqlite_employee_service(&self.conn).create_employee(&input)?)
        })
    }

    pub fn get_employee(&self, id: EmployeeId) -> ApiResponse {
        respond("employee_get", || {
            Ok(sqlite_employee_service(&self.conn).get_employee(id)?)
        })
    }

    /// Filtered, paginated listing. An empty `department` means no filter.
    pub fn list_employees(&self, params: &EmployeeListParams) -> ApiResponse {
        respond("employee_list", || {
            Ok(sqlite_employee_service(&self.conn)
                .list_employees(params.department.as_deref(), params.page_request())?)
        })
    }

    /// Every employee by name, then joining date. This payload is also the
    /// one served to remote consumers of the sorted view.
    pub fn sorted_employees(&self) -> ApiResponse {
        respond("employee_sorted", || {
            Ok(sqlite_employee_service(&self.conn).list_sorted_by_name_then_date()?)
        })
    }

    pub fn employees_sorted_by_salary(&self) -> ApiResponse {
        respond("employee_sorted_by_salary", || {
            Ok(sqlite_employee_service(&self.conn).list_sorted_by_salary()?)
        })
    }

    /// Full replace: every field is required, omitted relations are cleared.
    pub fn replace_employee(&self, id: EmployeeId, body: &str) -> ApiResponse {
        respond("employee_replace", || {
            let input: EmployeeInput = parse_body(body)?;
            self.update_employee(id, EmployeeUpdate::Replace(input))
        })
    }

    /// Partial update: absent fields keep their stored value.
    pub fn patch_employee(&self, id: EmployeeId, body: &str) -> ApiResponse {
        respond("employee_patch", || {
            let patch: EmployeePatch = parse_body(body)?;
            self.update_employee(id, EmployeeUpdate::Patch(patch))
        })
    }

    pub fn delete_employee(&self, id: EmployeeId) -> ApiResponse {
        respond_empty("employee_delete", || {
            Ok(sqlite_employee_service(&self.conn).delete_employee(id)?)
        })
    }

    /// Salary totals keyed by department name.
    pub fn salary_distribution(&self) -> ApiResponse {
        respond("salary_distribution", || {
            Ok(sqlite_report_service(&self.conn).salary_distribution_by_department()?)
        })
    }

    // Departments

    pub fn create_department(&self, body: &str) -> ApiResponse {
        respond("department_create", || {
            let input: DepartmentInput = parse_body(body)?;
            input.validate()?;
            Ok(self.departments().create_department(&input)?)
        })
    }

    pub fn get_department(&self, id: DepartmentId) -> ApiResponse {
        respond("department_get", || Ok(self.departments().get_department(id)?))
    }

    pub fn list_departments(&self) -> ApiResponse {
        respond("department_list", || Ok(self.departments().list_departments()?))
    }

    pub fn update_department(&self, id: DepartmentId, body: &str) -> ApiResponse {
        respond("department_update", || {
            let input: DepartmentInput = parse_body(body)?;
            input.validate()?;
            Ok(self.departments().update_department(id, &input)?)
        })
    }

    pub fn delete_department(&self, id: DepartmentId) -> ApiResponse {
        respond_empty("department_delete", || {
            Ok(self.departments().delete_department(id)?)
        })
    }

    /// Employees whose department is `id`.
    pub fn department_employees(&self, id: DepartmentId) -> ApiResponse {
        respond("department_employees", || {
            Ok(sqlite_employee_service(&self.conn).list_department_employees(id)?)
        })
    }

    // Projects

    pub fn create_project(&self, body: &str) -> ApiResponse {
        respond("project_create", || {
            let input: ProjectInput = parse_body(body)?;
            input.validate()?;
            Ok(self.projects().create_project(&input)?)
        })
    }

    pub fn get_project(&self, id: ProjectId) -> ApiResponse {
        respond("project_get", || Ok(self.projects().get_project(id)?))
    }

    pub fn list_projects(&self) -> ApiResponse {
        respond("project_list", || Ok(self.projects().list_projects()?))
    }

    /// Partial update; a non-positive duration is rejected before lookup.
    pub fn update_project(&self, id: ProjectId, body: &str) -> ApiResponse {
        respond("project_update", || {
            let patch: ProjectPatch = parse_body(body)?;
            patch.validate()?;
            Ok(self.projects().update_project(id, &patch)?)
        })
    }

    pub fn delete_project(&self, id: ProjectId) -> ApiResponse {
        respond_empty("project_delete", || Ok(self.projects().delete_project(id)?))
    }

    /// Employees assigned to project `id`.
    pub fn project_employees(&self, id: ProjectId) -> ApiResponse {
        respond("project_employees", || {
            Ok(sqlite_employee_service(&self.conn).list_project_employees(id)?)
        })
    }

    fn update_employee(
        &self,
        id: EmployeeId,
        update: EmployeeUpdate,
    ) -> Result<ems_core::EmployeeView, ApiError> {
        update.validate()?;
        Ok(sqlite_employee_service(&self.conn).update_employee(id, &update)?)
    }

    fn departments(&self) -> DepartmentService<SqliteDepartmentRepository<'_>> {
        DepartmentService::new(SqliteDepartmentRepository::new(&self.conn))
    }

    fn projects(&self) -> ProjectService<SqliteProjectRepository<'_>> {
        ProjectService::new(SqliteProjectRepository::new(&self.conn))
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|err| ApiError::Malformed(err.to_string()))
}

fn respond<T: Serialize>(
    event: &'static str,
    handler: impl FnOnce() -> Result<T, ApiError>,
) -> ApiResponse {
    let encoded = handler().and_then(|value| serde_json::to_value(value).map_err(ApiError::Encode));
    match encoded {
        Ok(body) => ApiResponse::ok(body),
        Err(err) => failure(event, &err),
    }
}

fn respond_empty(
    event: &'static str,
    handler: impl FnOnce() -> Result<(), ApiError>,
) -> ApiResponse {
    match handler() {
        Ok(()) => ApiResponse::no_content(),
        Err(err) => failure(event, &err),
    }
}

fn failure(event: &'static str, err: &ApiError) -> ApiResponse {
    let response = ApiResponse::from_error(err);
    if err.is_server_error() {
        error!(
            "event={event} module=api status=error http_status={} error={err}",
            response.status
        );
    } else {
        warn!(
            "event={event} module=api status=rejected http_status={}",
            response.status
        );
    }
    response
}
