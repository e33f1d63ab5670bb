//! Core domain logic for the employee management system.
//! This crate is the single source of truth for referential integrity,
//! ordering, pagination and salary aggregation.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{load_config, ConfigError, EmsConfig, ReportConfig};
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
};
pub use model::department::{Department, DepartmentId, DepartmentInput, DepartmentView};
pub use model::employee::{
    Employee, EmployeeId, EmployeeInput, EmployeePatch, EmployeeUpdate, EmployeeView, NewEmployee,
    UNASSIGNED_DEPARTMENT,
};
pub use model::page::{Page, PageRequest};
pub use model::project::{Project, ProjectId, ProjectInput, ProjectPatch, ProjectView};
pub use model::validation::{FieldError, ValidationError};
pub use model::EntityKind;
pub use repo::department_repo::{DepartmentRepository, SqliteDepartmentRepository};
pub use repo::employee_repo::{EmployeeListQuery, EmployeeRepository, SqliteEmployeeRepository};
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::{RepoError, RepoResult};
pub use service::department_service::DepartmentService;
pub use service::employee_service::EmployeeService;
pub use service::error::{ServiceError, ServiceResult};
pub use service::ordering::{compare_name_then_joining_date, compare_salary, EmployeeOrdering};
pub use service::project_service::ProjectService;
pub use service::report_service::{salary_distribution, AggregateReport, ReportService};
pub use service::resolver::{ReferenceResolver, ResolvedReferences};
pub use service::{
    sqlite_employee_service, sqlite_report_service, SqliteEmployeeService, SqliteReportService,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
