//! Core use-case services.
//!
//! # Responsibility
//! - Enforce referential integrity before anything is persisted.
//! - Turn stored records into denormalized views.
//! - Sort, paginate and aggregate employee data.
//!
//! # Invariants
//! - Services hold no mutable state between calls; every operation is a
//!   function of its arguments and the store.
//! - Services are built by explicit construction from repositories.

pub mod department_service;
pub mod employee_service;
pub mod error;
pub mod ordering;
pub mod project_service;
pub mod report_service;
pub mod resolver;

use crate::repo::department_repo::SqliteDepartmentRepository;
use crate::repo::employee_repo::SqliteEmployeeRepository;
use crate::repo::project_repo::SqliteProjectRepository;
use rusqlite::Connection;

/// Employee service wired to the SQLite store.
pub type SqliteEmployeeService<'conn> = employee_service::EmployeeService<
    SqliteEmployeeRepository<'conn>,
    SqliteDepartmentRepository<'conn>,
    SqliteProjectRepository<'conn>,
>;

/// Report service wired to the SQLite store.
pub type SqliteReportService<'conn> = report_service::ReportService<
    SqliteEmployeeRepository<'conn>,
    SqliteDepartmentRepository<'conn>,
    SqliteProjectRepository<'conn>,
>;

/// Builds an employee service whose repositories share `conn`.
pub fn sqlite_employee_service(conn: &Connection) -> SqliteEmployeeService<'_> {
    employee_service::EmployeeService::new(
        SqliteEmployeeRepository::new(conn),
        resolver::ReferenceResolver::new(
            SqliteDepartmentRepository::new(conn),
            SqliteProjectRepository::new(conn),
        ),
    )
}

/// Builds a report service whose repositories share `conn`.
pub fn sqlite_report_service(conn: &Connection) -> SqliteReportService<'_> {
    report_service::ReportService::new(sqlite_employee_service(conn))
}
