//! Salary aggregation and the periodic aggregate report.
//!
//! # Responsibility
//! - Sum salaries per resolved department name.
//! - Build the aggregate report handed to the scheduler.
//!
//! # Invariants
//! - Read-only; needs no coordination with concurrent writes beyond the
//!   store's own isolation.
//! - `run_scheduled_report` never returns an error; failures are logged.

use super::employee_service::EmployeeService;
use super::error::{log_failure, ServiceResult};
use crate::model::employee::{EmployeeView, UNASSIGNED_DEPARTMENT};
use crate::repo::department_repo::DepartmentRepository;
use crate::repo::employee_repo::EmployeeRepository;
use crate::repo::project_repo::ProjectRepository;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

/// Snapshot produced by one report run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub generated_at: DateTime<Utc>,
    pub employee_count: usize,
    pub total_payroll: f64,
    pub salary_by_department: BTreeMap<String, f64>,
}

/// Aggregation engine over the employee query engine.
pub struct ReportService<E, D, P>
where
    E: EmployeeRepository,
    D: DepartmentRepository,
    P: ProjectRepository,
{
    employees: EmployeeService<E, D, P>,
}

impl<E, D, P> ReportService<E, D, P>
where
    E: EmployeeRepository,
    D: DepartmentRepository,
    P: ProjectRepository,
{
    pub fn new(employees: EmployeeService<E, D, P>) -> Self {
        Self { employees }
    }

    /// Sums salaries per department name; employees without a resolvable
    /// department land under `"Unassigned"`. Empty store yields an empty map.
    pub fn salary_distribution_by_department(&self) -> ServiceResult<BTreeMap<String, f64>> {
        const EVENT: &str = "salary_distribution";
        debug!("event={EVENT} module=service status=start");

        let result = self
            .employees
            .list_all()
            .map(|views| salary_distribution(&views));

        match &result {
            Ok(distribution) => info!(
                "event={EVENT} module=service status=ok groups={}",
                distribution.len()
            ),
            Err(err) => log_failure(EVENT, err),
        }
        result
    }

    /// Builds one aggregate report from the name/date-sorted listing.
    pub fn generate_report(&self) -> ServiceResult<AggregateReport> {
        let views = self.employees.list_sorted_by_name_then_date()?;
        let salary_by_department = salary_distribution(&views);
        Ok(AggregateReport {
            generated_at: Utc::now(),
            employee_count: views.len(),
            total_payroll: salary_by_department.values().sum(),
            salary_by_department,
        })
    }

    /// Scheduler entry point. Never propagates a failure.
    pub fn run_scheduled_report(&self) -> Option<AggregateReport> {
        const EVENT: &str = "report_generate";
        let started_at = Instant::now();
        info!("event={EVENT} module=report status=start");

        match self.generate_report() {
            Ok(report) => {
                info!(
                    "event={EVENT} module=report status=ok duration_ms={} employees={} groups={}",
                    started_at.elapsed().as_millis(),
                    report.employee_count,
                    report.salary_by_department.len()
                );
                Some(report)
            }
            Err(err) => {
                log_failure(EVENT, &err);
                None
            }
        }
    }
}

/// Groups views by department name and sums their salaries.
pub fn salary_distribution(views: &[EmployeeView]) -> BTreeMap<String, f64> {
    let mut distribution = BTreeMap::new();
    for view in views {
        let department = view
            .department_name
            .as_deref()
            .unwrap_or(UNASSIGNED_DEPARTMENT);
        *distribution.entry(department.to_string()).or_insert(0.0) += view.salary;
    }
    distribution
}
