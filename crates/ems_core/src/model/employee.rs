//! Employee records, views and write inputs.
//!
//! # Invariants
//! - `department_id`, when set, referenced an existing department at the
//!   time it was written. Later department deletion may leave it dangling.
//! - Every id in `project_ids` referenced an existing project at write time.
//! - `salary` is positive and finite for records created through validated
//!   inputs.

use super::department::DepartmentId;
use super::project::ProjectId;
use super::validation::{ValidationError, Violations};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Store-assigned employee identifier.
pub type EmployeeId = i64;

/// Label used for employees without a (resolvable) department.
pub const UNASSIGNED_DEPARTMENT: &str = "Unassigned";

/// Canonical employee record as held by the entity store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub role: String,
    pub salary: f64,
    pub joining_date: NaiveDate,
    pub department_id: Option<DepartmentId>,
    pub project_ids: BTreeSet<ProjectId>,
}

/// Employee fields before the store assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub name: String,
    pub role: String,
    pub salary: f64,
    pub joining_date: NaiveDate,
    pub department_id: Option<DepartmentId>,
    pub project_ids: BTreeSet<ProjectId>,
}

impl NewEmployee {
    /// Attaches a store-assigned id.
    pub fn into_employee(self, id: EmployeeId) -> Employee {
        Employee {
            id,
            name: self.name,
            role: self.role,
            salary: self.salary,
            joining_date: self.joining_date,
            department_id: self.department_id,
            project_ids: self.project_ids,
        }
    }
}

/// Denormalized employee projection: relation ids are replaced by names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeView {
    pub id: EmployeeId,
    pub name: String,
    pub role: String,
    pub salary: f64,
    pub joining_date: NaiveDate,
    /// `None` when the employee has no department or it no longer exists.
    pub department_name: Option<String>,
    pub project_names: BTreeSet<String>,
}

/// Full input used by create and by the replace-style update.
///
/// On replace, an absent `department_id` or empty `project_ids` clears the
/// stored relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    pub name: String,
    pub role: String,
    pub salary: f64,
    pub joining_date: NaiveDate,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    #[serde(default)]
    pub project_ids: BTreeSet<ProjectId>,
}

impl EmployeeInput {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        salary: f64,
        joining_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            salary,
            joining_date,
            department_id: None,
            project_ids: BTreeSet::new(),
        }
    }

    pub fn with_department(mut self, department_id: DepartmentId) -> Self {
        self.department_id = Some(department_id);
        self
    }

    pub fn with_projects(mut self, project_ids: impl IntoIterator<Item = ProjectId>) -> Self {
        self.project_ids = project_ids.into_iter().collect();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::default();
        violations.require_text("name", &self.name, "name is required");
        violations.require_text("role", &self.role, "role is required");
        violations.require_positive("salary", self.salary, "salary must be positive");
        violations.finish()
    }
}

/// Partial update input. Every absent field keeps its stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub salary: Option<f64>,
    pub joining_date: Option<NaiveDate>,
    pub department_id: Option<DepartmentId>,
    /// `Some` replaces the whole assignment set, `Some(empty)` clears it.
    pub project_ids: Option<BTreeSet<ProjectId>>,
}

impl EmployeePatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::default();
        if let Some(name) = self.name.as_deref() {
            violations.require_text("name", name, "name must not be blank");
        }
        if let Some(role) = self.role.as_deref() {
            violations.require_text("role", role, "role must not be blank");
        }
        if let Some(salary) = self.salary {
            violations.require_positive("salary", salary, "salary must be positive");
        }
        violations.finish()
    }
}

/// The two update call shapes accepted by the employee service.
#[derive(Debug, Clone, PartialEq)]
pub enum EmployeeUpdate {
    /// Overwrites every field, clearing relations the input leaves out.
    Replace(EmployeeInput),
    /// Overwrites only the fields present in the patch.
    Patch(EmployeePatch),
}

impl EmployeeUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Replace(input) => input.validate(),
            Self::Patch(patch) => patch.validate(),
        }
    }
}
