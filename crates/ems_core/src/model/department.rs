//! Department records and inputs.

use super::validation::{ValidationError, Violations};
use serde::{Deserialize, Serialize};

/// Store-assigned department identifier.
pub type DepartmentId = i64;

/// Canonical department record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    /// Not unique; duplicates are allowed.
    pub name: String,
}

/// Read view returned by the department service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentView {
    pub id: DepartmentId,
    pub name: String,
}

impl From<Department> for DepartmentView {
    fn from(value: Department) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

/// Create/update input for a department. Update is a full replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentInput {
    pub name: String,
}

impl DepartmentInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::default();
        violations.require_text("name", &self.name, "Department name is required");
        violations.finish()
    }
}
