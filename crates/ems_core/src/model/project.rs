//! Project records and inputs.

use super::validation::{ValidationError, Violations};
use serde::{Deserialize, Serialize};

/// Store-assigned project identifier.
pub type ProjectId = i64;

/// Canonical project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Length in months. Always > 0 once stored.
    pub duration: i32,
}

/// Read view returned by the project service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectView {
    pub id: ProjectId,
    pub name: String,
    pub duration: i32,
}

impl From<Project> for ProjectView {
    fn from(value: Project) -> Self {
        Self {
            id: value.id,
            name: value.name,
            duration: value.duration,
        }
    }
}

/// Create input for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInput {
    pub name: String,
    pub duration: i32,
}

impl ProjectInput {
    pub fn new(name: impl Into<String>, duration: i32) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }

    /// Checks name presence only. Duration is enforced by the project
    /// service itself so that direct core callers hit the same rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::default();
        violations.require_text("name", &self.name, "Project name is required");
        violations.finish()
    }
}

/// Partial update input for a project. Absent fields keep stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub duration: Option<i32>,
}

impl ProjectPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::default();
        if let Some(name) = self.name.as_deref() {
            violations.require_text("name", name, "Project name must not be blank");
        }
        violations.finish()
    }
}
