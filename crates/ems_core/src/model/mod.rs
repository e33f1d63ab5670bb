//! Domain model for employees, departments and projects.
//!
//! # Responsibility
//! - Define canonical records owned by the entity store.
//! - Define denormalized read views and write inputs used by services.
//!
//! # Invariants
//! - Relations are plain id fields; nothing holds a pointer back to its
//!   owner. Member lists are always computed by query.
//! - Views are transient projections and are never persisted.

pub mod department;
pub mod employee;
pub mod page;
pub mod project;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Entity families held by the store; used to tag not-found failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Employee,
    Department,
    Project,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "Employee",
            Self::Department => "Department",
            Self::Project => "Project",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
