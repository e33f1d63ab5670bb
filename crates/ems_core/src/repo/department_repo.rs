//! Department repository contract and SQLite implementation.

use super::{RepoError, RepoResult};
use crate::model::department::{Department, DepartmentId};
use crate::model::EntityKind;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Persistence contract for departments.
pub trait DepartmentRepository {
    fn create_department(&self, name: &str) -> RepoResult<Department>;
    fn get_department(&self, id: DepartmentId) -> RepoResult<Option<Department>>;
    /// Returns every department in storage (id) order.
    fn list_departments(&self) -> RepoResult<Vec<Department>>;
    fn update_department(&self, department: &Department) -> RepoResult<()>;
    fn delete_department(&self, id: DepartmentId) -> RepoResult<()>;
}

/// SQLite-backed department repository.
pub struct SqliteDepartmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDepartmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DepartmentRepository for SqliteDepartmentRepository<'_> {
    fn create_department(&self, name: &str) -> RepoResult<Department> {
        self.conn
            .execute("INSERT INTO departments (name) VALUES (?1);", [name])?;
        Ok(Department {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    fn get_department(&self, id: DepartmentId) -> RepoResult<Option<Department>> {
        let department = self
            .conn
            .query_row(
                "SELECT id, name FROM departments WHERE id = ?1;",
                [id],
                parse_department_row,
            )
            .optional()?;
        Ok(department)
    }

    fn list_departments(&self) -> RepoResult<Vec<Department>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM departments ORDER BY id ASC;")?;
        let departments = stmt
            .query_map([], parse_department_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(departments)
    }

    fn update_department(&self, department: &Department) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE departments SET name = ?1 WHERE id = ?2;",
            params![department.name.as_str(), department.id],
        )?;
        if changed == 0 {
            return Err(not_found(department.id));
        }
        Ok(())
    }

    fn delete_department(&self, id: DepartmentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM departments WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn parse_department_row(row: &Row<'_>) -> rusqlite::Result<Department> {
    Ok(Department {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}

fn not_found(id: DepartmentId) -> RepoError {
    RepoError::NotFound {
        kind: EntityKind::Department,
        id,
    }
}
