//! Project repository contract and SQLite implementation.
//!
//! # Invariants
//! - Stored durations are always > 0 (enforced by a table CHECK as well as
//!   by the project service). A non-positive value on read is reported as
//!   `RepoError::InvalidData`.

use super::{RepoError, RepoResult};
use crate::model::project::{Project, ProjectId};
use crate::model::EntityKind;
use rusqlite::{params, Connection, OptionalExtension, Row};

const PROJECT_SELECT_SQL: &str = "SELECT id, name, duration FROM projects";

/// Persistence contract for projects.
pub trait ProjectRepository {
    fn create_project(&self, name: &str, duration: i32) -> RepoResult<Project>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Returns every project in storage (id) order.
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, name: &str, duration: i32) -> RepoResult<Project> {
        self.conn.execute(
            "INSERT INTO projects (name, duration) VALUES (?1, ?2);",
            params![name, duration],
        )?;
        Ok(Project {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            duration,
        })
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let row = self
            .conn
            .query_row(
                &format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                read_project_row,
            )
            .optional()?;
        row.map(check_project).transpose()
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(check_project(read_project_row(row)?)?);
        }
        Ok(projects)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE projects SET name = ?1, duration = ?2 WHERE id = ?3;",
            params![project.name.as_str(), project.duration, project.id],
        )?;
        if changed == 0 {
            return Err(not_found(project.id));
        }
        Ok(())
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn read_project_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get("id")?,
        name: row.get("name")?,
        duration: row.get("duration")?,
    })
}

fn check_project(project: Project) -> RepoResult<Project> {
    if project.duration <= 0 {
        return Err(RepoError::InvalidData(format!(
            "invalid duration `{}` in projects.duration for id {}",
            project.duration, project.id
        )));
    }
    Ok(project)
}

fn not_found(id: ProjectId) -> RepoError {
    RepoError::NotFound {
        kind: EntityKind::Project,
        id,
    }
}
