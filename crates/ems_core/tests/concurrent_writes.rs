use chrono::NaiveDate;
use ems_core::db::open_db;
use ems_core::{
    Department, DepartmentId, DepartmentRepository, EmployeeInput, EmployeeListQuery,
    EmployeePatch, EmployeeRepository, EmployeeService, EmployeeUpdate, EntityKind, NewEmployee,
    Project, ProjectId, ProjectRepository, ReferenceResolver, RepoError, RepoResult,
    ServiceError, SqliteDepartmentRepository, SqliteEmployeeRepository, SqliteProjectRepository,
};
use rusqlite::Connection;
use std::collections::BTreeSet;
use std::path::Path;

/// Department store whose rows are deleted by a second connection right
/// after each successful lookup, as if another writer raced the caller.
struct RacingDepartments<'conn> {
    inner: SqliteDepartmentRepository<'conn>,
    other_writer: Connection,
}

impl DepartmentRepository for RacingDepartments<'_> {
    fn create_department(&self, name: &str) -> RepoResult<Department> {
        self.inner.create_department(name)
    }

    fn get_department(&self, id: DepartmentId) -> RepoResult<Option<Department>> {
        let found = self.inner.get_department(id)?;
        self.other_writer
            .execute("DELETE FROM departments WHERE id = ?1;", [id])?;
        Ok(found)
    }

    fn list_departments(&self) -> RepoResult<Vec<Department>> {
        self.inner.list_departments()
    }

    fn update_department(&self, department: &Department) -> RepoResult<()> {
        self.inner.update_department(department)
    }

    fn delete_department(&self, id: DepartmentId) -> RepoResult<()> {
        self.inner.delete_department(id)
    }
}

/// Same race for projects.
struct RacingProjects<'conn> {
    inner: SqliteProjectRepository<'conn>,
    other_writer: Connection,
}

impl ProjectRepository for RacingProjects<'_> {
    fn create_project(&self, name: &str, duration: i32) -> RepoResult<Project> {
        self.inner.create_project(name, duration)
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let found = self.inner.get_project(id)?;
        self.other_writer
            .execute("DELETE FROM projects WHERE id = ?1;", [id])?;
        Ok(found)
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        self.inner.list_projects()
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        self.inner.update_project(project)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        self.inner.delete_project(id)
    }
}

fn joined() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

fn seed_department(conn: &Connection, name: &str) -> DepartmentId {
    SqliteDepartmentRepository::new(conn)
        .create_department(name)
        .unwrap()
        .id
}

fn seed_project(conn: &Connection, name: &str) -> ProjectId {
    SqliteProjectRepository::new(conn)
        .create_project(name, 6)
        .unwrap()
        .id
}

fn racing_department_service<'conn>(
    conn: &'conn Connection,
    path: &Path,
) -> EmployeeService<
    SqliteEmployeeRepository<'conn>,
    RacingDepartments<'conn>,
    SqliteProjectRepository<'conn>,
> {
    EmployeeService::new(
        SqliteEmployeeRepository::new(conn),
        ReferenceResolver::new(
            RacingDepartments {
                inner: SqliteDepartmentRepository::new(conn),
                other_writer: open_db(path).unwrap(),
            },
            SqliteProjectRepository::new(conn),
        ),
    )
}

fn employee_count(conn: &Connection) -> u64 {
    SqliteEmployeeRepository::new(conn)
        .count_employees(&EmployeeListQuery::default())
        .unwrap()
}

#[test]
fn create_fails_when_department_is_deleted_after_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ems.sqlite3");
    let conn = open_db(&path).unwrap();
    let it = seed_department(&conn, "IT");
    let service = racing_department_service(&conn, &path);

    let err = service
        .create_employee(
            &EmployeeInput::new("Ann", "Engineer", 1.0, joined()).with_department(it),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::NotFound {
            kind: EntityKind::Department,
            id
        } if id == it
    ));
    assert_eq!(employee_count(&conn), 0);
}

#[test]
fn create_fails_when_project_is_deleted_after_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ems.sqlite3");
    let conn = open_db(&path).unwrap();
    let apollo = seed_project(&conn, "Apollo");
    let service = EmployeeService::new(
        SqliteEmployeeRepository::new(&conn),
        ReferenceResolver::new(
            SqliteDepartmentRepository::new(&conn),
            RacingProjects {
                inner: SqliteProjectRepository::new(&conn),
                other_writer: open_db(&path).unwrap(),
            },
        ),
    );

    let err = service
        .create_employee(
            &EmployeeInput::new("Ann", "Engineer", 1.0, joined()).with_projects([apollo]),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::NotFound {
            kind: EntityKind::Project,
            id
        } if id == apollo
    ));
    assert_eq!(employee_count(&conn), 0);
    let pairs: i64 = conn
        .query_row("SELECT COUNT(*) FROM employee_projects;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(pairs, 0);
}

#[test]
fn patch_fails_when_new_department_is_deleted_after_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ems.sqlite3");
    let conn = open_db(&path).unwrap();
    let hr = seed_department(&conn, "HR");
    let it = seed_department(&conn, "IT");
    let stored = SqliteEmployeeRepository::new(&conn)
        .create_employee(&NewEmployee {
            name: "Ann".to_string(),
            role: "Engineer".to_string(),
            salary: 1.0,
            joining_date: joined(),
            department_id: Some(hr),
            project_ids: BTreeSet::new(),
        })
        .unwrap();
    let service = racing_department_service(&conn, &path);

    let err = service
        .update_employee(
            stored.id,
            &EmployeeUpdate::Patch(EmployeePatch {
                role: Some("Lead".to_string()),
                department_id: Some(it),
                ..EmployeePatch::default()
            }),
        )
        .unwrap_err();
    assert!(err.is_not_found());

    let reloaded = SqliteEmployeeRepository::new(&conn)
        .get_employee(stored.id)
        .unwrap()
        .unwrap();
    assert_eq!(reloaded, stored);
}

#[test]
fn store_rejects_unknown_references_on_insert() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("ems.sqlite3")).unwrap();
    let repo = SqliteEmployeeRepository::new(&conn);

    let err = repo
        .create_employee(&NewEmployee {
            name: "Ann".to_string(),
            role: "Engineer".to_string(),
            salary: 1.0,
            joining_date: joined(),
            department_id: None,
            project_ids: BTreeSet::from([404]),
        })
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::NotFound {
            kind: EntityKind::Project,
            id: 404
        }
    ));
    assert_eq!(employee_count(&conn), 0);
}

#[test]
fn store_keeps_retained_dangling_references_on_update() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("ems.sqlite3")).unwrap();
    let legal = seed_department(&conn, "Legal");
    let gemini = seed_project(&conn, "Gemini");
    let repo = SqliteEmployeeRepository::new(&conn);
    let mut stored = repo
        .create_employee(&NewEmployee {
            name: "Ann".to_string(),
            role: "Engineer".to_string(),
            salary: 1.0,
            joining_date: joined(),
            department_id: Some(legal),
            project_ids: BTreeSet::from([gemini]),
        })
        .unwrap();
    SqliteDepartmentRepository::new(&conn)
        .delete_department(legal)
        .unwrap();
    SqliteProjectRepository::new(&conn)
        .delete_project(gemini)
        .unwrap();

    stored.salary = 2.0;
    repo.update_employee(&stored).unwrap();

    assert_eq!(repo.get_employee(stored.id).unwrap(), Some(stored));
}
