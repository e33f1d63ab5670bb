//! Employee repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist employee rows together with their project assignment pairs.
//! - Provide filtered, paginated listing and matching counts.
//!
//! # Invariants
//! - A row and its assignment set are written in one immediate-mode
//!   transaction that first re-checks every newly written reference.
//! - Listing order is `id ASC`, so offset pagination is stable.
//! - Assignment pairs are removed with their employee (FK cascade).

use super::{RepoError, RepoResult};
use crate::model::department::DepartmentId;
use crate::model::employee::{Employee, EmployeeId, NewEmployee};
use crate::model::project::ProjectId;
use crate::model::EntityKind;
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};
use std::collections::{BTreeMap, BTreeSet};

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    e.id AS id,
    e.name AS name,
    e.role AS role,
    e.salary AS salary,
    e.joining_date AS joining_date,
    e.department_id AS department_id
FROM employees e";

/// Filter and window options for listing employees.
///
/// All filters combine with AND. `limit`/`offset` are ignored by
/// `count_employees`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeListQuery {
    /// Exact, case-sensitive match on the referenced department's name.
    pub department_name: Option<String>,
    pub department_id: Option<DepartmentId>,
    pub project_id: Option<ProjectId>,
    pub limit: Option<u64>,
    pub offset: u64,
}

/// Persistence contract for employees.
pub trait EmployeeRepository {
    fn create_employee(&self, employee: &NewEmployee) -> RepoResult<Employee>;
    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    fn list_employees(&self, query: &EmployeeListQuery) -> RepoResult<Vec<Employee>>;
    fn count_employees(&self, query: &EmployeeListQuery) -> RepoResult<u64>;
    /// Overwrites every stored field, including the assignment set.
    fn update_employee(&self, employee: &Employee) -> RepoResult<()>;
    fn delete_employee(&self, id: EmployeeId) -> RepoResult<()>;
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn create_employee(&self, employee: &NewEmployee) -> RepoResult<Employee> {
        let tx = begin_write(self.conn)?;
        ensure_references_exist(&tx, employee.department_id, employee.project_ids.iter())?;
        tx.execute(
            "INSERT INTO employees (
                name,
                role,
                salary,
                joining_date,
                department_id
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                employee.name.as_str(),
                employee.role.as_str(),
                employee.salary,
                employee.joining_date,
                employee.department_id,
            ],
        )?;
        let id = tx.last_insert_rowid();
        insert_assignments(&tx, id, &employee.project_ids)?;
        tx.commit()?;

        Ok(employee.clone().into_employee(id))
    }

    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMPLOYEE_SELECT_SQL} WHERE e.id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            let mut employee = parse_employee_row(row)?;
            employee.project_ids = load_assignments(self.conn, employee.id)?;
            return Ok(Some(employee));
        }
        Ok(None)
    }

    fn list_employees(&self, query: &EmployeeListQuery) -> RepoResult<Vec<Employee>> {
        let (window_sql, bind_values) = employee_window(query);
        // Rows and their assignment pairs come from one read snapshot.
        let tx = self.conn.unchecked_transaction()?;

        let mut employees = {
            let mut stmt = tx.prepare(&format!("{EMPLOYEE_SELECT_SQL}{window_sql};"))?;
            let mut rows = stmt.query(params_from_iter(&bind_values))?;
            let mut employees = Vec::new();
            while let Some(row) = rows.next()? {
                employees.push(parse_employee_row(row)?);
            }
            employees
        };

        let mut assignments = load_window_assignments(&tx, &window_sql, &bind_values)?;
        for employee in &mut employees {
            if let Some(project_ids) = assignments.remove(&employee.id) {
                employee.project_ids = project_ids;
            }
        }
        tx.commit()?;
        Ok(employees)
    }

    fn count_employees(&self, query: &EmployeeListQuery) -> RepoResult<u64> {
        let (filter_sql, bind_values) = employee_filter(query);
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM employees e{filter_sql};"),
            params_from_iter(bind_values),
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative employee count `{count}`")))
    }

    fn update_employee(&self, employee: &Employee) -> RepoResult<()> {
        let tx = begin_write(self.conn)?;
        let stored_department: Option<DepartmentId> = tx
            .query_row(
                "SELECT department_id FROM employees WHERE id = ?1;",
                [employee.id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| not_found(employee.id))?;
        let stored_projects = load_assignments(&tx, employee.id)?;

        // Retained references are stored as-is even when they dangle; only
        // newly written ones must exist.
        let new_department = employee
            .department_id
            .filter(|&id| Some(id) != stored_department);
        ensure_references_exist(
            &tx,
            new_department,
            employee.project_ids.difference(&stored_projects),
        )?;

        tx.execute(
            "UPDATE employees
             SET
                name = ?1,
                role = ?2,
                salary = ?3,
                joining_date = ?4,
                department_id = ?5
             WHERE id = ?6;",
            params![
                employee.name.as_str(),
                employee.role.as_str(),
                employee.salary,
                employee.joining_date,
                employee.department_id,
                employee.id,
            ],
        )?;
        tx.execute(
            "DELETE FROM employee_projects WHERE employee_id = ?1;",
            [employee.id],
        )?;
        insert_assignments(&tx, employee.id, &employee.project_ids)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_employee(&self, id: EmployeeId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM employees WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

/// Write transaction that takes the database write lock up front, so
/// reference checks and the write see the same committed state.
fn begin_write(conn: &Connection) -> rusqlite::Result<Transaction<'_>> {
    Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
}

fn ensure_references_exist<'a>(
    conn: &Connection,
    department_id: Option<DepartmentId>,
    project_ids: impl Iterator<Item = &'a ProjectId>,
) -> RepoResult<()> {
    if let Some(id) = department_id {
        if !row_exists(conn, "SELECT EXISTS(SELECT 1 FROM departments WHERE id = ?1);", id)? {
            return Err(RepoError::NotFound {
                kind: EntityKind::Department,
                id,
            });
        }
    }
    for &id in project_ids {
        if !row_exists(conn, "SELECT EXISTS(SELECT 1 FROM projects WHERE id = ?1);", id)? {
            return Err(RepoError::NotFound {
                kind: EntityKind::Project,
                id,
            });
        }
    }
    Ok(())
}

fn row_exists(conn: &Connection, sql: &str, id: i64) -> RepoResult<bool> {
    let exists = conn.query_row(sql, [id], |row| row.get::<_, bool>(0))?;
    Ok(exists)
}

/// Filter plus `ORDER BY`/`LIMIT`/`OFFSET` for one listing window.
fn employee_window(query: &EmployeeListQuery) -> (String, Vec<Value>) {
    let (mut sql, mut bind_values) = employee_filter(query);
    sql.push_str(" ORDER BY e.id ASC");

    if let Some(limit) = query.limit {
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(to_sql_int(limit)));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(to_sql_int(query.offset)));
        }
    } else if query.offset > 0 {
        sql.push_str(" LIMIT -1 OFFSET ?");
        bind_values.push(Value::Integer(to_sql_int(query.offset)));
    }

    (sql, bind_values)
}

fn employee_filter(query: &EmployeeListQuery) -> (String, Vec<Value>) {
    let mut sql = String::from(" WHERE 1 = 1");
    let mut bind_values = Vec::new();

    if let Some(name) = query.department_name.as_ref() {
        sql.push_str(" AND e.department_id IN (SELECT id FROM departments WHERE name = ?)");
        bind_values.push(Value::Text(name.clone()));
    }
    if let Some(department_id) = query.department_id {
        sql.push_str(" AND e.department_id = ?");
        bind_values.push(Value::Integer(department_id));
    }
    if let Some(project_id) = query.project_id {
        sql.push_str(
            " AND e.id IN (SELECT employee_id FROM employee_projects WHERE project_id = ?)",
        );
        bind_values.push(Value::Integer(project_id));
    }

    (sql, bind_values)
}

fn insert_assignments(
    conn: &Connection,
    employee_id: EmployeeId,
    project_ids: &BTreeSet<ProjectId>,
) -> RepoResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO employee_projects (employee_id, project_id) VALUES (?1, ?2);",
    )?;
    for project_id in project_ids {
        stmt.execute(params![employee_id, project_id])?;
    }
    Ok(())
}

fn load_assignments(
    conn: &Connection,
    employee_id: EmployeeId,
) -> RepoResult<BTreeSet<ProjectId>> {
    let mut stmt = conn.prepare(
        "SELECT project_id
         FROM employee_projects
         WHERE employee_id = ?1
         ORDER BY project_id ASC;",
    )?;
    let project_ids = stmt
        .query_map([employee_id], |row| row.get::<_, ProjectId>(0))?
        .collect::<Result<BTreeSet<_>, _>>()?;
    Ok(project_ids)
}

/// Assignment pairs of every employee inside one listing window, in a
/// single query.
fn load_window_assignments(
    conn: &Connection,
    window_sql: &str,
    bind_values: &[Value],
) -> RepoResult<BTreeMap<EmployeeId, BTreeSet<ProjectId>>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT ep.employee_id, ep.project_id
         FROM employee_projects ep
         WHERE ep.employee_id IN (SELECT e.id FROM employees e{window_sql})
         ORDER BY ep.employee_id ASC, ep.project_id ASC;"
    ))?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut assignments: BTreeMap<EmployeeId, BTreeSet<ProjectId>> = BTreeMap::new();
    while let Some(row) = rows.next()? {
        assignments
            .entry(row.get(0)?)
            .or_default()
            .insert(row.get(1)?);
    }
    Ok(assignments)
}

fn parse_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let id: EmployeeId = row.get("id")?;
    let salary: f64 = row.get("salary")?;
    if !salary.is_finite() {
        return Err(RepoError::InvalidData(format!(
            "invalid salary `{salary}` in employees.salary for id {id}"
        )));
    }

    Ok(Employee {
        id,
        name: row.get("name")?,
        role: row.get("role")?,
        salary,
        joining_date: row.get("joining_date")?,
        department_id: row.get("department_id")?,
        project_ids: BTreeSet::new(),
    })
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn not_found(id: EmployeeId) -> RepoError {
    RepoError::NotFound {
        kind: EntityKind::Employee,
        id,
    }
}
