use chrono::NaiveDate;
use ems_core::db::open_db_in_memory;
use ems_core::{
    sqlite_employee_service, DepartmentInput, DepartmentService, EmployeeInput, EmployeeListQuery,
    EmployeePatch, EmployeeRepository, EmployeeUpdate, EntityKind, ProjectInput, ProjectService,
    ServiceError, SqliteDepartmentRepository, SqliteEmployeeRepository, SqliteProjectRepository,
};
use rusqlite::Connection;
use std::collections::BTreeSet;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn create_department(conn: &Connection, name: &str) -> i64 {
    DepartmentService::new(SqliteDepartmentRepository::new(conn))
        .create_department(&DepartmentInput::new(name))
        .unwrap()
        .id
}

fn create_project(conn: &Connection, name: &str, duration: i32) -> i64 {
    ProjectService::new(SqliteProjectRepository::new(conn))
        .create_project(&ProjectInput::new(name, duration))
        .unwrap()
        .id
}

fn employee_count(conn: &Connection) -> u64 {
    SqliteEmployeeRepository::new(conn)
        .count_employees(&EmployeeListQuery::default())
        .unwrap()
}

#[test]
fn create_resolves_department_and_projects_into_view() {
    let conn = open_db_in_memory().unwrap();
    let it = create_department(&conn, "IT");
    let apollo = create_project(&conn, "Apollo", 12);
    let gemini = create_project(&conn, "Gemini", 3);
    let service = sqlite_employee_service(&conn);

    let created = service
        .create_employee(
            &EmployeeInput::new("Ann", "Engineer", 50_000.0, date(2020, 1, 1))
                .with_department(it)
                .with_projects([apollo, gemini]),
        )
        .unwrap();

    assert_eq!(created.name, "Ann");
    assert_eq!(created.department_name.as_deref(), Some("IT"));
    assert_eq!(
        created.project_names,
        BTreeSet::from(["Apollo".to_string(), "Gemini".to_string()])
    );

    let loaded = service.get_employee(created.id).unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn create_without_relations_has_no_department_and_no_projects() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_employee_service(&conn);

    let created = service
        .create_employee(&EmployeeInput::new("Bob", "Analyst", 30_000.0, date(2021, 5, 4)))
        .unwrap();

    assert_eq!(created.department_name, None);
    assert!(created.project_names.is_empty());
    assert_eq!(created.joining_date, date(2021, 5, 4));
}

#[test]
fn create_with_missing_department_fails_and_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_employee_service(&conn);

    let err = service
        .create_employee(
            &EmployeeInput::new("Ann", "Engineer", 50_000.0, date(2020, 1, 1))
                .with_department(9999),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::NotFound {
            kind: EntityKind::Department,
            id: 9999
        }
    ));
    assert_eq!(employee_count(&conn), 0);
}

#[test]
fn create_with_missing_project_fails_and_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let apollo = create_project(&conn, "Apollo", 12);
    let service = sqlite_employee_service(&conn);

    let err = service
        .create_employee(
            &EmployeeInput::new("Ann", "Engineer", 50_000.0, date(2020, 1, 1))
                .with_projects([apollo, 4242]),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::NotFound {
            kind: EntityKind::Project,
            id: 4242
        }
    ));
    assert_eq!(employee_count(&conn), 0);
    let pairs: i64 = conn
        .query_row("SELECT COUNT(*) FROM employee_projects;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(pairs, 0);
}

#[test]
fn get_missing_employee_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_employee_service(&conn);

    let err = service.get_employee(77).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Employee not found with id: 77");
}

#[test]
fn replace_update_overwrites_fields_and_clears_omitted_relations() {
    let conn = open_db_in_memory().unwrap();
    let it = create_department(&conn, "IT");
    let apollo = create_project(&conn, "Apollo", 12);
    let service = sqlite_employee_service(&conn);
    let created = service
        .create_employee(
            &EmployeeInput::new("Ann", "Engineer", 50_000.0, date(2020, 1, 1))
                .with_department(it)
                .with_projects([apollo]),
        )
        .unwrap();

    let updated = service
        .update_employee(
            created.id,
            &EmployeeUpdate::Replace(EmployeeInput::new(
                "Ann Lee",
                "Lead",
                65_000.0,
                date(2019, 2, 2),
            )),
        )
        .unwrap();

    assert_eq!(updated.name, "Ann Lee");
    assert_eq!(updated.role, "Lead");
    assert_eq!(updated.salary, 65_000.0);
    assert_eq!(updated.joining_date, date(2019, 2, 2));
    assert_eq!(updated.department_name, None);
    assert!(updated.project_names.is_empty());
    assert_eq!(service.get_employee(created.id).unwrap(), updated);
}

#[test]
fn patch_update_changes_only_supplied_fields() {
    let conn = open_db_in_memory().unwrap();
    let it = create_department(&conn, "IT");
    let hr = create_department(&conn, "HR");
    let apollo = create_project(&conn, "Apollo", 12);
    let service = sqlite_employee_service(&conn);
    let created = service
        .create_employee(
            &EmployeeInput::new("Ann", "Engineer", 50_000.0, date(2020, 1, 1))
                .with_department(it)
                .with_projects([apollo]),
        )
        .unwrap();

    let salary_only = service
        .update_employee(
            created.id,
            &EmployeeUpdate::Patch(EmployeePatch {
                salary: Some(55_000.0),
                ..EmployeePatch::default()
            }),
        )
        .unwrap();
    assert_eq!(salary_only.salary, 55_000.0);
    assert_eq!(salary_only.name, "Ann");
    assert_eq!(salary_only.department_name.as_deref(), Some("IT"));
    assert_eq!(
        salary_only.project_names,
        BTreeSet::from(["Apollo".to_string()])
    );

    let moved = service
        .update_employee(
            created.id,
            &EmployeeUpdate::Patch(EmployeePatch {
                department_id: Some(hr),
                project_ids: Some(BTreeSet::new()),
                ..EmployeePatch::default()
            }),
        )
        .unwrap();
    assert_eq!(moved.department_name.as_deref(), Some("HR"));
    assert!(moved.project_names.is_empty());
    assert_eq!(moved.salary, 55_000.0);
}

#[test]
fn failed_reference_resolution_leaves_record_untouched() {
    let conn = open_db_in_memory().unwrap();
    let it = create_department(&conn, "IT");
    let service = sqlite_employee_service(&conn);
    let created = service
        .create_employee(
            &EmployeeInput::new("Ann", "Engineer", 50_000.0, date(2020, 1, 1))
                .with_department(it),
        )
        .unwrap();

    let err = service
        .update_employee(
            created.id,
            &EmployeeUpdate::Patch(EmployeePatch {
                name: Some("Renamed".to_string()),
                salary: Some(1.0),
                project_ids: Some(BTreeSet::from([31337])),
                ..EmployeePatch::default()
            }),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            kind: EntityKind::Project,
            id: 31337
        }
    ));

    let replace_err = service
        .update_employee(
            created.id,
            &EmployeeUpdate::Replace(
                EmployeeInput::new("Other", "Other", 2.0, date(2000, 1, 1)).with_department(404),
            ),
        )
        .unwrap_err();
    assert!(matches!(
        replace_err,
        ServiceError::NotFound {
            kind: EntityKind::Department,
            id: 404
        }
    ));

    assert_eq!(service.get_employee(created.id).unwrap(), created);
}

#[test]
fn update_missing_employee_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_employee_service(&conn);

    let err = service
        .update_employee(12, &EmployeeUpdate::Patch(EmployeePatch::default()))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            kind: EntityKind::Employee,
            id: 12
        }
    ));
}

#[test]
fn delete_removes_employee_and_assignments() {
    let conn = open_db_in_memory().unwrap();
    let apollo = create_project(&conn, "Apollo", 12);
    let service = sqlite_employee_service(&conn);
    let created = service
        .create_employee(
            &EmployeeInput::new("Ann", "Engineer", 50_000.0, date(2020, 1, 1))
                .with_projects([apollo]),
        )
        .unwrap();

    service.delete_employee(created.id).unwrap();

    assert!(service.get_employee(created.id).unwrap_err().is_not_found());
    assert!(service.list_project_employees(apollo).unwrap().is_empty());
    assert_eq!(employee_count(&conn), 0);
}

#[test]
fn delete_unknown_employee_fails_and_keeps_count() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_employee_service(&conn);
    service
        .create_employee(&EmployeeInput::new("Ann", "Engineer", 1.0, date(2020, 1, 1)))
        .unwrap();

    let err = service.delete_employee(555).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            kind: EntityKind::Employee,
            id: 555
        }
    ));
    assert_eq!(employee_count(&conn), 1);
}

#[test]
fn dangling_department_reads_as_unassigned_instead_of_failing() {
    let conn = open_db_in_memory().unwrap();
    let it = create_department(&conn, "IT");
    let apollo = create_project(&conn, "Apollo", 12);
    let service = sqlite_employee_service(&conn);
    let ann = service
        .create_employee(
            &EmployeeInput::new("Ann", "Engineer", 50_000.0, date(2020, 1, 1))
                .with_department(it)
                .with_projects([apollo]),
        )
        .unwrap();
    assert_eq!(ann.department_name.as_deref(), Some("IT"));

    DepartmentService::new(SqliteDepartmentRepository::new(&conn))
        .delete_department(it)
        .unwrap();
    ProjectService::new(SqliteProjectRepository::new(&conn))
        .delete_project(apollo)
        .unwrap();

    let reloaded = service.get_employee(ann.id).unwrap();
    assert_eq!(reloaded.department_name, None);
    assert!(reloaded.project_names.is_empty());

    // The stored ids are kept; only the view treats them as missing.
    let stored = SqliteEmployeeRepository::new(&conn)
        .get_employee(ann.id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.department_id, Some(it));
    assert_eq!(stored.project_ids, BTreeSet::from([apollo]));
}

#[test]
fn patch_keeps_dangling_department_without_failing() {
    let conn = open_db_in_memory().unwrap();
    let it = create_department(&conn, "IT");
    let service = sqlite_employee_service(&conn);
    let ann = service
        .create_employee(
            &EmployeeInput::new("Ann", "Engineer", 50_000.0, date(2020, 1, 1))
                .with_department(it),
        )
        .unwrap();
    DepartmentService::new(SqliteDepartmentRepository::new(&conn))
        .delete_department(it)
        .unwrap();

    let updated = service
        .update_employee(
            ann.id,
            &EmployeeUpdate::Patch(EmployeePatch {
                role: Some("Manager".to_string()),
                ..EmployeePatch::default()
            }),
        )
        .unwrap();
    assert_eq!(updated.role, "Manager");
    assert_eq!(updated.department_name, None);
}
