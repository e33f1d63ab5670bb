use ems_api::{EmployeeListParams, EmsApi};
use serde_json::{json, Value};

fn body(value: Value) -> String {
    value.to_string()
}

fn created_id(api_response: &ems_api::ApiResponse) -> i64 {
    api_response
        .field("id")
        .and_then(Value::as_i64)
        .expect("created entity should carry an id")
}

fn seed(api: &EmsApi) -> (i64, i64) {
    let it = created_id(&api.create_department(&body(json!({ "name": "IT" }))));
    let apollo = created_id(&api.create_project(&body(json!({ "name": "Apollo", "duration": 6 }))));
    (it, apollo)
}

#[test]
fn create_returns_denormalized_view() {
    let api = EmsApi::open_in_memory().unwrap();
    let (it, apollo) = seed(&api);

    let response = api.create_employee(&body(json!({
        "name": "Ann",
        "role": "Engineer",
        "salary": 50000.0,
        "joiningDate": "2020-01-01",
        "departmentId": it,
        "projectIds": [apollo]
    })));

    assert_eq!(response.status, 200);
    assert_eq!(response.field("departmentName"), Some(&json!("IT")));
    assert_eq!(response.field("projectNames"), Some(&json!(["Apollo"])));
    assert_eq!(response.field("joiningDate"), Some(&json!("2020-01-01")));

    let fetched = api.get_employee(created_id(&response));
    assert_eq!(fetched.status, 200);
    assert_eq!(fetched.body, response.body);
}

#[test]
fn validation_failures_list_every_field() {
    let api = EmsApi::open_in_memory().unwrap();

    let response = api.create_employee(&body(json!({
        "name": " ",
        "role": "",
        "salary": -1.0,
        "joiningDate": "2020-01-01"
    })));

    assert_eq!(response.status, 400);
    assert_eq!(response.field("message"), Some(&json!("Validation failed")));
    let errors = response.field("errors").expect("errors map");
    assert_eq!(errors["name"], "name is required");
    assert_eq!(errors["role"], "role is required");
    assert_eq!(errors["salary"], "salary must be positive");
}

#[test]
fn malformed_body_is_rejected_without_touching_the_store() {
    let api = EmsApi::open_in_memory().unwrap();

    let response = api.create_employee("{\"name\": \"Ann\"");
    assert_eq!(response.status, 400);
    assert!(response.field("errors").is_none());

    let listed = api.list_employees(&EmployeeListParams::default());
    assert_eq!(listed.field("totalElements"), Some(&json!(0)));
}

#[test]
fn missing_department_reference_is_not_found() {
    let api = EmsApi::open_in_memory().unwrap();

    let response = api.create_employee(&body(json!({
        "name": "Ann",
        "role": "Engineer",
        "salary": 1.0,
        "joiningDate": "2020-01-01",
        "departmentId": 9999
    })));

    assert_eq!(response.status, 404);
    assert_eq!(
        response.field("message"),
        Some(&json!("Department not found with id: 9999"))
    );
    assert!(response.field("timestamp").is_some());
}

#[test]
fn unknown_employee_yields_404_for_get_update_and_delete() {
    let api = EmsApi::open_in_memory().unwrap();

    assert_eq!(api.get_employee(5).status, 404);
    assert_eq!(api.patch_employee(5, "{}").status, 404);
    assert_eq!(api.delete_employee(5).status, 404);
}

#[test]
fn replace_and_patch_update_shapes() {
    let api = EmsApi::open_in_memory().unwrap();
    let (it, apollo) = seed(&api);
    let id = created_id(&api.create_employee(&body(json!({
        "name": "Ann",
        "role": "Engineer",
        "salary": 50000.0,
        "joiningDate": "2020-01-01",
        "departmentId": it,
        "projectIds": [apollo]
    }))));

    let patched = api.patch_employee(id, &body(json!({ "salary": 65000.0 })));
    assert_eq!(patched.status, 200);
    assert_eq!(patched.field("salary"), Some(&json!(65000.0)));
    assert_eq!(patched.field("departmentName"), Some(&json!("IT")));

    let replaced = api.replace_employee(
        id,
        &body(json!({
            "name": "Ann B",
            "role": "Lead",
            "salary": 70000.0,
            "joiningDate": "2020-01-01"
        })),
    );
    assert_eq!(replaced.status, 200);
    assert_eq!(replaced.field("departmentName"), Some(&Value::Null));
    assert_eq!(replaced.field("projectNames"), Some(&json!([])));

    let rejected = api.patch_employee(id, &body(json!({ "salary": 0.0 })));
    assert_eq!(rejected.status, 400);
    assert_eq!(api.get_employee(id).field("salary"), Some(&json!(70000.0)));
}

#[test]
fn delete_answers_no_content() {
    let api = EmsApi::open_in_memory().unwrap();
    let id = created_id(&api.create_employee(&body(json!({
        "name": "Ann",
        "role": "Engineer",
        "salary": 1.0,
        "joiningDate": "2020-01-01"
    }))));

    let response = api.delete_employee(id);
    assert_eq!(response.status, 204);
    assert!(response.body.is_none());
    assert_eq!(api.get_employee(id).status, 404);
}

#[test]
fn listing_pages_and_filters() {
    let api = EmsApi::open_in_memory().unwrap();
    let (it, _) = seed(&api);
    for (index, department) in [Some(it), None, Some(it)].into_iter().enumerate() {
        let mut payload = json!({
            "name": format!("E{index}"),
            "role": "Staff",
            "salary": 100.0,
            "joiningDate": "2021-01-01"
        });
        if let Some(department) = department {
            payload["departmentId"] = json!(department);
        }
        assert_eq!(api.create_employee(&body(payload)).status, 200);
    }

    let filtered = api.list_employees(&EmployeeListParams {
        department: Some("IT".to_string()),
        page: Some(0),
        size: Some(1),
    });
    assert_eq!(filtered.status, 200);
    assert_eq!(filtered.field("totalElements"), Some(&json!(2)));
    assert_eq!(filtered.field("items").and_then(Value::as_array).map(Vec::len), Some(1));

    let empty_size = api.list_employees(&EmployeeListParams {
        department: None,
        page: None,
        size: Some(0),
    });
    assert_eq!(empty_size.status, 400);
}

#[test]
fn sorted_views_follow_their_orderings() {
    let api = EmsApi::open_in_memory().unwrap();
    for (name, salary, date) in [
        ("bob", 10.0, "2020-01-01"),
        ("Bob", 30.0, "2021-01-01"),
        ("Bob", 20.0, "2019-01-01"),
    ] {
        let response = api.create_employee(&body(json!({
            "name": name,
            "role": "Staff",
            "salary": salary,
            "joiningDate": date
        })));
        assert_eq!(response.status, 200);
    }

    let sorted = api.sorted_employees();
    let names: Vec<(String, String)> = sorted
        .body
        .as_ref()
        .and_then(Value::as_array)
        .unwrap()
        .iter()
        .map(|view| {
            (
                view["name"].as_str().unwrap().to_string(),
                view["joiningDate"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        names,
        vec![
            ("Bob".to_string(), "2019-01-01".to_string()),
            ("Bob".to_string(), "2021-01-01".to_string()),
            ("bob".to_string(), "2020-01-01".to_string()),
        ]
    );

    let by_salary = api.employees_sorted_by_salary();
    let salaries: Vec<f64> = by_salary
        .body
        .as_ref()
        .and_then(Value::as_array)
        .unwrap()
        .iter()
        .map(|view| view["salary"].as_f64().unwrap())
        .collect();
    assert_eq!(salaries, vec![10.0, 20.0, 30.0]);
}

#[test]
fn salary_distribution_endpoint_groups_by_department() {
    let api = EmsApi::open_in_memory().unwrap();
    let (it, _) = seed(&api);
    for (salary, department) in [(50000.0, Some(it)), (30000.0, None), (20000.0, Some(it))] {
        let mut payload = json!({
            "name": "E",
            "role": "Staff",
            "salary": salary,
            "joiningDate": "2021-01-01"
        });
        if let Some(department) = department {
            payload["departmentId"] = json!(department);
        }
        api.create_employee(&body(payload));
    }

    let response = api.salary_distribution();
    assert_eq!(response.status, 200);
    assert_eq!(
        response.body,
        Some(json!({ "IT": 70000.0, "Unassigned": 30000.0 }))
    );
}
