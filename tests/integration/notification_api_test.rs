//! Integration tests for the notification REST endpoints.

mod helpers;

use std::collections::HashMap;

use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use helpers::{TestApp, create_body};

const BASE: &str = "/api/v1/notifications";

fn ids(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .expect("data is not an array")
        .iter()
        .map(|n| n["id"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_root_and_health() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], json!(true));

    let response = app.request("GET", "/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], json!("ok"));
    assert_eq!(response.body["data"]["ws_clients"], json!(0));
}

#[tokio::test]
async fn test_create_one_record_per_recipient() {
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let hr = Uuid::new_v4();
    let users = HashMap::from([(alice, "Alice".to_string()), (hr, "HR Team".to_string())]);
    let app = TestApp::with_users(users).await;

    let response = app
        .request("POST", BASE, Some(create_body("MANPOWER", &[alice, bob], hr)))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], json!(true));
    let created = response.body["data"].as_array().unwrap();
    assert_eq!(created.len(), 2);
    assert!(created.iter().all(|n| n["read_at"].is_null()));
    assert!(created.iter().all(|n| n.get("deleted_at").is_none()));

    let response = app.request("GET", &format!("{BASE}/user/{alice}"), None).await;
    assert_eq!(response.status, StatusCode::OK);
    let items = response.body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["user_name"], json!("Alice"));
    assert_eq!(items[0]["created_by_name"], json!("HR Team"));

    // Bob is unknown to the user directory.
    let response = app.request("GET", &format!("{BASE}/user/{bob}"), None).await;
    assert_eq!(response.body["data"][0]["user_name"], json!("Unknown"));

    let response = app.request("GET", &format!("{BASE}/all"), None).await;
    assert_eq!(ids(&response.body).len(), 2);
}

#[tokio::test]
async fn test_create_validation() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();

    let response = app
        .request("POST", BASE, Some(create_body("PAYROLL", &[user], user)))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], json!("VALIDATION_ERROR"));
    assert!(
        response.body["message"]
            .as_str()
            .unwrap()
            .contains("application")
    );

    let response = app
        .request("POST", BASE, Some(create_body("MANPOWER", &[], user)))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let mut body = create_body("MANPOWER", &[user], user);
    body["url"] = json!("not a url");
    let response = app.request("POST", BASE, Some(body)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let mut body = create_body("MANPOWER", &[user], user);
    body["created_by"] = json!("nope");
    let response = app.request("POST", BASE, Some(body)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.request("GET", &format!("{BASE}/all"), None).await;
    assert!(ids(&response.body).is_empty());
}

#[tokio::test]
async fn test_list_filters() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let other = Uuid::new_v4();
    let sender = Uuid::new_v4();

    app.request("POST", BASE, Some(create_body("MANPOWER", &[user], sender)))
        .await;
    app.request("POST", BASE, Some(create_body("RECRUITMENT", &[user, other], sender)))
        .await;

    let response = app
        .request("GET", &format!("{BASE}?application=RECRUITMENT"), None)
        .await;
    assert_eq!(ids(&response.body).len(), 2);

    let response = app
        .request(
            "GET",
            &format!("{BASE}?application=RECRUITMENT&user_id={user}"),
            None,
        )
        .await;
    let found = ids(&response.body);
    assert_eq!(found.len(), 1);

    // Mark it read, then split by read state.
    let response = app
        .request(
            "PUT",
            &format!("{BASE}/update"),
            Some(json!({ "id": found[0], "read_at": "2024-06-01T10:00:00Z" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", &format!("{BASE}?user_id={user}&read_at=YES"), None)
        .await;
    assert_eq!(ids(&response.body), found);

    let response = app
        .request("GET", &format!("{BASE}?user_id={user}&read_at=NO"), None)
        .await;
    assert_eq!(ids(&response.body).len(), 1);

    let response = app.request("GET", &format!("{BASE}?read_at=maybe"), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.request("GET", &format!("{BASE}?user_id=xyz"), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_update_delete() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();

    let response = app
        .request("POST", BASE, Some(create_body("ONBOARDING", &[user], user)))
        .await;
    let id = response.body["data"][0]["id"].as_str().unwrap().to_string();

    let response = app.request("GET", &format!("{BASE}/{id}"), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["application"], json!("ONBOARDING"));

    let response = app
        .request(
            "PUT",
            &format!("{BASE}/update"),
            Some(json!({ "id": id, "name": "Welcome pack", "message": "Pick it up at reception" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["name"], json!("Welcome pack"));
    assert_eq!(response.body["data"]["url"], json!("https://hr.example.com/offers/42"));

    let response = app
        .request(
            "PUT",
            &format!("{BASE}/update"),
            Some(json!({ "id": id, "application": "PAYROLL" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "PUT",
            &format!("{BASE}/update"),
            Some(json!({ "id": Uuid::new_v4(), "name": "x" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.request("DELETE", &format!("{BASE}/{id}"), None).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", &format!("{BASE}/{id}"), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], json!("NOT_FOUND"));

    let response = app.request("DELETE", &format!("{BASE}/{id}"), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.request("GET", &format!("{BASE}/not-a-uuid"), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unread_count() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();

    app.request("POST", BASE, Some(create_body("MANPOWER", &[user], user)))
        .await;
    app.request("POST", BASE, Some(create_body("MANPOWER", &[user], user)))
        .await;
    let response = app
        .request("POST", BASE, Some(create_body("RECRUITMENT", &[user], user)))
        .await;
    let recruitment_id = response.body["data"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "GET",
            &format!("{BASE}/unread/count?user_id={user}&application=MANPOWER"),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["count"], json!(2));

    let response = app
        .request("GET", &format!("{BASE}/unread/count?user_id={user}"), None)
        .await;
    assert_eq!(response.body["data"]["count"], json!(3));

    app.request("DELETE", &format!("{BASE}/{recruitment_id}"), None)
        .await;
    let response = app
        .request("GET", &format!("{BASE}/unread/count?user_id={user}"), None)
        .await;
    assert_eq!(response.body["data"]["count"], json!(2));

    let response = app.request("GET", &format!("{BASE}/unread/count"), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
