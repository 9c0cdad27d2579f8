mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{peru, TestApp};

fn creds(username: &str, password: &str) -> serde_json::Value {
    json!({ "username": username, "password": password })
}

#[tokio::test]
async fn signup_login_logout() {
    let app = TestApp::new().await;

    let signup = app.post("/signup", creds("alice", "secret")).await;
    assert_eq!(signup.status, StatusCode::OK);
    assert_eq!(signup.body["username"], "alice");
    assert!(signup.body["id"].as_i64().unwrap() > 0);

    let login = app.post("/login", creds("alice", "secret")).await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body, json!({ "message": "Logged in" }));
    let cookie = login.cookie.expect("session cookie");

    let logout = app.call(Method::POST, "/logout", None, Some(&cookie)).await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.body, json!({ "message": "Logged out" }));
}

#[tokio::test]
async fn signup_never_returns_the_hash() {
    let app = TestApp::new().await;

    let signup = app.post("/signup", creds("alice", "secret")).await;
    let keys: Vec<&str> = signup
        .body
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["id", "username"]);
}

#[tokio::test]
async fn duplicate_username_conflicts_and_keeps_original() {
    let app = TestApp::new().await;
    let first = app.post("/signup", creds("alice", "secret")).await;

    let dup = app.post("/signup", creds("alice", "other")).await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);
    assert_eq!(dup.body, json!({ "detail": "Username already registered" }));

    // the original password still works and the new one does not
    let ok = app.post("/login", creds("alice", "secret")).await;
    assert_eq!(ok.status, StatusCode::OK);
    let me = app
        .call(Method::GET, "/me", None, ok.cookie.as_deref())
        .await;
    assert_eq!(me.body, first.body);
    let bad = app.post("/login", creds("alice", "other")).await;
    assert_eq!(bad.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_looks_like_unknown_user() {
    let app = TestApp::new().await;
    app.post("/signup", creds("alice", "secret")).await;

    let wrong = app.post("/login", creds("alice", "wrong")).await;
    let unknown = app.post("/login", creds("mallory", "secret")).await;

    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status, unknown.status);
    assert_eq!(wrong.body, json!({ "detail": "Invalid credentials" }));
    assert_eq!(wrong.body, unknown.body);
    assert!(wrong.cookie.is_none());
    assert!(unknown.cookie.is_none());
}

#[tokio::test]
async fn signup_requires_both_fields() {
    let app = TestApp::new().await;

    let resp = app.post("/signup", json!({ "username": "alice" })).await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(resp.body["detail"][0]["loc"], json!(["body", "password"]));
}

#[tokio::test]
async fn me_follows_the_session_lifecycle() {
    let app = TestApp::new().await;

    let anonymous = app.get("/me").await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.body, json!({ "detail": "Not authenticated" }));

    let cookie = app.login_as("alice", "secret").await;
    let me = app.call(Method::GET, "/me", None, Some(&cookie)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["username"], "alice");

    app.call(Method::POST, "/logout", None, Some(&cookie)).await;
    let after = app.call(Method::GET, "/me", None, Some(&cookie)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn failed_login_keeps_existing_session() {
    let app = TestApp::new().await;
    let cookie = app.login_as("alice", "secret").await;
    app.post("/signup", creds("bob", "hunter2")).await;

    let failed = app
        .call(Method::POST, "/login", Some(creds("bob", "nope")), Some(&cookie))
        .await;
    assert_eq!(failed.status, StatusCode::UNAUTHORIZED);

    let me = app.call(Method::GET, "/me", None, Some(&cookie)).await;
    assert_eq!(me.body["username"], "alice");
}

#[tokio::test]
async fn login_rotates_the_session_id() {
    let app = TestApp::new().await;
    let first = app.login_as("alice", "secret").await;

    let again = app
        .call(Method::POST, "/login", Some(creds("alice", "secret")), Some(&first))
        .await;
    let second = again.cookie.expect("new session cookie");
    assert_ne!(first, second);

    let me = app.call(Method::GET, "/me", None, Some(&second)).await;
    assert_eq!(me.body["username"], "alice");
    let stale = app.call(Method::GET, "/me", None, Some(&first)).await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_without_session_succeeds() {
    let app = TestApp::new().await;

    let resp = app.call(Method::POST, "/logout", None, None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, json!({ "message": "Logged out" }));
}

#[tokio::test]
async fn end_to_end_scenario() {
    let app = TestApp::new().await;

    let signup = app.post("/signup", creds("alice", "secret")).await;
    assert_eq!(signup.status, StatusCode::OK);
    assert_eq!(signup.body, json!({ "id": 1, "username": "alice" }));

    let login = app.post("/login", creds("alice", "secret")).await;
    assert_eq!(login.status, StatusCode::OK);
    let cookie = login.cookie.expect("session cookie");

    let created = app
        .call(Method::POST, "/countries", Some(peru()), Some(&cookie))
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.body["id"], 1);

    let fetched = app.get("/countries/1").await;
    assert_eq!(fetched.body, created.body);

    assert_eq!(app.delete("/countries/1").await.status, StatusCode::OK);
    assert_eq!(app.get("/countries/1").await.status, StatusCode::NOT_FOUND);
}
