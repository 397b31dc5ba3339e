//! Integration tests driving the composed application route end to end,
//! cookie handling included.

use devdesk_backend::api::build_app;
use devdesk_backend::services::{SessionService, UserService};
use devdesk_backend::stores::Datastore;
use poem::http::{header, Method, StatusCode};
use poem::{Endpoint, Request, Response};
use serde_json::{json, Value};
use std::sync::Arc;

const ADMIN_EMAIL: &str = "admin@devdesk.local";
const ADMIN_PASSWORD: &str = "admin123";

async fn setup() -> (tempfile::TempDir, impl Endpoint) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Datastore::new(dir.path().join("database.json")));
    store.initialize().await.unwrap();
    UserService::new(store.clone())
        .ensure_admin(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .unwrap();

    let sessions = Arc::new(SessionService::new(
        "test-secret-key-minimum-32-characters-long".to_string(),
        false,
    ));
    (dir, build_app(store, sessions))
}

async fn send(
    app: &impl Endpoint,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri.parse().unwrap());
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(value) => builder
            .content_type("application/json")
            .body(value.to_string()),
        None => builder.finish(),
    };
    app.get_response(request).await
}

async fn body_json(response: Response) -> Value {
    let text = response.into_body().into_string().await.unwrap();
    serde_json::from_str(&text).unwrap()
}

/// Pull the session cookie pair out of a login response.
fn session_cookie(response: &Response) -> String {
    let header = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a cookie")
        .to_str()
        .unwrap();
    assert!(header.starts_with("session-token="));
    header.split(';').next().unwrap().to_string()
}

async fn login(app: &impl Endpoint, email: &str, password: &str) -> String {
    let response = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

/// Create a user through the API and return its id.
async fn create_user(app: &impl Endpoint, admin: &str, email: &str, role: &str) -> String {
    let response = send(
        app,
        Method::POST,
        "/api/users",
        Some(admin),
        Some(json!({
            "name": "Member",
            "email": email,
            "password": "secret123",
            "role": role,
            "department": "Engineering"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["user"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn create_project(app: &impl Endpoint, admin: &str, name: &str) -> String {
    let response = send(
        app,
        Method::POST,
        "/api/projects",
        Some(admin),
        Some(json!({
            "name": name,
            "description": "A system under active development",
            "client": "Acme"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["project"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn login_sets_an_http_only_session_cookie() {
    let (_dir, app) = setup().await;

    let response = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie_header = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie_header.starts_with("session-token="));
    assert!(cookie_header.contains("HttpOnly"));
    assert!(cookie_header.contains("SameSite=Lax"));

    let body = body_json(response).await;
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn login_distinguishes_missing_fields_bad_credentials_and_inactive() {
    let (_dir, app) = setup().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "", "password": "" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": "wrong" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    // A correct password on a deactivated account is forbidden, not
    // unauthenticated.
    let id = create_user(&app, &admin, "inactive@example.com", "developer").await;
    let response = send(
        &app,
        Method::PUT,
        &format!("/api/users/{id}"),
        Some(&admin),
        Some(json!({ "status": "inactive" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "inactive@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn me_echoes_session_claims_and_rejects_anonymous_requests() {
    let (_dir, app) = setup().await;

    let response = send(&app, Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let response = send(&app, Method::GET, "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn logout_replaces_the_cookie_with_an_expired_one() {
    let (_dir, app) = setup().await;
    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = send(&app, Method::POST, "/api/auth/logout", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cleared.starts_with("session-token="));
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn garbage_cookie_is_unauthenticated_not_an_error() {
    let (_dir, app) = setup().await;
    let response = send(
        &app,
        Method::GET,
        "/api/users",
        Some("session-token=not-a-real-token"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_listing_never_exposes_password_hashes() {
    let (_dir, app) = setup().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    create_user(&app, &admin, "dev@example.com", "developer").await;

    let response = send(&app, Method::GET, "/api/users", Some(&admin), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    for user in users {
        assert!(user.get("password").is_none());
    }
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let (_dir, app) = setup().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    create_user(&app, &admin, "dev@example.com", "developer").await;

    let response = send(
        &app,
        Method::POST,
        "/api/users",
        Some(&admin),
        Some(json!({
            "name": "Clone",
            "email": "dev@example.com",
            "password": "secret123",
            "role": "developer",
            "department": "Engineering"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn developers_cannot_manage_users() {
    let (_dir, app) = setup().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    create_user(&app, &admin, "dev@example.com", "developer").await;
    let dev = login(&app, "dev@example.com", "secret123").await;

    let response = send(
        &app,
        Method::POST,
        "/api/users",
        Some(&dev),
        Some(json!({
            "name": "Intruder",
            "email": "x@example.com",
            "password": "secret123",
            "role": "developer",
            "department": "Engineering"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn self_edit_is_allowed_but_role_changes_are_admin_only() {
    let (_dir, app) = setup().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let id = create_user(&app, &admin, "dev@example.com", "developer").await;
    let dev = login(&app, "dev@example.com", "secret123").await;

    let response = send(
        &app,
        Method::PUT,
        &format!("/api/users/{id}"),
        Some(&dev),
        Some(json!({ "department": "Platform" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["user"]["department"], "Platform");

    let response = send(
        &app,
        Method::PUT,
        &format!("/api/users/{id}"),
        Some(&dev),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admins_cannot_delete_themselves() {
    let (_dir, app) = setup().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let me = body_json(send(&app, Method::GET, "/api/auth/me", Some(&admin), None).await).await;
    let my_id = me["user"]["id"].as_str().unwrap();

    let response = send(
        &app,
        Method::DELETE,
        &format!("/api/users/{my_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The account survives the rejected delete.
    let response = send(
        &app,
        Method::GET,
        &format!("/api/users/{my_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn deleting_a_user_requires_the_admin_role() {
    let (_dir, app) = setup().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    create_user(&app, &admin, "boss@example.com", "manager").await;
    let victim = create_user(&app, &admin, "dev@example.com", "developer").await;
    let manager = login(&app, "boss@example.com", "secret123").await;

    let response = send(
        &app,
        Method::DELETE,
        &format!("/api/users/{victim}"),
        Some(&manager),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        Method::DELETE,
        &format!("/api/users/{victim}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        Method::GET,
        &format!("/api/users/{victim}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn developers_only_see_their_assigned_projects() {
    let (_dir, app) = setup().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let dev_id = create_user(&app, &admin, "dev@example.com", "developer").await;
    let visible = create_project(&app, &admin, "Portal").await;
    let hidden = create_project(&app, &admin, "Internal Tooling").await;

    let response = send(
        &app,
        Method::POST,
        &format!("/api/projects/{visible}/assign-users"),
        Some(&admin),
        Some(json!({ "userIds": [dev_id] })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let dev = login(&app, "dev@example.com", "secret123").await;
    let body = body_json(send(&app, Method::GET, "/api/projects", Some(&dev), None).await).await;
    let projects = body["projects"].as_array().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["id"], visible.as_str());

    // Direct fetch of the unassigned project is forbidden, not hidden.
    let response = send(
        &app,
        Method::GET,
        &format!("/api/projects/{hidden}"),
        Some(&dev),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn assign_users_keeps_both_sides_of_the_relation_in_step() {
    let (_dir, app) = setup().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let u1 = create_user(&app, &admin, "u1@example.com", "developer").await;
    let u2 = create_user(&app, &admin, "u2@example.com", "designer").await;
    let project = create_project(&app, &admin, "Portal").await;

    let response = send(
        &app,
        Method::POST,
        &format!("/api/projects/{project}/assign-users"),
        Some(&admin),
        Some(json!({ "userIds": [u1.as_str(), u2.as_str()] })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    for id in [&u1, &u2] {
        let body =
            body_json(send(&app, Method::GET, &format!("/api/users/{id}"), Some(&admin), None).await)
                .await;
        let assigned = body["user"]["assignedProjects"].as_array().unwrap();
        assert!(assigned.iter().any(|p| p == project.as_str()));
        assert_eq!(body["user"]["projectsCount"], 1);
    }

    // Narrowing the assignment removes the mirror entry for the dropped user.
    let response = send(
        &app,
        Method::POST,
        &format!("/api/projects/{project}/assign-users"),
        Some(&admin),
        Some(json!({ "userIds": [u2.as_str()] })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body =
        body_json(send(&app, Method::GET, &format!("/api/users/{u1}"), Some(&admin), None).await)
            .await;
    assert!(body["user"]["assignedProjects"].as_array().unwrap().is_empty());
    assert_eq!(body["user"]["projectsCount"], 0);
}

#[tokio::test]
async fn project_updates_validate_field_lengths() {
    let (_dir, app) = setup().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let project = create_project(&app, &admin, "Portal").await;

    let response = send(
        &app,
        Method::PUT,
        &format!("/api/projects/{project}"),
        Some(&admin),
        Some(json!({ "name": "x" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        Method::PUT,
        &format!("/api/projects/{project}"),
        Some(&admin),
        Some(json!({ "description": "too short" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        Method::PUT,
        &format!("/api/projects/{project}"),
        Some(&admin),
        Some(json!({ "status": "maintenance" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["project"]["status"], "maintenance");
}

#[tokio::test]
async fn comments_are_attributed_to_the_session_user() {
    let (_dir, app) = setup().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let project = create_project(&app, &admin, "Portal").await;

    let response = send(
        &app,
        Method::POST,
        &format!("/api/projects/{project}/comments"),
        Some(&admin),
        Some(json!({ "text": "Kickoff scheduled" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let comments = body["project"]["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["text"], "Kickoff scheduled");
    assert_eq!(comments[0]["author"], "Administrator");

    let comment_id = comments[0]["id"].as_str().unwrap();
    let response = send(
        &app,
        Method::DELETE,
        &format!("/api/projects/{project}/comments/{comment_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["project"]["comments"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn stats_require_a_session_and_report_kpis() {
    let (_dir, app) = setup().await;

    let response = send(&app, Method::GET, "/api/stats", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    create_project(&app, &admin, "Portal").await;

    let body = body_json(send(&app, Method::GET, "/api/stats", Some(&admin), None).await).await;
    assert_eq!(body["kpis"]["totalProjects"], 1);
    assert_eq!(body["kpis"]["activeProjects"], 1);
    assert_eq!(body["kpis"]["usersByRole"]["admin"], 1);
    assert_eq!(body["charts"]["monthlyProjects"].as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn health_reports_the_datastore_without_a_session() {
    let (_dir, app) = setup().await;

    let response = send(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["database"]["exists"].as_bool().unwrap());
    assert_eq!(body["database"]["usersCount"], 1);
    assert_eq!(body["database"]["projectsCount"], 0);
}

#[tokio::test]
async fn error_bodies_carry_the_standard_envelope() {
    let (_dir, app) = setup().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = send(&app, Method::GET, "/api/users/nope", Some(&admin), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["status_code"], 404);
    assert!(body["message"].as_str().unwrap().contains("not found"));
}
