#![allow(clippy::unwrap_used)]

mod common;

use auth0_provider::api;
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request, StatusCode},
    response::Response,
};
use common::{can_bind_localhost, create, update, Tenant};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn post_event(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/events")
        .header(CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_build_and_resource_types() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let tenant = Tenant::start().await;

    let response = api::router(tenant.provider.clone())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let x_app = response.headers().get("X-App").unwrap().to_str().unwrap();
    assert!(x_app.starts_with(concat!(
        env!("CARGO_PKG_NAME"),
        ":",
        env!("CARGO_PKG_VERSION"),
        ":"
    )));
    assert!(response.headers().contains_key("x-request-id"));

    let body = json_body(response).await;
    assert_eq!(body["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(body["resourceTypes"].as_array().unwrap().len(), 15);
}

#[tokio::test]
async fn request_id_is_propagated() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let tenant = Tenant::start().await;

    let response = api::router(tenant.provider.clone())
        .oneshot(
            Request::get("/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-123");
}

#[tokio::test]
async fn event_is_applied() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let tenant = Tenant::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/roles"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "rol_1", "name": "admin" })),
        )
        .expect(1)
        .mount(&tenant.server)
        .await;

    let event = create("Custom::Auth0Role", json!({ "name": "admin" }));
    let response = api::router(tenant.provider.clone())
        .oneshot(post_event(serde_json::to_vec(&event).unwrap()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "PhysicalResourceId": "rol_1",
            "Data": { "roleId": "rol_1", "roleName": "admin" }
        })
    );
}

#[tokio::test]
async fn failures_map_to_status_and_kind() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let tenant = Tenant::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v2/roles/rol_1"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "statusCode": 429,
            "error": "Too Many Requests",
            "message": "Global limit has been reached"
        })))
        .mount(&tenant.server)
        .await;

    let mut unsupported = create("Custom::Auth0Role", json!({}));
    unsupported.request_type = "Rollback".to_string().into();
    let mut unknown = create("Custom::Auth0Role", json!({}));
    unknown.resource_type = "Custom::Auth0Hook".to_string();

    let cases = [
        (unsupported, StatusCode::BAD_REQUEST, "UnsupportedRequestType"),
        (unknown, StatusCode::NOT_FOUND, "UnknownResourceType"),
        (
            update(
                "Custom::Auth0Connection",
                "con_1",
                json!({ "name": "b" }),
                json!({ "name": "a" }),
            ),
            StatusCode::CONFLICT,
            "ImmutableFieldChanged",
        ),
        (
            create("Custom::Auth0ClientGrant", json!({ "scope": [] })),
            StatusCode::UNPROCESSABLE_ENTITY,
            "InvalidProperties",
        ),
        (
            update(
                "Custom::Auth0Role",
                "rol_1",
                json!({ "name": "admin" }),
                json!({ "name": "admin" }),
            ),
            StatusCode::BAD_GATEWAY,
            "RemoteApiError",
        ),
    ];

    for (event, status, kind) in cases {
        let response = api::router(tenant.provider.clone())
            .oneshot(post_event(serde_json::to_vec(&event).unwrap()))
            .await
            .unwrap();

        assert_eq!(response.status(), status, "{kind}");
        let body = json_body(response).await;
        assert_eq!(body["kind"], kind);
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    }
}

#[tokio::test]
async fn upstream_message_is_passed_through() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let tenant = Tenant::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/roles"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "statusCode": 409,
            "error": "Conflict",
            "message": "Role name already exists"
        })))
        .mount(&tenant.server)
        .await;

    let event = create("Custom::Auth0Role", json!({ "name": "admin" }));
    let response = api::router(tenant.provider.clone())
        .oneshot(post_event(serde_json::to_vec(&event).unwrap()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "RemoteApiError");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .ends_with("409, Role name already exists"));
}

#[tokio::test]
async fn malformed_event_is_a_bad_request() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let tenant = Tenant::start().await;

    let response = api::router(tenant.provider.clone())
        .oneshot(post_event(r#"{"RequestType": "Create"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["kind"], "InvalidEvent");
    assert!(tenant.requests().await.is_empty());
}

#[tokio::test]
async fn openapi_document_is_served() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let tenant = Tenant::start().await;

    let response = api::router(tenant.provider.clone())
        .oneshot(
            Request::get("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let doc = json_body(response).await;
    assert_eq!(doc["info"]["title"], env!("CARGO_PKG_NAME"));
    assert!(doc["paths"]["/events"]["post"].is_object());
}
