#![allow(clippy::unwrap_used)]

mod common;

use auth0_provider::provider::{resources::trigger::bindings, HandlerError, PollPolicy};
use common::{can_bind_localhost, create, delete, update, Tenant};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{bearer_token, body_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const ACTION: &str = "Custom::Auth0Action";

fn action_props() -> serde_json::Value {
    json!({
        "name": "add-claims",
        "code": "exports.onExecutePostLogin = async () => {};",
        "supportedTriggers": [{ "id": "post-login", "version": "v3" }]
    })
}

async fn mount_action_status(tenant: &Tenant, status: &str, times: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path("/api/v2/actions/actions/act_1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "act_1", "status": status })),
        );
    match times {
        Some(n) => mock.up_to_n_times(n).mount(&tenant.server).await,
        None => mock.mount(&tenant.server).await,
    }
}

#[tokio::test]
async fn action_deploys_only_once_built() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let tenant = Tenant::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/actions/actions"))
        .and(bearer_token("mgmt-token"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "id": "act_1", "status": "pending" })),
        )
        .expect(1)
        .mount(&tenant.server)
        .await;
    mount_action_status(&tenant, "pending", Some(1)).await;
    mount_action_status(&tenant, "building", Some(2)).await;
    mount_action_status(&tenant, "built", None).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/actions/actions/act_1/deploy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "ver_1" })))
        .expect(1)
        .mount(&tenant.server)
        .await;

    let response = tenant
        .provider
        .handle(&create(ACTION, action_props()))
        .await
        .unwrap();

    assert_eq!(response.physical_resource_id, "act_1");
    assert_eq!(response.data["actionId"], "act_1");
    assert_eq!(
        tenant.api_calls().await,
        vec![
            "POST /api/v2/actions/actions",
            "GET /api/v2/actions/actions/act_1",
            "GET /api/v2/actions/actions/act_1",
            "GET /api/v2/actions/actions/act_1",
            "GET /api/v2/actions/actions/act_1",
            "POST /api/v2/actions/actions/act_1/deploy",
        ]
    );
}

#[tokio::test]
async fn action_build_wait_is_bounded() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let tenant = Tenant::with_poll(PollPolicy {
        initial_interval: Duration::from_millis(5),
        max_interval: Duration::from_millis(10),
        timeout: Duration::from_millis(60),
    })
    .await;

    Mock::given(method("PATCH"))
        .and(path("/api/v2/actions/actions/act_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "act_1" })))
        .mount(&tenant.server)
        .await;
    mount_action_status(&tenant, "failed", None).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/actions/actions/act_1/deploy"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&tenant.server)
        .await;

    let err = tenant
        .provider
        .handle(&update(ACTION, "act_1", action_props(), action_props()))
        .await
        .unwrap_err();

    assert!(
        matches!(&err, HandlerError::ActionBuildTimeout { action_id, .. } if action_id == "act_1"),
        "{err}"
    );
}

#[tokio::test]
async fn action_delete_forces_removal_of_bound_actions() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let tenant = Tenant::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v2/actions/actions/act_1"))
        .and(query_param("force", "true"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&tenant.server)
        .await;

    let response = tenant
        .provider
        .handle(&delete(ACTION, "act_1", action_props()))
        .await
        .unwrap();
    assert_eq!(response.physical_resource_id, "act_1");
}

#[tokio::test]
async fn trigger_bindings_keep_declared_order() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }

    for count in [0_usize, 1, 4] {
        let tenant = Tenant::start().await;
        let actions: Vec<String> = (0..count).rev().map(|i| format!("act_{i}")).collect();

        Mock::given(method("PATCH"))
            .and(path("/api/v2/actions/triggers/post-login/bindings"))
            .and(body_json(json!({ "bindings": bindings(&actions) })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "bindings": [] })))
            .expect(1)
            .mount(&tenant.server)
            .await;

        let response = tenant
            .provider
            .handle(&create(
                "Custom::Auth0Trigger",
                json!({ "id": "post-login", "actions": actions }),
            ))
            .await
            .unwrap();

        assert_eq!(response.physical_resource_id, "post-login");
        assert_eq!(response.data["bindingCount"], count);

        let sent: serde_json::Value = tenant
            .requests()
            .await
            .iter()
            .find(|r| r.url.path().ends_with("/bindings"))
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .unwrap();
        let refs: Vec<_> = sent["bindings"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["ref"]["value"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(refs, actions);
    }
}

#[tokio::test]
async fn email_provider_create_configures_when_missing() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }

    let not_configured = [
        ResponseTemplate::new(404).set_body_json(json!({
            "statusCode": 404,
            "message": "There is not an email provider configured."
        })),
        ResponseTemplate::new(200).set_body_json(json!({ "name": "" })),
    ];

    for current in not_configured {
        let tenant = Tenant::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/emails/provider"))
            .respond_with(current)
            .mount(&tenant.server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v2/emails/provider"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "name": "mailgun" })))
            .expect(1)
            .mount(&tenant.server)
            .await;

        let response = tenant
            .provider
            .handle(&create(
                "Custom::Auth0EmailProvider",
                json!({
                    "name": "mailgun",
                    "credentials": { "credType": "mailgun", "apiKey": "k", "domain": "mg.example.com" }
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.physical_resource_id, "emailProvider");
        assert_eq!(response.data["emailProviderName"], "mailgun");
        assert_eq!(
            tenant.api_calls().await,
            vec!["GET /api/v2/emails/provider", "POST /api/v2/emails/provider"]
        );
    }
}

#[tokio::test]
async fn email_provider_create_updates_when_configured() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let tenant = Tenant::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/emails/provider"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "ses" })))
        .mount(&tenant.server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v2/emails/provider"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "mailgun" })))
        .expect(1)
        .mount(&tenant.server)
        .await;

    tenant
        .provider
        .handle(&create(
            "Custom::Auth0EmailProvider",
            json!({ "name": "mailgun", "credentials": { "credType": "apikey", "apiKey": "k" } }),
        ))
        .await
        .unwrap();

    assert_eq!(
        tenant.api_calls().await,
        vec!["GET /api/v2/emails/provider", "PATCH /api/v2/emails/provider"]
    );
}

#[tokio::test]
async fn email_provider_lookup_errors_are_not_treated_as_missing() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let tenant = Tenant::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/emails/provider"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "statusCode": 403,
            "message": "Insufficient scope, expected any of: read:email_provider"
        })))
        .mount(&tenant.server)
        .await;

    let err = tenant
        .provider
        .handle(&create("Custom::Auth0EmailProvider", json!({ "name": "ses" })))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "RemoteApiError");
    assert!(err.to_string().contains("Insufficient scope"));
    assert_eq!(tenant.api_calls().await, vec!["GET /api/v2/emails/provider"]);
}

#[tokio::test]
async fn email_provider_delete_disables_it() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let tenant = Tenant::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v2/emails/provider"))
        .and(body_json(json!({ "enabled": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "mailgun" })))
        .expect(1)
        .mount(&tenant.server)
        .await;

    let response = tenant
        .provider
        .handle(&delete(
            "Custom::Auth0EmailProvider",
            "emailProvider",
            json!({ "name": "mailgun" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.physical_resource_id, "emailProvider");
    assert_eq!(
        tenant.api_calls().await,
        vec!["PATCH /api/v2/emails/provider"]
    );
}

#[tokio::test]
async fn role_permissions_delete_removes_every_page() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let tenant = Tenant::start().await;

    let permission = |i: usize| {
        json!({
            "resource_server_identifier": "https://api.example.com",
            "permission_name": format!("scope:{i}"),
        })
    };
    // Listed records carry extra fields that must not be echoed back.
    let listed = |range: std::ops::Range<usize>| {
        range
            .map(|i| {
                let mut p = permission(i);
                p["resource_server_name"] = json!("API");
                p["description"] = json!("listed");
                p
            })
            .collect::<Vec<_>>()
    };

    Mock::given(method("GET"))
        .and(path("/api/v2/roles/rol_1/permissions"))
        .and(query_param("per_page", "100"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listed(0..100)))
        .expect(1)
        .mount(&tenant.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/roles/rol_1/permissions"))
        .and(query_param("per_page", "100"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listed(100..101)))
        .expect(1)
        .mount(&tenant.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v2/roles/rol_1/permissions"))
        .and(body_json(json!({
            "permissions": (0..101).map(permission).collect::<Vec<_>>()
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&tenant.server)
        .await;

    let response = tenant
        .provider
        .handle(&delete(
            "Custom::Auth0RolePermissions",
            "rol_1",
            json!({ "roleId": "rol_1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.physical_resource_id, "rol_1");
    assert_eq!(
        tenant.api_calls().await,
        vec![
            "GET /api/v2/roles/rol_1/permissions",
            "GET /api/v2/roles/rol_1/permissions",
            "DELETE /api/v2/roles/rol_1/permissions",
        ]
    );
}

#[tokio::test]
async fn role_permissions_delete_of_empty_role_only_lists() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let tenant = Tenant::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/roles/rol_1/permissions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&tenant.server)
        .await;

    tenant
        .provider
        .handle(&delete(
            "Custom::Auth0RolePermissions",
            "rol_1",
            json!({ "roleId": "rol_1" }),
        ))
        .await
        .unwrap();

    assert_eq!(
        tenant.api_calls().await,
        vec!["GET /api/v2/roles/rol_1/permissions"]
    );
}

#[tokio::test]
async fn role_permissions_update_replaces_the_set() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let tenant = Tenant::start().await;

    let read = json!({ "resourceServerIdentifier": "https://api.example.com", "permissionName": "read:users" });
    let write = json!({ "resourceServerIdentifier": "https://api.example.com", "permissionName": "write:users" });

    Mock::given(method("DELETE"))
        .and(path("/api/v2/roles/rol_1/permissions"))
        .and(body_json(json!({ "permissions": [{
            "resource_server_identifier": "https://api.example.com",
            "permission_name": "read:users"
        }] })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&tenant.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/roles/rol_1/permissions"))
        .and(body_json(json!({ "permissions": [{
            "resource_server_identifier": "https://api.example.com",
            "permission_name": "write:users"
        }] })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&tenant.server)
        .await;

    let response = tenant
        .provider
        .handle(&update(
            "Custom::Auth0RolePermissions",
            "rol_1",
            json!({ "roleId": "rol_1", "permissions": [write] }),
            json!({ "roleId": "rol_1", "permissions": [read] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.physical_resource_id, "rol_1");
    assert_eq!(
        tenant.api_calls().await,
        vec![
            "DELETE /api/v2/roles/rol_1/permissions",
            "POST /api/v2/roles/rol_1/permissions",
        ]
    );
}

#[tokio::test]
async fn credential_fetch_failure_aborts_before_any_mutation() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let tenant = Tenant::start().await;

    let mut event = create("Custom::Auth0Role", json!({ "name": "admin" }));
    event
        .resource_properties
        .insert("secretName".to_string(), json!("missing/secret"));

    let err = tenant.provider.handle(&event).await.unwrap_err();
    assert_eq!(err.kind(), "SecretFetchError");
    assert!(tenant.api_calls().await.is_empty());
}
