#![allow(dead_code, clippy::unwrap_used)]

use auth0_provider::{
    provider::{Event, PollPolicy, Provider, Registry, Services},
    secrets::{ExtensionClient, MemorySecretWriter},
};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const SECRET_NAME: &str = "auth0/api";

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

pub fn fast_poll() -> PollPolicy {
    PollPolicy {
        initial_interval: Duration::from_millis(1),
        max_interval: Duration::from_millis(4),
        timeout: Duration::from_secs(5),
    }
}

/// One mock server standing in for the secrets side-car, the token endpoint
/// and the Management API of the tenant it advertises.
pub struct Tenant {
    pub server: MockServer,
    pub writer: Arc<MemorySecretWriter>,
    pub provider: Arc<Provider>,
}

impl Tenant {
    pub async fn start() -> Self {
        Self::with_poll(fast_poll()).await
    }

    pub async fn with_poll(poll: PollPolicy) -> Self {
        let server = MockServer::start().await;

        let credentials = json!({
            "domain": server.uri(),
            "clientId": "provider-client",
            "clientSecret": "provider-secret",
        });

        Mock::given(method("GET"))
            .and(path("/secretsmanager/get"))
            .and(query_param("secretId", SECRET_NAME))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Name": SECRET_NAME,
                "SecretString": credentials.to_string(),
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "mgmt-token",
                "token_type": "Bearer",
            })))
            .mount(&server)
            .await;

        let writer = Arc::new(MemorySecretWriter::new());
        let http = reqwest::Client::new();
        let services = Services {
            secrets: ExtensionClient::new(
                http.clone(),
                server.uri(),
                SecretString::from("session".to_string()),
            ),
            http,
            secret_writer: writer.clone(),
            poll,
        };

        Self {
            server,
            writer,
            provider: Arc::new(Provider::new(Registry::with_defaults(), services)),
        }
    }

    /// Requests that reached the server, side-car and token calls included.
    pub async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// `METHOD /path` of every Management API request, in arrival order.
    pub async fn api_calls(&self) -> Vec<String> {
        self.requests()
            .await
            .iter()
            .filter(|r| r.url.path().starts_with("/api/v2/"))
            .map(|r| format!("{} {}", r.method, r.url.path()))
            .collect()
    }
}

pub fn with_secret(mut properties: Value) -> Value {
    properties["secretName"] = json!(SECRET_NAME);
    properties
}

pub fn create(resource_type: &str, properties: Value) -> Event {
    serde_json::from_value(json!({
        "RequestType": "Create",
        "ResourceType": resource_type,
        "LogicalResourceId": "Resource",
        "ResourceProperties": with_secret(properties),
    }))
    .unwrap()
}

pub fn update(resource_type: &str, id: &str, properties: Value, old: Value) -> Event {
    serde_json::from_value(json!({
        "RequestType": "Update",
        "ResourceType": resource_type,
        "LogicalResourceId": "Resource",
        "PhysicalResourceId": id,
        "ResourceProperties": with_secret(properties),
        "OldResourceProperties": with_secret(old),
    }))
    .unwrap()
}

pub fn delete(resource_type: &str, id: &str, properties: Value) -> Event {
    serde_json::from_value(json!({
        "RequestType": "Delete",
        "ResourceType": resource_type,
        "LogicalResourceId": "Resource",
        "PhysicalResourceId": id,
        "ResourceProperties": with_secret(properties),
    }))
    .unwrap()
}
