//! Minimal Auth0 Management API v2 client.
//!
//! Only what the resource adapters need: a client-credentials token exchange and
//! JSON verbs against `/api/v2/...` paths built from raw segments.

mod error;

pub use error::ApiError;

use crate::secrets::ApiCredentials;
use error::error_message;
use reqwest::{Client, Method};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info_span, instrument, Instrument};
use url::Url;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// An authenticated Management API session for one tenant.
pub struct ManagementClient {
    http: Client,
    domain: String,
    base_url: Url,
    token: SecretString,
}

impl ManagementClient {
    /// Tenant base URL. Bare domains get `https://`; explicit schemes are kept.
    ///
    /// # Errors
    /// Returns an error if the result is not a valid base URL.
    pub fn base_url(domain: &str) -> Result<Url, ApiError> {
        let invalid = |message: &str| ApiError::InvalidDomain {
            domain: domain.to_string(),
            message: message.to_string(),
        };

        let trimmed = domain.trim();
        let (scheme, authority) = ["http://", "https://"]
            .iter()
            .find_map(|scheme| {
                trimmed
                    .strip_prefix(scheme)
                    .map(|rest| (scheme.trim_end_matches("://"), rest))
            })
            .unwrap_or(("https", trimmed));
        let authority = authority.trim_end_matches('/');

        // An empty host or a dangling port separator ("https:") is never a tenant.
        if authority.is_empty() || authority.ends_with(':') {
            return Err(invalid("no host specified"));
        }

        let candidate = format!("{scheme}://{authority}");

        let url = Url::parse(&candidate).map_err(|e| invalid(&e.to_string()))?;

        if url.host_str().is_none() || url.cannot_be_a_base() {
            return Err(invalid("no host specified"));
        }

        Ok(url)
    }

    /// Exchange the stored client credentials for a Management API token.
    ///
    /// # Errors
    /// Returns an error if the domain is invalid or the token endpoint rejects the credentials.
    #[instrument(skip(http, credentials), fields(domain = %credentials.domain))]
    pub async fn connect(http: &Client, credentials: &ApiCredentials) -> Result<Self, ApiError> {
        let base_url = Self::base_url(&credentials.domain)?;
        let audience = api_audience(&base_url);
        let token_url = join(&base_url, &["oauth", "token"], &credentials.domain)?;

        let payload = json!({
            "grant_type": "client_credentials",
            "client_id": credentials.client_id,
            "client_secret": credentials.client_secret.expose_secret(),
            "audience": audience,
        });

        let span = info_span!("auth0.token", http.method = "POST", url = %token_url);
        let response = http
            .post(token_url)
            .json(&payload)
            .send()
            .instrument(span)
            .await
            .map_err(|e| ApiError::Token {
                domain: credentials.domain.clone(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            return Err(ApiError::Token {
                domain: credentials.domain.clone(),
                message: format!("{status}, {}", error_message(&body)),
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| ApiError::Token {
            domain: credentials.domain.clone(),
            message: e.to_string(),
        })?;

        debug!("management API token issued for {}", credentials.domain);

        Ok(Self {
            http: http.clone(),
            domain: credentials.domain.clone(),
            base_url,
            token: SecretString::from(token.access_token),
        })
    }

    /// Tenant domain exactly as stored in the API secret.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Audience of the Management API itself (`https://{domain}/api/v2/`).
    #[must_use]
    pub fn api_audience(&self) -> String {
        api_audience(&self.base_url)
    }

    /// Build `/api/v2/{segments...}`; each segment is percent-encoded.
    ///
    /// # Errors
    /// Returns an error if the base URL cannot carry a path.
    pub fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut full = Vec::with_capacity(segments.len() + 2);
        full.extend(["api", "v2"]);
        full.extend_from_slice(segments);
        join(&self.base_url, &full, &self.domain)
    }

    /// # Errors
    /// Returns an error on transport failure, non-success status, or an undecodable body.
    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.url(segments)?;
        self.send(Method::GET, url, None::<&()>).await
    }

    /// # Errors
    /// Returns an error on transport failure, non-success status, or an undecodable body.
    pub async fn post<B, T>(&self, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(segments)?;
        self.send(Method::POST, url, Some(body)).await
    }

    /// # Errors
    /// Returns an error on transport failure, non-success status, or an undecodable body.
    pub async fn patch<B, T>(&self, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(segments)?;
        self.send(Method::PATCH, url, Some(body)).await
    }

    /// # Errors
    /// Returns an error on transport failure or non-success status.
    pub async fn delete(&self, segments: &[&str]) -> Result<(), ApiError> {
        let url = self.url(segments)?;
        self.send::<(), Value>(Method::DELETE, url, None)
            .await
            .map(|_| ())
    }

    /// Send one request and decode the JSON answer. Empty bodies decode as `null`.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status, or an undecodable body.
    pub async fn send<B, T>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let path = url.path().to_string();
        let span = info_span!(
            "auth0.request",
            http.method = %method,
            http.path = %path
        );

        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(self.token.expose_secret());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response =
            request
                .send()
                .instrument(span)
                .await
                .map_err(|source| ApiError::Transport {
                    method: method.to_string(),
                    path: path.clone(),
                    source,
                })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| ApiError::Transport {
                method: method.to_string(),
                path: path.clone(),
                source,
            })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                method: method.to_string(),
                path,
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let text = if text.trim().is_empty() { "null" } else { text.as_str() };

        serde_json::from_str(text).map_err(|source| ApiError::Decode {
            method: method.to_string(),
            path,
            source,
        })
    }
}

impl std::fmt::Debug for ManagementClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagementClient")
            .field("domain", &self.domain)
            .field("base_url", &self.base_url.as_str())
            .field("token", &"***")
            .finish_non_exhaustive()
    }
}

fn api_audience(base_url: &Url) -> String {
    format!("{}/api/v2/", base_url.as_str().trim_end_matches('/'))
}

fn join(base_url: &Url, segments: &[&str], domain: &str) -> Result<Url, ApiError> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|()| ApiError::InvalidDomain {
            domain: domain.to_string(),
            message: "URL cannot carry a path".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{bearer_token, body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        std::net::TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn credentials(domain: &str) -> ApiCredentials {
        ApiCredentials {
            domain: domain.to_string(),
            client_id: "cid".to_string(),
            client_secret: SecretString::from("csecret".to_string()),
        }
    }

    #[test]
    fn base_url_adds_https_to_bare_domain() {
        let url = ManagementClient::base_url("tenant.eu.auth0.com").unwrap();
        assert_eq!(url.as_str(), "https://tenant.eu.auth0.com/");
        assert_eq!(api_audience(&url), "https://tenant.eu.auth0.com/api/v2/");
    }

    #[test]
    fn base_url_keeps_explicit_scheme() {
        let url = ManagementClient::base_url("http://127.0.0.1:8080/").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn base_url_rejects_garbage() {
        for domain in ["https://", "https:", "http:///", "", "  "] {
            let err = ManagementClient::base_url(domain).unwrap_err();
            assert!(
                matches!(err, ApiError::InvalidDomain { .. }),
                "{domain:?}: {err}"
            );
        }
    }

    #[test]
    fn base_url_trims_trailing_slashes_after_scheme() {
        let url = ManagementClient::base_url(" https://tenant.auth0.com// ").unwrap();
        assert_eq!(url.as_str(), "https://tenant.auth0.com/");
    }

    #[test]
    fn join_encodes_segments() {
        let base = ManagementClient::base_url("tenant.auth0.com").unwrap();
        let url = join(&base, &["api", "v2", "clients", "a/b c"], "tenant.auth0.com").unwrap();
        assert_eq!(url.path(), "/api/v2/clients/a%2Fb%20c");
    }

    #[tokio::test]
    async fn connect_exchanges_client_credentials() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        let audience = format!("{}/api/v2/", server.uri());

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_json(json!({
                "grant_type": "client_credentials",
                "client_id": "cid",
                "client_secret": "csecret",
                "audience": audience,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "mgmt-token",
                "token_type": "Bearer",
                "expires_in": 86400
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v2/roles/rol_1"))
            .and(bearer_token("mgmt-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": "rol_1", "name": "admin" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ManagementClient::connect(&Client::new(), &credentials(&server.uri()))
            .await
            .unwrap();
        assert_eq!(client.api_audience(), audience);

        let role: Value = client.get(&["roles", "rol_1"]).await.unwrap();
        assert_eq!(role["name"], "admin");
    }

    #[tokio::test]
    async fn connect_reports_rejected_credentials() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "access_denied",
                "error_description": "Unauthorized"
            })))
            .mount(&server)
            .await;

        let err = ManagementClient::connect(&Client::new(), &credentials(&server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Token { .. }));
        assert!(err.to_string().contains("Unauthorized"));
    }

    #[tokio::test]
    async fn send_propagates_status_and_decodes_empty_body() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "access_token": "t" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v2/roles/rol_1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/v2/roles/rol_2"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "statusCode": 404,
                "error": "Not Found",
                "message": "The role does not exist."
            })))
            .mount(&server)
            .await;

        let client = ManagementClient::connect(&Client::new(), &credentials(&server.uri()))
            .await
            .unwrap();

        client.delete(&["roles", "rol_1"]).await.unwrap();

        let err = client
            .patch::<_, Value>(&["roles", "rol_2"], &json!({ "name": "x" }))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("The role does not exist."));
    }
}
