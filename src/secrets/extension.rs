use super::SecretError;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info_span, instrument, Instrument};

/// Default listen port of the parameters and secrets side-car.
pub const DEFAULT_EXTENSION_PORT: u16 = 2773;

const SESSION_TOKEN_HEADER: &str = "X-Aws-Parameters-Secrets-Token";

/// Management API credentials stored in the API secret.
#[derive(Clone)]
pub struct ApiCredentials {
    pub domain: String,
    pub client_id: String,
    pub client_secret: SecretString,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCredentials {
    domain: String,
    client_id: String,
    client_secret: String,
}

#[derive(Deserialize)]
struct SecretValue {
    #[serde(rename = "SecretString")]
    secret_string: String,
}

/// HTTP client for the local secrets side-car.
#[derive(Clone)]
pub struct ExtensionClient {
    http: Client,
    base_url: String,
    session_token: SecretString,
}

impl ExtensionClient {
    #[must_use]
    pub fn new(http: Client, base_url: impl Into<String>, session_token: SecretString) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_token,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Read the raw `SecretString` of a secret.
    ///
    /// # Errors
    /// Returns an error if the side-car is unreachable, answers with a non-success
    /// status, or the answer has no `SecretString`.
    #[instrument(skip(self))]
    pub async fn secret_string(&self, name: &str) -> Result<SecretString, SecretError> {
        let url = format!("{}/secretsmanager/get", self.base_url);

        let span = info_span!("secrets.get", http.method = "GET", url = %url);
        let response = self
            .http
            .get(&url)
            .query(&[("secretId", name)])
            .header(SESSION_TOKEN_HEADER, self.session_token.expose_secret())
            .send()
            .instrument(span)
            .await
            .map_err(|source| SecretError::Transport {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            return Err(SecretError::Status {
                name: name.to_string(),
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| SecretError::Transport { url, source })?;

        let value: SecretValue =
            serde_json::from_str(&body).map_err(|source| SecretError::Decode {
                name: name.to_string(),
                source,
            })?;

        debug!("secret {} fetched", name);

        Ok(SecretString::from(value.secret_string))
    }

    /// Read and decode the Management API credentials stored in `name`.
    ///
    /// # Errors
    /// Returns an error if the secret cannot be read or is not
    /// `{"domain", "clientId", "clientSecret"}` JSON.
    pub async fn api_credentials(&self, name: &str) -> Result<ApiCredentials, SecretError> {
        let secret = self.secret_string(name).await?;

        let raw: RawCredentials =
            serde_json::from_str(secret.expose_secret()).map_err(|source| {
                SecretError::Decode {
                    name: name.to_string(),
                    source,
                }
            })?;

        Ok(ApiCredentials {
            domain: raw.domain,
            client_id: raw.client_id,
            client_secret: SecretString::from(raw.client_secret),
        })
    }
}

impl std::fmt::Debug for ExtensionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionClient")
            .field("base_url", &self.base_url)
            .field("session_token", &"***")
            .finish_non_exhaustive()
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .or_else(|| json.get("Message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
