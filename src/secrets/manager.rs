use super::SecretError;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use secrecy::{ExposeSecret, SecretString};
use std::{collections::HashMap, sync::Mutex};
use tracing::{debug, instrument};

/// Destination for secrets generated by Auth0 (client secrets).
#[async_trait]
pub trait SecretWriter: Send + Sync {
    /// Store `value` as the current version of secret `name` and return its ARN.
    async fn put_secret_string(&self, name: &str, value: &SecretString)
        -> Result<String, SecretError>;
}

/// Writes secrets with the AWS Secrets Manager `UpdateSecret` call.
#[derive(Debug, Clone)]
pub struct SecretsManagerWriter {
    client: aws_sdk_secretsmanager::Client,
}

impl SecretsManagerWriter {
    #[must_use]
    pub const fn new(client: aws_sdk_secretsmanager::Client) -> Self {
        Self { client }
    }

    /// Build a writer from the ambient AWS configuration (env, profile, IMDS).
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::new(aws_sdk_secretsmanager::Client::new(&config))
    }
}

#[async_trait]
impl SecretWriter for SecretsManagerWriter {
    #[instrument(skip(self, value))]
    async fn put_secret_string(
        &self,
        name: &str,
        value: &SecretString,
    ) -> Result<String, SecretError> {
        let output = self
            .client
            .update_secret()
            .secret_id(name)
            .secret_string(value.expose_secret())
            .send()
            .await
            .map_err(|e| SecretError::Write {
                name: name.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let arn = output.arn().ok_or_else(|| SecretError::Write {
            name: name.to_string(),
            message: "UpdateSecret returned no ARN".to_string(),
        })?;

        debug!("secret {} updated", name);

        Ok(arn.to_string())
    }
}

/// Keeps secrets in process memory; used for local runs and tests.
#[derive(Debug, Default)]
pub struct MemorySecretWriter {
    secrets: Mutex<HashMap<String, String>>,
}

impl MemorySecretWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn arn_for(name: &str) -> String {
        format!("arn:aws:secretsmanager:local:000000000000:secret:{name}")
    }

    /// Current value of `name`, if written.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.secrets
            .lock()
            .ok()
            .and_then(|secrets| secrets.get(name).cloned())
    }
}

#[async_trait]
impl SecretWriter for MemorySecretWriter {
    async fn put_secret_string(
        &self,
        name: &str,
        value: &SecretString,
    ) -> Result<String, SecretError> {
        let mut secrets = self.secrets.lock().map_err(|_| SecretError::Write {
            name: name.to_string(),
            message: "secret map poisoned".to_string(),
        })?;
        secrets.insert(name.to_string(), value.expose_secret().to_string());

        Ok(Self::arn_for(name))
    }
}
