use super::{poll::PollPolicy, Event, HandlerError};
use crate::{
    management::ManagementClient,
    secrets::{ExtensionClient, SecretWriter},
};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Process-wide collaborators shared by every invocation.
#[derive(Clone)]
pub struct Services {
    pub http: Client,
    pub secrets: ExtensionClient,
    pub secret_writer: Arc<dyn SecretWriter>,
    pub poll: PollPolicy,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("secrets", &self.secrets)
            .field("poll", &self.poll)
            .finish_non_exhaustive()
    }
}

/// Per-invocation state handed to resource adapters.
///
/// The Management API session is opened on first use, so an invocation that
/// fails validation or has nothing to do never touches the secret store.
pub struct Context<'a> {
    pub services: &'a Services,
    pub event: &'a Event,
    management: OnceCell<ManagementClient>,
}

impl<'a> Context<'a> {
    #[must_use]
    pub fn new(services: &'a Services, event: &'a Event) -> Self {
        Self {
            services,
            event,
            management: OnceCell::new(),
        }
    }

    /// Name of the credential secret carried by every declaration.
    ///
    /// # Errors
    /// Returns `InvalidProperties` if `secretName` is missing or not a string.
    pub fn secret_name(&self) -> Result<&'a str, HandlerError> {
        self.event
            .resource_properties
            .get("secretName")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| HandlerError::invalid("secretName is required"))
    }

    /// Authenticated Management API client, created on first call.
    ///
    /// # Errors
    /// Returns an error if the credentials cannot be fetched or exchanged.
    pub async fn management(&self) -> Result<&ManagementClient, HandlerError> {
        self.management
            .get_or_try_init(|| async {
                let secret_name = self.secret_name()?;
                let credentials = self.services.secrets.api_credentials(secret_name).await?;
                let client =
                    ManagementClient::connect(&self.services.http, &credentials).await?;
                Ok::<_, HandlerError>(client)
            })
            .await
    }

    #[must_use]
    pub fn logical_id(&self) -> &'a str {
        &self.event.logical_resource_id
    }

    #[must_use]
    pub const fn poll_policy(&self) -> PollPolicy {
        self.services.poll
    }

    #[must_use]
    pub fn secret_writer(&self) -> &dyn SecretWriter {
        self.services.secret_writer.as_ref()
    }
}
