pub mod invoke;
pub mod server;

// Internal "interpreter" for `Action`.
mod run;

use crate::{
    cli::globals::GlobalArgs,
    provider::{Provider, Registry, Services},
    secrets::{ExtensionClient, SecretsManagerWriter},
    APP_USER_AGENT,
};
use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};

#[derive(Debug)]
pub enum Action {
    Server(server::Args),
    Invoke(invoke::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> Result<()> {
        run::execute(self).await
    }
}

/// Wire the provider with every built-in adapter.
///
/// # Errors
/// Returns an error if the HTTP client cannot be built.
pub async fn build_provider(globals: &GlobalArgs) -> Result<Provider> {
    let http = reqwest::Client::builder()
        .user_agent(APP_USER_AGENT)
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;

    let services = Services {
        secrets: ExtensionClient::new(
            http.clone(),
            globals.secrets_extension_url.clone(),
            globals.session_token.clone(),
        ),
        http,
        secret_writer: Arc::new(SecretsManagerWriter::from_env().await),
        poll: globals.poll,
    };

    Ok(Provider::new(Registry::with_defaults(), services))
}
