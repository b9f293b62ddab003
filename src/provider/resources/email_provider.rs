//! `Custom::Auth0EmailProvider`: the tenant's single email provider.
//!
//! Auth0 has separate "configure" (POST) and "update" (PATCH) calls for the
//! provider. Create picks one by reading the current provider: a non-empty
//! name means one is configured already. A 404 means none is.

use crate::provider::{
    props::{opt_int, without_nulls},
    Context, HandlerError, Resource, Response,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

const PHYSICAL_ID: &str = "emailProvider";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailProviderProps {
    pub name: String,
    #[serde(default)]
    pub default_from_address: Option<String>,
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

/// Provider credentials, selected by `credType`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "credType")]
pub enum Credentials {
    #[serde(rename = "apikey", rename_all = "camelCase")]
    ApiKey { api_key: String },
    #[serde(rename = "azure_cs", rename_all = "camelCase")]
    AzureCs { connection_string: String },
    #[serde(rename = "mailgun", rename_all = "camelCase")]
    Mailgun {
        api_key: String,
        domain: String,
        #[serde(default)]
        region: Option<String>,
    },
    #[serde(rename = "ms365", rename_all = "camelCase")]
    Ms365 {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
    #[serde(rename = "ses", rename_all = "camelCase")]
    Ses {
        access_key_id: String,
        secret_access_key: String,
        region: String,
    },
    #[serde(rename = "smtp", rename_all = "camelCase")]
    Smtp {
        smtp_host: Value,
        #[serde(default, deserialize_with = "opt_int")]
        smtp_port: Option<i64>,
        smtp_user: String,
        smtp_password: String,
    },
    #[serde(rename = "sparkpost", rename_all = "camelCase")]
    SparkPost {
        api_key: String,
        #[serde(default)]
        region: Option<String>,
    },
}

impl Credentials {
    /// Shape expected by the Management API.
    fn to_api(&self) -> Value {
        match self {
            Self::ApiKey { api_key } => json!({ "api_key": api_key }),
            Self::AzureCs { connection_string } => {
                json!({ "connectionString": connection_string })
            }
            Self::Mailgun {
                api_key,
                domain,
                region,
            } => json!({ "api_key": api_key, "domain": domain, "region": region }),
            Self::Ms365 {
                tenant_id,
                client_id,
                client_secret,
            } => json!({
                "tenantId": tenant_id,
                "clientId": client_id,
                "clientSecret": client_secret,
            }),
            Self::Ses {
                access_key_id,
                secret_access_key,
                region,
            } => json!({
                "accessKeyId": access_key_id,
                "secretAccessKey": secret_access_key,
                "region": region,
            }),
            Self::Smtp {
                smtp_host,
                smtp_port,
                smtp_user,
                smtp_password,
            } => json!({
                "smtp_host": smtp_host,
                "smtp_port": smtp_port,
                "smtp_user": smtp_user,
                "smtp_pass": smtp_password,
            }),
            Self::SparkPost { api_key, region } => {
                json!({ "api_key": api_key, "region": region })
            }
        }
    }
}

impl EmailProviderProps {
    fn body(&self) -> Value {
        let credentials = self.credentials.as_ref().map(Credentials::to_api);

        let mut body = without_nulls(json!({
            "name": self.name,
            "enabled": true,
            "default_from_address": self.default_from_address,
        }));
        // kept verbatim: mailgun and sparkpost send an explicit null region
        if let Some(credentials) = credentials {
            body["credentials"] = credentials;
        }
        body
    }
}

#[derive(Debug, Default, Deserialize)]
struct CurrentProvider {
    #[serde(default)]
    name: Option<String>,
}

impl CurrentProvider {
    fn is_configured(&self) -> bool {
        self.name.as_deref().is_some_and(|name| !name.trim().is_empty())
    }
}

fn response(props: &EmailProviderProps, id: &str) -> Response {
    Response::new(id).with("emailProviderName", props.name.clone())
}

pub struct EmailProvider;

#[async_trait]
impl Resource for EmailProvider {
    const RESOURCE_TYPE: &'static str = "Custom::Auth0EmailProvider";
    type Props = EmailProviderProps;

    #[instrument(skip_all, fields(provider = %props.name))]
    async fn create(
        &self,
        ctx: &Context<'_>,
        props: &EmailProviderProps,
    ) -> Result<Response, HandlerError> {
        let management = ctx.management().await?;

        let current = match management.get::<CurrentProvider>(&["emails", "provider"]).await {
            Ok(current) => current,
            Err(err) if err.status() == Some(404) => CurrentProvider::default(),
            Err(err) => return Err(err.into()),
        };

        let body = props.body();
        let _: Value = if current.is_configured() {
            debug!("email provider already configured, updating");
            management.patch(&["emails", "provider"], &body).await?
        } else {
            debug!("no email provider configured, configuring");
            management.post(&["emails", "provider"], &body).await?
        };

        Ok(response(props, PHYSICAL_ID))
    }

    #[instrument(skip_all, fields(provider = %props.name))]
    async fn update(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &EmailProviderProps,
        _old: &EmailProviderProps,
    ) -> Result<Response, HandlerError> {
        let _: Value = ctx
            .management()
            .await?
            .patch(&["emails", "provider"], &props.body())
            .await?;

        Ok(response(props, id))
    }

    #[instrument(skip_all)]
    async fn delete(
        &self,
        ctx: &Context<'_>,
        id: &str,
        _props: &EmailProviderProps,
    ) -> Result<Response, HandlerError> {
        let _: Value = ctx
            .management()
            .await?
            .patch(&["emails", "provider"], &json!({ "enabled": false }))
            .await?;

        Ok(Response::new(id))
    }
}
