//! `Custom::Auth0Client`: applications, with the generated client secret
//! written back to the secret store.

use crate::provider::{
    props::{flag, opt_int, without_nulls},
    Context, HandlerError, Resource, Response,
};
use async_trait::async_trait;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProps {
    pub client_secret_secret_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_uri: Option<String>,
    #[serde(default)]
    pub callbacks: Vec<String>,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default)]
    pub web_origins: Vec<String>,
    #[serde(default)]
    pub client_aliases: Vec<String>,
    #[serde(default)]
    pub client_metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub allowed_clients: Vec<String>,
    #[serde(default)]
    pub allowed_logout_urls: Vec<String>,
    #[serde(default = "default_grant_types")]
    pub grant_types: Vec<String>,
    #[serde(default = "default_token_endpoint_auth_method")]
    pub token_endpoint_auth_method: String,
    #[serde(default)]
    pub app_type: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub is_first_party: bool,
    #[serde(default, deserialize_with = "flag")]
    pub oidc_conformant: bool,
    #[serde(default)]
    pub jwt: Jwt,
    #[serde(default, deserialize_with = "flag")]
    pub sso: bool,
    #[serde(default, deserialize_with = "flag")]
    pub cross_origin_authentication: bool,
    #[serde(default)]
    pub cross_origin_loc: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub sso_disabled: bool,
    #[serde(default, deserialize_with = "flag")]
    pub custom_login_page_on: bool,
    #[serde(default)]
    pub custom_login_page: Option<String>,
    #[serde(default)]
    pub custom_login_page_preview: Option<String>,
    #[serde(default)]
    pub form_template: Option<String>,
    #[serde(default)]
    pub initiate_login_uri: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<RefreshToken>,
    #[serde(default)]
    pub organization_usage: Option<String>,
    #[serde(default)]
    pub organization_require_behavior: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub deletion_protection: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Jwt {
    #[serde(default = "default_alg")]
    pub alg: String,
}

impl Default for Jwt {
    fn default() -> Self {
        Self { alg: default_alg() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshToken {
    #[serde(default = "default_rotation_type")]
    pub rotation_type: String,
    #[serde(default = "default_expiration_type")]
    pub expiration_type: String,
    #[serde(default, deserialize_with = "opt_int")]
    pub leeway: Option<i64>,
    #[serde(default, deserialize_with = "opt_int")]
    pub token_lifetime: Option<i64>,
    #[serde(default, deserialize_with = "flag")]
    pub infinite_token_lifetime: bool,
    #[serde(default, deserialize_with = "opt_int")]
    pub idle_token_lifetime: Option<i64>,
    #[serde(default, deserialize_with = "flag")]
    pub infinite_idle_token_lifetime: bool,
}

fn default_grant_types() -> Vec<String> {
    vec!["implicit".to_string(), "authorization_code".to_string()]
}

fn default_token_endpoint_auth_method() -> String {
    "none".to_string()
}

fn default_alg() -> String {
    "RS256".to_string()
}

fn default_rotation_type() -> String {
    "rotating".to_string()
}

fn default_expiration_type() -> String {
    "expiring".to_string()
}

const DEFAULT_TOKEN_LIFETIME: i64 = 2_592_000;
const DEFAULT_IDLE_TOKEN_LIFETIME: i64 = 604_800;

#[derive(Debug, Deserialize)]
struct ClientRecord {
    client_id: String,
    client_secret: String,
}

/// Request body shared by create and update.
pub(crate) fn body(props: &ClientProps, logical_id: &str) -> Value {
    let name = props
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(logical_id);

    let refresh_token = props.refresh_token.as_ref().map(|token| {
        json!({
            "rotation_type": token.rotation_type,
            "expiration_type": token.expiration_type,
            "leeway": token.leeway.unwrap_or(0),
            "token_lifetime": token.token_lifetime.unwrap_or(DEFAULT_TOKEN_LIFETIME),
            "infinite_token_lifetime": token.infinite_token_lifetime,
            "idle_token_lifetime": token.idle_token_lifetime.unwrap_or(DEFAULT_IDLE_TOKEN_LIFETIME),
            "infinite_idle_token_lifetime": token.infinite_idle_token_lifetime,
        })
    });

    without_nulls(json!({
        "name": name,
        "description": props.description,
        "logo_uri": props.logo_uri,
        "callbacks": props.callbacks,
        "allowed_origins": props.allowed_origins,
        "web_origins": props.web_origins,
        "client_aliases": props.client_aliases,
        "client_metadata": props.client_metadata,
        "allowed_clients": props.allowed_clients,
        "allowed_logout_urls": props.allowed_logout_urls,
        "grant_types": props.grant_types,
        "token_endpoint_auth_method": props.token_endpoint_auth_method,
        "app_type": props.app_type,
        "is_first_party": props.is_first_party,
        "oidc_conformant": props.oidc_conformant,
        "jwt_configuration": { "alg": props.jwt.alg },
        "sso": props.sso,
        "cross_origin_authentication": props.cross_origin_authentication,
        "cross_origin_loc": props.cross_origin_loc,
        "sso_disabled": props.sso_disabled,
        "custom_login_page_on": props.custom_login_page_on,
        "custom_login_page": props.custom_login_page,
        "custom_login_page_preview": props.custom_login_page_preview,
        "form_template": props.form_template,
        "initiate_login_uri": props.initiate_login_uri,
        "refresh_token": refresh_token,
        "organization_usage": props.organization_usage,
        "organization_require_behavior": props.organization_require_behavior,
    }))
}

pub struct Client;

impl Client {
    async fn store_secret(
        ctx: &Context<'_>,
        props: &ClientProps,
        record: ClientRecord,
    ) -> Result<Response, HandlerError> {
        let management = ctx.management().await?;
        let arn = ctx
            .secret_writer()
            .put_secret_string(
                &props.client_secret_secret_name,
                &SecretString::from(record.client_secret),
            )
            .await?;

        Ok(Response::new(record.client_id.clone())
            .with("clientId", record.client_id)
            .with("clientDomain", management.domain())
            .with("clientSecretArn", arn))
    }
}

#[async_trait]
impl Resource for Client {
    const RESOURCE_TYPE: &'static str = "Custom::Auth0Client";
    type Props = ClientProps;

    #[instrument(skip_all)]
    async fn create(&self, ctx: &Context<'_>, props: &ClientProps) -> Result<Response, HandlerError> {
        let management = ctx.management().await?;
        let record: ClientRecord = management
            .post(&["clients"], &body(props, ctx.logical_id()))
            .await?;

        debug!("client {} created", record.client_id);

        Self::store_secret(ctx, props, record).await
    }

    #[instrument(skip_all, fields(client_id = %id))]
    async fn update(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &ClientProps,
        _old: &ClientProps,
    ) -> Result<Response, HandlerError> {
        let management = ctx.management().await?;
        let _: Value = management
            .patch(&["clients", id], &body(props, ctx.logical_id()))
            .await?;
        let record: ClientRecord = management.get(&["clients", id]).await?;

        Self::store_secret(ctx, props, record).await
    }

    #[instrument(skip_all, fields(client_id = %id))]
    async fn delete(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &ClientProps,
    ) -> Result<Response, HandlerError> {
        if props.deletion_protection {
            debug!("client {id} is protected, skipping delete");
            return Ok(Response::new(id));
        }

        ctx.management().await?.delete(&["clients", id]).await?;

        Ok(Response::new(id))
    }
}
