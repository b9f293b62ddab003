use crate::provider::{
    ensure_unchanged,
    props::{flag, opt_int, without_nulls},
    Context, HandlerError, Resource, Response,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceServerProps {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub scopes: Vec<Scope>,
    #[serde(default = "default_signing_alg")]
    pub signing_alg: String,
    #[serde(default)]
    pub signing_secret: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub allow_offline_access: bool,
    #[serde(default, deserialize_with = "opt_int")]
    pub token_lifetime: Option<i64>,
    #[serde(default = "default_token_dialect")]
    pub token_dialect: String,
    #[serde(default, deserialize_with = "flag")]
    pub skip_consent_for_verifiable_first_party_clients: bool,
    #[serde(default, deserialize_with = "flag")]
    pub enforce_policies: bool,
    #[serde(default, deserialize_with = "flag")]
    pub deletion_protection: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Scope {
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_signing_alg() -> String {
    "RS256".to_string()
}

fn default_token_dialect() -> String {
    "access_token".to_string()
}

const DEFAULT_TOKEN_LIFETIME: i64 = 86_400;

impl ResourceServerProps {
    fn identifier<'a>(&'a self, logical_id: &'a str) -> &'a str {
        self.identifier
            .as_deref()
            .filter(|i| !i.is_empty())
            .unwrap_or(logical_id)
    }

    fn body(&self, logical_id: &str) -> Value {
        let name = self
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(logical_id);
        let scopes: Vec<Value> = self
            .scopes
            .iter()
            .map(|s| json!({ "value": s.value, "description": s.description }))
            .collect();

        without_nulls(json!({
            "name": name,
            "scopes": scopes,
            "signing_alg": self.signing_alg,
            "signing_secret": self.signing_secret,
            "allow_offline_access": self.allow_offline_access,
            "token_lifetime": self.token_lifetime.unwrap_or(DEFAULT_TOKEN_LIFETIME),
            "token_dialect": self.token_dialect,
            "skip_consent_for_verifiable_first_party_clients":
                self.skip_consent_for_verifiable_first_party_clients,
            "enforce_policies": self.enforce_policies,
        }))
    }
}

#[derive(Deserialize)]
struct ServerRecord {
    id: String,
    identifier: String,
}

pub struct ResourceServer;

#[async_trait]
impl Resource for ResourceServer {
    const RESOURCE_TYPE: &'static str = "Custom::Auth0ResourceServer";
    type Props = ResourceServerProps;

    #[instrument(skip_all)]
    async fn create(
        &self,
        ctx: &Context<'_>,
        props: &ResourceServerProps,
    ) -> Result<Response, HandlerError> {
        let mut body = props.body(ctx.logical_id());
        body["identifier"] = json!(props.identifier(ctx.logical_id()));

        let record: ServerRecord = ctx
            .management()
            .await?
            .post(&["resource-servers"], &body)
            .await?;

        Ok(Response::new(record.id.clone())
            .with("resourceServerId", record.id)
            .with("resourceServerIdentifier", record.identifier))
    }

    #[instrument(skip_all, fields(resource_server_id = %id))]
    async fn update(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &ResourceServerProps,
        old: &ResourceServerProps,
    ) -> Result<Response, HandlerError> {
        ensure_unchanged(
            "ResourceServer",
            "identifier",
            props.identifier(ctx.logical_id()),
            old.identifier(ctx.logical_id()),
        )?;

        let record: ServerRecord = ctx
            .management()
            .await?
            .patch(&["resource-servers", id], &props.body(ctx.logical_id()))
            .await?;

        Ok(Response::new(id)
            .with("resourceServerId", id)
            .with("resourceServerIdentifier", record.identifier))
    }

    #[instrument(skip_all, fields(resource_server_id = %id))]
    async fn delete(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &ResourceServerProps,
    ) -> Result<Response, HandlerError> {
        if props.deletion_protection {
            debug!("resource server {id} is protected, skipping delete");
            return Ok(Response::new(id));
        }

        ctx.management()
            .await?
            .delete(&["resource-servers", id])
            .await?;

        Ok(Response::new(id))
    }
}
