use crate::provider::{
    ensure_unchanged, props::flag, Context, HandlerError, Resource, Response,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProps {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default)]
    pub enabled_clients: Vec<String>,
    #[serde(default, deserialize_with = "flag")]
    pub is_domain_connection: bool,
    #[serde(default, deserialize_with = "flag")]
    pub disable_signup: bool,
    #[serde(default, deserialize_with = "flag")]
    pub deletion_protection: bool,
}

fn default_strategy() -> String {
    "auth0".to_string()
}

fn or_logical<'a>(value: Option<&'a str>, logical_id: &'a str) -> &'a str {
    value.filter(|v| !v.is_empty()).unwrap_or(logical_id)
}

#[derive(Deserialize)]
struct ConnectionRecord {
    id: String,
    name: String,
}

pub struct Connection;

#[async_trait]
impl Resource for Connection {
    const RESOURCE_TYPE: &'static str = "Custom::Auth0Connection";
    type Props = ConnectionProps;

    #[instrument(skip_all, fields(strategy = %props.strategy))]
    async fn create(
        &self,
        ctx: &Context<'_>,
        props: &ConnectionProps,
    ) -> Result<Response, HandlerError> {
        let logical_id = ctx.logical_id();
        let record: ConnectionRecord = ctx
            .management()
            .await?
            .post(
                &["connections"],
                &json!({
                    "name": or_logical(props.name.as_deref(), logical_id),
                    "display_name": or_logical(props.display_name.as_deref(), logical_id),
                    "strategy": props.strategy,
                    "enabled_clients": props.enabled_clients,
                    "is_domain_connection": props.is_domain_connection,
                    "options": { "disable_signup": props.disable_signup },
                }),
            )
            .await?;

        Ok(Response::new(record.id.clone())
            .with("connectionId", record.id)
            .with("connectionName", record.name))
    }

    #[instrument(skip_all, fields(connection_id = %id))]
    async fn update(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &ConnectionProps,
        old: &ConnectionProps,
    ) -> Result<Response, HandlerError> {
        ensure_unchanged("Connection", "name", &props.name, &old.name)?;
        ensure_unchanged("Connection", "strategy", &props.strategy, &old.strategy)?;

        let record: ConnectionRecord = ctx
            .management()
            .await?
            .patch(
                &["connections", id],
                &json!({
                    "display_name": or_logical(props.display_name.as_deref(), ctx.logical_id()),
                    "enabled_clients": props.enabled_clients,
                    "is_domain_connection": props.is_domain_connection,
                    "options": { "disable_signup": props.disable_signup },
                }),
            )
            .await?;

        Ok(Response::new(id)
            .with("connectionId", id)
            .with("connectionName", record.name))
    }

    #[instrument(skip_all, fields(connection_id = %id))]
    async fn delete(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &ConnectionProps,
    ) -> Result<Response, HandlerError> {
        if props.deletion_protection {
            debug!("connection {id} is protected, skipping delete");
            return Ok(Response::new(id));
        }

        ctx.management().await?.delete(&["connections", id]).await?;

        Ok(Response::new(id))
    }
}
