use crate::provider::{ensure_unchanged, Context, HandlerError, Resource, Response};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientGrantProps {
    #[serde(alias = "clinetId")]
    pub client_id: String,
    /// Resource server identifier; the Management API itself when absent.
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub scope: Vec<String>,
}

#[derive(Deserialize)]
struct Grant {
    id: String,
}

pub struct ClientGrant;

fn response(id: &str) -> Response {
    Response::new(id).with("clientGrantId", id)
}

#[async_trait]
impl Resource for ClientGrant {
    const RESOURCE_TYPE: &'static str = "Custom::Auth0ClientGrant";
    type Props = ClientGrantProps;

    #[instrument(skip_all, fields(client_id = %props.client_id))]
    async fn create(
        &self,
        ctx: &Context<'_>,
        props: &ClientGrantProps,
    ) -> Result<Response, HandlerError> {
        let management = ctx.management().await?;
        let audience = props
            .audience
            .clone()
            .filter(|audience| !audience.is_empty())
            .unwrap_or_else(|| management.api_audience());

        let grant: Grant = management
            .post(
                &["client-grants"],
                &json!({
                    "client_id": props.client_id,
                    "audience": audience,
                    "scope": props.scope,
                }),
            )
            .await?;

        Ok(response(&grant.id))
    }

    #[instrument(skip_all, fields(grant_id = %id))]
    async fn update(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &ClientGrantProps,
        old: &ClientGrantProps,
    ) -> Result<Response, HandlerError> {
        ensure_unchanged("ClientGrant", "clientId", &props.client_id, &old.client_id)?;
        ensure_unchanged("ClientGrant", "audience", &props.audience, &old.audience)?;

        let _: Value = ctx
            .management()
            .await?
            .patch(&["client-grants", id], &json!({ "scope": props.scope }))
            .await?;

        Ok(response(id))
    }

    #[instrument(skip_all, fields(grant_id = %id))]
    async fn delete(
        &self,
        ctx: &Context<'_>,
        id: &str,
        _props: &ClientGrantProps,
    ) -> Result<Response, HandlerError> {
        ctx.management().await?.delete(&["client-grants", id]).await?;

        Ok(Response::new(id))
    }
}
