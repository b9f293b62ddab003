use crate::provider::{
    props::{flag, without_nulls},
    Context, HandlerError, Resource, Response,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleProps {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub deletion_protection: bool,
}

impl RoleProps {
    fn body(&self, logical_id: &str) -> Value {
        let name = self
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(logical_id);
        without_nulls(json!({ "name": name, "description": self.description }))
    }
}

#[derive(Deserialize)]
struct RoleRecord {
    id: String,
    name: String,
}

impl From<RoleRecord> for Response {
    fn from(role: RoleRecord) -> Self {
        Self::new(role.id.clone())
            .with("roleId", role.id)
            .with("roleName", role.name)
    }
}

pub struct Role;

#[async_trait]
impl Resource for Role {
    const RESOURCE_TYPE: &'static str = "Custom::Auth0Role";
    type Props = RoleProps;

    #[instrument(skip_all)]
    async fn create(&self, ctx: &Context<'_>, props: &RoleProps) -> Result<Response, HandlerError> {
        let role: RoleRecord = ctx
            .management()
            .await?
            .post(&["roles"], &props.body(ctx.logical_id()))
            .await?;

        Ok(role.into())
    }

    #[instrument(skip_all, fields(role_id = %id))]
    async fn update(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &RoleProps,
        _old: &RoleProps,
    ) -> Result<Response, HandlerError> {
        let role: RoleRecord = ctx
            .management()
            .await?
            .patch(&["roles", id], &props.body(ctx.logical_id()))
            .await?;

        Ok(role.into())
    }

    #[instrument(skip_all, fields(role_id = %id))]
    async fn delete(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &RoleProps,
    ) -> Result<Response, HandlerError> {
        if props.deletion_protection {
            debug!("role {id} is protected, skipping delete");
            return Ok(Response::new(id));
        }

        ctx.management().await?.delete(&["roles", id]).await?;

        Ok(Response::new(id))
    }
}
