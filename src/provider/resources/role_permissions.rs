//! `Custom::Auth0RolePermissions`: the permission set attached to a role.
//!
//! The physical id is the role id. Update replaces the whole set (old
//! permissions removed, new ones added); delete strips whatever the role
//! currently holds.

use crate::provider::{ensure_unchanged, Context, HandlerError, Resource, Response};
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

/// Auth0 caps list pages at 100 entries.
const PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissionsProps {
    pub role_id: String,
    #[serde(default)]
    pub permissions: Vec<PermissionProps>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionProps {
    pub resource_server_identifier: String,
    pub permission_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Permission {
    resource_server_identifier: String,
    permission_name: String,
}

impl From<&PermissionProps> for Permission {
    fn from(p: &PermissionProps) -> Self {
        Self {
            resource_server_identifier: p.resource_server_identifier.clone(),
            permission_name: p.permission_name.clone(),
        }
    }
}

fn permissions(props: &RolePermissionsProps) -> Vec<Permission> {
    props.permissions.iter().map(Permission::from).collect()
}

fn response(role_id: &str, permissions: &[Permission]) -> Result<Response, HandlerError> {
    let listed = serde_json::to_value(permissions).map_err(HandlerError::invalid)?;
    Ok(Response::new(role_id)
        .with("roleId", role_id)
        .with("permissions", listed))
}

async fn add(ctx: &Context<'_>, role_id: &str, set: &[Permission]) -> Result<(), HandlerError> {
    if set.is_empty() {
        return Ok(());
    }
    let _: Value = ctx
        .management()
        .await?
        .post(&["roles", role_id, "permissions"], &json!({ "permissions": set }))
        .await?;
    Ok(())
}

async fn remove(ctx: &Context<'_>, role_id: &str, set: &[Permission]) -> Result<(), HandlerError> {
    if set.is_empty() {
        return Ok(());
    }
    let management = ctx.management().await?;
    let url = management.url(&["roles", role_id, "permissions"])?;
    let _: Value = management
        .send(Method::DELETE, url, Some(&json!({ "permissions": set })))
        .await?;
    Ok(())
}

/// Every permission the role holds, read page by page until a short page.
async fn current_permissions(
    ctx: &Context<'_>,
    role_id: &str,
) -> Result<Vec<Permission>, HandlerError> {
    let management = ctx.management().await?;
    let mut current = Vec::new();

    for page in 0.. {
        let mut url = management.url(&["roles", role_id, "permissions"])?;
        url.query_pairs_mut()
            .append_pair("per_page", &PAGE_SIZE.to_string())
            .append_pair("page", &page.to_string());

        let batch: Vec<Permission> = management.send(Method::GET, url, None::<&()>).await?;
        let last = batch.len() < PAGE_SIZE;
        current.extend(batch);
        if last {
            break;
        }
    }

    Ok(current)
}

pub struct RolePermissions;

#[async_trait]
impl Resource for RolePermissions {
    const RESOURCE_TYPE: &'static str = "Custom::Auth0RolePermissions";
    type Props = RolePermissionsProps;

    #[instrument(skip_all, fields(role_id = %props.role_id))]
    async fn create(
        &self,
        ctx: &Context<'_>,
        props: &RolePermissionsProps,
    ) -> Result<Response, HandlerError> {
        let set = permissions(props);
        add(ctx, &props.role_id, &set).await?;

        response(&props.role_id, &set)
    }

    #[instrument(skip_all, fields(role_id = %id))]
    async fn update(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &RolePermissionsProps,
        old: &RolePermissionsProps,
    ) -> Result<Response, HandlerError> {
        ensure_unchanged("RolePermissions", "roleId", &props.role_id, &old.role_id)?;

        let set = permissions(props);
        remove(ctx, id, &permissions(old)).await?;
        add(ctx, id, &set).await?;

        response(id, &set)
    }

    #[instrument(skip_all, fields(role_id = %id))]
    async fn delete(
        &self,
        ctx: &Context<'_>,
        id: &str,
        _props: &RolePermissionsProps,
    ) -> Result<Response, HandlerError> {
        let current = current_permissions(ctx, id).await?;
        debug!("removing {} permissions from role {id}", current.len());
        remove(ctx, id, &current).await?;

        Ok(Response::new(id))
    }
}
