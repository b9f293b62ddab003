use crate::provider::{
    ensure_unchanged,
    props::{flag, without_nulls},
    Context, HandlerError, Resource, Response,
};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationProps {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub branding: Option<OrganizationBranding>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub enabled_connections: Vec<EnabledConnection>,
    #[serde(default, deserialize_with = "flag")]
    pub deletion_protection: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationBranding {
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub colors: Option<OrganizationColors>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationColors {
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub page_background: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnabledConnection {
    pub connection_id: String,
    #[serde(default, deserialize_with = "flag")]
    pub assign_membership_on_login: bool,
    #[serde(default, deserialize_with = "flag")]
    pub show_as_button: bool,
}

// A single connection object is accepted in place of a list.
fn one_or_many<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<EnabledConnection>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<EnabledConnection>),
        One(EnabledConnection),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::Many(list)) => list,
        Some(OneOrMany::One(one)) => vec![one],
        None => Vec::new(),
    })
}

impl OrganizationProps {
    fn name<'a>(&'a self, logical_id: &'a str) -> &'a str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(logical_id)
    }

    fn branding(&self) -> Option<Value> {
        self.branding.as_ref().map(|branding| {
            let colors = branding.colors.as_ref().map(|colors| {
                json!({ "primary": colors.primary, "page_background": colors.page_background })
            });
            json!({ "logo_url": branding.logo_url, "colors": colors })
        })
    }

    fn connections(&self) -> Vec<Value> {
        self.enabled_connections
            .iter()
            .map(|c| {
                json!({
                    "connection_id": c.connection_id,
                    "assign_membership_on_login": c.assign_membership_on_login,
                    "show_as_button": c.show_as_button,
                })
            })
            .collect()
    }
}

#[derive(Deserialize)]
struct OrganizationRecord {
    id: String,
}

fn response(id: &str) -> Response {
    Response::new(id).with("organizationId", id)
}

pub struct Organization;

#[async_trait]
impl Resource for Organization {
    const RESOURCE_TYPE: &'static str = "Custom::Auth0Organization";
    type Props = OrganizationProps;

    #[instrument(skip_all)]
    async fn create(
        &self,
        ctx: &Context<'_>,
        props: &OrganizationProps,
    ) -> Result<Response, HandlerError> {
        let record: OrganizationRecord = ctx
            .management()
            .await?
            .post(
                &["organizations"],
                &without_nulls(json!({
                    "name": props.name(ctx.logical_id()),
                    "display_name": props.display_name,
                    "branding": props.branding(),
                    "metadata": props.metadata,
                    "enabled_connections": props.connections(),
                })),
            )
            .await?;

        Ok(response(&record.id))
    }

    #[instrument(skip_all, fields(organization_id = %id))]
    async fn update(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &OrganizationProps,
        old: &OrganizationProps,
    ) -> Result<Response, HandlerError> {
        ensure_unchanged(
            "Organization",
            "enabledConnections",
            &props.enabled_connections,
            &old.enabled_connections,
        )?;

        let _: Value = ctx
            .management()
            .await?
            .patch(
                &["organizations", id],
                &without_nulls(json!({
                    "name": props.name(ctx.logical_id()),
                    "display_name": props.display_name,
                    "branding": props.branding(),
                    "metadata": props.metadata.clone().unwrap_or_default(),
                })),
            )
            .await?;

        Ok(response(id))
    }

    #[instrument(skip_all, fields(organization_id = %id))]
    async fn delete(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &OrganizationProps,
    ) -> Result<Response, HandlerError> {
        if props.deletion_protection {
            debug!("organization {id} is protected, skipping delete");
            return Ok(Response::new(id));
        }

        ctx.management().await?.delete(&["organizations", id]).await?;

        Ok(Response::new(id))
    }
}
