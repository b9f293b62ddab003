use crate::provider::{ensure_unchanged, Context, HandlerError, Resource, Response};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TriggerProps {
    /// Trigger id, e.g. `post-login`.
    pub id: String,
    /// Action ids, bound in this order.
    #[serde(default)]
    pub actions: Vec<String>,
}

/// Binding list for `PATCH /actions/triggers/{id}/bindings`, in input order.
#[must_use]
pub fn bindings(actions: &[String]) -> Vec<Value> {
    actions
        .iter()
        .map(|action| json!({ "ref": { "type": "action_id", "value": action } }))
        .collect()
}

pub struct Trigger;

impl Trigger {
    async fn bind(ctx: &Context<'_>, props: &TriggerProps) -> Result<Response, HandlerError> {
        let _: Value = ctx
            .management()
            .await?
            .patch(
                &["actions", "triggers", &props.id, "bindings"],
                &json!({ "bindings": bindings(&props.actions) }),
            )
            .await?;

        Ok(Response::new(props.id.clone())
            .with("triggerId", props.id.clone())
            .with("bindingCount", props.actions.len()))
    }
}

#[async_trait]
impl Resource for Trigger {
    const RESOURCE_TYPE: &'static str = "Custom::Auth0Trigger";
    type Props = TriggerProps;

    #[instrument(skip_all, fields(trigger = %props.id))]
    async fn create(&self, ctx: &Context<'_>, props: &TriggerProps) -> Result<Response, HandlerError> {
        Self::bind(ctx, props).await
    }

    #[instrument(skip_all, fields(trigger = %props.id))]
    async fn update(
        &self,
        ctx: &Context<'_>,
        _id: &str,
        props: &TriggerProps,
        old: &TriggerProps,
    ) -> Result<Response, HandlerError> {
        ensure_unchanged("Trigger", "id", &props.id, &old.id)?;
        Self::bind(ctx, props).await
    }

    // Bindings are left in place.
    async fn delete(
        &self,
        _ctx: &Context<'_>,
        id: &str,
        _props: &TriggerProps,
    ) -> Result<Response, HandlerError> {
        Ok(Response::new(id))
    }
}
