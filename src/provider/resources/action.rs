//! `Custom::Auth0Action`: code actions.
//!
//! Auth0 builds an action asynchronously after create or update. The adapter
//! polls the action until its status is exactly `built`, then deploys it. The
//! wait is bounded by the configured [`PollPolicy`](crate::provider::PollPolicy).

use crate::provider::{
    poll::{poll_until, PollOutcome},
    props::without_nulls,
    Context, HandlerError, Resource, Response,
};
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

const BUILT: &str = "built";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionProps {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub supported_triggers: Vec<SupportedTrigger>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub secrets: Vec<ActionSecret>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub registry_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SupportedTrigger {
    pub id: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActionSecret {
    pub name: String,
    pub value: String,
}

impl ActionProps {
    fn body(&self) -> Value {
        let dependencies: Vec<Value> = self
            .dependencies
            .iter()
            .map(|d| json!({ "name": d.name, "version": d.version, "registry_url": d.registry_url }))
            .collect();
        let triggers: Vec<Value> = self
            .supported_triggers
            .iter()
            .map(|t| json!({ "id": t.id, "version": t.version }))
            .collect();
        let secrets: Vec<Value> = self
            .secrets
            .iter()
            .map(|s| json!({ "name": s.name, "value": s.value }))
            .collect();

        without_nulls(json!({
            "name": self.name,
            "code": self.code,
            "dependencies": dependencies,
            "supported_triggers": triggers,
            "runtime": self.runtime,
            "secrets": secrets,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct ActionRecord {
    id: String,
    #[serde(default)]
    status: Option<String>,
}

fn response(id: &str) -> Response {
    Response::new(id).with("actionId", id)
}

pub struct Action;

impl Action {
    /// Wait for the build to finish, then deploy.
    #[instrument(skip(ctx))]
    async fn build_and_deploy(ctx: &Context<'_>, id: &str) -> Result<(), HandlerError> {
        let management = ctx.management().await?;

        let outcome = poll_until(ctx.poll_policy(), move || async move {
            let action: ActionRecord = management.get(&["actions", "actions", id]).await?;
            debug!("action {id} status {:?}", action.status);
            Ok::<_, HandlerError>(action.status.as_deref() == Some(BUILT))
        })
        .await?;

        match outcome {
            PollOutcome::Ready { attempts } => {
                info!("action {id} built after {attempts} checks");
            }
            PollOutcome::TimedOut { waited, .. } => {
                return Err(HandlerError::ActionBuildTimeout {
                    action_id: id.to_string(),
                    waited,
                });
            }
        }

        let _: Value = management
            .post(&["actions", "actions", id, "deploy"], &json!({}))
            .await?;

        Ok(())
    }
}

#[async_trait]
impl Resource for Action {
    const RESOURCE_TYPE: &'static str = "Custom::Auth0Action";
    type Props = ActionProps;

    #[instrument(skip_all, fields(name = %props.name))]
    async fn create(&self, ctx: &Context<'_>, props: &ActionProps) -> Result<Response, HandlerError> {
        let action: ActionRecord = ctx
            .management()
            .await?
            .post(&["actions", "actions"], &props.body())
            .await?;

        Self::build_and_deploy(ctx, &action.id).await?;

        Ok(response(&action.id))
    }

    #[instrument(skip_all, fields(action_id = %id))]
    async fn update(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &ActionProps,
        _old: &ActionProps,
    ) -> Result<Response, HandlerError> {
        let _: Value = ctx
            .management()
            .await?
            .patch(&["actions", "actions", id], &props.body())
            .await?;

        Self::build_and_deploy(ctx, id).await?;

        Ok(response(id))
    }

    #[instrument(skip_all, fields(action_id = %id))]
    async fn delete(
        &self,
        ctx: &Context<'_>,
        id: &str,
        _props: &ActionProps,
    ) -> Result<Response, HandlerError> {
        let management = ctx.management().await?;
        let mut url = management.url(&["actions", "actions", id])?;
        url.query_pairs_mut().append_pair("force", "true");

        let _: Value = management.send(Method::DELETE, url, None::<&()>).await?;

        Ok(Response::new(id))
    }
}
