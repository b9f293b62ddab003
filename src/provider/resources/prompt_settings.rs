use crate::provider::{props::flag, Context, HandlerError, Resource, Response};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

const PHYSICAL_ID: &str = "promptSettings";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSettingsProps {
    #[serde(default = "default_experience")]
    pub universal_login_experience: String,
    #[serde(default, deserialize_with = "flag")]
    pub identifier_first: bool,
    #[serde(default, deserialize_with = "flag")]
    pub webauthn_platform_first_factor: bool,
}

fn default_experience() -> String {
    "new".to_string()
}

pub struct PromptSettings;

impl PromptSettings {
    async fn apply(ctx: &Context<'_>, props: &PromptSettingsProps) -> Result<(), HandlerError> {
        let _: Value = ctx
            .management()
            .await?
            .patch(
                &["prompts"],
                &json!({
                    "universal_login_experience": props.universal_login_experience,
                    "identifier_first": props.identifier_first,
                    "webauthn_platform_first_factor": props.webauthn_platform_first_factor,
                }),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Resource for PromptSettings {
    const RESOURCE_TYPE: &'static str = "Custom::Auth0PromptSettings";
    type Props = PromptSettingsProps;

    #[instrument(skip_all)]
    async fn create(
        &self,
        ctx: &Context<'_>,
        props: &PromptSettingsProps,
    ) -> Result<Response, HandlerError> {
        Self::apply(ctx, props).await?;
        Ok(Response::new(PHYSICAL_ID))
    }

    #[instrument(skip_all)]
    async fn update(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &PromptSettingsProps,
        _old: &PromptSettingsProps,
    ) -> Result<Response, HandlerError> {
        Self::apply(ctx, props).await?;
        Ok(Response::new(id))
    }

    async fn delete(
        &self,
        _ctx: &Context<'_>,
        id: &str,
        _props: &PromptSettingsProps,
    ) -> Result<Response, HandlerError> {
        Ok(Response::new(id))
    }
}
