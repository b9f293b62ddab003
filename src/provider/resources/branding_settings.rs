use crate::provider::{
    props::{opt_number, without_nulls},
    Context, HandlerError, Resource, Response,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

const PHYSICAL_ID: &str = "brandingSettings";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandingSettingsProps {
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub favicon_url: Option<String>,
    #[serde(default)]
    pub colors: Option<BrandingColors>,
    #[serde(default)]
    pub font_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandingColors {
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub page_background: Option<PageBackground>,
}

/// A plain color or a gradient.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PageBackground {
    Color(String),
    Gradient(Gradient),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradient {
    #[serde(default = "default_gradient_type")]
    pub background_type: String,
    pub start: String,
    pub end: String,
    #[serde(default, deserialize_with = "opt_number")]
    pub angle_deg: Option<f64>,
}

fn default_gradient_type() -> String {
    "linear-gradient".to_string()
}

impl BrandingSettingsProps {
    fn body(&self) -> Value {
        let colors = self.colors.as_ref().map(|colors| {
            let page_background = colors.page_background.as_ref().map(|bg| match bg {
                PageBackground::Color(color) => json!(color),
                PageBackground::Gradient(g) => json!({
                    "type": g.background_type,
                    "start": g.start,
                    "end": g.end,
                    "angle_deg": g.angle_deg,
                }),
            });
            json!({ "primary": colors.primary, "page_background": page_background })
        });

        without_nulls(json!({
            "logo_url": self.logo_url,
            "favicon_url": self.favicon_url,
            "colors": colors,
            "font": self.font_url.as_ref().map(|url| json!({ "url": url })),
        }))
    }
}

pub struct BrandingSettings;

impl BrandingSettings {
    async fn apply(ctx: &Context<'_>, props: &BrandingSettingsProps) -> Result<(), HandlerError> {
        let _: Value = ctx
            .management()
            .await?
            .patch(&["branding"], &props.body())
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Resource for BrandingSettings {
    const RESOURCE_TYPE: &'static str = "Custom::Auth0BrandingSettings";
    type Props = BrandingSettingsProps;

    #[instrument(skip_all)]
    async fn create(
        &self,
        ctx: &Context<'_>,
        props: &BrandingSettingsProps,
    ) -> Result<Response, HandlerError> {
        Self::apply(ctx, props).await?;
        Ok(Response::new(PHYSICAL_ID))
    }

    #[instrument(skip_all)]
    async fn update(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &BrandingSettingsProps,
        _old: &BrandingSettingsProps,
    ) -> Result<Response, HandlerError> {
        Self::apply(ctx, props).await?;
        Ok(Response::new(id))
    }

    // Tenant branding cannot be removed, only left as is.
    async fn delete(
        &self,
        _ctx: &Context<'_>,
        id: &str,
        _props: &BrandingSettingsProps,
    ) -> Result<Response, HandlerError> {
        Ok(Response::new(id))
    }
}
