//! `Custom::Auth0BrandingTheme`: Universal Login theme.
//!
//! Every field has a default matching the stock Auth0 theme, so an empty
//! declaration produces a complete, valid theme.

use crate::provider::{
    props::{flag, number},
    Context, HandlerError, Resource, Response,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandingThemeProps {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub colors: ThemeColors,
    #[serde(default)]
    pub fonts: ThemeFonts,
    #[serde(default)]
    pub borders: ThemeBorders,
    #[serde(default)]
    pub widget: ThemeWidget,
    #[serde(default)]
    pub page_background: ThemePageBackground,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeColors {
    pub base_focus_color: String,
    pub base_hover_color: String,
    pub body_text: String,
    pub captcha_widget_theme: String,
    #[serde(alias = "errorColor")]
    pub error: String,
    pub header: String,
    pub icons: String,
    pub input_background: String,
    pub input_border: String,
    pub input_filled_text: String,
    pub input_labels_placeholders: String,
    pub links_focused_components: String,
    pub primary_button: String,
    pub primary_button_label: String,
    pub secondary_button_border: String,
    pub secondary_button_label: String,
    #[serde(alias = "successColor")]
    pub success: String,
    pub widget_background: String,
    pub widget_border: String,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            base_focus_color: "#635dff".into(),
            base_hover_color: "#000000".into(),
            body_text: "#1e212a".into(),
            captcha_widget_theme: "light".into(),
            error: "#d03c38".into(),
            header: "#1e212a".into(),
            icons: "#65676e".into(),
            input_background: "#ffffff".into(),
            input_border: "#c9cace".into(),
            input_filled_text: "#000000".into(),
            input_labels_placeholders: "#65676e".into(),
            links_focused_components: "#635dff".into(),
            primary_button: "#635dff".into(),
            primary_button_label: "#ffffff".into(),
            secondary_button_border: "#c9cace".into(),
            secondary_button_label: "#1e212a".into(),
            success: "#13a688".into(),
            widget_background: "#ffffff".into(),
            widget_border: "#c9cace".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FontStyle {
    #[serde(default, deserialize_with = "flag")]
    pub bold: bool,
    #[serde(deserialize_with = "number")]
    pub size: f64,
}

impl FontStyle {
    const fn new(bold: bool, size: f64) -> Self {
        Self { bold, size }
    }

    fn to_json(self) -> Value {
        json!({ "bold": self.bold, "size": self.size })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeFonts {
    pub body_text: FontStyle,
    pub buttons_text: FontStyle,
    pub font_url: String,
    pub input_labels: FontStyle,
    pub links: FontStyle,
    pub links_style: String,
    #[serde(deserialize_with = "number")]
    pub reference_text_size: f64,
    pub subtitle: FontStyle,
    pub title: FontStyle,
}

impl Default for ThemeFonts {
    fn default() -> Self {
        Self {
            body_text: FontStyle::new(false, 87.5),
            buttons_text: FontStyle::new(false, 100.0),
            font_url: String::new(),
            input_labels: FontStyle::new(false, 100.0),
            links: FontStyle::new(true, 87.5),
            links_style: "normal".into(),
            reference_text_size: 16.0,
            subtitle: FontStyle::new(false, 87.5),
            title: FontStyle::new(false, 150.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeBorders {
    #[serde(deserialize_with = "number")]
    pub button_border_radius: f64,
    #[serde(deserialize_with = "number")]
    pub button_border_weight: f64,
    pub buttons_style: String,
    #[serde(deserialize_with = "number")]
    pub input_border_radius: f64,
    #[serde(deserialize_with = "number")]
    pub input_border_weight: f64,
    pub inputs_style: String,
    #[serde(deserialize_with = "flag")]
    pub show_widget_shadow: bool,
    #[serde(deserialize_with = "number")]
    pub widget_border_weight: f64,
    #[serde(deserialize_with = "number")]
    pub widget_corner_radius: f64,
}

impl Default for ThemeBorders {
    fn default() -> Self {
        Self {
            button_border_radius: 3.0,
            button_border_weight: 1.0,
            buttons_style: "rounded".into(),
            input_border_radius: 3.0,
            input_border_weight: 1.0,
            inputs_style: "rounded".into(),
            show_widget_shadow: true,
            widget_border_weight: 0.0,
            widget_corner_radius: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeWidget {
    pub header_text_alignment: String,
    #[serde(deserialize_with = "number")]
    pub logo_height: f64,
    pub logo_position: String,
    pub logo_url: String,
    pub social_buttons_layout: String,
}

impl Default for ThemeWidget {
    fn default() -> Self {
        Self {
            header_text_alignment: "center".into(),
            logo_height: 52.0,
            logo_position: "center".into(),
            logo_url: String::new(),
            social_buttons_layout: "bottom".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemePageBackground {
    pub background_color: String,
    pub background_image_url: String,
    pub page_layout: String,
}

impl Default for ThemePageBackground {
    fn default() -> Self {
        Self {
            background_color: "#000000".into(),
            background_image_url: String::new(),
            page_layout: "center".into(),
        }
    }
}

impl BrandingThemeProps {
    fn body(&self) -> Value {
        let c = &self.colors;
        let f = &self.fonts;
        let b = &self.borders;
        let w = &self.widget;
        let p = &self.page_background;

        let mut body = json!({
            "colors": {
                "base_focus_color": c.base_focus_color,
                "base_hover_color": c.base_hover_color,
                "body_text": c.body_text,
                "captcha_widget_theme": c.captcha_widget_theme,
                "error": c.error,
                "header": c.header,
                "icons": c.icons,
                "input_background": c.input_background,
                "input_border": c.input_border,
                "input_filled_text": c.input_filled_text,
                "input_labels_placeholders": c.input_labels_placeholders,
                "links_focused_components": c.links_focused_components,
                "primary_button": c.primary_button,
                "primary_button_label": c.primary_button_label,
                "secondary_button_border": c.secondary_button_border,
                "secondary_button_label": c.secondary_button_label,
                "success": c.success,
                "widget_background": c.widget_background,
                "widget_border": c.widget_border,
            },
            "fonts": {
                "body_text": f.body_text.to_json(),
                "buttons_text": f.buttons_text.to_json(),
                "font_url": f.font_url,
                "input_labels": f.input_labels.to_json(),
                "links": f.links.to_json(),
                "links_style": f.links_style,
                "reference_text_size": f.reference_text_size,
                "subtitle": f.subtitle.to_json(),
                "title": f.title.to_json(),
            },
            "borders": {
                "button_border_radius": b.button_border_radius,
                "button_border_weight": b.button_border_weight,
                "buttons_style": b.buttons_style,
                "input_border_radius": b.input_border_radius,
                "input_border_weight": b.input_border_weight,
                "inputs_style": b.inputs_style,
                "show_widget_shadow": b.show_widget_shadow,
                "widget_border_weight": b.widget_border_weight,
                "widget_corner_radius": b.widget_corner_radius,
            },
            "widget": {
                "header_text_alignment": w.header_text_alignment,
                "logo_height": w.logo_height,
                "logo_position": w.logo_position,
                "logo_url": w.logo_url,
                "social_buttons_layout": w.social_buttons_layout,
            },
            "page_background": {
                "background_color": p.background_color,
                "background_image_url": p.background_image_url,
                "page_layout": p.page_layout,
            },
        });

        if let Some(name) = &self.display_name {
            body["displayName"] = json!(name);
        }
        body
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeRecord {
    theme_id: String,
}

fn response(id: &str) -> Response {
    Response::new(id).with("brandingThemeId", id)
}

pub struct BrandingTheme;

#[async_trait]
impl Resource for BrandingTheme {
    const RESOURCE_TYPE: &'static str = "Custom::Auth0BrandingTheme";
    type Props = BrandingThemeProps;

    #[instrument(skip_all)]
    async fn create(
        &self,
        ctx: &Context<'_>,
        props: &BrandingThemeProps,
    ) -> Result<Response, HandlerError> {
        let theme: ThemeRecord = ctx
            .management()
            .await?
            .post(&["branding", "themes"], &props.body())
            .await?;

        Ok(response(&theme.theme_id))
    }

    #[instrument(skip_all, fields(theme_id = %id))]
    async fn update(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &BrandingThemeProps,
        _old: &BrandingThemeProps,
    ) -> Result<Response, HandlerError> {
        let _: Value = ctx
            .management()
            .await?
            .patch(&["branding", "themes", id], &props.body())
            .await?;

        Ok(response(id))
    }

    #[instrument(skip_all, fields(theme_id = %id))]
    async fn delete(
        &self,
        ctx: &Context<'_>,
        id: &str,
        _props: &BrandingThemeProps,
    ) -> Result<Response, HandlerError> {
        ctx.management()
            .await?
            .delete(&["branding", "themes", id])
            .await?;

        Ok(Response::new(id))
    }
}
