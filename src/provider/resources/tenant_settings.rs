//! `Custom::Auth0TenantSettings`: tenant-wide settings, applied with
//! `PATCH /tenants/settings`. The tenant cannot be deleted, so delete is a no-op.

use crate::provider::{
    props::{flag, opt_flag, opt_number, without_nulls},
    Context, HandlerError, Resource, Response,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

const PHYSICAL_ID: &str = "tenantSettings";

/// Upper bounds enforced by Auth0, in hours.
pub const MAX_SESSION_LIFETIME: f64 = 336.0;
pub const MAX_IDLE_SESSION_LIFETIME: f64 = 72.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSettingsProps {
    #[serde(default)]
    pub change_password: PageToggle,
    #[serde(default)]
    pub device_flow: DeviceFlow,
    #[serde(default)]
    pub guardian_mfa_page: PageToggle,
    #[serde(default)]
    pub default_audience: Option<String>,
    #[serde(default)]
    pub default_directory: Option<String>,
    #[serde(default)]
    pub error_page: ErrorPage,
    #[serde(default)]
    pub flags: TenantFlags,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub picture_url: Option<String>,
    #[serde(default)]
    pub support_email: Option<String>,
    #[serde(default)]
    pub support_url: Option<String>,
    #[serde(default)]
    pub allowed_logout_urls: Option<Vec<String>>,
    /// Hours.
    #[serde(default, deserialize_with = "opt_number")]
    pub session_lifetime: Option<f64>,
    /// Hours.
    #[serde(default, deserialize_with = "opt_number")]
    pub idle_session_lifetime: Option<f64>,
    #[serde(default)]
    pub sandbox_version: Option<String>,
    #[serde(default)]
    pub default_redirection_uri: Option<String>,
    #[serde(default = "default_locales")]
    pub enabled_locales: Vec<String>,
    #[serde(default)]
    pub session_cookie: Option<SessionCookie>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct PageToggle {
    #[serde(deserialize_with = "flag")]
    pub enabled: bool,
    pub html: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviceFlow {
    pub charset: String,
    pub mask: Option<String>,
}

impl Default for DeviceFlow {
    fn default() -> Self {
        Self {
            charset: "base20".to_string(),
            mask: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorPage {
    pub html: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub show_log_link: bool,
    pub url: Option<String>,
}

impl Default for ErrorPage {
    fn default() -> Self {
        Self {
            html: None,
            show_log_link: true,
            url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionCookie {
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct TenantFlags {
    #[serde(deserialize_with = "flag")]
    pub enable_client_connections: bool,
    #[serde(deserialize_with = "flag")]
    pub enable_apis_section: bool,
    #[serde(deserialize_with = "flag")]
    pub enable_pipeline2: bool,
    #[serde(deserialize_with = "flag")]
    pub enable_dynamic_client_registration: bool,
    #[serde(deserialize_with = "flag")]
    pub enable_custom_domain_in_emails: bool,
    #[serde(deserialize_with = "flag")]
    pub enable_legacy_profile: bool,
    #[serde(deserialize_with = "flag")]
    pub enable_sso: bool,
    #[serde(deserialize_with = "flag")]
    pub disable_clickjack_protection_headers: bool,
    #[serde(deserialize_with = "flag")]
    pub no_disclose_enterprise_connections: bool,
    #[serde(deserialize_with = "flag")]
    pub disable_management_api_sms_obfuscation: bool,
    #[serde(deserialize_with = "flag")]
    pub enforce_client_authentication_on_passwordless_start: bool,
    #[serde(deserialize_with = "opt_flag")]
    pub trust_azure_adfs_email_verified_connection_property: Option<bool>,
    #[serde(deserialize_with = "flag")]
    pub enable_adfs_waad_email_verification: bool,
    #[serde(deserialize_with = "flag")]
    pub revoke_refresh_token_grant: bool,
    #[serde(deserialize_with = "flag")]
    pub dashboard_log_streams_next: bool,
    #[serde(deserialize_with = "flag")]
    pub dashboard_insights_view: bool,
    #[serde(deserialize_with = "flag")]
    pub disable_fields_map_fix: bool,
    #[serde(deserialize_with = "flag")]
    pub mfa_show_factor_list_on_enrollment: bool,
}

impl Default for TenantFlags {
    fn default() -> Self {
        Self {
            enable_client_connections: true,
            enable_apis_section: true,
            enable_pipeline2: true,
            enable_dynamic_client_registration: false,
            enable_custom_domain_in_emails: false,
            enable_legacy_profile: false,
            enable_sso: false,
            disable_clickjack_protection_headers: false,
            no_disclose_enterprise_connections: false,
            disable_management_api_sms_obfuscation: false,
            enforce_client_authentication_on_passwordless_start: false,
            trust_azure_adfs_email_verified_connection_property: None,
            enable_adfs_waad_email_verification: false,
            revoke_refresh_token_grant: false,
            dashboard_log_streams_next: false,
            dashboard_insights_view: true,
            disable_fields_map_fix: false,
            mfa_show_factor_list_on_enrollment: false,
        }
    }
}

fn default_locales() -> Vec<String> {
    vec!["en".to_string()]
}

impl TenantSettingsProps {
    /// Effective lifetimes in hours, checked against the Auth0 bounds.
    fn lifetimes(&self) -> Result<(f64, f64), HandlerError> {
        let session = self.session_lifetime.unwrap_or(MAX_SESSION_LIFETIME);
        let idle = self.idle_session_lifetime.unwrap_or(MAX_IDLE_SESSION_LIFETIME);

        if session > MAX_SESSION_LIFETIME {
            return Err(HandlerError::invalid(format!(
                "sessionLifetime can't exceed {MAX_SESSION_LIFETIME} hours"
            )));
        }
        if idle > MAX_IDLE_SESSION_LIFETIME {
            return Err(HandlerError::invalid(format!(
                "idleSessionLifetime can't exceed {MAX_IDLE_SESSION_LIFETIME} hours"
            )));
        }

        Ok((session, idle))
    }

    fn body(&self) -> Result<Value, HandlerError> {
        let (session_lifetime, idle_session_lifetime) = self.lifetimes()?;
        let f = &self.flags;

        Ok(without_nulls(json!({
            "change_password": {
                "enabled": self.change_password.enabled,
                "html": self.change_password.html,
            },
            "device_flow": {
                "charset": self.device_flow.charset,
                "mask": self.device_flow.mask,
            },
            "guardian_mfa_page": {
                "enabled": self.guardian_mfa_page.enabled,
                "html": self.guardian_mfa_page.html,
            },
            "default_audience": self.default_audience,
            "default_directory": self.default_directory,
            "error_page": {
                "html": self.error_page.html,
                "show_log_link": self.error_page.show_log_link,
                "url": self.error_page.url,
            },
            "flags": {
                "enable_client_connections": f.enable_client_connections,
                "enable_apis_section": f.enable_apis_section,
                "enable_pipeline2": f.enable_pipeline2,
                "enable_dynamic_client_registration": f.enable_dynamic_client_registration,
                "enable_custom_domain_in_emails": f.enable_custom_domain_in_emails,
                "enable_legacy_profile": f.enable_legacy_profile,
                "enable_sso": f.enable_sso,
                "disable_clickjack_protection_headers": f.disable_clickjack_protection_headers,
                "no_disclose_enterprise_connections": f.no_disclose_enterprise_connections,
                "disable_management_api_sms_obfuscation": f.disable_management_api_sms_obfuscation,
                "enforce_client_authentication_on_passwordless_start":
                    f.enforce_client_authentication_on_passwordless_start,
                "trust_azure_adfs_email_verified_connection_property":
                    f.trust_azure_adfs_email_verified_connection_property,
                "enable_adfs_waad_email_verification": f.enable_adfs_waad_email_verification,
                "revoke_refresh_token_grant": f.revoke_refresh_token_grant,
                "dashboard_log_streams_next": f.dashboard_log_streams_next,
                "dashboard_insights_view": f.dashboard_insights_view,
                "disable_fields_map_fix": f.disable_fields_map_fix,
                "mfa_show_factor_list_on_enrollment": f.mfa_show_factor_list_on_enrollment,
            },
            "friendly_name": self.friendly_name,
            "picture_url": self.picture_url,
            "support_email": self.support_email,
            "support_url": self.support_url,
            "allowed_logout_urls": self.allowed_logout_urls,
            "session_lifetime": session_lifetime,
            "idle_session_lifetime": idle_session_lifetime,
            "sandbox_version": self.sandbox_version,
            "default_redirection_uri": self.default_redirection_uri,
            "enabled_locales": self.enabled_locales,
            "session_cookie": self.session_cookie.as_ref().map(|c| json!({ "mode": c.mode })),
        })))
    }
}

pub struct TenantSettings;

impl TenantSettings {
    async fn apply(ctx: &Context<'_>, props: &TenantSettingsProps) -> Result<(), HandlerError> {
        // validate before the credential fetch
        let body = props.body()?;
        let _: Value = ctx
            .management()
            .await?
            .patch(&["tenants", "settings"], &body)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Resource for TenantSettings {
    const RESOURCE_TYPE: &'static str = "Custom::Auth0TenantSettings";
    type Props = TenantSettingsProps;

    #[instrument(skip_all)]
    async fn create(
        &self,
        ctx: &Context<'_>,
        props: &TenantSettingsProps,
    ) -> Result<Response, HandlerError> {
        Self::apply(ctx, props).await?;
        Ok(Response::new(PHYSICAL_ID))
    }

    #[instrument(skip_all)]
    async fn update(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &TenantSettingsProps,
        _old: &TenantSettingsProps,
    ) -> Result<Response, HandlerError> {
        Self::apply(ctx, props).await?;
        Ok(Response::new(id))
    }

    async fn delete(
        &self,
        _ctx: &Context<'_>,
        id: &str,
        _props: &TenantSettingsProps,
    ) -> Result<Response, HandlerError> {
        Ok(Response::new(id))
    }
}
