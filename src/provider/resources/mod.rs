//! One adapter per Auth0 resource kind.

pub mod action;
pub mod branding_settings;
pub mod branding_theme;
pub mod client;
pub mod client_grant;
pub mod connection;
pub mod custom_domain;
pub mod email_provider;
pub mod organization;
pub mod prompt_settings;
pub mod resource_server;
pub mod role;
pub mod role_permissions;
pub mod tenant_settings;
pub mod trigger;

pub use action::Action;
pub use branding_settings::BrandingSettings;
pub use branding_theme::BrandingTheme;
pub use client::Client;
pub use client_grant::ClientGrant;
pub use connection::Connection;
pub use custom_domain::CustomDomain;
pub use email_provider::EmailProvider;
pub use organization::Organization;
pub use prompt_settings::PromptSettings;
pub use resource_server::ResourceServer;
pub use role::Role;
pub use role_permissions::RolePermissions;
pub use tenant_settings::TenantSettings;
pub use trigger::Trigger;

use super::Registry;

pub(super) fn register_all(registry: Registry) -> Registry {
    registry
        .register(Action)
        .register(Trigger)
        .register(Client)
        .register(ClientGrant)
        .register(Connection)
        .register(CustomDomain)
        .register(ResourceServer)
        .register(Role)
        .register(RolePermissions)
        .register(Organization)
        .register(BrandingSettings)
        .register(BrandingTheme)
        .register(PromptSettings)
        .register(TenantSettings)
        .register(EmailProvider)
}
