//! # auth0-provider (Auth0 custom resource provider)
//!
//! `auth0-provider` lets a deployment engine manage Auth0 tenant objects as if
//! they were native cloud resources. The engine sends one lifecycle event
//! (`Create`, `Update` or `Delete`) per resource; the provider translates it
//! into Auth0 Management API calls and answers with a physical resource id and
//! a set of output attributes.
//!
//! ## Resource adapters
//!
//! Every Auth0 entity kind (clients, connections, actions, roles, ...) is a
//! [`provider::Resource`] implementation with a typed declaration. Adapters are
//! collected in an explicit [`provider::Registry`] keyed by resource type
//! (`Custom::Auth0Client`, ...).
//!
//! - **Physical ids:** the id returned on create is threaded back into every
//!   update and delete. Settings singletons use fixed ids.
//! - **Identity fields:** changing an identity-defining field on update fails with
//!   `ImmutableFieldChanged` before any remote call is made.
//! - **Deletion protection:** `deletionProtection: "true"` turns delete into a no-op.
//!
//! ## Credentials
//!
//! Management API credentials (`{domain, clientId, clientSecret}`) are read on
//! every invocation from the local secrets side-car, only once the adapter makes
//! its first remote call.

pub mod api;
pub mod cli;
pub mod management;
pub mod provider;
pub mod secrets;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
