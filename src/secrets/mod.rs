//! Secret store access.
//!
//! Credentials are read through the local secrets side-car (`extension`), and
//! generated client secrets are written back to AWS Secrets Manager (`manager`).

pub mod extension;
pub mod manager;

pub use extension::{ApiCredentials, ExtensionClient, DEFAULT_EXTENSION_PORT};
pub use manager::{MemorySecretWriter, SecretWriter, SecretsManagerWriter};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("secret {name} fetch failed: {status}, {message}")]
    Status {
        name: String,
        status: u16,
        message: String,
    },
    #[error("secret {name} has an unexpected shape: {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("secret {name} write failed: {message}")]
    Write { name: String, message: String },
}

impl SecretError {
    #[must_use]
    pub const fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}
