use crate::{management::ApiError, secrets::SecretError};
use std::time::Duration;
use thiserror::Error;

/// Why a lifecycle event could not be applied.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Invalid request type: {0}")]
    UnsupportedRequestType(String),

    #[error("{resource}: {field} cannot be changed after creation")]
    ImmutableFieldChanged {
        resource: &'static str,
        field: &'static str,
    },

    #[error(transparent)]
    RemoteApi(#[from] ApiError),

    #[error("failed to fetch API credentials: {0}")]
    SecretFetch(#[source] SecretError),

    #[error("failed to store generated secret: {0}")]
    SecretWrite(#[source] SecretError),

    #[error("invalid resource properties: {0}")]
    InvalidProperties(String),

    #[error("no adapter registered for resource type {0}")]
    UnknownResourceType(String),

    #[error("action {action_id} was not built after {}s", waited.as_secs())]
    ActionBuildTimeout { action_id: String, waited: Duration },
}

impl From<SecretError> for HandlerError {
    fn from(err: SecretError) -> Self {
        if err.is_write() {
            Self::SecretWrite(err)
        } else {
            Self::SecretFetch(err)
        }
    }
}

impl HandlerError {
    /// Stable machine-readable name of the variant.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedRequestType(_) => "UnsupportedRequestType",
            Self::ImmutableFieldChanged { .. } => "ImmutableFieldChanged",
            Self::RemoteApi(_) => "RemoteApiError",
            Self::SecretFetch(_) => "SecretFetchError",
            Self::SecretWrite(_) => "SecretWriteError",
            Self::InvalidProperties(_) => "InvalidProperties",
            Self::UnknownResourceType(_) => "UnknownResourceType",
            Self::ActionBuildTimeout { .. } => "ActionBuildTimeout",
        }
    }

    pub(crate) fn invalid(message: impl std::fmt::Display) -> Self {
        Self::InvalidProperties(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_errors_split_by_direction() {
        let fetch = HandlerError::from(SecretError::Status {
            name: "auth0/api".into(),
            status: 400,
            message: "nope".into(),
        });
        assert_eq!(fetch.kind(), "SecretFetchError");

        let write = HandlerError::from(SecretError::Write {
            name: "client/secret".into(),
            message: "denied".into(),
        });
        assert_eq!(write.kind(), "SecretWriteError");
    }

    #[test]
    fn remote_errors_keep_upstream_message() {
        let err = HandlerError::from(ApiError::Status {
            method: "POST".into(),
            path: "/api/v2/roles".into(),
            status: 409,
            message: "The role already exists.".into(),
        });
        assert_eq!(err.kind(), "RemoteApiError");
        assert_eq!(
            err.to_string(),
            "POST /api/v2/roles - 409, The role already exists."
        );
    }

    #[test]
    fn timeout_message_reports_seconds() {
        let err = HandlerError::ActionBuildTimeout {
            action_id: "act_1".into(),
            waited: Duration::from_secs(600),
        };
        assert_eq!(err.to_string(), "action act_1 was not built after 600s");
    }
}
