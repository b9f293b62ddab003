use crate::provider::{Event, HandlerError, Provider, Response};
use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::ToSchema;

/// Error payload for a failed event.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    /// Machine-readable failure class, e.g. `ImmutableFieldChanged`.
    pub kind: String,
}

/// HTTP status for each failure class.
#[must_use]
pub const fn status_code(err: &HandlerError) -> StatusCode {
    match err {
        HandlerError::UnsupportedRequestType(_) => StatusCode::BAD_REQUEST,
        HandlerError::UnknownResourceType(_) => StatusCode::NOT_FOUND,
        HandlerError::ImmutableFieldChanged { .. } => StatusCode::CONFLICT,
        HandlerError::InvalidProperties(_) => StatusCode::UNPROCESSABLE_ENTITY,
        HandlerError::RemoteApi(_) | HandlerError::SecretFetch(_) | HandlerError::SecretWrite(_) => {
            StatusCode::BAD_GATEWAY
        }
        HandlerError::ActionBuildTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        let status = status_code(&self);
        if status.is_server_error() {
            error!(kind = self.kind(), "{}", self);
        } else {
            warn!(kind = self.kind(), "{}", self);
        }

        let body = ErrorBody {
            error: self.to_string(),
            kind: self.kind().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[utoipa::path(
    post,
    path= "/events",
    request_body = Event,
    responses (
        (status = 200, description = "Event applied", body = Response),
        (status = 400, description = "Malformed event or unsupported request type", body = ErrorBody),
        (status = 404, description = "No adapter for the resource type", body = ErrorBody),
        (status = 409, description = "Identity field changed on update", body = ErrorBody),
        (status = 422, description = "Invalid resource properties", body = ErrorBody),
        (status = 502, description = "Auth0 or the secret store failed", body = ErrorBody),
        (status = 504, description = "Action build did not finish in time", body = ErrorBody)
    ),
    tag = "events",
)]
/// Apply one custom-resource lifecycle event.
pub async fn events(
    provider: Extension<Arc<Provider>>,
    payload: Result<Json<Event>, JsonRejection>,
) -> axum::response::Response {
    let event = match payload {
        Ok(Json(event)) => event,
        Err(rejection) => {
            warn!("Rejected event payload: {}", rejection.body_text());
            let body = ErrorBody {
                error: rejection.body_text(),
                kind: "InvalidEvent".to_string(),
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    match provider.handle(&event).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => err.into_response(),
    }
}
