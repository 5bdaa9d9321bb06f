use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::feed::FinderError;
use crate::util::{normalize, NormalizeError};

use super::models::{ErrorResponse, FindFeedsRequest, FindFeedsResponse};
use super::AppState;

/// Message returned for every discovery failure. Details stay in the log.
pub const DISCOVERY_FAILED: &str = "Failed to find RSS feeds";

/// Everything the endpoint can answer with besides a feed list.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, empty or malformed input. Always 400 with the message verbatim.
    #[error(transparent)]
    BadInput(#[from] NormalizeError),
    /// The discovery collaborator failed. Always 500 with a generic message.
    #[error("discovery failed: {0}")]
    Discovery(#[from] FinderError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadInput(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Discovery(e) => {
                tracing::error!(error = %e, "Feed discovery failed");
                (StatusCode::INTERNAL_SERVER_ERROR, DISCOVERY_FAILED.to_owned())
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// `POST /api/find-feeds`
///
/// Normalizes the submitted URL and hands it to the finder. A body that is
/// not a JSON object with a string `url` is treated as a missing URL.
pub async fn find_feeds(
    State(state): State<AppState>,
    body: Result<Json<FindFeedsRequest>, JsonRejection>,
) -> Result<Json<FindFeedsResponse>, ApiError> {
    let raw = match body {
        Ok(Json(request)) => request.url.unwrap_or_default(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected request body");
            String::new()
        }
    };

    let url = normalize(&raw)?;
    tracing::info!(url = %url, "Finding feeds");

    // A panicking finder must still produce a 500, so run it as its own task
    let finder = state.finder.clone();
    let options = state.options.clone();
    let lookup_url = url.clone();
    let feeds = tokio::spawn(async move { finder.find(&lookup_url, &options).await })
        .await
        .map_err(|e| FinderError::Task(e.to_string()))??;

    tracing::info!(url = %url, count = feeds.len(), "Found feeds");
    Ok(Json(FindFeedsResponse { feeds }))
}
