//! HTTP client for the discovery endpoint.

use std::time::Duration;

use thiserror::Error;

use crate::feed::FeedCandidate;
use crate::server::models::{ErrorResponse, FindFeedsRequest, FindFeedsResponse};
use crate::server::FIND_FEEDS_PATH;

/// Shown when the server gave no usable error message.
pub const GENERIC_FAILURE: &str = "Failed to find feeds";

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {}", .message.as_deref().unwrap_or(GENERIC_FAILURE))]
    Api {
        status: u16,
        /// The `error` field of the body, if the body had one.
        message: Option<String>,
    },
    /// The server could not be reached or the request timed out.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// A 2xx response whose body was not the expected JSON.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Text to put in front of the user.
    ///
    /// Only server-supplied messages are shown verbatim; everything else gets
    /// the generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_FAILURE.to_owned(),
        }
    }
}

/// Talks to a running `serve` instance.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ApiClient {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), FIND_FEEDS_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submits an already-normalized URL and returns the server's feed list.
    pub async fn find_feeds(&self, url: &str) -> Result<Vec<FeedCandidate>, ClientError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&FindFeedsRequest {
                url: Some(url.to_owned()),
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorResponse>(&body)
                .ok()
                .map(|e| e.error);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice::<FindFeedsResponse>(&body)
            .map(|r| r.feeds)
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}
