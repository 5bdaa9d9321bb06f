use serde::{Deserialize, Serialize};

use crate::feed::FeedCandidate;

/// Body of `POST /api/find-feeds`.
///
/// `url` is optional so that a missing field reaches the handler and gets the
/// same answer as an empty one.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FindFeedsRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FindFeedsResponse {
    pub feeds: Vec<FeedCandidate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
