//! HTTP access to the telemetry API.

use gloo_net::http::Request;
use serde::de::DeserializeOwned;
use serde_json::Value;

use shared::api::{api_url, load_track_path, parse_load_track, TRACK_LIST_PATH};
use shared::{ApiRequest, TimestampSequence, TrackListEntry, TrackLoadError};

#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("unexpected response body from {url}: {message}")]
    Decode { url: String, message: String },
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TrackLoadFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("invalid track data: {0}")]
    Invalid(#[from] TrackLoadError),
}

/// Telemetry API rooted at a base URL (`""` for same origin).
#[derive(Debug, Clone, Default)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn url_for(&self, request: &ApiRequest) -> String {
        api_url(&self.base_url, &request.path_and_query())
    }

    pub async fn track_list(&self) -> Result<Vec<TrackListEntry>, FetchError> {
        get_json(&api_url(&self.base_url, TRACK_LIST_PATH)).await
    }

    pub async fn load_track(&self, filename: &str) -> Result<TimestampSequence, TrackLoadFailure> {
        let url = api_url(&self.base_url, &load_track_path(filename));
        let body: Value = get_json(&url).await?;
        Ok(parse_load_track(&body)?)
    }

    /// Fire-and-forget request whose body is not needed.
    pub async fn notify(&self, request: &ApiRequest) -> Result<(), FetchError> {
        let url = self.url_for(request);
        send(&url).await.map(|_| ())
    }

    pub async fn fetch<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, FetchError> {
        get_json(&self.url_for(request)).await
    }
}

async fn send(url: &str) -> Result<gloo_net::http::Response, FetchError> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|error| FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        })?;
    if !response.ok() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }
    Ok(response)
}

async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, FetchError> {
    let text = send(url)
        .await?
        .text()
        .await
        .map_err(|error| FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        })?;
    serde_json::from_str(&text).map_err(|error| FetchError::Decode {
        url: url.to_string(),
        message: error.to_string(),
    })
}
