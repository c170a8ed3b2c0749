//! Generic JSON HTTP client shared by the Knack clients.
//!
//! # Design
//! `ApiClient` holds an optional base URL, an immutable list of default
//! headers, and a `Transport`. It never mutates itself after construction,
//! so one instance can serve concurrent callers. Each verb is split into a
//! pure `build_request` step and an execute-and-decode step, keeping the
//! request shape testable without a network.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";

/// Construction parameters for `ApiClient`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiClientConfig {
    /// Prefix for every request path. `None` sends paths as given.
    pub api_base_url: Option<String>,
    /// Accepted for parity with the Knack configs but not sent by the generic
    /// client. Auth headers are supplied through `with_transport`.
    pub api_key: String,
}

impl fmt::Debug for ApiClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClientConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Per-call request configuration, passed through to the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestConfig {
    pub query: Option<Vec<(String, String)>>,
    /// Appended after the client's default headers.
    pub headers: Vec<(String, String)>,
}

impl RequestConfig {
    pub fn with_query(query: Vec<(String, String)>) -> Self {
        Self {
            query: Some(query),
            headers: Vec::new(),
        }
    }
}

/// JSON client over a pluggable transport.
pub struct ApiClient<T = UreqTransport> {
    base_url: Option<String>,
    headers: Vec<(String, String)>,
    transport: T,
}

impl ApiClient<UreqTransport> {
    pub fn new(config: ApiClientConfig) -> Self {
        Self::with_transport(config, Vec::new(), UreqTransport::new())
    }
}

impl<T: Transport> ApiClient<T> {
    /// Build a client whose default headers are `Content-Type:
    /// application/json` followed by `extra_headers`, fixed for its lifetime.
    pub fn with_transport(config: ApiClientConfig, extra_headers: Vec<(String, String)>, transport: T) -> Self {
        let mut headers = Vec::with_capacity(extra_headers.len() + 1);
        headers.push((CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()));
        headers.extend(extra_headers);
        Self {
            base_url: config
                .api_base_url
                .map(|url| url.trim_end_matches('/').to_string()),
            headers,
            transport,
        }
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn default_headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Describe a request without sending it.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        config: Option<&RequestConfig>,
    ) -> HttpRequest {
        let url = match &self.base_url {
            Some(base) => format!("{base}{path}"),
            None => path.to_string(),
        };
        let mut headers = self.headers.clone();
        let mut query = None;
        if let Some(config) = config {
            headers.extend(config.headers.iter().cloned());
            query = config.query.clone();
        }
        HttpRequest {
            method,
            url,
            query,
            headers,
            body,
        }
    }

    pub fn get<R: DeserializeOwned>(&self, path: &str, config: Option<&RequestConfig>) -> Result<R, ApiError> {
        self.send(self.build_request(HttpMethod::Get, path, None, config))
    }

    pub fn post<R, B>(&self, path: &str, body: Option<&B>, config: Option<&RequestConfig>) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = body.map(encode_body).transpose()?;
        self.send(self.build_request(HttpMethod::Post, path, body, config))
    }

    pub fn put<R, B>(&self, path: &str, body: Option<&B>, config: Option<&RequestConfig>) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = body.map(encode_body).transpose()?;
        self.send(self.build_request(HttpMethod::Put, path, body, config))
    }

    pub fn delete<R: DeserializeOwned>(&self, path: &str, config: Option<&RequestConfig>) -> Result<R, ApiError> {
        self.send(self.build_request(HttpMethod::Delete, path, None, config))
    }

    fn send<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, ApiError> {
        debug!(
            method = request.method.as_str(),
            url = %request.url,
            query_params = request.query.as_ref().map_or(0, Vec::len),
            "sending request"
        );
        let response = self.transport.execute(&request)?;
        decode_response(response)
    }
}

impl<T> fmt::Debug for ApiClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("headers", &header_names)
            .finish_non_exhaustive()
    }
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Turn a response into `R`, or into `ApiError::Http` for non-2xx statuses.
///
/// An empty body decodes as JSON `null`.
pub fn decode_response<R: DeserializeOwned>(response: HttpResponse) -> Result<R, ApiError> {
    if !response.is_success() {
        warn!(status = response.status, "request failed");
        return Err(ApiError::Http {
            status: response.status,
            body: response.body,
        });
    }
    let body = if response.body.trim().is_empty() {
        "null"
    } else {
        response.body.as_str()
    };
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
