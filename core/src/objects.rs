//! Object-mode Knack client: record CRUD under `/objects/{object_key}`.
//!
//! Authenticates with the application id and the REST API key. Keys and
//! record ids are inserted into paths verbatim; callers pass URL-safe values.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::{ApiClient, ApiClientConfig, RequestConfig};
use crate::config::KnackApiConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, Transport, UreqTransport};
use crate::types::{list_query, RequestOptions};

pub const HEADER_APPLICATION_ID: &str = "X-Knack-Application-Id";
pub const HEADER_REST_API_KEY: &str = "X-Knack-REST-API-Key";

/// Client for Knack object (table) records.
#[derive(Debug)]
pub struct KnackApiClient<T = UreqTransport> {
    http: ApiClient<T>,
}

impl KnackApiClient<UreqTransport> {
    pub fn new(config: KnackApiConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> KnackApiClient<T> {
    pub fn with_transport(config: KnackApiConfig, transport: T) -> Self {
        let headers = vec![
            (HEADER_APPLICATION_ID.to_string(), config.application_id.clone()),
            (HEADER_REST_API_KEY.to_string(), config.api_key.clone()),
        ];
        let base = ApiClientConfig {
            api_base_url: Some(config.base_url()),
            api_key: config.api_key,
        };
        Self {
            http: ApiClient::with_transport(base, headers, transport),
        }
    }

    /// The underlying generic client.
    pub fn http(&self) -> &ApiClient<T> {
        &self.http
    }

    /// List records. Always sends a query, empty when `options` is `None`.
    pub fn get_records<R: DeserializeOwned>(
        &self,
        object_key: &str,
        options: Option<&RequestOptions>,
    ) -> Result<R, ApiError> {
        let config = RequestConfig::with_query(list_query(options)?);
        self.http.get(&records_path(object_key), Some(&config))
    }

    pub fn get_record<R: DeserializeOwned>(&self, object_key: &str, record_id: &str) -> Result<R, ApiError> {
        self.http.get(&record_path(object_key, record_id), None)
    }

    pub fn create_record<R, B>(&self, object_key: &str, record: &B) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.http.post(&records_path(object_key), Some(record), None)
    }

    pub fn update_record<R, B>(&self, object_key: &str, record_id: &str, record: &B) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.http.put(&record_path(object_key, record_id), Some(record), None)
    }

    pub fn delete_record<R: DeserializeOwned>(&self, object_key: &str, record_id: &str) -> Result<R, ApiError> {
        self.http.delete(&record_path(object_key, record_id), None)
    }

    /// The request `get_records` would send, without sending it.
    pub fn build_get_records(&self, object_key: &str, options: Option<&RequestOptions>) -> Result<HttpRequest, ApiError> {
        let config = RequestConfig::with_query(list_query(options)?);
        Ok(self
            .http
            .build_request(HttpMethod::Get, &records_path(object_key), None, Some(&config)))
    }
}

fn records_path(object_key: &str) -> String {
    format!("/objects/{object_key}/records")
}

fn record_path(object_key: &str, record_id: &str) -> String {
    format!("/objects/{object_key}/records/{record_id}")
}
