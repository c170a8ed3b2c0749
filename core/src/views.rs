//! View-mode Knack client: record CRUD under `/pages/{scene}/views/{view}`.
//!
//! Authenticates with the application id and a user token sent verbatim in
//! `Authorization`. No REST API key is ever sent in this mode.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::{ApiClient, ApiClientConfig, RequestConfig};
use crate::config::KnackViewConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, Transport, UreqTransport};
use crate::objects::HEADER_APPLICATION_ID;
use crate::types::{list_query, RequestOptions};

pub const HEADER_AUTHORIZATION: &str = "Authorization";

/// Client for records exposed through a Knack scene view.
#[derive(Debug)]
pub struct KnackViewClient<T = UreqTransport> {
    http: ApiClient<T>,
}

impl KnackViewClient<UreqTransport> {
    pub fn new(config: KnackViewConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> KnackViewClient<T> {
    pub fn with_transport(config: KnackViewConfig, transport: T) -> Self {
        let base = ApiClientConfig {
            api_base_url: Some(config.base_url()),
            api_key: String::new(),
        };
        let headers = vec![
            (HEADER_APPLICATION_ID.to_string(), config.application_id),
            (HEADER_AUTHORIZATION.to_string(), config.token),
        ];
        Self {
            http: ApiClient::with_transport(base, headers, transport),
        }
    }

    pub fn http(&self) -> &ApiClient<T> {
        &self.http
    }

    /// List records. Always sends a query, empty when `options` is `None`.
    pub fn get_records<R: DeserializeOwned>(
        &self,
        scene_key: &str,
        view_key: &str,
        options: Option<&RequestOptions>,
    ) -> Result<R, ApiError> {
        let config = RequestConfig::with_query(list_query(options)?);
        self.http.get(&records_path(scene_key, view_key), Some(&config))
    }

    pub fn get_record<R: DeserializeOwned>(&self, scene_key: &str, view_key: &str, record_id: &str) -> Result<R, ApiError> {
        self.http.get(&record_path(scene_key, view_key, record_id), None)
    }

    pub fn create_record<R, B>(&self, scene_key: &str, view_key: &str, record: &B) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.http.post(&records_path(scene_key, view_key), Some(record), None)
    }

    pub fn update_record<R, B>(&self, scene_key: &str, view_key: &str, record_id: &str, record: &B) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.http
            .put(&record_path(scene_key, view_key, record_id), Some(record), None)
    }

    pub fn delete_record<R: DeserializeOwned>(&self, scene_key: &str, view_key: &str, record_id: &str) -> Result<R, ApiError> {
        self.http.delete(&record_path(scene_key, view_key, record_id), None)
    }

    /// The request `get_records` would send, without sending it.
    pub fn build_get_records(
        &self,
        scene_key: &str,
        view_key: &str,
        options: Option<&RequestOptions>,
    ) -> Result<HttpRequest, ApiError> {
        let config = RequestConfig::with_query(list_query(options)?);
        Ok(self
            .http
            .build_request(HttpMethod::Get, &records_path(scene_key, view_key), None, Some(&config)))
    }
}

fn records_path(scene_key: &str, view_key: &str) -> String {
    format!("/pages/{scene_key}/views/{view_key}/records")
}

fn record_path(scene_key: &str, view_key: &str, record_id: &str) -> String {
    format!("/pages/{scene_key}/views/{view_key}/records/{record_id}")
}
