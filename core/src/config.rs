//! Credentials and endpoint configuration for the Knack clients.
//!
//! Values can be built directly, deserialized, or read from the environment
//! (`.env` is loaded first when present).

use std::fmt;

use serde::Deserialize;

use crate::error::ApiError;

/// Production Knack API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.knack.com/v1";

pub const ENV_APPLICATION_ID: &str = "KNACK_APPLICATION_ID";
pub const ENV_API_KEY: &str = "KNACK_API_KEY";
pub const ENV_TOKEN: &str = "KNACK_TOKEN";
pub const ENV_API_BASE_URL: &str = "KNACK_API_BASE_URL";

/// Configuration for object-mode requests (application id + REST API key).
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct KnackApiConfig {
    pub application_id: String,
    pub api_key: String,
    #[serde(default)]
    pub api_base_url: Option<String>,
}

/// Configuration for view-mode requests (application id + user token).
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct KnackViewConfig {
    pub application_id: String,
    pub token: String,
    #[serde(default)]
    pub api_base_url: Option<String>,
}

impl KnackApiConfig {
    pub fn new(application_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            api_key: api_key.into(),
            api_base_url: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn from_env() -> Result<Self, ApiError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            application_id: required(&lookup, ENV_APPLICATION_ID)?,
            api_key: required(&lookup, ENV_API_KEY)?,
            api_base_url: optional(&lookup, ENV_API_BASE_URL),
        })
    }

    pub(crate) fn base_url(&self) -> String {
        resolve_base_url(self.api_base_url.as_deref())
    }
}

impl KnackViewConfig {
    pub fn new(application_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            token: token.into(),
            api_base_url: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn from_env() -> Result<Self, ApiError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            application_id: required(&lookup, ENV_APPLICATION_ID)?,
            token: required(&lookup, ENV_TOKEN)?,
            api_base_url: optional(&lookup, ENV_API_BASE_URL),
        })
    }

    pub(crate) fn base_url(&self) -> String {
        resolve_base_url(self.api_base_url.as_deref())
    }
}

impl fmt::Debug for KnackApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KnackApiConfig")
            .field("application_id", &self.application_id)
            .field("api_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl fmt::Debug for KnackViewConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KnackViewConfig")
            .field("application_id", &self.application_id)
            .field("token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

// An empty base URL counts as unset.
fn resolve_base_url(url: Option<&str>) -> String {
    match url {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => DEFAULT_API_BASE_URL.to_string(),
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ApiError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or(ApiError::MissingConfig(name))
}

fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.is_empty())
}
