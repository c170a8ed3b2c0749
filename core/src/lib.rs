//! Blocking client for the Knack REST API.
//!
//! # Overview
//! Two thin clients map Knack record CRUD onto a generic JSON HTTP client:
//! `KnackApiClient` for object endpoints (application id + REST API key) and
//! `KnackViewClient` for scene/view endpoints (application id + user token).
//!
//! # Design
//! - Each Knack client owns an `ApiClient`; all headers are fixed when the
//!   client is built, so one instance can be shared across threads.
//! - The network sits behind the `Transport` trait. `UreqTransport` is the
//!   default; tests substitute a recording fake.
//! - Errors surface as they happened: non-2xx responses keep status and body.
//! - Response types are chosen by the caller and only checked by serde.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod objects;
pub mod types;
pub mod views;

pub use client::{ApiClient, ApiClientConfig, RequestConfig};
pub use config::{KnackApiConfig, KnackViewConfig, DEFAULT_API_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use objects::KnackApiClient;
pub use types::{FilterOptions, FilterRule, MatchMode, PaginationOptions, RequestOptions, SortOptions, SortOrder};
pub use views::KnackViewClient;
