//! Async API client core for the blog backend.
//!
//! # Overview
//! Every call goes through one request wrapper that builds an `HttpRequest`
//! (bearer token, JSON or multipart body, query string), hands it to a
//! [`Transport`], and folds whatever comes back into an [`ApiResponse`]
//! envelope. Typed call sites for categories, tags, posts and users unwrap
//! that envelope into domain values or safe fallbacks.
//!
//! # Design
//! - Request building and response decoding are pure functions over plain
//!   data (`request`, `envelope`); only the transport does I/O.
//! - `ApiClient` is cheap to clone and stateless apart from the shared
//!   transport and the key-value store the token is read from.
//! - Failures never escape the wrapper as `Err`; callers branch on
//!   `success` or on the sentinel returned by the typed call sites.
//! - Client-side state that outlives a request (token, theme) lives in a
//!   [`KeyValueStore`]; the route table is static data in [`menu`].

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod envelope;
pub mod http;
pub mod menu;
pub mod request;
pub mod storage;
pub mod theme;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use config::{load_config, ClientConfig, ConfigError};
pub use envelope::ApiResponse;
pub use http::{FormData, HttpBody, HttpMethod, HttpRequest, HttpResponse};
pub use request::RequestOptions;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use theme::{Theme, ThemeStore};
pub use transport::{ReqwestTransport, Transport, TransportError};
pub use types::*;
