//! The request wrapper every API call goes through.
//!
//! # Design
//! `ApiClient` holds the base URL, a shared [`Transport`] and the
//! [`KeyValueStore`] the token is read from; it carries no other state
//! between calls. `request` is the single boundary where lower-level
//! failures are converted into an `ApiResponse`: nothing above it sees an
//! `Err` from the network. The typed helpers only fix the method and place
//! the payload in the right slot.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth;
use crate::config::{ClientConfig, ConfigError};
use crate::envelope::{normalize_response, ApiResponse};
use crate::http::{FormData, HttpMethod};
use crate::request::{build_request, to_query_params, RequestOptions};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::transport::{ReqwestTransport, Transport};

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn Transport>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            store,
        }
    }

    /// Client over `reqwest` with the store named by the configuration
    /// (a file store when a path is set, memory otherwise).
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let store: Arc<dyn KeyValueStore> = match &config.storage.path {
            Some(path) => Arc::new(FileStore::open(path)?),
            None => Arc::new(MemoryStore::new()),
        };
        Ok(Self::new(
            &config.api.base_url,
            Arc::new(ReqwestTransport::new()),
            store,
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Build, dispatch and normalize one request. Always yields an envelope.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ApiResponse<T> {
        let method = options.method;
        let token = auth::get_token(self.store.as_ref());
        let request = match build_request(&self.base_url, path, options, token.as_deref()) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(%method, path, error = %err, "request could not be built");
                return ApiResponse::failure(err.to_string(), None);
            }
        };

        tracing::debug!(%method, url = %request.url, "dispatching request");
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(%method, path, error = %err, "request failed");
                return ApiResponse::failure(err.to_string(), None);
            }
        };

        let envelope = normalize_response(&response);
        if !envelope.success {
            tracing::warn!(
                %method,
                path,
                status = response.status,
                code = ?envelope.code,
                message = envelope.message_or_default(),
                "request returned a failure envelope"
            );
        }
        envelope
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResponse<T> {
        self.request(path, RequestOptions::new(HttpMethod::Get)).await
    }

    /// GET with a query string built from any serializable struct or map.
    pub async fn get_with_params<T, P>(&self, path: &str, params: &P) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        match to_query_params(params) {
            Ok(params) => {
                self.request(path, RequestOptions::new(HttpMethod::Get).params(params))
                    .await
            }
            Err(err) => ApiResponse::failure(err.to_string(), None),
        }
    }

    pub async fn post<T, D>(&self, path: &str, data: &D) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        self.send_data(HttpMethod::Post, path, data).await
    }

    pub async fn put<T, D>(&self, path: &str, data: &D) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        self.send_data(HttpMethod::Put, path, data).await
    }

    pub async fn patch<T, D>(&self, path: &str, data: &D) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        self.send_data(HttpMethod::Patch, path, data).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResponse<T> {
        self.request(path, RequestOptions::new(HttpMethod::Delete))
            .await
    }

    /// POST a multipart form. The transport sets the boundary.
    pub async fn upload<T: DeserializeOwned>(&self, path: &str, form: FormData) -> ApiResponse<T> {
        self.request(path, RequestOptions::new(HttpMethod::Post).form(form))
            .await
    }

    async fn send_data<T, D>(&self, method: HttpMethod, path: &str, data: &D) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        match serde_json::to_value(data) {
            Ok(data) => self.request(path, RequestOptions::new(method).data(data)).await,
            Err(err) => ApiResponse::failure(
                format!("request payload could not be serialized: {err}"),
                None,
            ),
        }
    }
}
