//! Network execution of `HttpRequest` values.
//!
//! The core never talks to the network directly. `ApiClient` hands finished
//! requests to a `Transport`, which makes tests able to swap in a recording
//! fake while production code uses `ReqwestTransport`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use thiserror::Error;

use crate::http::{FormData, FormPart, HttpBody, HttpMethod, HttpRequest, HttpResponse};

/// Lower-level failures. Their text becomes the envelope message.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("request failed: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// Executes one request and returns the raw response, whatever its status.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self
            .client
            .request(to_reqwest_method(method), &url)
            .headers(to_header_map(&headers)?);
        builder = match body {
            Some(HttpBody::Json(text)) => builder.body(text),
            Some(HttpBody::Form(form)) => builder.multipart(to_multipart(form)?),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
    }
}

fn to_header_map(headers: &[(String, String)]) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::InvalidRequest(format!("header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| TransportError::InvalidRequest(format!("header {name}: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

fn to_multipart(form: FormData) -> Result<Form, TransportError> {
    let mut multipart = Form::new();
    for part in form.into_parts() {
        multipart = match part {
            FormPart::Text { name, value } => multipart.text(name, value),
            FormPart::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                let mut file = Part::bytes(bytes).file_name(file_name);
                if let Some(mime) = content_type {
                    file = file
                        .mime_str(&mime)
                        .map_err(|e| TransportError::InvalidRequest(format!("part {name}: {e}")))?;
                }
                multipart.part(name, file)
            }
        };
    }
    Ok(multipart)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_header_name_is_rejected() {
        let headers = vec![("bad header".to_string(), "x".to_string())];
        let err = to_header_map(&headers).unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }

    #[test]
    fn header_map_keeps_values() {
        let headers = vec![
            ("Authorization".to_string(), "Bearer t".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];
        let map = to_header_map(&headers).unwrap();
        assert_eq!(map.get("authorization").unwrap(), "Bearer t");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn invalid_part_mime_is_rejected() {
        let form = FormData::new().file("file", "a.bin", Some("not a mime"), vec![0]);
        assert!(matches!(
            to_multipart(form),
            Err(TransportError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let transport = ReqwestTransport::with_client(Client::new());
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://127.0.0.1:1/api/category".to_string(),
            headers: Vec::new(),
            body: None,
        };
        assert!(transport.send(request).await.is_err());
    }
}
