//! Request descriptors and the pure request builder.
//!
//! `build_request` turns a base URL, a resource path, a `RequestOptions` and
//! the current token into an `HttpRequest`. It performs no I/O, so every
//! header and body rule can be checked without a network.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::http::{FormData, HttpBody, HttpMethod, HttpRequest};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const AUTHORIZATION: &str = "Authorization";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Everything a caller can say about one request besides its path.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub params: Vec<(String, String)>,
    pub data: Option<Value>,
    pub body: Option<HttpBody>,
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(HttpMethod::Get)
    }
}

impl RequestOptions {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            params: Vec::new(),
            data: None,
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn params(mut self, params: Vec<(String, String)>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn form(mut self, form: FormData) -> Self {
        self.body = Some(HttpBody::Form(form));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }
}

/// Failures while turning typed inputs into a request.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("request payload could not be serialized: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("query parameters must serialize to an object, got {0}")]
    ParamsNotObject(&'static str),
}

/// Flatten a serializable query struct into ordered string pairs.
///
/// Strings are used as-is, numbers and booleans through `to_string`,
/// arrays are joined with `,` and nulls are skipped.
pub fn to_query_params<P: Serialize + ?Sized>(
    params: &P,
) -> Result<Vec<(String, String)>, BuildError> {
    let value = serde_json::to_value(params).map_err(BuildError::Serialize)?;
    let map = match value {
        Value::Object(map) => map,
        Value::Null => return Ok(Vec::new()),
        other => return Err(BuildError::ParamsNotObject(json_kind(&other))),
    };
    Ok(map
        .into_iter()
        .filter_map(|(key, value)| param_text(&value).map(|text| (key, text)))
        .collect())
}

fn param_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(param_text)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Build the wire request for `path` under `base_url`.
pub fn build_request(
    base_url: &str,
    path: &str,
    options: RequestOptions,
    token: Option<&str>,
) -> Result<HttpRequest, BuildError> {
    let RequestOptions {
        method,
        params,
        data,
        body,
        headers: overrides,
    } = options;

    let mut headers = Vec::new();
    if let Some(token) = token.filter(|token| !token.is_empty()) {
        headers.push((AUTHORIZATION.to_string(), format!("Bearer {token}")));
    }
    if !body.as_ref().is_some_and(HttpBody::is_form) {
        headers.push((CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string()));
    }
    for (name, value) in overrides {
        headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        headers.push((name, value));
    }

    let mut url = format!("{base_url}{path}");
    if !params.is_empty() {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish();
        url.push('?');
        url.push_str(&query);
    }

    let body = match (body, data) {
        (Some(body), _) => Some(body),
        (None, Some(data)) if method.carries_body() => {
            if is_json_content_type(&headers) {
                let text = serde_json::to_string(&data).map_err(BuildError::Serialize)?;
                Some(HttpBody::Json(text))
            } else {
                tracing::debug!(%method, path, "payload dropped: content type is not JSON");
                None
            }
        }
        (None, _) => None,
    };

    Ok(HttpRequest {
        method,
        url,
        headers,
        body,
    })
}

fn is_json_content_type(headers: &[(String, String)]) -> bool {
    headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE))
        .is_some_and(|(_, value)| value == JSON_CONTENT_TYPE)
}
