//! The uniform result envelope and the response decoder that produces it.
//!
//! # Design
//! Every outcome of a call (success, HTTP error, empty body, undecodable
//! body) is folded into one `ApiResponse<T>`. Success bodies go through a
//! tagged decode: the body is first tried as an envelope (an object with a
//! boolean `success` field) and passed through as-is; on shape mismatch the
//! raw value is decoded as `T` and wrapped. The fallback exists so backends
//! that return bare payloads keep working next to ones that frame them.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::http::HttpResponse;

/// `{ success, data?, message?, code? }` as exchanged with the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, code: u16) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            code: Some(i64::from(code)),
        }
    }

    /// Success without a payload (204 and friends).
    pub fn empty(code: u16) -> Self {
        Self {
            success: true,
            data: None,
            message: None,
            code: Some(i64::from(code)),
        }
    }

    pub fn failure(message: impl Into<String>, code: Option<i64>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            code,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The payload of a successful envelope; `None` for failures.
    pub fn into_data(self) -> Option<T> {
        if self.success {
            self.data
        } else {
            None
        }
    }

    pub fn message_or_default(&self) -> &str {
        self.message.as_deref().unwrap_or("unknown error")
    }
}

/// How a successful JSON body was framed by the backend.
#[derive(Debug, PartialEq)]
pub enum Framing<T> {
    /// The backend already sent an envelope.
    Enveloped(ApiResponse<T>),
    /// The backend sent the payload directly.
    Raw(T),
}

/// Failures while decoding a successful response body.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON in response body: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("response payload did not match the expected shape: {0}")]
    Payload(#[source] serde_json::Error),
}

/// Decode a JSON value as an envelope first, then as a bare payload.
///
/// Any object with a boolean `success` is an envelope. A `message` that is
/// not a string or a `code` that is not an integer is dropped rather than
/// demoting the whole body to a bare payload.
pub fn decode_framing<T: DeserializeOwned>(value: Value) -> Result<Framing<T>, DecodeError> {
    let Some(success) = value.get("success").and_then(Value::as_bool) else {
        return serde_json::from_value(value)
            .map(Framing::Raw)
            .map_err(DecodeError::Payload);
    };
    let data = match value.get("data") {
        None | Some(Value::Null) => None,
        Some(raw) => Some(T::deserialize(raw).map_err(DecodeError::Payload)?),
    };
    Ok(Framing::Enveloped(ApiResponse {
        success,
        data,
        message: value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        code: value.get("code").and_then(Value::as_i64),
    }))
}

/// Decode a 2xx response.
pub fn decode_success<T: DeserializeOwned>(
    response: &HttpResponse,
) -> Result<ApiResponse<T>, DecodeError> {
    if is_empty_body(response) {
        return Ok(ApiResponse::empty(response.status));
    }
    let value: Value = serde_json::from_str(&response.body).map_err(DecodeError::InvalidJson)?;
    Ok(match decode_framing(value)? {
        Framing::Enveloped(envelope) => envelope,
        Framing::Raw(data) => ApiResponse::ok(data, response.status),
    })
}

/// Build the failure envelope for a non-2xx response.
///
/// A JSON error body contributes its `message` (or `error`) and `code`;
/// anything else falls back to the status.
pub fn decode_error<T>(response: &HttpResponse) -> ApiResponse<T> {
    let fallback = format!("HTTP error! status: {}", response.status);
    let status = i64::from(response.status);
    let Ok(body) = serde_json::from_str::<Value>(&response.body) else {
        return ApiResponse::failure(fallback, Some(status));
    };

    let text_field = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    };
    let message = text_field("message")
        .or_else(|| text_field("error"))
        .unwrap_or(fallback);
    let code = body
        .get("code")
        .and_then(Value::as_i64)
        .filter(|code| *code != 0)
        .unwrap_or(status);
    ApiResponse::failure(message, Some(code))
}

/// Fold any response into an envelope. Never fails.
pub fn normalize_response<T: DeserializeOwned>(response: &HttpResponse) -> ApiResponse<T> {
    if !response.is_success() {
        return decode_error(response);
    }
    decode_success(response).unwrap_or_else(|err| ApiResponse::failure(err.to_string(), None))
}

fn is_empty_body(response: &HttpResponse) -> bool {
    response.status == 204
        || response.header("content-length").map(str::trim) == Some("0")
        || response.body.trim().is_empty()
}
